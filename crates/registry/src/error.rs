use refdata_core::common::error::ValidationError;
use refdata_core::store::error::StoreError;
use thiserror::Error;

/// # Summary
/// Registry 层的统一错误类型。
///
/// # Invariants
/// - 逐条目的解析冲突与未找到不会出现在这里，它们是批量结果的一部分。
/// - `Store` 对整个请求是致命的，已排队的写入不会持久化。
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}
