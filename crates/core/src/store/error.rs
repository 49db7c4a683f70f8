use thiserror::Error;

/// # Summary
/// 存储层错误枚举，处理数据库连接、读写与提交失败等问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 存储错误对整个批次是致命的，与逐条目的业务错误分属不同层次。
#[derive(Error, Debug)]
pub enum StoreError {
    /// 数据库操作失败
    #[error("Database error: {0}")]
    Database(String),
    /// 主键冲突
    #[error("Duplicate key: {0}")]
    Duplicate(String),
    /// 会话已提交或已关闭
    #[error("Session already closed")]
    Closed,
    /// 初始化存储失败
    #[error("Initialization error: {0}")]
    InitError(String),
}
