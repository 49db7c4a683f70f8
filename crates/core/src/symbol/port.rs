use super::entity::RefDataUuid;

/// # Summary
/// 参考数据标识生成器接口。
///
/// # Invariants
/// - 生成的标识全局唯一、按生成顺序单调可排序、对调用方不透明且带前缀。
/// - 只能由解析器在 "铸造新身份" 分支中调用，记录构造不得产生此副作用。
pub trait IdGenerator: Send + Sync {
    /// 铸造一个新的参考数据标识
    fn next_ref_data_uuid(&self) -> RefDataUuid;
}
