use super::error::StoreError;
use crate::common::interval::IntervalPredicate;
use crate::corp_action::entity::CorpAction;
use crate::symbol::entity::{RefDataUuid, SymbolRecord};
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// # Summary
/// 注册中心存储接口，负责开启请求级会话并提供只读投影。
///
/// # Invariants
/// - 实现者必须线程安全，可被多个并发请求共享。
/// - 每个请求通过 `begin` 获得独立会话，会话之间不共享未提交的写入。
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// # Summary
    /// 开启一个新的事务性会话。
    ///
    /// # Logic
    /// 获取底层连接并开始事务。会话在 `commit` 之前丢弃即视为回滚。
    ///
    /// # Returns
    /// 会话句柄或 `StoreError`。
    async fn begin(&self) -> Result<Box<dyn RegistrySession>, StoreError>;

    /// # Summary
    /// 读取全部符号记录。
    ///
    /// # Returns
    /// 按 (`ref_data_uuid`, `symbology`, `start_time`) 排序的记录列表。
    async fn list_symbol_records(&self) -> Result<Vec<SymbolRecord>, StoreError>;

    /// # Summary
    /// 读取某只证券的符号记录，可选地限定符号体系。
    ///
    /// # Arguments
    /// * `ref_data_uuid`: 证券标识。
    /// * `symbology`: 为 `Some` 时只返回该体系下的记录。
    ///
    /// # Returns
    /// 按 (`symbology`, `start_time`) 排序的记录列表，无匹配时为空。
    async fn symbol_records_for(
        &self,
        ref_data_uuid: &RefDataUuid,
        symbology: Option<&str>,
    ) -> Result<Vec<SymbolRecord>, StoreError>;

    /// # Summary
    /// 读取公司行动，可选地限定证券。
    ///
    /// # Returns
    /// 按 (`ref_data_uuid`, `effective_time`) 排序的记录列表。
    async fn list_corp_actions(
        &self,
        ref_data_uuid: Option<&RefDataUuid>,
    ) -> Result<Vec<CorpAction>, StoreError>;
}

/// # Summary
/// 单个请求的事务性会话，所有读写共享同一事务。
///
/// # Invariants
/// - 读操作可见本会话内已排队但尚未提交的写入。
/// - 写入在 `commit` 成功之前不持久。
/// - `commit` 之后会话不可再用，任何调用返回 `StoreError::Closed`。
#[async_trait]
pub trait RegistrySession: Send {
    /// # Summary
    /// 按 (symbology, symbol) 精确匹配并以区间谓词过滤符号记录。
    ///
    /// # Arguments
    /// * `symbology`: 符号体系 (精确匹配)。
    /// * `symbol`: 符号 (精确匹配)。
    /// * `predicate`: 时间区间谓词。
    ///
    /// # Returns
    /// 所有满足条件的记录，无匹配时为空序列而非错误。
    async fn find_symbol_records(
        &mut self,
        symbology: &str,
        symbol: &str,
        predicate: IntervalPredicate,
    ) -> Result<Vec<SymbolRecord>, StoreError>;

    /// # Summary
    /// 判断是否存在任何体系下引用该标识的符号记录。
    async fn ref_data_uuid_exists(&mut self, ref_data_uuid: &RefDataUuid)
    -> Result<bool, StoreError>;

    /// # Summary
    /// 判断主键 (`ref_data_uuid`, `symbology`, `start_time`) 是否已被占用，
    /// 包括本会话内已排队的写入。
    async fn symbol_key_taken(
        &mut self,
        ref_data_uuid: &RefDataUuid,
        symbology: &str,
        start_time: NaiveDateTime,
    ) -> Result<bool, StoreError>;

    /// 排队写入一条符号记录
    async fn insert_symbol_record(&mut self, record: &SymbolRecord) -> Result<(), StoreError>;

    /// 排队写入一条公司行动记录
    async fn insert_corp_action_record(&mut self, record: &CorpAction) -> Result<(), StoreError>;

    /// # Summary
    /// 提交会话内的全部写入，作为一个批次请求的持久化边界。
    ///
    /// # Returns
    /// 提交失败时整批写入均不生效。
    async fn commit(&mut self) -> Result<(), StoreError>;
}
