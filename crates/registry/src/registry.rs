use std::convert::Infallible;
use std::sync::Arc;

use refdata_core::common::error::ValidationError;
use refdata_core::corp_action::entity::{CorpAction, CorpActionRequest};
use refdata_core::store::port::RegistryStore;
use refdata_core::symbol::entity::{
    RefDataUuid, SecuritySymbols, group_records, validate_symbology_map,
};
use refdata_core::symbol::port::IdGenerator;
use tracing::{error, info};

use crate::batch::{BatchOutcome, SymbolBatchItem, SymbolItemOutcome};
use crate::corp_action::{self, AttachOutcome};
use crate::error::RegistryError;
use crate::resolver;

/// # Summary
/// 参考数据注册中心，系统的应用服务层门面 (Facade)。
/// 编译期仅依赖 `refdata-core` 中的 Trait 定义，存储与标识生成通过构造函数注入。
///
/// # Invariants
/// - 每个写请求恰好开启一个会话，成功时提交一次，失败时丢弃会话即回滚。
/// - 校验在开启会话之前完成，校验失败不会触达存储。
pub struct Registry {
    // 存储接口
    store: Arc<dyn RegistryStore>,
    // 标识生成器，只在铸造分支中调用
    ids: Arc<dyn IdGenerator>,
}

impl Registry {
    /// # Summary
    /// 创建 Registry 实例。
    ///
    /// # Arguments
    /// * `store` - 存储接口的具体实现。
    /// * `ids` - 参考数据标识生成器。
    ///
    /// # Returns
    /// * `Arc<Self>` - 可共享的注册中心实例。
    pub fn new(store: Arc<dyn RegistryStore>, ids: Arc<dyn IdGenerator>) -> Arc<Self> {
        Arc::new(Self { store, ids })
    }

    /// # Summary
    /// 批量创建证券符号。
    ///
    /// # Logic
    /// 1. 校验批量非空以及每个条目的时间窗口与起始时间唯一性。
    /// 2. 开启一个会话，按输入顺序逐条解析；冲突与歧义记为条目错误，后续条目照常处理。
    ///    后面的条目可以看到前面条目已排队的写入。
    /// 3. 所有条目处理完之后提交一次；提交失败时整个批量失败，不保留任何写入。
    /// 4. 汇总整体状态。
    ///
    /// # Arguments
    /// * `items` - 批量条目。
    ///
    /// # Returns
    /// * `Result<BatchOutcome, RegistryError>` - 条目结果与整体状态。
    pub async fn create_symbols(
        &self,
        items: Vec<SymbolBatchItem>,
    ) -> Result<BatchOutcome, RegistryError> {
        if items.is_empty() {
            return Err(ValidationError::EmptyBatch.into());
        }
        for item in &items {
            validate_symbology_map(&item.symbology_map)?;
        }

        let mut session = self.store.begin().await?;
        let mut outcomes = Vec::with_capacity(items.len());
        for item in items {
            let resolution =
                resolver::resolve(session.as_mut(), self.ids.as_ref(), &item.symbology_map)
                    .await?;
            outcomes.push(SymbolItemOutcome::from_resolution(item, resolution));
        }

        if let Err(e) = session.commit().await {
            error!("Symbol batch commit failed: {}", e);
            return Err(e.into());
        }

        let outcome = BatchOutcome::new(outcomes);
        info!(
            "Symbol batch of {} item(s) finished with status {:?}",
            outcome.items.len(),
            outcome.status
        );
        Ok(outcome)
    }

    /// # Summary
    /// 创建公司行动。
    ///
    /// # Logic
    /// 1. 校验生效时间范围 (目标模式已在构造 `CorpActionRequest` 时确定)。
    /// 2. 开启会话并挂载；未找到时直接丢弃会话。
    /// 3. 挂载成功后提交。
    ///
    /// # Returns
    /// * `Result<AttachOutcome, RegistryError>` - 写入的公司行动或未找到原因。
    pub async fn create_corp_action(
        &self,
        request: CorpActionRequest,
    ) -> Result<AttachOutcome, RegistryError> {
        request.validate()?;

        let mut session = self.store.begin().await?;
        let outcome = corp_action::attach(session.as_mut(), &request).await?;
        if matches!(outcome, AttachOutcome::Created(_)) {
            session.commit().await.map_err(|e| {
                error!("Corporate action commit failed: {}", e);
                RegistryError::from(e)
            })?;
        }
        Ok(outcome)
    }

    /// # Summary
    /// 列出所有证券及其符号体系映射，按标识排序。
    pub async fn list_securities(&self) -> Result<Vec<SecuritySymbols>, RegistryError> {
        let records = self.store.list_symbol_records().await?;
        Ok(group_records(&records))
    }

    /// # Summary
    /// 读取一只证券的符号体系映射，可选地限定单一体系。
    ///
    /// # Returns
    /// 没有任何匹配记录时返回 `Ok(None)`。
    pub async fn get_security(
        &self,
        ref_data_uuid: &RefDataUuid,
        symbology: Option<&str>,
    ) -> Result<Option<SecuritySymbols>, RegistryError> {
        let records = self.store.symbol_records_for(ref_data_uuid, symbology).await?;
        Ok(group_records(&records).into_iter().next())
    }

    /// # Summary
    /// 列出公司行动，可选地限定证券。
    pub async fn list_corp_actions(
        &self,
        ref_data_uuid: Option<&RefDataUuid>,
    ) -> Result<Vec<CorpAction>, RegistryError> {
        Ok(self.store.list_corp_actions(ref_data_uuid).await?)
    }

    /// # Summary
    /// 修改证券的符号历史。尚未支持，总是返回 `Unsupported`。
    pub async fn update_symbol_history(
        &self,
        _items: Vec<SymbolBatchItem>,
    ) -> Result<Infallible, RegistryError> {
        Err(RegistryError::Unsupported("changing symbol history"))
    }

    /// # Summary
    /// 修改已有的公司行动。尚未支持，总是返回 `Unsupported`。
    pub async fn update_corp_action(
        &self,
        _request: CorpActionRequest,
    ) -> Result<Infallible, RegistryError> {
        Err(RegistryError::Unsupported("editing an existing corporate action"))
    }
}
