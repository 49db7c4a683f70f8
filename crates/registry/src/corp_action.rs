//! # 公司行动挂载
//!
//! 将公司行动请求解析到所属证券的参考数据标识并写入。

use std::collections::BTreeSet;

use refdata_core::corp_action::entity::{CorpAction, CorpActionRequest, CorpActionTarget};
use refdata_core::store::error::StoreError;
use refdata_core::store::port::RegistrySession;
use refdata_core::symbol::entity::RefDataUuid;
use tracing::{info, warn};

use crate::interval;

/// # Summary
/// 挂载结果。
#[derive(Debug, Clone, PartialEq)]
pub enum AttachOutcome {
    /// 每个解析出的标识各写入一条公司行动
    Created(Vec<CorpAction>),
    /// 未找到可挂载的证券，附带原因
    NotFound(String),
}

/// # Summary
/// 解析挂载目标并把公司行动排入会话。
///
/// # Logic
/// 1. 显式标识：只检查是否存在任何引用该标识的符号记录，存在则直接写入。
/// 2. 符号查找：以生效时间做时间点匹配，收集去重后的标识。
///    命中多个标识时为每个标识各写一条，不视为歧义 (与批量解析器的拒绝行为不同)。
///
/// # Arguments
/// * `session` - 当前请求的存储会话。
/// * `request` - 已通过校验的公司行动请求。
///
/// # Returns
/// 挂载结果；未找到是正常结果，只有存储失败返回 `Err`。
pub async fn attach(
    session: &mut dyn RegistrySession,
    request: &CorpActionRequest,
) -> Result<AttachOutcome, StoreError> {
    let targets: Vec<RefDataUuid> = match &request.target {
        CorpActionTarget::RefDataUuid(ref_data_uuid) => {
            if !session.ref_data_uuid_exists(ref_data_uuid).await? {
                warn!("Corporate action target {} has no symbol records", ref_data_uuid);
                return Ok(AttachOutcome::NotFound(format!(
                    "No symbol found for ref_data_uuid {}",
                    ref_data_uuid
                )));
            }
            vec![ref_data_uuid.clone()]
        }
        CorpActionTarget::Symbol { symbology, symbol } => {
            let records =
                interval::find_at(session, symbology, symbol, request.effective_time).await?;
            if records.is_empty() {
                warn!(
                    "No symbol found for {} {} on {}",
                    symbology, symbol, request.effective_time
                );
                return Ok(AttachOutcome::NotFound(format!(
                    "No symbol found for {} {} on {}",
                    symbology, symbol, request.effective_time
                )));
            }
            let distinct: BTreeSet<RefDataUuid> =
                records.into_iter().map(|r| r.ref_data_uuid).collect();
            distinct.into_iter().collect()
        }
    };

    let mut created = Vec::with_capacity(targets.len());
    for ref_data_uuid in &targets {
        let record = request.to_record(ref_data_uuid);
        session.insert_corp_action_record(&record).await?;
        created.push(record);
    }

    info!(
        "Queued {} {} corporate action(s) effective {}",
        created.len(),
        request.action_type,
        request.effective_time
    );
    Ok(AttachOutcome::Created(created))
}
