//! # 区间查询引擎
//!
//! 在 (symbology, symbol) 精确匹配的记录集合上按时间谓词过滤。
//! 两个入口对应两种谓词，调用方必须按用途选用，不可互换。

use chrono::NaiveDateTime;
use refdata_core::common::interval::IntervalPredicate;
use refdata_core::store::error::StoreError;
use refdata_core::store::port::RegistrySession;
use refdata_core::symbol::entity::{SymbolQuery, SymbolRecord};
use tracing::debug;

/// # Summary
/// 覆盖匹配：查找有效期完整覆盖查询窗口的已有记录。
///
/// # Logic
/// 用于批量创建时的身份解析：`record.start_time <= query.start_time && record.end_time >= query.end_time`。
///
/// # Returns
/// 满足条件的记录，无匹配时为空序列。
pub async fn find_covering(
    session: &mut dyn RegistrySession,
    query: &SymbolQuery,
) -> Result<Vec<SymbolRecord>, StoreError> {
    let predicate = IntervalPredicate::Containing {
        start: query.start_time,
        end: query.end_time,
    };
    find(session, &query.symbology, &query.symbol, predicate).await
}

/// # Summary
/// 时间点匹配：查找在 `at` 时刻有效的记录。
///
/// # Logic
/// 用于按符号挂载公司行动：`record.start_time <= at <= record.end_time`。
///
/// # Returns
/// 满足条件的记录，无匹配时为空序列。
pub async fn find_at(
    session: &mut dyn RegistrySession,
    symbology: &str,
    symbol: &str,
    at: NaiveDateTime,
) -> Result<Vec<SymbolRecord>, StoreError> {
    find(session, symbology, symbol, IntervalPredicate::PointInRange { at }).await
}

async fn find(
    session: &mut dyn RegistrySession,
    symbology: &str,
    symbol: &str,
    predicate: IntervalPredicate,
) -> Result<Vec<SymbolRecord>, StoreError> {
    let records = session.find_symbol_records(symbology, symbol, predicate).await?;
    // 无论存储实现是否下推谓词，返回结果都必须满足谓词
    let matched: Vec<SymbolRecord> = records.into_iter().filter(|r| predicate.matches(r)).collect();
    debug!(
        "interval query {}/{} {:?} matched {} record(s)",
        symbology,
        symbol,
        predicate,
        matched.len()
    );
    Ok(matched)
}
