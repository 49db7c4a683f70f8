use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::error::ValidationError;
use crate::common::time::check_instant;
use crate::symbol::entity::RefDataUuid;

/// # Summary
/// 公司行动类型枚举，固定集合。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorpActionType {
    // 拆股
    StockSplit,
    // 分红
    Dividend,
    // 合并
    Merger,
    // 收购
    Acquisition,
    // 配股
    RightsIssue,
    // 送股
    BonusIssue,
    // 分拆
    SpinOff,
    // 其他
    Other,
}

impl FromStr for CorpActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STOCK_SPLIT" => Ok(CorpActionType::StockSplit),
            "DIVIDEND" => Ok(CorpActionType::Dividend),
            "MERGER" => Ok(CorpActionType::Merger),
            "ACQUISITION" => Ok(CorpActionType::Acquisition),
            "RIGHTS_ISSUE" => Ok(CorpActionType::RightsIssue),
            "BONUS_ISSUE" => Ok(CorpActionType::BonusIssue),
            "SPIN_OFF" => Ok(CorpActionType::SpinOff),
            "OTHER" => Ok(CorpActionType::Other),
            _ => Err(format!("Unknown CorpActionType: {}", s)),
        }
    }
}

impl fmt::Display for CorpActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CorpActionType::StockSplit => "STOCK_SPLIT",
            CorpActionType::Dividend => "DIVIDEND",
            CorpActionType::Merger => "MERGER",
            CorpActionType::Acquisition => "ACQUISITION",
            CorpActionType::RightsIssue => "RIGHTS_ISSUE",
            CorpActionType::BonusIssue => "BONUS_ISSUE",
            CorpActionType::SpinOff => "SPIN_OFF",
            CorpActionType::Other => "OTHER",
        };
        f.write_str(s)
    }
}

pub const DEFAULT_ADDITIVE_ADJUSTMENT: f64 = 0.0;
pub const DEFAULT_MULTIPLICATIVE_ADJUSTMENT: f64 = 1.0;

/// # Summary
/// 持久化的公司行动事实，挂载在某只证券的参考数据标识上。
///
/// # Invariants
/// - 复合主键为 (`ref_data_uuid`, `effective_time`)。
/// - `effective_time` 位于全局哨兵上下限之内。
/// - 调整因子的组合语义由消费方决定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpAction {
    pub ref_data_uuid: RefDataUuid,
    pub effective_time: NaiveDateTime,
    pub action_type: CorpActionType,
    pub additive_adjustment: f64,
    pub multiplicative_adjustment: f64,
}

/// # Summary
/// 公司行动的挂载目标，两种定位方式互斥。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpActionTarget {
    /// 显式给出参考数据标识
    RefDataUuid(RefDataUuid),
    /// 通过 (symbology, symbol) 在生效时间点上查找
    Symbol { symbology: String, symbol: String },
}

impl CorpActionTarget {
    /// # Summary
    /// 从可选字段组合出唯一的挂载目标。
    ///
    /// # Logic
    /// 1. 空字符串视同未提供。
    /// 2. 标识与 (symbology, symbol) 同时出现 (哪怕只出现一半) 视为歧义。
    /// 3. 标识缺失时，symbology 与 symbol 必须同时给出。
    pub fn from_parts(
        ref_data_uuid: Option<String>,
        symbology: Option<String>,
        symbol: Option<String>,
    ) -> Result<Self, ValidationError> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        let (ref_data_uuid, symbology, symbol) =
            (non_empty(ref_data_uuid), non_empty(symbology), non_empty(symbol));

        match (ref_data_uuid, symbology, symbol) {
            (Some(uuid), None, None) => Ok(CorpActionTarget::RefDataUuid(RefDataUuid(uuid))),
            (Some(_), _, _) => Err(ValidationError::AmbiguousTarget),
            (None, Some(symbology), Some(symbol)) => {
                Ok(CorpActionTarget::Symbol { symbology, symbol })
            }
            (None, _, _) => Err(ValidationError::MissingTarget),
        }
    }
}

/// # Summary
/// 创建公司行动的领域请求。
#[derive(Debug, Clone, PartialEq)]
pub struct CorpActionRequest {
    pub target: CorpActionTarget,
    pub effective_time: NaiveDateTime,
    pub action_type: CorpActionType,
    pub additive_adjustment: f64,
    pub multiplicative_adjustment: f64,
}

impl CorpActionRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_instant(self.effective_time)
    }

    /// 针对解析出的标识生成待写入的记录
    pub fn to_record(&self, ref_data_uuid: &RefDataUuid) -> CorpAction {
        CorpAction {
            ref_data_uuid: ref_data_uuid.clone(),
            effective_time: self.effective_time,
            action_type: self.action_type,
            additive_adjustment: self.additive_adjustment,
            multiplicative_adjustment: self.multiplicative_adjustment,
        }
    }
}
