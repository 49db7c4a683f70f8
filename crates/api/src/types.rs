//! # DTO (Data Transfer Object) 层
//!
//! 请求与响应的线上结构体，以及它们与 `refdata-core` 规范记录之间的显式转换。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。

use chrono::NaiveDateTime;
use refdata_core::common::error::ValidationError;
use refdata_core::corp_action::entity::{
    CorpAction, CorpActionRequest, CorpActionTarget, CorpActionType,
    DEFAULT_ADDITIVE_ADJUSTMENT, DEFAULT_MULTIPLICATIVE_ADJUSTMENT,
};
use refdata_core::symbol::entity::{SecuritySymbols, SymbologyMap};
use refdata_registry::batch::{SymbolBatchItem, SymbolItemOutcome};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const CORP_ACTION_CREATED_MESSAGE: &str = "Corporate action created successfully.";

// ============================================================
//  符号相关 DTO
// ============================================================

/// 批量创建中的单个条目
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SymbologySymbolCreate {
    /// 符号体系 -> 符号规格序列
    #[schema(value_type = Object, example = json!({"TICKER": [{"symbol": "AAPL"}]}))]
    pub symbology_map: SymbologyMap,
    /// 仅回显，不影响解析
    #[serde(default)]
    pub force_duplicates: bool,
}

impl From<SymbologySymbolCreate> for SymbolBatchItem {
    fn from(dto: SymbologySymbolCreate) -> Self {
        SymbolBatchItem {
            symbology_map: dto.symbology_map,
            force_duplicates: dto.force_duplicates,
        }
    }
}

/// 批量创建中单个条目的结果
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SymbologySymbolPublic {
    /// 分配或命中的参考数据标识
    #[schema(example = "ref-0190b7c2-5c4e-7c3a-9a55-2f1f0a4b8e11")]
    pub ref_data_uuid: Option<String>,
    #[schema(value_type = Object)]
    pub symbology_map: SymbologyMap,
    pub force_duplicates: bool,
    /// 成功说明
    pub message: Option<String>,
    /// 失败原因
    pub error: Option<String>,
}

impl From<SymbolItemOutcome> for SymbologySymbolPublic {
    fn from(outcome: SymbolItemOutcome) -> Self {
        Self {
            ref_data_uuid: outcome.ref_data_uuid.map(|u| u.0),
            symbology_map: outcome.symbology_map,
            force_duplicates: outcome.force_duplicates,
            message: outcome.message,
            error: outcome.error,
        }
    }
}

/// 一只证券的完整符号体系映射
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SecuritySymbolsPublic {
    #[schema(example = "ref-0190b7c2-5c4e-7c3a-9a55-2f1f0a4b8e11")]
    pub ref_data_uuid: String,
    #[schema(value_type = Object)]
    pub symbology_map: SymbologyMap,
}

impl From<SecuritySymbols> for SecuritySymbolsPublic {
    fn from(security: SecuritySymbols) -> Self {
        Self {
            ref_data_uuid: security.ref_data_uuid.0,
            symbology_map: security.symbology_map,
        }
    }
}

// ============================================================
//  公司行动 DTO
// ============================================================

fn default_additive() -> f64 {
    DEFAULT_ADDITIVE_ADJUSTMENT
}

fn default_multiplicative() -> f64 {
    DEFAULT_MULTIPLICATIVE_ADJUSTMENT
}

/// 创建公司行动请求体。`ref_data_uuid` 与 (`symbology`, `symbol`) 二选一。
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CorpActionCreate {
    pub ref_data_uuid: Option<String>,
    #[schema(example = "TICKER")]
    pub symbology: Option<String>,
    #[schema(example = "AAPL")]
    pub symbol: Option<String>,
    /// 生效时间 (ISO 8601，无时区)
    #[schema(value_type = String, example = "2020-08-31T00:00:00")]
    pub effective_time: NaiveDateTime,
    pub action_type: CorpActionType,
    #[serde(default = "default_additive")]
    #[schema(example = 0.0)]
    pub additive_adjustment: f64,
    #[serde(default = "default_multiplicative")]
    #[schema(example = 4.0)]
    pub multiplicative_adjustment: f64,
}

impl CorpActionCreate {
    /// 转换为领域请求，同时确定挂载目标
    pub fn to_request(&self) -> Result<CorpActionRequest, ValidationError> {
        let target = CorpActionTarget::from_parts(
            self.ref_data_uuid.clone(),
            self.symbology.clone(),
            self.symbol.clone(),
        )?;
        Ok(CorpActionRequest {
            target,
            effective_time: self.effective_time,
            action_type: self.action_type,
            additive_adjustment: self.additive_adjustment,
            multiplicative_adjustment: self.multiplicative_adjustment,
        })
    }
}

/// 公司行动输出
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CorpActionPublic {
    pub ref_data_uuid: Option<String>,
    #[schema(value_type = String, example = "2020-08-31T00:00:00")]
    pub effective_time: NaiveDateTime,
    pub action_type: CorpActionType,
    pub additive_adjustment: f64,
    pub multiplicative_adjustment: f64,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl CorpActionPublic {
    /// 新写入的公司行动
    pub fn created(action: CorpAction) -> Self {
        Self {
            message: Some(CORP_ACTION_CREATED_MESSAGE.to_string()),
            ..Self::from(action)
        }
    }

    /// 未找到挂载目标，回显请求内容
    pub fn not_found(req: &CorpActionCreate, error: String) -> Self {
        Self {
            ref_data_uuid: req.ref_data_uuid.clone(),
            effective_time: req.effective_time,
            action_type: req.action_type,
            additive_adjustment: req.additive_adjustment,
            multiplicative_adjustment: req.multiplicative_adjustment,
            message: None,
            error: Some(error),
        }
    }
}

impl From<CorpAction> for CorpActionPublic {
    fn from(action: CorpAction) -> Self {
        Self {
            ref_data_uuid: Some(action.ref_data_uuid.0),
            effective_time: action.effective_time,
            action_type: action.action_type,
            additive_adjustment: action.additive_adjustment,
            multiplicative_adjustment: action.multiplicative_adjustment,
            message: None,
            error: None,
        }
    }
}

// ============================================================
//  通用 DTO
// ============================================================

/// 简单消息响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Hello World")]
    pub message: String,
}

/// 构建失败响应 (不含泛型载荷)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdata_core::common::time::{highest_datetime, lowest_datetime};

    #[test]
    fn test_symbol_create_defaults() {
        let dto: SymbologySymbolCreate =
            serde_json::from_str(r#"{"symbology_map": {"TICKER": [{"symbol": "EURUSD"}]}}"#)
                .unwrap();
        assert!(!dto.force_duplicates);
        let spec = &dto.symbology_map["TICKER"][0];
        assert_eq!(spec.start_time, lowest_datetime());
        assert_eq!(spec.end_time, highest_datetime());
        assert_eq!(spec.exchange, None);
    }

    #[test]
    fn test_corp_action_create_defaults_and_target() {
        let dto: CorpActionCreate = serde_json::from_str(
            r#"{"symbology": "TICKER", "symbol": "AAPL",
                "effective_time": "2020-08-31T00:00:00", "action_type": "STOCK_SPLIT"}"#,
        )
        .unwrap();
        assert_eq!(dto.additive_adjustment, 0.0);
        assert_eq!(dto.multiplicative_adjustment, 1.0);
        let req = dto.to_request().unwrap();
        assert_eq!(
            req.target,
            CorpActionTarget::Symbol {
                symbology: "TICKER".into(),
                symbol: "AAPL".into()
            }
        );
    }

    #[test]
    fn test_corp_action_create_rejects_both_targets() {
        let dto: CorpActionCreate = serde_json::from_str(
            r#"{"ref_data_uuid": "ref-1", "symbology": "TICKER", "symbol": "AAPL",
                "effective_time": "2020-08-31T00:00:00", "action_type": "DIVIDEND"}"#,
        )
        .unwrap();
        assert_eq!(dto.to_request(), Err(ValidationError::AmbiguousTarget));
    }

    #[test]
    fn test_invalid_timestamp_is_a_parse_error() {
        let parsed = serde_json::from_str::<CorpActionCreate>(
            r#"{"ref_data_uuid": "ref-1", "effective_time": "not-a-date", "action_type": "DIVIDEND"}"#,
        );
        assert!(parsed.is_err());
    }
}
