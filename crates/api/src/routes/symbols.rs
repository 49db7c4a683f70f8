//! # 证券符号路由控制器
//!
//! 实现 `/symbols/` 路径下的 REST 接口：批量创建、全量与按标识查询。

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use refdata_core::symbol::entity::RefDataUuid;
use refdata_registry::batch::{BatchStatus, SymbolBatchItem};

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, SecuritySymbolsPublic, SymbologySymbolCreate, SymbologySymbolPublic};

fn status_of(status: BatchStatus) -> StatusCode {
    match status {
        BatchStatus::Created => StatusCode::CREATED,
        BatchStatus::Partial => StatusCode::MULTI_STATUS,
        BatchStatus::AllFailed => StatusCode::BAD_REQUEST,
    }
}

/// 列出所有证券
///
/// 按参考数据标识分组，每只证券附带其完整的符号体系映射。
#[utoipa::path(
    get,
    path = "/symbols/",
    tag = "符号 (Symbols)",
    responses(
        (status = 200, description = "证券列表", body = Vec<SecuritySymbolsPublic>),
        (status = 500, description = "存储错误", body = ApiErrorResponse)
    )
)]
pub async fn list_symbols(
    State(state): State<AppState>,
) -> Result<Json<Vec<SecuritySymbolsPublic>>, ApiError> {
    let securities = state.registry.list_securities().await?;
    Ok(Json(securities.into_iter().map(SecuritySymbolsPublic::from).collect()))
}

/// 批量创建证券符号
///
/// 每个条目独立解析：复用已有标识、铸造新标识，或以条目错误拒绝。
/// 整体状态码：全部成功 201，部分成功 207，全部失败 400。
#[utoipa::path(
    post,
    path = "/symbols/",
    tag = "符号 (Symbols)",
    request_body = Vec<SymbologySymbolCreate>,
    responses(
        (status = 201, description = "全部条目创建成功", body = Vec<SymbologySymbolPublic>),
        (status = 207, description = "部分条目失败", body = Vec<SymbologySymbolPublic>),
        (status = 400, description = "全部条目失败", body = Vec<SymbologySymbolPublic>),
        (status = 422, description = "请求校验失败", body = ApiErrorResponse),
        (status = 500, description = "存储错误，整个批量未写入", body = ApiErrorResponse)
    )
)]
pub async fn create_symbols(
    State(state): State<AppState>,
    Json(req): Json<Vec<SymbologySymbolCreate>>,
) -> Result<(StatusCode, Json<Vec<SymbologySymbolPublic>>), ApiError> {
    let items: Vec<SymbolBatchItem> = req.into_iter().map(SymbolBatchItem::from).collect();
    let outcome = state.registry.create_symbols(items).await?;

    let body = outcome
        .items
        .into_iter()
        .map(SymbologySymbolPublic::from)
        .collect();
    Ok((status_of(outcome.status), Json(body)))
}

/// 修改证券的符号历史 (尚未支持)
#[utoipa::path(
    put,
    path = "/symbols/",
    tag = "符号 (Symbols)",
    request_body = Vec<SymbologySymbolCreate>,
    responses(
        (status = 501, description = "尚未支持", body = ApiErrorResponse)
    )
)]
pub async fn update_symbols(
    State(state): State<AppState>,
    Json(req): Json<Vec<SymbologySymbolCreate>>,
) -> Result<Json<Vec<SymbologySymbolPublic>>, ApiError> {
    let items = req.into_iter().map(SymbolBatchItem::from).collect();
    match state.registry.update_symbol_history(items).await? {}
}

/// 获取指定证券的完整符号体系映射
#[utoipa::path(
    get,
    path = "/symbols/{ref_data_uuid}",
    tag = "符号 (Symbols)",
    params(
        ("ref_data_uuid" = String, Path, description = "参考数据标识")
    ),
    responses(
        (status = 200, description = "证券详情", body = SecuritySymbolsPublic),
        (status = 404, description = "标识不存在", body = ApiErrorResponse)
    )
)]
pub async fn get_symbol(
    State(state): State<AppState>,
    Path(ref_data_uuid): Path<String>,
) -> Result<Json<SecuritySymbolsPublic>, ApiError> {
    let uuid = RefDataUuid(ref_data_uuid);
    let security = state
        .registry
        .get_security(&uuid, None)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No symbol found for ref_data_uuid {}", uuid)))?;
    Ok(Json(security.into()))
}

/// 获取指定证券在某一符号体系下的记录
#[utoipa::path(
    get,
    path = "/symbols/{ref_data_uuid}/symbology/{symbology}",
    tag = "符号 (Symbols)",
    params(
        ("ref_data_uuid" = String, Path, description = "参考数据标识"),
        ("symbology" = String, Path, description = "符号体系")
    ),
    responses(
        (status = 200, description = "证券详情 (仅含该体系)", body = SecuritySymbolsPublic),
        (status = 404, description = "无匹配记录", body = ApiErrorResponse)
    )
)]
pub async fn get_symbol_by_symbology(
    State(state): State<AppState>,
    Path((ref_data_uuid, symbology)): Path<(String, String)>,
) -> Result<Json<SecuritySymbolsPublic>, ApiError> {
    let uuid = RefDataUuid(ref_data_uuid);
    let security = state
        .registry
        .get_security(&uuid, Some(&symbology))
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "No {} symbol found for ref_data_uuid {}",
                symbology, uuid
            ))
        })?;
    Ok(Json(security.into()))
}
