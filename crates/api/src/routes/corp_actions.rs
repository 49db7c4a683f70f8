//! # 公司行动路由控制器
//!
//! 实现 `/corpActions/` 路径下的 REST 接口。

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use refdata_core::symbol::entity::RefDataUuid;
use refdata_registry::corp_action::AttachOutcome;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, CorpActionCreate, CorpActionPublic};

/// 列出所有公司行动
#[utoipa::path(
    get,
    path = "/corpActions/",
    tag = "公司行动 (CorpActions)",
    responses(
        (status = 200, description = "公司行动列表", body = Vec<CorpActionPublic>),
        (status = 500, description = "存储错误", body = ApiErrorResponse)
    )
)]
pub async fn list_corp_actions(
    State(state): State<AppState>,
) -> Result<Json<Vec<CorpActionPublic>>, ApiError> {
    let actions = state.registry.list_corp_actions(None).await?;
    Ok(Json(actions.into_iter().map(CorpActionPublic::from).collect()))
}

/// 创建公司行动
///
/// 未提供 `ref_data_uuid` 时，以 (symbology, symbol) 在生效时间点上查找标识；
/// 命中多只证券时为每只证券各写一条。
#[utoipa::path(
    post,
    path = "/corpActions/",
    tag = "公司行动 (CorpActions)",
    request_body = CorpActionCreate,
    responses(
        (status = 201, description = "每个解析出的标识对应一条结果", body = Vec<CorpActionPublic>),
        (status = 404, description = "未找到挂载目标", body = Vec<CorpActionPublic>),
        (status = 409, description = "同一证券在该生效时间已有公司行动", body = ApiErrorResponse),
        (status = 422, description = "请求校验失败", body = ApiErrorResponse)
    )
)]
pub async fn create_corp_action(
    State(state): State<AppState>,
    Json(req): Json<CorpActionCreate>,
) -> Result<(StatusCode, Json<Vec<CorpActionPublic>>), ApiError> {
    let request = req.to_request()?;
    match state.registry.create_corp_action(request).await? {
        AttachOutcome::Created(actions) => Ok((
            StatusCode::CREATED,
            Json(actions.into_iter().map(CorpActionPublic::created).collect()),
        )),
        AttachOutcome::NotFound(error) => Ok((
            StatusCode::NOT_FOUND,
            Json(vec![CorpActionPublic::not_found(&req, error)]),
        )),
    }
}

/// 修改已有的公司行动 (尚未支持)
#[utoipa::path(
    put,
    path = "/corpActions/",
    tag = "公司行动 (CorpActions)",
    request_body = CorpActionCreate,
    responses(
        (status = 501, description = "尚未支持", body = ApiErrorResponse),
        (status = 422, description = "请求校验失败", body = ApiErrorResponse)
    )
)]
pub async fn update_corp_action(
    State(state): State<AppState>,
    Json(req): Json<CorpActionCreate>,
) -> Result<Json<Vec<CorpActionPublic>>, ApiError> {
    let request = req.to_request()?;
    match state.registry.update_corp_action(request).await? {}
}

/// 获取指定证券的公司行动
#[utoipa::path(
    get,
    path = "/corpActions/{ref_data_uuid}",
    tag = "公司行动 (CorpActions)",
    params(
        ("ref_data_uuid" = String, Path, description = "参考数据标识")
    ),
    responses(
        (status = 200, description = "公司行动列表，可能为空", body = Vec<CorpActionPublic>)
    )
)]
pub async fn get_corp_actions(
    State(state): State<AppState>,
    Path(ref_data_uuid): Path<String>,
) -> Result<Json<Vec<CorpActionPublic>>, ApiError> {
    let uuid = RefDataUuid(ref_data_uuid);
    let actions = state.registry.list_corp_actions(Some(&uuid)).await?;
    Ok(Json(actions.into_iter().map(CorpActionPublic::from).collect()))
}
