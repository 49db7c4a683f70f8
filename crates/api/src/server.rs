//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 的 DI 容器持有并调用。

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use refdata_registry::registry::Registry;

use crate::routes::{corp_actions, health, symbols};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - `registry` 在服务启动前由 DI 容器注入，生命周期与进程等同。
#[derive(Clone)]
pub struct AppState {
    /// 参考数据注册中心 (Facade)
    pub registry: Arc<Registry>,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Reference Data Registry API",
        version = "0.1.0",
        description = "证券参考数据注册中心：跨符号体系的身份解析与公司行动挂载。",
        license(name = "MIT")
    ),
    tags(
        (name = "系统 (System)", description = "存活检查"),
        (name = "符号 (Symbols)", description = "证券符号体系映射的批量创建与查询"),
        (name = "公司行动 (CorpActions)", description = "公司行动的创建与查询")
    )
)]
pub struct ApiDoc;

// ============================================================
//  服务构建与启动
// ============================================================

/// # Summary
/// 构建完整的 axum 应用路由树 (含 Swagger UI 与 CORS)。
///
/// # Arguments
/// * `state` - 由外部 DI 容器注入的共享状态
pub fn build_router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(health::root))
        .routes(routes!(
            symbols::list_symbols,
            symbols::create_symbols,
            symbols::update_symbols
        ))
        .routes(routes!(symbols::get_symbol))
        .routes(routes!(symbols::get_symbol_by_symbology))
        .routes(routes!(
            corp_actions::list_corp_actions,
            corp_actions::create_corp_action,
            corp_actions::update_corp_action
        ))
        .routes(routes!(corp_actions::get_corp_actions))
        .with_state(state)
        .split_for_parts();

    // 开发阶段允许所有来源
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(cors)
}

/// # Summary
/// 在已绑定的监听器上提供服务，直到 `shutdown` 完成。
///
/// # Arguments
/// * `state` - 共享状态
/// * `listener` - 已绑定的 TCP 监听器
/// * `shutdown` - 优雅退出信号
pub async fn serve(
    state: AppState,
    listener: TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// # Summary
/// 绑定端口并启动 HTTP 服务。
///
/// # Arguments
/// * `state` - 由外部 DI 容器注入的共享状态
/// * `bind_addr` - 监听的地址与端口，如 `"0.0.0.0:8080"`
/// * `shutdown` - 优雅退出信号
///
/// # Returns
/// TCP 绑定失败或服务异常退出时返回错误。
pub async fn start_server(
    state: AppState,
    bind_addr: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("Reference data API listening on {}", listener.local_addr()?);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", bind_addr);

    serve(state, listener, shutdown).await
}
