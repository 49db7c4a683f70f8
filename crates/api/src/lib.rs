//! # `refdata-api` - HTTP API 网关
//!
//! 参考数据注册中心的 HTTP/REST 服务入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收批量符号创建、公司行动创建与查询请求
//! - 将线上 DTO 显式转换为领域请求后调用下层 `Registry`
//! - 把批量结果映射为 201 / 207 / 400，把校验失败映射为 422

pub mod error;
pub mod routes;
pub mod server;
pub mod types;
