//! # `refdata-store` - 存储适配器
//!
//! 实现 `refdata-core` 中定义的 `RegistryStore` / `RegistrySession` 端口：
//! - `sqlite`: 基于 sqlx 的 SQLite 实现，一个会话对应一个数据库事务。
//! - `memory`: 基于内存的实现，会话内写入先缓冲，提交时一次性应用。

pub mod memory;
pub mod sqlite;
