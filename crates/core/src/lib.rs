//! # `refdata-core` - 领域模型与端口
//!
//! 定义参考数据注册中心的核心实体（符号记录、公司行动）、时间区间谓词、
//! 输入校验规则，以及存储层与标识生成器的抽象接口。
//! 本 crate 不包含任何 I/O 实现。

pub mod common;
pub mod config;
pub mod corp_action;
pub mod store;
pub mod symbol;
