//! # `refdata-registry` - 符号身份解析
//!
//! 注册中心的核心逻辑：
//! - `interval`: 区间查询引擎，两种谓词分别服务批量解析与公司行动挂载。
//! - `resolver`: 根据一只证券的符号体系映射决定复用、铸造或拒绝参考数据标识。
//! - `corp_action`: 按标识或按 (symbology, symbol, 生效时间) 挂载公司行动。
//! - `batch`: 汇总批量请求中各条目的结果与整体状态。
//! - `registry`: 面向 API 层的门面，每个请求开启并提交一个存储会话。

pub mod batch;
pub mod corp_action;
pub mod error;
pub mod id;
pub mod interval;
pub mod registry;
pub mod resolver;
