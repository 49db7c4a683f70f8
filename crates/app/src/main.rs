use std::sync::Arc;

use config::{Config, ConfigError, Environment, File};
use refdata_api::server::{self, AppState};
use refdata_core::config::{AppConfig, LoggingConfig};
use refdata_registry::id::UuidV7Generator;
use refdata_registry::registry::Registry;
use refdata_store::sqlite::SqliteRegistryStore;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// # Summary
/// 加载配置：内置默认值 -> 可选的 `config.toml` -> `REFDATA__` 前缀环境变量。
///
/// # Returns
/// 合并后的配置，格式错误时返回 `ConfigError`。
fn load_config() -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(Config::try_from(&AppConfig::default())?)
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("REFDATA")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// # Summary
/// 初始化全局日志。`RUST_LOG` 优先于配置中的级别。
///
/// # Returns
/// 配置了日志目录时返回文件写入线程的 guard，必须持有到进程退出。
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let (file_layer, guard) = match &logging.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "refdata.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received. Exiting...");
}

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 Arc<dyn Trait> 注入到 Registry。
///
/// # Logic
/// 1. 加载配置并初始化全局日志。
/// 2. 实例化基础设施层 (SQLite 存储)。
/// 3. 构造应用服务层 (Registry)。
/// 4. 启动 HTTP 服务，等待外部信号退出。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 配置与日志
    let app_config = load_config()?;
    let _log_guard = init_logging(&app_config.logging);
    info!("Reference data registry starting...");

    // 2. 实例化基础设施层
    let store = Arc::new(SqliteRegistryStore::open(&app_config.database.data_dir).await?);
    info!("Store opened at {}", app_config.database.data_dir);

    // 3. 构造应用服务层
    let registry = Registry::new(store, Arc::new(UuidV7Generator::new()));

    // 4. 启动 API
    let state = AppState { registry };
    server::start_server(state, &app_config.server.bind_addr(), shutdown_signal()).await?;

    Ok(())
}
