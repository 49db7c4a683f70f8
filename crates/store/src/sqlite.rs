use async_trait::async_trait;
use chrono::NaiveDateTime;
use refdata_core::common::interval::IntervalPredicate;
use refdata_core::corp_action::entity::{CorpAction, CorpActionType};
use refdata_core::store::error::StoreError;
use refdata_core::store::port::{RegistrySession, RegistryStore};
use refdata_core::symbol::entity::{RefDataUuid, SymbolRecord};
use sqlx::{
    Sqlite, SqlitePool, Transaction,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// 默认注册中心数据库文件名
const DEFAULT_REGISTRY_DB: &str = "refdata.db";

type SymbolRow = (
    String,
    String,
    String,
    Option<String>,
    NaiveDateTime,
    NaiveDateTime,
);

type CorpActionRow = (String, NaiveDateTime, String, f64, f64);

const SYMBOL_COLUMNS: &str = "ref_data_uuid, symbology, symbol, exchange, start_time, end_time";
const CORP_ACTION_COLUMNS: &str =
    "ref_data_uuid, effective_time, action_type, additive_adjustment, multiplicative_adjustment";

fn symbol_from_row(r: SymbolRow) -> SymbolRecord {
    SymbolRecord {
        ref_data_uuid: RefDataUuid(r.0),
        symbology: r.1,
        symbol: r.2,
        exchange: r.3,
        start_time: r.4,
        end_time: r.5,
    }
}

fn corp_action_from_row(r: CorpActionRow) -> Result<CorpAction, StoreError> {
    let action_type = r
        .2
        .parse::<CorpActionType>()
        .map_err(StoreError::Database)?;
    Ok(CorpAction {
        ref_data_uuid: RefDataUuid(r.0),
        effective_time: r.1,
        action_type,
        additive_adjustment: r.3,
        multiplicative_adjustment: r.4,
    })
}

/// 将 sqlx 错误映射为存储层错误，主键冲突单独区分。
fn map_db_err(e: sqlx::Error) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return StoreError::Duplicate(db_err.message().to_string());
        }
    }
    StoreError::Database(e.to_string())
}

/// RegistryStore 的 SQLite 实现。
///
/// # Summary
/// 在单个 SQLite 数据库 (`refdata.db`) 中管理符号记录与公司行动。
///
/// # Invariants
/// * 数据库结构在存储实例创建时初始化。
/// * 所有会话均从共享的 `SqlitePool` 中取得连接并各自持有一个事务。
pub struct SqliteRegistryStore {
    pool: SqlitePool,
}

impl SqliteRegistryStore {
    /// 打开 (必要时创建) 指定数据目录下的注册中心数据库。
    ///
    /// # Logic
    /// 1. 确保数据目录存在。
    /// 2. 配置 SQLite 连接选项：自动创建、WAL 日志、忙等待超时。
    /// 3. 连接数据库并执行 DDL 初始化表结构与索引。
    ///
    /// # Arguments
    /// * `data_dir` - 数据根目录。
    ///
    /// # Returns
    /// * `Result<Self, StoreError>` - 存储实例或初始化错误。
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = data_dir.as_ref();
        fs::create_dir_all(root).map_err(|e| StoreError::InitError(e.to_string()))?;

        let db_path = root.join(DEFAULT_REGISTRY_DB);

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| StoreError::InitError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS symbols (
                ref_data_uuid TEXT NOT NULL,
                symbology TEXT NOT NULL,
                symbol TEXT NOT NULL,
                exchange TEXT,
                start_time DATETIME NOT NULL,
                end_time DATETIME NOT NULL,
                PRIMARY KEY (ref_data_uuid, symbology, start_time)
            );

            CREATE INDEX IF NOT EXISTS idx_symbols_lookup
                ON symbols (symbology, symbol);

            CREATE TABLE IF NOT EXISTS corp_actions (
                ref_data_uuid TEXT NOT NULL,
                effective_time DATETIME NOT NULL,
                action_type TEXT NOT NULL,
                additive_adjustment REAL NOT NULL,
                multiplicative_adjustment REAL NOT NULL,
                PRIMARY KEY (ref_data_uuid, effective_time)
            );
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::InitError(e.to_string()))?;

        info!("Registry database ready at {}", db_path.display());
        Ok(Self { pool })
    }
}

#[async_trait]
impl RegistryStore for SqliteRegistryStore {
    async fn begin(&self) -> Result<Box<dyn RegistrySession>, StoreError> {
        let tx = self.pool.begin().await.map_err(map_db_err)?;
        Ok(Box::new(SqliteSession { tx: Some(tx) }))
    }

    async fn list_symbol_records(&self) -> Result<Vec<SymbolRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM symbols ORDER BY ref_data_uuid, symbology, start_time",
            SYMBOL_COLUMNS
        );
        let rows = sqlx::query_as::<_, SymbolRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(symbol_from_row).collect())
    }

    async fn symbol_records_for(
        &self,
        ref_data_uuid: &RefDataUuid,
        symbology: Option<&str>,
    ) -> Result<Vec<SymbolRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM symbols WHERE ref_data_uuid = ? AND (? IS NULL OR symbology = ?) \
             ORDER BY symbology, start_time",
            SYMBOL_COLUMNS
        );
        let rows = sqlx::query_as::<_, SymbolRow>(&sql)
            .bind(ref_data_uuid.as_str())
            .bind(symbology)
            .bind(symbology)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(symbol_from_row).collect())
    }

    async fn list_corp_actions(
        &self,
        ref_data_uuid: Option<&RefDataUuid>,
    ) -> Result<Vec<CorpAction>, StoreError> {
        let sql = format!(
            "SELECT {} FROM corp_actions WHERE (? IS NULL OR ref_data_uuid = ?) \
             ORDER BY ref_data_uuid, effective_time",
            CORP_ACTION_COLUMNS
        );
        let uuid = ref_data_uuid.map(RefDataUuid::as_str);
        sqlx::query_as::<_, CorpActionRow>(&sql)
            .bind(uuid)
            .bind(uuid)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(corp_action_from_row)
            .collect()
    }
}

/// # Summary
/// 单个请求的 SQLite 会话，内部持有一个未提交的事务。
///
/// # Invariants
/// * 会话在 `commit` 之前被丢弃时，sqlx 会自动回滚事务。
/// * `commit` 之后 `tx` 为 `None`，后续调用返回 `StoreError::Closed`。
pub struct SqliteSession {
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteSession {
    fn tx(&mut self) -> Result<&mut Transaction<'static, Sqlite>, StoreError> {
        self.tx.as_mut().ok_or(StoreError::Closed)
    }
}

#[async_trait]
impl RegistrySession for SqliteSession {
    async fn find_symbol_records(
        &mut self,
        symbology: &str,
        symbol: &str,
        predicate: IntervalPredicate,
    ) -> Result<Vec<SymbolRecord>, StoreError> {
        let (latest_start, earliest_end) = predicate.bounds();
        let sql = format!(
            "SELECT {} FROM symbols \
             WHERE symbology = ? AND symbol = ? AND start_time <= ? AND end_time >= ? \
             ORDER BY ref_data_uuid, start_time",
            SYMBOL_COLUMNS
        );
        let tx = self.tx()?;
        let rows = sqlx::query_as::<_, SymbolRow>(&sql)
            .bind(symbology)
            .bind(symbol)
            .bind(latest_start)
            .bind(earliest_end)
            .fetch_all(&mut **tx)
            .await
            .map_err(map_db_err)?;

        debug!(
            "find_symbol_records({}, {}, {:?}) -> {} row(s)",
            symbology,
            symbol,
            predicate,
            rows.len()
        );
        Ok(rows.into_iter().map(symbol_from_row).collect())
    }

    async fn ref_data_uuid_exists(
        &mut self,
        ref_data_uuid: &RefDataUuid,
    ) -> Result<bool, StoreError> {
        let tx = self.tx()?;
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT 1 FROM symbols WHERE ref_data_uuid = ? LIMIT 1",
        )
        .bind(ref_data_uuid.as_str())
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_db_err)?;
        Ok(found.is_some())
    }

    async fn symbol_key_taken(
        &mut self,
        ref_data_uuid: &RefDataUuid,
        symbology: &str,
        start_time: NaiveDateTime,
    ) -> Result<bool, StoreError> {
        let tx = self.tx()?;
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT 1 FROM symbols WHERE ref_data_uuid = ? AND symbology = ? AND start_time = ? LIMIT 1",
        )
        .bind(ref_data_uuid.as_str())
        .bind(symbology)
        .bind(start_time)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_db_err)?;
        Ok(found.is_some())
    }

    async fn insert_symbol_record(&mut self, record: &SymbolRecord) -> Result<(), StoreError> {
        let tx = self.tx()?;
        sqlx::query(
            "INSERT INTO symbols (ref_data_uuid, symbology, symbol, exchange, start_time, end_time) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.ref_data_uuid.as_str())
        .bind(&record.symbology)
        .bind(&record.symbol)
        .bind(&record.exchange)
        .bind(record.start_time)
        .bind(record.end_time)
        .execute(&mut **tx)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn insert_corp_action_record(&mut self, record: &CorpAction) -> Result<(), StoreError> {
        let tx = self.tx()?;
        sqlx::query(
            "INSERT INTO corp_actions (ref_data_uuid, effective_time, action_type, additive_adjustment, multiplicative_adjustment) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.ref_data_uuid.as_str())
        .bind(record.effective_time)
        .bind(record.action_type.to_string())
        .bind(record.additive_adjustment)
        .bind(record.multiplicative_adjustment)
        .execute(&mut **tx)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        let tx = self.tx.take().ok_or(StoreError::Closed)?;
        tx.commit().await.map_err(map_db_err)
    }
}
