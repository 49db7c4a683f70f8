use async_trait::async_trait;
use chrono::NaiveDateTime;
use refdata_core::common::interval::IntervalPredicate;
use refdata_core::corp_action::entity::CorpAction;
use refdata_core::store::error::StoreError;
use refdata_core::store::port::{RegistrySession, RegistryStore};
use refdata_core::symbol::entity::{RefDataUuid, SymbolRecord};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryState {
    symbols: Vec<SymbolRecord>,
    corp_actions: Vec<CorpAction>,
}

fn same_symbol_key(a: &SymbolRecord, b: &SymbolRecord) -> bool {
    a.ref_data_uuid == b.ref_data_uuid && a.symbology == b.symbology && a.start_time == b.start_time
}

fn same_corp_action_key(a: &CorpAction, b: &CorpAction) -> bool {
    a.ref_data_uuid == b.ref_data_uuid && a.effective_time == b.effective_time
}

/// # Summary
/// 基于内存的注册中心存储实现。
///
/// 作为 `RegistryStore` 的适配器，适用于测试与无持久化需求的场景。
/// 与 SQLite 实现保持相同的主键约束与会话语义。
pub struct MemoryRegistryStore {
    state: Arc<RwLock<MemoryState>>,
    fail_commits: Arc<AtomicBool>,
}

impl MemoryRegistryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState::default())),
            fail_commits: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 令后续所有会话的提交失败，用于模拟存储层故障
    pub fn set_fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }
}

impl Default for MemoryRegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryStore for MemoryRegistryStore {
    async fn begin(&self) -> Result<Box<dyn RegistrySession>, StoreError> {
        Ok(Box::new(MemorySession {
            state: self.state.clone(),
            fail_commits: self.fail_commits.clone(),
            pending_symbols: Vec::new(),
            pending_corp_actions: Vec::new(),
            closed: false,
        }))
    }

    async fn list_symbol_records(&self) -> Result<Vec<SymbolRecord>, StoreError> {
        let mut records = self.state.read().await.symbols.clone();
        records.sort_by(|a, b| {
            (&a.ref_data_uuid, &a.symbology, a.start_time).cmp(&(
                &b.ref_data_uuid,
                &b.symbology,
                b.start_time,
            ))
        });
        Ok(records)
    }

    async fn symbol_records_for(
        &self,
        ref_data_uuid: &RefDataUuid,
        symbology: Option<&str>,
    ) -> Result<Vec<SymbolRecord>, StoreError> {
        let guard = self.state.read().await;
        let mut records: Vec<SymbolRecord> = guard
            .symbols
            .iter()
            .filter(|r| &r.ref_data_uuid == ref_data_uuid)
            .filter(|r| symbology.is_none_or(|s| r.symbology == s))
            .cloned()
            .collect();
        records.sort_by(|a, b| (&a.symbology, a.start_time).cmp(&(&b.symbology, b.start_time)));
        Ok(records)
    }

    async fn list_corp_actions(
        &self,
        ref_data_uuid: Option<&RefDataUuid>,
    ) -> Result<Vec<CorpAction>, StoreError> {
        let guard = self.state.read().await;
        let mut actions: Vec<CorpAction> = guard
            .corp_actions
            .iter()
            .filter(|a| ref_data_uuid.is_none_or(|u| &a.ref_data_uuid == u))
            .cloned()
            .collect();
        actions.sort_by(|a, b| {
            (&a.ref_data_uuid, a.effective_time).cmp(&(&b.ref_data_uuid, b.effective_time))
        });
        Ok(actions)
    }
}

/// # Summary
/// 内存会话：写入先缓冲在会话内，提交时在写锁下一次性应用。
///
/// # Invariants
/// - 读操作合并已提交数据与本会话缓冲。
/// - 丢弃未提交的会话即丢弃其缓冲，等价于回滚。
pub struct MemorySession {
    state: Arc<RwLock<MemoryState>>,
    fail_commits: Arc<AtomicBool>,
    pending_symbols: Vec<SymbolRecord>,
    pending_corp_actions: Vec<CorpAction>,
    closed: bool,
}

impl MemorySession {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl RegistrySession for MemorySession {
    async fn find_symbol_records(
        &mut self,
        symbology: &str,
        symbol: &str,
        predicate: IntervalPredicate,
    ) -> Result<Vec<SymbolRecord>, StoreError> {
        self.ensure_open()?;
        let guard = self.state.read().await;
        Ok(guard
            .symbols
            .iter()
            .chain(self.pending_symbols.iter())
            .filter(|r| r.symbology == symbology && r.symbol == symbol)
            .filter(|r| predicate.matches(r))
            .cloned()
            .collect())
    }

    async fn ref_data_uuid_exists(
        &mut self,
        ref_data_uuid: &RefDataUuid,
    ) -> Result<bool, StoreError> {
        self.ensure_open()?;
        let guard = self.state.read().await;
        Ok(guard
            .symbols
            .iter()
            .chain(self.pending_symbols.iter())
            .any(|r| &r.ref_data_uuid == ref_data_uuid))
    }

    async fn symbol_key_taken(
        &mut self,
        ref_data_uuid: &RefDataUuid,
        symbology: &str,
        start_time: NaiveDateTime,
    ) -> Result<bool, StoreError> {
        self.ensure_open()?;
        let guard = self.state.read().await;
        Ok(guard
            .symbols
            .iter()
            .chain(self.pending_symbols.iter())
            .any(|r| {
                &r.ref_data_uuid == ref_data_uuid
                    && r.symbology == symbology
                    && r.start_time == start_time
            }))
    }

    async fn insert_symbol_record(&mut self, record: &SymbolRecord) -> Result<(), StoreError> {
        self.ensure_open()?;
        let guard = self.state.read().await;
        let exists = guard
            .symbols
            .iter()
            .chain(self.pending_symbols.iter())
            .any(|r| same_symbol_key(r, record));
        drop(guard);
        if exists {
            return Err(StoreError::Duplicate(format!(
                "symbols({}, {}, {})",
                record.ref_data_uuid, record.symbology, record.start_time
            )));
        }
        self.pending_symbols.push(record.clone());
        Ok(())
    }

    async fn insert_corp_action_record(&mut self, record: &CorpAction) -> Result<(), StoreError> {
        self.ensure_open()?;
        let guard = self.state.read().await;
        let exists = guard
            .corp_actions
            .iter()
            .chain(self.pending_corp_actions.iter())
            .any(|a| same_corp_action_key(a, record));
        drop(guard);
        if exists {
            return Err(StoreError::Duplicate(format!(
                "corp_actions({}, {})",
                record.ref_data_uuid, record.effective_time
            )));
        }
        self.pending_corp_actions.push(record.clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.closed = true;
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Database("simulated commit failure".to_string()));
        }

        let mut guard = self.state.write().await;
        // 其他会话可能已先行提交相同主键
        for record in &self.pending_symbols {
            if guard.symbols.iter().any(|r| same_symbol_key(r, record)) {
                return Err(StoreError::Duplicate(format!(
                    "symbols({}, {}, {})",
                    record.ref_data_uuid, record.symbology, record.start_time
                )));
            }
        }
        for record in &self.pending_corp_actions {
            if guard.corp_actions.iter().any(|a| same_corp_action_key(a, record)) {
                return Err(StoreError::Duplicate(format!(
                    "corp_actions({}, {})",
                    record.ref_data_uuid, record.effective_time
                )));
            }
        }
        guard.symbols.append(&mut self.pending_symbols);
        guard.corp_actions.append(&mut self.pending_corp_actions);
        Ok(())
    }
}
