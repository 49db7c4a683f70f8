use chrono::{NaiveDate, NaiveDateTime};
use refdata_core::common::interval::IntervalPredicate;
use refdata_core::corp_action::entity::{CorpAction, CorpActionType};
use refdata_core::store::error::StoreError;
use refdata_core::store::port::RegistryStore;
use refdata_core::symbol::entity::{RefDataUuid, SymbolRecord, SymbolSpec};
use refdata_store::memory::MemoryRegistryStore;
use refdata_store::sqlite::SqliteRegistryStore;
use tempfile::tempdir;

fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid date")
}

fn record(uuid: &str, symbology: &str, symbol: &str, start: NaiveDateTime, end: NaiveDateTime) -> SymbolRecord {
    SymbolRecord::from_spec(
        &RefDataUuid::from(uuid),
        symbology,
        &SymbolSpec::new(symbol).with_window(start, end),
    )
}

/// 两种存储实现必须表现一致，此处对同一套场景分别执行
async fn exercise_store(store: &dyn RegistryStore) {
    // 1. 会话内写入，提交前对会话自身可见，对外不可见
    let mut session = store.begin().await.unwrap();
    session
        .insert_symbol_record(&record("ref-a", "TICKER", "FB", ts(2012, 5, 18), ts(2021, 10, 28)))
        .await
        .unwrap();
    session
        .insert_symbol_record(&record("ref-a", "TICKER", "META", ts(2021, 10, 28), ts(2099, 1, 1)))
        .await
        .unwrap();

    assert!(session.ref_data_uuid_exists(&RefDataUuid::from("ref-a")).await.unwrap());
    assert!(store.list_symbol_records().await.unwrap().is_empty());

    session.commit().await.unwrap();
    assert!(matches!(
        session.ref_data_uuid_exists(&RefDataUuid::from("ref-a")).await,
        Err(StoreError::Closed)
    ));

    // 2. 区间查询
    let mut session = store.begin().await.unwrap();
    let containing = session
        .find_symbol_records(
            "TICKER",
            "FB",
            IntervalPredicate::Containing {
                start: ts(2015, 1, 1),
                end: ts(2016, 1, 1),
            },
        )
        .await
        .unwrap();
    assert_eq!(containing.len(), 1);
    assert_eq!(containing[0].ref_data_uuid, RefDataUuid::from("ref-a"));

    // 查询窗口超出记录有效期，不算覆盖
    let not_covered = session
        .find_symbol_records(
            "TICKER",
            "FB",
            IntervalPredicate::Containing {
                start: ts(2015, 1, 1),
                end: ts(2022, 1, 1),
            },
        )
        .await
        .unwrap();
    assert!(not_covered.is_empty());

    // 时间点查询，边界包含
    let at_boundary = session
        .find_symbol_records("TICKER", "META", IntervalPredicate::PointInRange { at: ts(2021, 10, 28) })
        .await
        .unwrap();
    assert_eq!(at_boundary.len(), 1);
    let before = session
        .find_symbol_records("TICKER", "META", IntervalPredicate::PointInRange { at: ts(2020, 1, 1) })
        .await
        .unwrap();
    assert!(before.is_empty());

    // 符号体系与符号均为精确匹配
    let other_symbology = session
        .find_symbol_records("ISIN", "FB", IntervalPredicate::PointInRange { at: ts(2015, 1, 1) })
        .await
        .unwrap();
    assert!(other_symbology.is_empty());

    // 3. 主键冲突
    let dup = session
        .insert_symbol_record(&record("ref-a", "TICKER", "FB2", ts(2012, 5, 18), ts(2013, 1, 1)))
        .await;
    assert!(matches!(dup, Err(StoreError::Duplicate(_))));

    // 主键占用检查：只有三元组全部相同才算占用
    let ref_a = RefDataUuid::from("ref-a");
    assert!(session.symbol_key_taken(&ref_a, "TICKER", ts(2012, 5, 18)).await.unwrap());
    assert!(!session.symbol_key_taken(&ref_a, "TICKER", ts(2012, 5, 19)).await.unwrap());
    assert!(!session.symbol_key_taken(&ref_a, "ISIN", ts(2012, 5, 18)).await.unwrap());

    // 4. 丢弃会话即回滚
    // 本会话排队的写入同样占用主键
    let ref_b = RefDataUuid::from("ref-b");
    assert!(!session.symbol_key_taken(&ref_b, "TICKER", ts(2013, 11, 7)).await.unwrap());
    session
        .insert_symbol_record(&record("ref-b", "TICKER", "TWTR", ts(2013, 11, 7), ts(2022, 10, 27)))
        .await
        .unwrap();
    assert!(session.symbol_key_taken(&ref_b, "TICKER", ts(2013, 11, 7)).await.unwrap());
    drop(session);
    assert!(store
        .symbol_records_for(&RefDataUuid::from("ref-b"), None)
        .await
        .unwrap()
        .is_empty());

    // 5. 公司行动
    let mut session = store.begin().await.unwrap();
    let split = CorpAction {
        ref_data_uuid: RefDataUuid::from("ref-a"),
        effective_time: ts(2022, 6, 6),
        action_type: CorpActionType::StockSplit,
        additive_adjustment: 0.0,
        multiplicative_adjustment: 20.0,
    };
    session.insert_corp_action_record(&split).await.unwrap();
    assert!(matches!(
        session.insert_corp_action_record(&split).await,
        Err(StoreError::Duplicate(_))
    ));
    session.commit().await.unwrap();

    let actions = store.list_corp_actions(None).await.unwrap();
    assert_eq!(actions, vec![split.clone()]);
    let none = store
        .list_corp_actions(Some(&RefDataUuid::from("ref-b")))
        .await
        .unwrap();
    assert!(none.is_empty());

    // 6. 读取投影
    let by_uuid = store
        .symbol_records_for(&RefDataUuid::from("ref-a"), Some("TICKER"))
        .await
        .unwrap();
    assert_eq!(by_uuid.len(), 2);
    assert_eq!(by_uuid[0].symbol, "FB");
    assert_eq!(by_uuid[1].symbol, "META");
    assert!(store
        .symbol_records_for(&RefDataUuid::from("ref-a"), Some("ISIN"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_sqlite_store_integration() {
    let tmp_dir = tempdir().expect("Failed to create temp dir");
    let store = SqliteRegistryStore::open(tmp_dir.path())
        .await
        .expect("Failed to open registry store");

    exercise_store(&store).await;

    // 数据库文件位于指定目录下
    assert!(tmp_dir.path().join("refdata.db").exists());

    // 重新打开后数据仍在
    drop(store);
    let reopened = SqliteRegistryStore::open(tmp_dir.path()).await.unwrap();
    assert_eq!(reopened.list_symbol_records().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_memory_store_integration() {
    let store = MemoryRegistryStore::new();
    exercise_store(&store).await;
}

#[tokio::test]
async fn test_memory_store_simulated_commit_failure() -> anyhow::Result<()> {
    let store = MemoryRegistryStore::new();
    store.set_fail_commits(true);

    let mut session = store.begin().await?;
    session
        .insert_symbol_record(&record("ref-a", "TICKER", "AAPL", ts(1980, 12, 12), ts(2099, 1, 1)))
        .await?;
    assert!(matches!(session.commit().await, Err(StoreError::Database(_))));
    assert!(store.list_symbol_records().await?.is_empty());
    Ok(())
}
