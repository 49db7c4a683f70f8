//! # 批量结果汇总
//!
//! 把每个条目的解析结果转为输出对象，并在全部条目处理完之后一次性计算整体状态。

use refdata_core::symbol::entity::{RefDataUuid, SymbologyMap};

use crate::resolver::Resolution;

/// # Summary
/// 批量创建请求中的单个条目。
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolBatchItem {
    pub symbology_map: SymbologyMap,
    // 仅回显，不影响解析
    pub force_duplicates: bool,
}

/// # Summary
/// 单个条目的输出。`error` 为 `Some` 即表示该条目失败。
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolItemOutcome {
    pub symbology_map: SymbologyMap,
    pub force_duplicates: bool,
    pub ref_data_uuid: Option<RefDataUuid>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl SymbolItemOutcome {
    fn success(item: SymbolBatchItem, ref_data_uuid: RefDataUuid, message: String) -> Self {
        Self {
            symbology_map: item.symbology_map,
            force_duplicates: item.force_duplicates,
            ref_data_uuid: Some(ref_data_uuid),
            message: Some(message),
            error: None,
        }
    }

    fn failure(item: SymbolBatchItem, ref_data_uuid: Option<RefDataUuid>, error: String) -> Self {
        Self {
            symbology_map: item.symbology_map,
            force_duplicates: item.force_duplicates,
            ref_data_uuid,
            message: None,
            error: Some(error),
        }
    }

    /// 由解析结果构造条目输出
    pub fn from_resolution(item: SymbolBatchItem, resolution: Resolution) -> Self {
        match resolution {
            Resolution::Created {
                ref_data_uuid,
                written,
            } => Self::success(
                item,
                ref_data_uuid,
                format!("Symbol created successfully ({} symbol record(s)).", written),
            ),
            Resolution::Extended {
                ref_data_uuid,
                symbologies,
                written,
            } => Self::success(
                item,
                ref_data_uuid,
                format!(
                    "Added symbologies [{}] to existing ref_data_uuid ({} symbol record(s)); symbologies already present were skipped.",
                    symbologies.join(", "),
                    written
                ),
            ),
            Resolution::AlreadyPresent { ref_data_uuid } => {
                let error = format!(
                    "All symbologies already present for ref_data_uuid {}, use the update endpoint instead.",
                    ref_data_uuid
                );
                Self::failure(item, Some(ref_data_uuid), error)
            }
            Resolution::Ambiguous { candidates } => {
                let list: Vec<&str> = candidates.iter().map(RefDataUuid::as_str).collect();
                let error = format!(
                    "Multiple ref_data_uuids found ({}), cannot determine which one.",
                    list.join(", ")
                );
                Self::failure(item, None, error)
            }
            Resolution::KeyTaken {
                ref_data_uuid,
                symbology,
                start_time,
            } => {
                let error = format!(
                    "Symbology {} already has a row starting at {} under ref_data_uuid {}, use the update endpoint instead.",
                    symbology, start_time, ref_data_uuid
                );
                Self::failure(item, Some(ref_data_uuid), error)
            }
            Resolution::NoSymbols => {
                Self::failure(item, None, "No symbols supplied in symbology_map.".to_string())
            }
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// # Summary
/// 批量请求的整体状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// 所有条目成功
    Created,
    /// 部分成功
    Partial,
    /// 所有条目失败
    AllFailed,
}

impl BatchStatus {
    /// # Summary
    /// 根据每个条目是否失败计算整体状态。必须在所有条目处理完之后调用。
    ///
    /// 调用方保证至少一个条目；空批量在校验阶段以 `EmptyBatch` 拒绝，
    /// 否则空输入会被误报为 `Created`。
    pub fn aggregate(failures: impl IntoIterator<Item = bool>) -> Self {
        let (mut total, mut failed) = (0usize, 0usize);
        for is_error in failures {
            total += 1;
            if is_error {
                failed += 1;
            }
        }
        debug_assert!(total > 0, "aggregate called on an empty batch");
        if failed == 0 {
            BatchStatus::Created
        } else if failed == total {
            BatchStatus::AllFailed
        } else {
            BatchStatus::Partial
        }
    }
}

/// # Summary
/// 批量请求的汇总输出，条目顺序与输入一致。
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub status: BatchStatus,
    pub items: Vec<SymbolItemOutcome>,
}

impl BatchOutcome {
    pub fn new(items: Vec<SymbolItemOutcome>) -> Self {
        let status = BatchStatus::aggregate(items.iter().map(SymbolItemOutcome::is_error));
        Self { status, items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdata_core::symbol::entity::SymbolSpec;

    fn item() -> SymbolBatchItem {
        let mut symbology_map = SymbologyMap::new();
        symbology_map.insert("TICKER".into(), vec![SymbolSpec::new("EURUSD")]);
        SymbolBatchItem {
            symbology_map,
            force_duplicates: false,
        }
    }

    #[test]
    fn test_aggregate_status() {
        assert_eq!(BatchStatus::aggregate([false, false]), BatchStatus::Created);
        assert_eq!(BatchStatus::aggregate([true, true]), BatchStatus::AllFailed);
        assert_eq!(BatchStatus::aggregate([false, true]), BatchStatus::Partial);
        assert_eq!(BatchStatus::aggregate([true, false, false]), BatchStatus::Partial);
        assert_eq!(BatchStatus::aggregate([true]), BatchStatus::AllFailed);
    }

    #[test]
    fn test_outcome_from_resolution() {
        let created = SymbolItemOutcome::from_resolution(
            item(),
            Resolution::Created {
                ref_data_uuid: RefDataUuid::from("ref-1"),
                written: 1,
            },
        );
        assert!(!created.is_error());
        assert_eq!(created.ref_data_uuid, Some(RefDataUuid::from("ref-1")));
        assert!(created.message.is_some());
        assert_eq!(created.symbology_map, item().symbology_map);

        // 已存在时仍然报告已有标识
        let present = SymbolItemOutcome::from_resolution(
            item(),
            Resolution::AlreadyPresent {
                ref_data_uuid: RefDataUuid::from("ref-1"),
            },
        );
        assert!(present.is_error());
        assert_eq!(present.ref_data_uuid, Some(RefDataUuid::from("ref-1")));
        assert!(present.message.is_none());

        let ambiguous = SymbolItemOutcome::from_resolution(
            item(),
            Resolution::Ambiguous {
                candidates: vec![RefDataUuid::from("ref-1"), RefDataUuid::from("ref-2")],
            },
        );
        assert!(ambiguous.is_error());
        assert_eq!(ambiguous.ref_data_uuid, None);
        assert!(ambiguous.error.unwrap_or_default().contains("ref-1, ref-2"));

        // 主键冲突同样报告已有标识，并指出冲突的体系与起始时间
        let start_time = chrono::NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        let taken = SymbolItemOutcome::from_resolution(
            item(),
            Resolution::KeyTaken {
                ref_data_uuid: RefDataUuid::from("ref-1"),
                symbology: "ISIN".to_string(),
                start_time,
            },
        );
        assert!(taken.is_error());
        assert_eq!(taken.ref_data_uuid, Some(RefDataUuid::from("ref-1")));
        let error = taken.error.unwrap_or_default();
        assert!(error.contains("ISIN"));
        assert!(error.contains("2000-01-01 00:00:00"));
        assert!(error.contains("update endpoint"));
    }

    #[test]
    #[should_panic(expected = "empty batch")]
    #[cfg(debug_assertions)]
    fn test_aggregate_rejects_empty_input() {
        let _ = BatchStatus::aggregate(std::iter::empty());
    }

    #[test]
    fn test_batch_outcome_preserves_order() {
        let outcomes = vec![
            SymbolItemOutcome::from_resolution(item(), Resolution::NoSymbols),
            SymbolItemOutcome::from_resolution(
                item(),
                Resolution::Created {
                    ref_data_uuid: RefDataUuid::from("ref-9"),
                    written: 1,
                },
            ),
        ];
        let batch = BatchOutcome::new(outcomes);
        assert_eq!(batch.status, BatchStatus::Partial);
        assert!(batch.items[0].is_error());
        assert!(!batch.items[1].is_error());
    }
}
