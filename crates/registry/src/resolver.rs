//! # 参考数据标识解析器
//!
//! 针对一只证券提交的符号体系映射，决定新记录写在哪个参考数据标识之下：
//! 复用已有标识、铸造新标识，或因冲突/歧义而拒绝。

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use refdata_core::store::error::StoreError;
use refdata_core::store::port::RegistrySession;
use refdata_core::symbol::entity::{
    RefDataUuid, SymbolRecord, SymbologyMap, flatten_symbology_map,
};
use refdata_core::symbol::port::IdGenerator;
use tracing::{info, warn};

use crate::interval;

/// 已存储的匹配结果：标识 -> 在该标识下被命中的符号体系集合
pub type FoundSymbologies = BTreeMap<RefDataUuid, BTreeSet<String>>;

/// # Summary
/// 解析决策，仅依赖提交的映射与查询命中结果，不涉及 I/O。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// 映射中没有任何符号规格
    NoSymbols,
    /// 无任何命中，铸造新标识
    MintNew,
    /// 唯一命中且存在尚未记录的体系，只追加这些体系
    Extend {
        ref_data_uuid: RefDataUuid,
        symbologies: Vec<String>,
    },
    /// 唯一命中且所有请求的体系均已存在
    AlreadyPresent { ref_data_uuid: RefDataUuid },
    /// 命中多个不同标识
    Ambiguous { candidates: Vec<RefDataUuid> },
}

/// # Summary
/// 单个条目的解析结果 (写入已排队到会话中)。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Created {
        ref_data_uuid: RefDataUuid,
        written: usize,
    },
    Extended {
        ref_data_uuid: RefDataUuid,
        symbologies: Vec<String>,
        written: usize,
    },
    AlreadyPresent {
        ref_data_uuid: RefDataUuid,
    },
    Ambiguous {
        candidates: Vec<RefDataUuid>,
    },
    /// 追加的体系与已有记录主键冲突，本条目不写入任何记录
    KeyTaken {
        ref_data_uuid: RefDataUuid,
        symbology: String,
        start_time: NaiveDateTime,
    },
    NoSymbols,
}

/// 映射中实际携带符号规格的体系 (空列表不算请求了该体系)
fn requested_symbologies(map: &SymbologyMap) -> impl Iterator<Item = &String> {
    map.iter()
        .filter(|(_, specs)| !specs.is_empty())
        .map(|(symbology, _)| symbology)
}

/// # Summary
/// 对映射中的每个符号规格执行覆盖匹配，收集命中的标识及其体系。
pub async fn lookup_existing(
    session: &mut dyn RegistrySession,
    map: &SymbologyMap,
) -> Result<FoundSymbologies, StoreError> {
    let mut found = FoundSymbologies::new();
    for query in flatten_symbology_map(map) {
        for record in interval::find_covering(session, &query).await? {
            found
                .entry(record.ref_data_uuid)
                .or_default()
                .insert(record.symbology);
        }
    }
    Ok(found)
}

/// # Summary
/// 按命中标识的数量做出决策。
///
/// # Logic
/// 1. 零命中：铸造新标识，映射中的全部规格写在其下。
/// 2. 唯一命中：请求的体系集合是已存在体系的子集时拒绝，否则只追加缺失的体系。
/// 3. 多个命中：提交的符号横跨多只已有证券，拒绝。
pub fn decide(map: &SymbologyMap, found: FoundSymbologies) -> Decision {
    if requested_symbologies(map).next().is_none() {
        return Decision::NoSymbols;
    }

    if found.len() > 1 {
        return Decision::Ambiguous {
            candidates: found.into_keys().collect(),
        };
    }

    match found.into_iter().next() {
        None => Decision::MintNew,
        Some((ref_data_uuid, already_present)) => {
            let missing: Vec<String> = requested_symbologies(map)
                .filter(|s| !already_present.contains(*s))
                .cloned()
                .collect();
            if missing.is_empty() {
                Decision::AlreadyPresent { ref_data_uuid }
            } else {
                Decision::Extend {
                    ref_data_uuid,
                    symbologies: missing,
                }
            }
        }
    }
}

/// # Summary
/// 返回计划写入的规格中第一个主键已被占用的 (体系, 起始时间)。
///
/// # Logic
/// 在排队任何写入之前检查全部主键，保证冲突条目一条记录也不写。
async fn first_taken_key<'a>(
    session: &mut dyn RegistrySession,
    ref_data_uuid: &RefDataUuid,
    map: &SymbologyMap,
    symbologies: impl IntoIterator<Item = &'a String>,
) -> Result<Option<(String, NaiveDateTime)>, StoreError> {
    for symbology in symbologies {
        let Some(specs) = map.get(symbology) else {
            continue;
        };
        for spec in specs {
            if session
                .symbol_key_taken(ref_data_uuid, symbology, spec.start_time)
                .await?
            {
                return Ok(Some((symbology.clone(), spec.start_time)));
            }
        }
    }
    Ok(None)
}

async fn write_specs<'a>(
    session: &mut dyn RegistrySession,
    ref_data_uuid: &RefDataUuid,
    map: &SymbologyMap,
    symbologies: impl IntoIterator<Item = &'a String>,
) -> Result<usize, StoreError> {
    let mut written = 0;
    for symbology in symbologies {
        let Some(specs) = map.get(symbology) else {
            continue;
        };
        for spec in specs {
            let record = SymbolRecord::from_spec(ref_data_uuid, symbology, spec);
            session.insert_symbol_record(&record).await?;
            written += 1;
        }
    }
    Ok(written)
}

/// # Summary
/// 解析一个条目的符号体系映射并把需要写入的记录排入会话。
///
/// # Logic
/// 1. 展平映射并逐个执行覆盖匹配。
/// 2. 按命中数量决策。
/// 3. 只有在铸造分支中才调用 `ids` 生成新标识。
/// 4. 追加分支先检查全部待写主键，任一已被占用则整个条目不写入。
/// 5. 每个被写入的规格恰好对应一条新符号记录。
///
/// # Arguments
/// * `session` - 当前请求的存储会话。
/// * `ids` - 标识生成器。
/// * `map` - 已通过校验的符号体系映射。
///
/// # Returns
/// 解析结果；冲突与歧义是正常结果而非错误，只有存储失败返回 `Err`。
pub async fn resolve(
    session: &mut dyn RegistrySession,
    ids: &dyn IdGenerator,
    map: &SymbologyMap,
) -> Result<Resolution, StoreError> {
    let found = lookup_existing(session, map).await?;

    let resolution = match decide(map, found) {
        Decision::NoSymbols => Resolution::NoSymbols,
        Decision::MintNew => {
            let ref_data_uuid = ids.next_ref_data_uuid();
            let written = write_specs(session, &ref_data_uuid, map, requested_symbologies(map)).await?;
            info!("Minted {} with {} symbol record(s)", ref_data_uuid, written);
            Resolution::Created {
                ref_data_uuid,
                written,
            }
        }
        Decision::Extend {
            ref_data_uuid,
            symbologies,
        } => {
            if let Some((symbology, start_time)) =
                first_taken_key(session, &ref_data_uuid, map, &symbologies).await?
            {
                warn!(
                    "{} already has a {} row starting at {}, skipping item",
                    ref_data_uuid, symbology, start_time
                );
                return Ok(Resolution::KeyTaken {
                    ref_data_uuid,
                    symbology,
                    start_time,
                });
            }
            let written = write_specs(session, &ref_data_uuid, map, &symbologies).await?;
            info!(
                "Extended {} with symbologies {:?} ({} record(s))",
                ref_data_uuid, symbologies, written
            );
            Resolution::Extended {
                ref_data_uuid,
                symbologies,
                written,
            }
        }
        Decision::AlreadyPresent { ref_data_uuid } => {
            warn!("All requested symbologies already present under {}", ref_data_uuid);
            Resolution::AlreadyPresent { ref_data_uuid }
        }
        Decision::Ambiguous { candidates } => {
            warn!("Symbols straddle multiple ref_data_uuids: {:?}", candidates);
            Resolution::Ambiguous { candidates }
        }
    };
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdata_core::symbol::entity::SymbolSpec;

    fn map_of(entries: &[(&str, &[&str])]) -> SymbologyMap {
        entries
            .iter()
            .map(|(symbology, symbols)| {
                (
                    symbology.to_string(),
                    symbols.iter().map(|s| SymbolSpec::new(*s)).collect(),
                )
            })
            .collect()
    }

    fn found_of(entries: &[(&str, &[&str])]) -> FoundSymbologies {
        entries
            .iter()
            .map(|(uuid, symbologies)| {
                (
                    RefDataUuid::from(*uuid),
                    symbologies.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_no_match_mints_new() {
        let map = map_of(&[("TICKER", &["AAPL"]), ("ISIN", &["US0378331005"])]);
        assert_eq!(decide(&map, FoundSymbologies::new()), Decision::MintNew);
    }

    #[test]
    fn test_empty_map_or_lists() {
        assert_eq!(decide(&SymbologyMap::new(), FoundSymbologies::new()), Decision::NoSymbols);
        let map = map_of(&[("TICKER", &[])]);
        assert_eq!(decide(&map, FoundSymbologies::new()), Decision::NoSymbols);
    }

    #[test]
    fn test_single_match_subset_is_already_present() {
        let map = map_of(&[("TICKER", &["AAPL"])]);
        let found = found_of(&[("ref-1", &["TICKER"])]);
        assert_eq!(
            decide(&map, found),
            Decision::AlreadyPresent {
                ref_data_uuid: RefDataUuid::from("ref-1")
            }
        );
    }

    #[test]
    fn test_single_match_extends_missing_symbologies_only() {
        let map = map_of(&[("TICKER", &["AAPL"]), ("ISIN", &["US0378331005"]), ("FIGI", &[])]);
        let found = found_of(&[("ref-1", &["TICKER"])]);
        assert_eq!(
            decide(&map, found),
            Decision::Extend {
                ref_data_uuid: RefDataUuid::from("ref-1"),
                symbologies: vec!["ISIN".to_string()],
            }
        );
    }

    #[test]
    fn test_multiple_matches_are_ambiguous() {
        let map = map_of(&[("TICKER", &["AAPL"]), ("ISIN", &["US0378331005"])]);
        let found = found_of(&[("ref-2", &["ISIN"]), ("ref-1", &["TICKER"])]);
        assert_eq!(
            decide(&map, found),
            Decision::Ambiguous {
                candidates: vec![RefDataUuid::from("ref-1"), RefDataUuid::from("ref-2")]
            }
        );
    }
}
