use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::error::ValidationError;
use crate::common::time::{check_window, highest_datetime, lowest_datetime};

/// # Summary
/// 证券的参考数据标识，跨符号体系与公司行动的连接键。
///
/// # Invariants
/// - 全局唯一、不可变，带有人类可识别的前缀 (例如 `ref-`)。
/// - 不存在独立的 "证券" 表，标识的存在性由引用它的记录隐式体现。
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RefDataUuid(pub String);

impl RefDataUuid {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RefDataUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RefDataUuid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// # Summary
/// 单个符号规格：某符号体系下的一个代码及其有效期。
///
/// # Invariants
/// - `start_time < end_time`，且落在全局哨兵上下限之内 (通过 `validate` 检查)。
/// - 未提供的起止时间默认取哨兵值，代表开放区间。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SymbolSpec {
    /// 外部代码
    #[schema(example = "EURUSD")]
    pub symbol: String,
    /// 交易所 (可选，用于消歧)
    #[serde(default)]
    pub exchange: Option<String>,
    /// 有效期起点，默认为全局下限
    #[serde(default = "lowest_datetime")]
    #[schema(value_type = String, example = "1900-01-01T00:00:00")]
    pub start_time: NaiveDateTime,
    /// 有效期终点，默认为全局上限
    #[serde(default = "highest_datetime")]
    #[schema(value_type = String, example = "2099-12-31T00:00:00")]
    pub end_time: NaiveDateTime,
}

impl SymbolSpec {
    /// 以开放有效期创建符号规格
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            exchange: None,
            start_time: lowest_datetime(),
            end_time: highest_datetime(),
        }
    }

    /// 指定有效期
    pub fn with_window(mut self, start_time: NaiveDateTime, end_time: NaiveDateTime) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    /// 指定交易所
    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = Some(exchange.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_window(self.start_time, self.end_time)
    }
}

/// # Summary
/// 一只证券在所有符号体系下的已知信息，作为一次创建单元提交。
/// Key 为符号体系名称，Value 为该体系下的符号规格序列 (改名历史)。
pub type SymbologyMap = BTreeMap<String, Vec<SymbolSpec>>;

/// # Summary
/// 校验一个符号体系映射中的所有规格。
///
/// # Logic
/// 1. 每个规格的有效期必须合法。
/// 2. 同一体系下的起始时间不得重复，否则写入时会违反 `(ref_data_uuid, symbology, start_time)` 主键。
pub fn validate_symbology_map(map: &SymbologyMap) -> Result<(), ValidationError> {
    for (symbology, specs) in map {
        let mut starts = HashSet::new();
        for spec in specs {
            spec.validate()?;
            if !starts.insert(spec.start_time) {
                return Err(ValidationError::DuplicateStartTime {
                    symbology: symbology.clone(),
                    start: spec.start_time,
                });
            }
        }
    }
    Ok(())
}

/// # Summary
/// 持久化的符号事实："符号体系 Y 下的符号 S 在 [start_time, end_time] 内指代该证券"。
///
/// # Invariants
/// - 复合主键为 (`ref_data_uuid`, `symbology`, `start_time`)。
/// - 只通过解析器的写路径创建，从不原地更新或删除。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub ref_data_uuid: RefDataUuid,
    pub symbology: String,
    pub symbol: String,
    pub exchange: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

impl SymbolRecord {
    /// 由输入规格构造存储记录
    pub fn from_spec(ref_data_uuid: &RefDataUuid, symbology: &str, spec: &SymbolSpec) -> Self {
        Self {
            ref_data_uuid: ref_data_uuid.clone(),
            symbology: symbology.to_string(),
            symbol: spec.symbol.clone(),
            exchange: spec.exchange.clone(),
            start_time: spec.start_time,
            end_time: spec.end_time,
        }
    }

    /// 投影为输出规格
    pub fn to_spec(&self) -> SymbolSpec {
        SymbolSpec {
            symbol: self.symbol.clone(),
            exchange: self.exchange.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// # Summary
/// 解析时使用的扁平查询元组，每个符号规格对应一个。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolQuery {
    pub symbology: String,
    pub symbol: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

/// 将符号体系映射展平为查询元组序列
pub fn flatten_symbology_map(map: &SymbologyMap) -> Vec<SymbolQuery> {
    map.iter()
        .flat_map(|(symbology, specs)| {
            specs.iter().map(move |spec| SymbolQuery {
                symbology: symbology.clone(),
                symbol: spec.symbol.clone(),
                start_time: spec.start_time,
                end_time: spec.end_time,
            })
        })
        .collect()
}

/// # Summary
/// 一只证券的读取投影：标识加其完整的符号体系映射。
#[derive(Debug, Clone, PartialEq)]
pub struct SecuritySymbols {
    pub ref_data_uuid: RefDataUuid,
    pub symbology_map: SymbologyMap,
}

/// # Summary
/// 将存储记录按 `ref_data_uuid`、再按 `symbology` 分组为读取投影。
///
/// # Logic
/// 输出按标识排序；同一体系下的规格保持输入顺序 (存储层按 `start_time` 排序返回)。
pub fn group_records(records: &[SymbolRecord]) -> Vec<SecuritySymbols> {
    let mut grouped: BTreeMap<&RefDataUuid, SymbologyMap> = BTreeMap::new();
    for record in records {
        grouped
            .entry(&record.ref_data_uuid)
            .or_default()
            .entry(record.symbology.clone())
            .or_default()
            .push(record.to_spec());
    }
    grouped
        .into_iter()
        .map(|(ref_data_uuid, symbology_map)| SecuritySymbols {
            ref_data_uuid: ref_data_uuid.clone(),
            symbology_map,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }

    #[test]
    fn test_spec_defaults_to_sentinels() {
        let spec: SymbolSpec = serde_json::from_str(r#"{"symbol": "EURUSD"}"#).unwrap();
        assert_eq!(spec.start_time, lowest_datetime());
        assert_eq!(spec.end_time, highest_datetime());
        assert_eq!(spec.exchange, None);
        assert!(spec.validate().is_ok());

        let spec: SymbolSpec =
            serde_json::from_str(r#"{"symbol": "EURUSD", "start_time": "2021-01-01T00:00:00"}"#)
                .unwrap();
        assert_eq!(spec.start_time, ts(2021, 1, 1));
    }

    #[test]
    fn test_validate_symbology_map_rejects_duplicate_start() {
        let mut map = SymbologyMap::new();
        map.insert(
            "TICKER".into(),
            vec![
                SymbolSpec::new("FB").with_window(ts(2010, 1, 1), ts(2021, 10, 28)),
                SymbolSpec::new("META").with_window(ts(2010, 1, 1), ts(2099, 1, 1)),
            ],
        );
        assert!(matches!(
            validate_symbology_map(&map),
            Err(ValidationError::DuplicateStartTime { .. })
        ));

        // 改名历史：起点不同即可
        map.insert(
            "TICKER".into(),
            vec![
                SymbolSpec::new("FB").with_window(ts(2010, 1, 1), ts(2021, 10, 28)),
                SymbolSpec::new("META").with_window(ts(2021, 10, 28), ts(2099, 1, 1)),
            ],
        );
        assert!(validate_symbology_map(&map).is_ok());
    }

    #[test]
    fn test_validate_symbology_map_rejects_inverted_window() {
        let mut map = SymbologyMap::new();
        map.insert(
            "ISIN".into(),
            vec![SymbolSpec::new("US0378331005").with_window(ts(2020, 1, 1), ts(2019, 1, 1))],
        );
        assert!(matches!(
            validate_symbology_map(&map),
            Err(ValidationError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_flatten_symbology_map() {
        let mut map = SymbologyMap::new();
        map.insert("TICKER".into(), vec![SymbolSpec::new("A"), SymbolSpec::new("B")]);
        map.insert("ISIN".into(), vec![SymbolSpec::new("X")]);
        let queries = flatten_symbology_map(&map);
        assert_eq!(queries.len(), 3);
        assert!(queries.iter().any(|q| q.symbology == "ISIN" && q.symbol == "X"));
        assert_eq!(queries.iter().filter(|q| q.symbology == "TICKER").count(), 2);
    }

    #[test]
    fn test_group_records() {
        let a = RefDataUuid::from("ref-a");
        let b = RefDataUuid::from("ref-b");
        let records = vec![
            SymbolRecord::from_spec(&b, "TICKER", &SymbolSpec::new("GBPUSD")),
            SymbolRecord::from_spec(&a, "TICKER", &SymbolSpec::new("EURUSD")),
            SymbolRecord::from_spec(&a, "ISIN", &SymbolSpec::new("EU000")),
        ];
        let grouped = group_records(&records);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].ref_data_uuid, a);
        assert_eq!(grouped[0].symbology_map.len(), 2);
        assert_eq!(grouped[1].ref_data_uuid, b);
        assert_eq!(grouped[1].symbology_map["TICKER"][0].symbol, "GBPUSD");
    }
}
