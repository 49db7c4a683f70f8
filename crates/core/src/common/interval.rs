use chrono::NaiveDateTime;

use crate::symbol::entity::SymbolRecord;

/// # Summary
/// 符号记录的时间区间匹配谓词。两种谓词服务于不同的调用方，不可混用。
///
/// # Invariants
/// - `Containing` 仅用于批量创建时的身份解析。
/// - `PointInRange` 仅用于按符号挂载公司行动。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalPredicate {
    /// 已有记录的有效期必须覆盖查询窗口:
    /// `record.start_time <= start && record.end_time >= end`
    Containing {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// 查询时间点落在记录有效期内 (含两端):
    /// `record.start_time <= at <= record.end_time`
    PointInRange { at: NaiveDateTime },
}

impl IntervalPredicate {
    /// # Summary
    /// 两种谓词都可写成 `record.start_time <= a && record.end_time >= b`，返回 `(a, b)`。
    /// 存储层据此把谓词下推为范围查询。
    pub fn bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        match *self {
            IntervalPredicate::Containing { start, end } => (start, end),
            IntervalPredicate::PointInRange { at } => (at, at),
        }
    }

    /// 判断给定有效期 `[start_time, end_time]` 是否满足谓词
    pub fn matches_window(&self, start_time: NaiveDateTime, end_time: NaiveDateTime) -> bool {
        let (latest_start, earliest_end) = self.bounds();
        start_time <= latest_start && end_time >= earliest_end
    }

    /// 判断符号记录是否满足谓词
    pub fn matches(&self, record: &SymbolRecord) -> bool {
        self.matches_window(record.start_time, record.end_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }

    #[test]
    fn test_containing_requires_cover() {
        let q = IntervalPredicate::Containing {
            start: day(10),
            end: day(20),
        };
        // 完全覆盖
        assert!(q.matches_window(day(1), day(30)));
        // 边界相等也算覆盖
        assert!(q.matches_window(day(10), day(20)));
        // 起点太晚
        assert!(!q.matches_window(day(11), day(30)));
        // 终点太早
        assert!(!q.matches_window(day(1), day(19)));
        // 记录被查询窗口包含，但并未覆盖查询窗口
        assert!(!q.matches_window(day(12), day(18)));
    }

    #[test]
    fn test_point_in_range_is_inclusive() {
        let q = IntervalPredicate::PointInRange { at: day(10) };
        assert!(q.matches_window(day(10), day(20)));
        assert!(q.matches_window(day(1), day(10)));
        assert!(q.matches_window(day(1), day(20)));
        assert!(!q.matches_window(day(11), day(20)));
        assert!(!q.matches_window(day(1), day(9)));
    }
}
