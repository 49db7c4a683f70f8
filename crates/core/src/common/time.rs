use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::error::ValidationError;

/// # Summary
/// 全局时间下限哨兵 ("时间起点")，代表无起始边界的有效期。
pub fn lowest_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::default())
}

/// # Summary
/// 全局时间上限哨兵 ("时间终点")，代表无结束边界的有效期。
pub fn highest_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2099, 12, 31)
        .unwrap_or(NaiveDate::MAX)
        .and_time(NaiveTime::default())
}

/// # Summary
/// 校验一个有效期窗口。
///
/// # Logic
/// 1. `start` 不得早于全局下限。
/// 2. `end` 不得晚于全局上限。
/// 3. `start` 必须严格小于 `end`。
///
/// # Arguments
/// * `start`: 窗口起点。
/// * `end`: 窗口终点。
///
/// # Returns
/// 合法返回 Ok，否则返回对应的 `ValidationError`。
pub fn check_window(start: NaiveDateTime, end: NaiveDateTime) -> Result<(), ValidationError> {
    let floor = lowest_datetime();
    if start < floor {
        return Err(ValidationError::StartBeforeFloor { start, floor });
    }
    let ceiling = highest_datetime();
    if end > ceiling {
        return Err(ValidationError::EndAfterCeiling { end, ceiling });
    }
    if start >= end {
        return Err(ValidationError::InvalidWindow { start, end });
    }
    Ok(())
}

/// # Summary
/// 校验单个时间点落在全局上下限之内 (含边界)。
pub fn check_instant(at: NaiveDateTime) -> Result<(), ValidationError> {
    let floor = lowest_datetime();
    let ceiling = highest_datetime();
    if at < floor || at > ceiling {
        return Err(ValidationError::EffectiveTimeOutOfRange { at, floor, ceiling });
    }
    Ok(())
}
