use chrono::NaiveDateTime;
use thiserror::Error;

/// # Summary
/// 输入校验错误枚举。在任何解析或持久化动作之前拒绝格式不合法的请求。
///
/// # Invariants
/// - 校验错误作用于整个请求，而不是批量中的单个条目。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// 起始时间不小于结束时间
    #[error("Start time should be less than end time (start: {start}, end: {end}).")]
    InvalidWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// 起始时间早于全局下限
    #[error("Start time {start} is earlier than the lowest allowed datetime {floor}.")]
    StartBeforeFloor {
        start: NaiveDateTime,
        floor: NaiveDateTime,
    },
    /// 结束时间晚于全局上限
    #[error("End time {end} is later than the highest allowed datetime {ceiling}.")]
    EndAfterCeiling {
        end: NaiveDateTime,
        ceiling: NaiveDateTime,
    },
    /// 生效时间越界
    #[error("Effective time {at} is outside [{floor}, {ceiling}].")]
    EffectiveTimeOutOfRange {
        at: NaiveDateTime,
        floor: NaiveDateTime,
        ceiling: NaiveDateTime,
    },
    /// 同一符号体系下出现重复的起始时间 (会与主键冲突)
    #[error("Duplicate start time {start} under symbology {symbology}.")]
    DuplicateStartTime {
        symbology: String,
        start: NaiveDateTime,
    },
    /// 同时提供了 ref_data_uuid 与 (symbology, symbol)
    #[error("Expected ref_data_uuid or (symbology, symbol) pair but not both.")]
    AmbiguousTarget,
    /// 两种定位方式均未完整提供
    #[error("Expected ref_data_uuid or (symbology, symbol) pair but got neither.")]
    MissingTarget,
    /// 批量请求为空
    #[error("Batch request contains no items.")]
    EmptyBatch,
}
