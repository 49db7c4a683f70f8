use refdata_core::symbol::entity::RefDataUuid;
use refdata_core::symbol::port::IdGenerator;
use uuid::Uuid;

/// 参考数据标识的默认前缀
pub const REF_DATA_PREFIX: &str = "ref";

/// # Summary
/// 基于 UUID v7 的标识生成器，输出形如 `ref-0190b7c2-...`。
///
/// # Invariants
/// - UUID v7 以毫秒时间戳开头，进程内单调递增，因此字符串按生成顺序可排序。
pub struct UuidV7Generator {
    prefix: String,
}

impl UuidV7Generator {
    pub fn new() -> Self {
        Self::with_prefix(REF_DATA_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for UuidV7Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for UuidV7Generator {
    fn next_ref_data_uuid(&self) -> RefDataUuid {
        RefDataUuid(format!("{}-{}", self.prefix, Uuid::now_v7()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_prefixed_unique_and_sortable() {
        let generator = UuidV7Generator::new();
        let ids: Vec<RefDataUuid> = (0..200).map(|_| generator.next_ref_data_uuid()).collect();

        assert!(ids.iter().all(|id| id.as_str().starts_with("ref-")));

        let distinct: HashSet<_> = ids.iter().collect();
        assert_eq!(distinct.len(), ids.len());

        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(sorted, ids);
    }

    #[test]
    fn test_custom_prefix() {
        let generator = UuidV7Generator::with_prefix("sec");
        assert!(generator.next_ref_data_uuid().as_str().starts_with("sec-"));
    }
}
