use std::sync::{PoisonError, RwLock};

use super::ReferenceStore;
use crate::error::AppError;
use crate::models::{normalize_key, ReferenceRecord};

/// 内存参考库 (测试及无需落盘的场景)
#[derive(Debug, Default)]
pub struct MemoryReferenceStore {
    rows: RwLock<Vec<ReferenceRecord>>,
}

impl MemoryReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = ReferenceRecord>) -> Self {
        Self {
            rows: RwLock::new(records.into_iter().collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReferenceStore for MemoryReferenceStore {
    fn lookup(&self, description: &str) -> Option<ReferenceRecord> {
        let key = normalize_key(description);
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|r| r.description_key() == key)
            .cloned()
    }

    fn append_record(&self, record: &ReferenceRecord) -> Result<(), AppError> {
        self.rows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }

    fn records(&self) -> Vec<ReferenceRecord> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(desc: &str, code: &str) -> ReferenceRecord {
        ReferenceRecord::new(desc, code, "0.9", "CN").unwrap()
    }

    #[test]
    fn empty_store_finds_nothing() {
        let store = MemoryReferenceStore::new();
        assert!(store.lookup("LV SPEEDY BAG").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn first_duplicate_wins() {
        let store = MemoryReferenceStore::with_records([
            record("LV SPEEDY BAG", "42022100"),
            record("lv speedy bag", "99999999"),
        ]);

        let found = store.lookup("Lv Speedy Bag").unwrap();
        assert_eq!(found.commodity_code(), "42022100");
    }

    #[test]
    fn blank_append_leaves_store_untouched() {
        let store = MemoryReferenceStore::new();

        let appended = store.append("GUCCI BELT", "42033000", "", "IT").unwrap();

        assert!(appended.is_none());
        assert_eq!(store.len(), 0);
        assert!(store.lookup("GUCCI BELT").is_none());
    }
}
