//! crates/tutor_core/src/ledger.rs
//!
//! The Result Ledger: an append-only list of attempt records per student,
//! stored under `results_<student id>`, plus the aggregates shown on the
//! student home screen and in teacher reports.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::{AttemptKind, AttemptRecord};
use crate::ports::{get_typed, set_typed, KeyValueStore, PortError, PortResult};

/// Number of records surfaced as "recent activity".
pub const RECENT_LIMIT: usize = 5;

pub fn results_key(student_id: &str) -> String {
    format!("results_{}", student_id)
}

/// Appends to and reads back per-student result lists.
pub struct ResultLedger {
    store: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write appends within this process.
    append_lock: Mutex<()>,
}

impl ResultLedger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            append_lock: Mutex::new(()),
        }
    }

    /// Appends one record to the end of the student's list.
    ///
    /// The whole list is rewritten; a second process writing the same key
    /// concurrently can still overwrite this append.
    pub async fn append(&self, student_id: &str, record: AttemptRecord) -> PortResult<()> {
        let _guard = self.append_lock.lock().await;
        let key = results_key(student_id);
        // Entries are kept as raw JSON so ones this build cannot read survive the rewrite.
        let mut records: Vec<Value> =
            get_typed(self.store.as_ref(), &key).await?.unwrap_or_default();
        let entry = serde_json::to_value(&record)
            .map_err(|e| PortError::Unexpected(format!("unserializable record: {}", e)))?;
        records.push(entry);
        set_typed(self.store.as_ref(), &key, &records).await?;
        debug!("Ledger for {} now holds {} records", student_id, records.len());
        Ok(())
    }

    /// Every readable record for the student, oldest first.
    ///
    /// Entries that do not decode are logged and skipped.
    pub async fn records(&self, student_id: &str) -> PortResult<Vec<AttemptRecord>> {
        let key = results_key(student_id);
        let raw: Vec<Value> = get_typed(self.store.as_ref(), &key).await?.unwrap_or_default();
        Ok(raw
            .into_iter()
            .enumerate()
            .filter_map(|(position, entry)| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping unreadable entry {} under '{}': {}", position, key, e);
                    None
                }
            })
            .collect())
    }

    /// The last `n` records, oldest first.
    pub async fn last(&self, student_id: &str, n: usize) -> PortResult<Vec<AttemptRecord>> {
        let mut records = self.records(student_id).await?;
        let skip = records.len().saturating_sub(n);
        Ok(records.split_off(skip))
    }

    pub async fn summary(&self, student_id: &str) -> PortResult<LedgerSummary> {
        Ok(summarize(&self.records(student_id).await?))
    }
}

//=========================================================================================
// Aggregation
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindAverage {
    pub count: usize,
    /// `None` when there are no records of this kind.
    pub average: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub reading: KindAverage,
    pub essay: KindAverage,
    pub naesin: KindAverage,
    /// Most recent first, any kind.
    pub recent: Vec<AttemptRecord>,
}

fn kind_average(records: &[AttemptRecord], kind: AttemptKind) -> KindAverage {
    let scores: Vec<u32> = records
        .iter()
        .filter(|r| r.kind() == kind)
        .filter_map(|r| r.score().map(u32::from))
        .collect();
    let average = if scores.is_empty() {
        None
    } else {
        let mean = scores.iter().sum::<u32>() as f64 / scores.len() as f64;
        Some(mean.round() as u8)
    };
    KindAverage {
        count: scores.len(),
        average,
    }
}

/// Per-kind averages plus the latest records. Classcard entries carry no
/// numeric score and only show up in `recent`.
pub fn summarize(records: &[AttemptRecord]) -> LedgerSummary {
    LedgerSummary {
        reading: kind_average(records, AttemptKind::Reading),
        essay: kind_average(records, AttemptKind::Essay),
        naesin: kind_average(records, AttemptKind::Naesin),
        recent: records.iter().rev().take(RECENT_LIMIT).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AttemptDetail, ClasscardScores, ExamDifficulty};
    use crate::store::InMemoryStore;
    use serde_json::json;

    fn reading(score: u8) -> AttemptRecord {
        AttemptRecord {
            detail: AttemptDetail::Reading {
                score,
                topic: "animals".to_string(),
            },
            date: "2026. 10. 18.".to_string(),
        }
    }

    fn classcard() -> AttemptRecord {
        AttemptRecord {
            detail: AttemptDetail::Classcard(ClasscardScores {
                vocab: "95".to_string(),
                grammar: "80".to_string(),
                listening: "70".to_string(),
            }),
            date: "2026. 10. 18.".to_string(),
        }
    }

    #[tokio::test]
    async fn appended_records_read_back_in_order() {
        let ledger = ResultLedger::new(Arc::new(InMemoryStore::new()));
        for score in [10, 20, 30, 40] {
            ledger.append("st_1", reading(score)).await.unwrap();
        }
        let scores: Vec<_> = ledger
            .records("st_1")
            .await
            .unwrap()
            .iter()
            .map(|r| r.score())
            .collect();
        assert_eq!(scores, vec![Some(10), Some(20), Some(30), Some(40)]);
        assert!(ledger.records("st_2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn legacy_entries_do_not_block_reads_or_appends() {
        let store = Arc::new(InMemoryStore::new());
        store
            .set(
                "results_st_1",
                json!([
                    {"type": "essay", "date": "2025. 3. 2.", "topic": "t"},
                    {"type": "vocabulary", "date": "2025. 3. 3.", "score": 70}
                ]),
            )
            .await
            .unwrap();
        let ledger = ResultLedger::new(store.clone());

        let records = ledger.records("st_1").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind(), AttemptKind::Essay);
        assert_eq!(records[0].score(), Some(0));

        ledger.append("st_1", reading(90)).await.unwrap();
        let stored = store.get("results_st_1").await.unwrap().unwrap();
        assert_eq!(stored.as_array().unwrap().len(), 3);
        assert_eq!(stored[1]["type"], "vocabulary");

        let summary = ledger.summary("st_1").await.unwrap();
        assert_eq!(summary.essay.average, Some(0));
        assert_eq!(summary.reading.average, Some(90));
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() {
        let ledger = Arc::new(ResultLedger::new(Arc::new(InMemoryStore::new())));
        let handles: Vec<_> = (0..20u8)
            .map(|score| {
                let ledger = ledger.clone();
                tokio::spawn(async move { ledger.append("st_1", reading(score)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(ledger.records("st_1").await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn last_returns_the_tail_oldest_first() {
        let ledger = ResultLedger::new(Arc::new(InMemoryStore::new()));
        for score in 1..=12 {
            ledger.append("st_1", reading(score)).await.unwrap();
        }
        let tail = ledger.last("st_1", 10).await.unwrap();
        assert_eq!(tail.len(), 10);
        assert_eq!(tail[0].score(), Some(3));
        assert_eq!(tail[9].score(), Some(12));
    }

    #[test]
    fn average_of_reading_scores() {
        let summary = summarize(&[reading(80), reading(90), reading(70)]);
        assert_eq!(summary.reading.average, Some(80));
        assert_eq!(summary.reading.count, 3);
    }

    #[test]
    fn kind_without_records_reports_no_data() {
        let summary = summarize(&[reading(80)]);
        assert_eq!(summary.essay, KindAverage { count: 0, average: None });
        assert_eq!(summary.naesin.average, None);
    }

    #[test]
    fn average_rounds_half_up() {
        let summary = summarize(&[reading(80), reading(81)]);
        assert_eq!(summary.reading.average, Some(81));
    }

    #[test]
    fn classcard_is_recent_but_not_averaged() {
        let naesin = AttemptRecord {
            detail: AttemptDetail::Naesin {
                score: 60,
                difficulty: ExamDifficulty::Hard,
            },
            date: "2026. 10. 18.".to_string(),
        };
        let records = vec![
            reading(10),
            reading(20),
            naesin,
            reading(30),
            reading(40),
            classcard(),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.naesin.average, Some(60));
        assert_eq!(summary.recent.len(), RECENT_LIMIT);
        assert_eq!(summary.recent[0].kind(), AttemptKind::Classcard);
        assert_eq!(summary.recent[1].score(), Some(40));
        assert_eq!(summary.recent[4].score(), Some(20));
    }
}
