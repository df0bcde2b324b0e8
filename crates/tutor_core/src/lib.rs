pub mod domain;
pub mod exercise;
pub mod extract;
pub mod ledger;
pub mod ports;
pub mod prompts;
pub mod report;
pub mod roster;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use domain::{
    AttemptDetail, AttemptKind, AttemptRecord, ClasscardScores, ExerciseKind, GradeBand,
    NewStudent, Student,
};
pub use exercise::{ExerciseSession, GenerationRequest, GradeOutcome};
pub use ledger::{LedgerSummary, ResultLedger};
pub use ports::{KeyValueStore, LanguageModelService, PortError, PortResult};
pub use roster::{AuthGate, Principal, Roster};
pub use store::InMemoryStore;
