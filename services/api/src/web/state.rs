//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the in-memory registries for
//! login sessions and exercise sessions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tutor_core::{
    domain::ExerciseKind, exercise::ExerciseSession, AuthGate, KeyValueStore,
    LanguageModelService, Principal, ResultLedger, Roster,
};

/// Exercise sessions are keyed by student and generator.
pub type ExerciseKey = (String, ExerciseKind);

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub model: Arc<dyn LanguageModelService>,
    pub roster: Arc<Roster>,
    pub auth: AuthGate,
    pub ledger: ResultLedger,
    /// Cookie value → who logged in. Lives until logout or restart.
    pub login_sessions: RwLock<HashMap<String, Principal>>,
    /// Never held across a model call.
    pub exercises: Mutex<HashMap<ExerciseKey, ExerciseSession>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        model: Arc<dyn LanguageModelService>,
        teacher_passphrase: String,
    ) -> Self {
        let roster = Arc::new(Roster::new(store.clone()));
        Self {
            model,
            auth: AuthGate::new(roster.clone(), teacher_passphrase),
            roster,
            ledger: ResultLedger::new(store),
            login_sessions: RwLock::new(HashMap::new()),
            exercises: Mutex::new(HashMap::new()),
        }
    }
}
