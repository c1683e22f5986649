//! services/tutor/src/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use tutor_core::ports::ResponseGenerator;

use crate::config::Config;
use crate::store::TutorStore;

/// The shared application state, created once at startup and cloned into
/// every task that needs it. The store owns all mutable state; the response
/// generator is the collaborator used by the chat worker.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TutorStore>,
    pub responder: Arc<dyn ResponseGenerator>,
    pub config: Arc<Config>,
}
