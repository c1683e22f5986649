//! crates/tutor_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations. The shipped adapters
//! are simulated stand-ins; a real PDF pipeline or model client can replace them
//! without touching the store.

use async_trait::async_trait;

use crate::domain::{Creativity, DocumentAnalysis};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external collaborators.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Derives page count, chapters and main topics from an uploaded file.
    /// Only the file name is available; real content extraction is out of scope.
    async fn analyze(&self, file_name: &str) -> PortResult<DocumentAnalysis>;
}

#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Produces the assistant's reply text for a user prompt at the given
    /// creativity level.
    async fn generate(&self, creativity: Creativity, prompt: &str) -> PortResult<String>;
}
