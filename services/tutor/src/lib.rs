pub mod adapters;
pub mod chat;
pub mod config;
pub mod error;
pub mod state;
pub mod store;

pub use chat::{send_user_message, ReplyOutcome};
pub use state::AppState;
pub use store::{StoreSnapshot, TutorStore};
