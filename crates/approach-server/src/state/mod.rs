pub mod store;

pub use store::{AppState, SessionEntry, DEFAULT_SESSION_ID};
