//! In-memory session store using DashMap.
//!
//! Every session owns its own flight records; nothing is shared between
//! sessions, so queries only need the map lookup.

use approach_core::SimulationSession;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

use crate::config::Config;

/// Id under which the startup roster is registered.
pub const DEFAULT_SESSION_ID: &str = "default";

/// A registered simulation session.
#[derive(Debug)]
pub struct SessionEntry {
    pub id: String,
    pub session: SimulationSession,
    pub created_at: DateTime<Utc>,
}

/// Application state - thread-safe registry of simulation sessions.
pub struct AppState {
    sessions: DashMap<String, Arc<SessionEntry>>,
    config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a session under a fresh id.
    pub fn add_session(&self, session: SimulationSession) -> Arc<SessionEntry> {
        self.insert_session(uuid::Uuid::new_v4().to_string(), session)
    }

    /// Register (or replace) a session under `id`.
    pub fn insert_session(&self, id: impl Into<String>, session: SimulationSession) -> Arc<SessionEntry> {
        let entry = Arc::new(SessionEntry {
            id: id.into(),
            session,
            created_at: Utc::now(),
        });
        self.sessions.insert(entry.id.clone(), entry.clone());
        entry
    }

    pub fn get_session(&self, id: &str) -> Option<Arc<SessionEntry>> {
        self.sessions.get(id).map(|r| r.value().clone())
    }

    pub fn remove_session(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// All sessions, oldest first.
    pub fn get_sessions(&self) -> Vec<Arc<SessionEntry>> {
        let mut sessions: Vec<_> = self.sessions.iter().map(|r| r.value().clone()).collect();
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        sessions
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
