//! Session management
//!
//! One orchestrator per live call, keyed by session id. Engines are shared
//! across sessions; per-call state lives inside each orchestrator.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

use voice_dialogue_agent::DialogueOrchestrator;
use voice_dialogue_config::DialogueConfig;
use voice_dialogue_core::{ReasoningEngine, SpeechRecognizer, SpeechSynthesizer};
use voice_dialogue_tools::StationDirectory;

use crate::ServerError;

/// The three engines injected into every orchestrator
#[derive(Clone)]
pub struct EngineSet {
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub reasoner: Arc<dyn ReasoningEngine>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl EngineSet {
    /// Development stubs, no external model services required
    pub fn dev_stubs() -> Self {
        Self {
            recognizer: Arc::new(crate::engines::EchoRecognizer),
            reasoner: Arc::new(crate::engines::ScriptedReasoner::new()),
            synthesizer: Arc::new(crate::engines::SilenceSynthesizer),
        }
    }
}

/// One live call and its orchestrator
pub struct ManagedSession {
    pub id: String,
    pub orchestrator: Arc<DialogueOrchestrator>,
    pub created_at: DateTime<Utc>,
    last_activity: Mutex<Instant>,
}

impl ManagedSession {
    fn new(id: String, orchestrator: DialogueOrchestrator) -> Self {
        Self {
            id,
            orchestrator: Arc::new(orchestrator),
            created_at: Utc::now(),
            last_activity: Mutex::new(Instant::now()),
        }
    }

    pub fn touch(&self) {
        *self.last_activity.lock() = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity.lock().elapsed()
    }
}

/// Registry of live sessions with a capacity cap
pub struct SessionManager {
    sessions: DashMap<String, Arc<ManagedSession>>,
    engines: EngineSet,
    stations: Arc<StationDirectory>,
    config: DialogueConfig,
    max_sessions: usize,
}

impl SessionManager {
    pub fn new(
        engines: EngineSet,
        stations: Arc<StationDirectory>,
        config: DialogueConfig,
        max_sessions: usize,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            engines,
            stations,
            config,
            max_sessions,
        }
    }

    /// Create a session with a fresh orchestrator
    pub fn create(&self) -> Result<Arc<ManagedSession>, ServerError> {
        if self.sessions.len() >= self.max_sessions {
            return Err(ServerError::SessionLimit(self.max_sessions));
        }

        let id = Uuid::new_v4().to_string();
        let orchestrator = DialogueOrchestrator::new(
            self.engines.recognizer.clone(),
            self.engines.reasoner.clone(),
            self.engines.synthesizer.clone(),
            self.stations.clone(),
            self.config.clone(),
        );
        let session = Arc::new(ManagedSession::new(id.clone(), orchestrator));
        self.sessions.insert(id.clone(), session.clone());
        crate::metrics::record_session_created();
        tracing::info!(session_id = %id, total = self.sessions.len(), "Session created");
        Ok(session)
    }

    pub fn get(&self, id: &str) -> Option<Arc<ManagedSession>> {
        self.sessions.get(id).map(|entry| entry.clone())
    }

    pub fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            tracing::info!(session_id = id, "Session removed");
        }
        removed
    }

    pub fn list(&self) -> Vec<String> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle longer than `max_idle`
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let stale: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| entry.idle_for() > max_idle)
            .map(|entry| entry.key().clone())
            .collect();
        for id in &stale {
            tracing::info!(session_id = %id, "Evicting idle session");
            self.sessions.remove(id);
        }
        stale.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(cap: usize) -> SessionManager {
        SessionManager::new(
            EngineSet::dev_stubs(),
            Arc::new(StationDirectory::new()),
            DialogueConfig::default(),
            cap,
        )
    }

    #[test]
    fn create_get_remove_roundtrip() {
        let manager = manager(4);
        let session = manager.create().unwrap();
        assert!(manager.get(&session.id).is_some());
        assert_eq!(manager.len(), 1);
        assert!(manager.remove(&session.id));
        assert!(manager.get(&session.id).is_none());
    }

    #[test]
    fn capacity_cap_is_enforced() {
        let manager = manager(1);
        manager.create().unwrap();
        assert!(matches!(
            manager.create(),
            Err(ServerError::SessionLimit(1))
        ));
    }

    #[test]
    fn evict_only_removes_idle() {
        let manager = manager(4);
        let session = manager.create().unwrap();
        session.touch();
        assert_eq!(manager.evict_idle(Duration::from_secs(60)), 0);
        assert_eq!(manager.evict_idle(Duration::ZERO), 1);
        assert!(manager.is_empty());
    }
}
