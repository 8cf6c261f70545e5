//! Shared application state

use std::sync::Arc;

use voice_dialogue_config::Settings;
use voice_dialogue_tools::StationDirectory;

use crate::session::{EngineSet, SessionManager};

const MAX_SESSIONS: usize = 100;

/// State shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub sessions: Arc<SessionManager>,
    /// Station cache shared by every session's dispatcher
    pub stations: Arc<StationDirectory>,
}

impl AppState {
    pub fn new(settings: Settings, engines: EngineSet) -> Self {
        let stations = Arc::new(StationDirectory::new());
        let sessions = Arc::new(SessionManager::new(
            engines,
            stations.clone(),
            settings.dialogue.clone(),
            MAX_SESSIONS,
        ));
        Self {
            settings: Arc::new(settings),
            sessions,
            stations,
        }
    }
}
