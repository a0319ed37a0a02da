use std::sync::Arc;

use crate::classroom::ClassroomClient;
use crate::graph::EducationClient;
use crate::services::MigrationConfig;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionStore>,
    pub classroom: Arc<dyn ClassroomClient>,
    pub graph: Arc<dyn EducationClient>,
    pub migration: MigrationConfig,
}
