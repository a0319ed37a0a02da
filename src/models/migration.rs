use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CourseWork, CourseWorkMaterial, TargetKind};

/// Pre-selected source items to migrate into one destination class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRequest {
    #[serde(default)]
    pub course_work: Vec<CourseWork>,
    #[serde(default)]
    pub course_work_materials: Vec<CourseWorkMaterial>,
    /// Overrides the default due date for every created assignment.
    #[serde(default)]
    pub due_date_time: Option<DateTime<Utc>>,
}

/// Where a single coursework item ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemState {
    Pending,
    AssignmentCreated,
    FolderReady,
    ResourcesAttached,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutcome {
    pub source_id: String,
    pub kind: TargetKind,
    pub display_name: String,
    pub entity_id: Option<String>,
    pub state: ItemState,
    pub resources_attached: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationFailure {
    pub item: String,
    pub material: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub run_id: Uuid,
    pub class_id: String,
    pub assignments_created: Vec<String>,
    pub modules_created: Vec<String>,
    pub materials_skipped: usize,
    pub items: Vec<ItemOutcome>,
    pub failures: Vec<MigrationFailure>,
}

impl MigrationReport {
    pub fn new(class_id: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            class_id: class_id.to_string(),
            assignments_created: Vec::new(),
            modules_created: Vec::new(),
            materials_skipped: 0,
            items: Vec::new(),
            failures: Vec::new(),
        }
    }
}
