use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssignmentStatus {
    #[default]
    Draft,
    Published,
    Assigned,
    Inactive,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub content: String,
    pub content_type: String,
}

impl ItemBody {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationClass {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationAssignment {
    pub id: String,
    #[serde(default)]
    pub class_id: String,
    pub display_name: String,
    #[serde(default)]
    pub instructions: Option<ItemBody>,
    #[serde(default)]
    pub due_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: AssignmentStatus,
    #[serde(default)]
    pub resources_folder_url: Option<String>,
    #[serde(default)]
    pub grading: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationModule {
    pub id: String,
    #[serde(default)]
    pub class_id: String,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub resources_folder_url: Option<String>,
}

/// Fields sent when creating an assignment. Graph always creates it as a draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    pub display_name: String,
    pub instructions: ItemBody,
    pub due_date_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grading: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign_to: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Word,
    Excel,
    PowerPoint,
    Media,
    File,
    Link,
}

/// Resource kinds that point at an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileKind {
    Word,
    Excel,
    PowerPoint,
    Media,
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@odata.type")]
pub enum EducationResource {
    #[serde(rename = "#microsoft.graph.educationWordResource", rename_all = "camelCase")]
    Word { display_name: String, file_url: String },
    #[serde(rename = "#microsoft.graph.educationExcelResource", rename_all = "camelCase")]
    Excel { display_name: String, file_url: String },
    #[serde(rename = "#microsoft.graph.educationPowerPointResource", rename_all = "camelCase")]
    PowerPoint { display_name: String, file_url: String },
    #[serde(rename = "#microsoft.graph.educationMediaResource", rename_all = "camelCase")]
    Media { display_name: String, file_url: String },
    #[serde(rename = "#microsoft.graph.educationFileResource", rename_all = "camelCase")]
    File { display_name: String, file_url: String },
    #[serde(rename = "#microsoft.graph.educationLinkResource", rename_all = "camelCase")]
    Link { display_name: String, link: String },
}

impl EducationResource {
    pub fn file(
        kind: FileKind,
        display_name: impl Into<String>,
        file_url: impl Into<String>,
    ) -> Self {
        let display_name = display_name.into();
        let file_url = file_url.into();
        match kind {
            FileKind::Word => EducationResource::Word {
                display_name,
                file_url,
            },
            FileKind::Excel => EducationResource::Excel {
                display_name,
                file_url,
            },
            FileKind::PowerPoint => EducationResource::PowerPoint {
                display_name,
                file_url,
            },
            FileKind::Media => EducationResource::Media {
                display_name,
                file_url,
            },
            FileKind::File => EducationResource::File {
                display_name,
                file_url,
            },
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            EducationResource::Word { .. } => ResourceKind::Word,
            EducationResource::Excel { .. } => ResourceKind::Excel,
            EducationResource::PowerPoint { .. } => ResourceKind::PowerPoint,
            EducationResource::Media { .. } => ResourceKind::Media,
            EducationResource::File { .. } => ResourceKind::File,
            EducationResource::Link { .. } => ResourceKind::Link,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            EducationResource::Word { display_name, .. }
            | EducationResource::Excel { display_name, .. }
            | EducationResource::PowerPoint { display_name, .. }
            | EducationResource::Media { display_name, .. }
            | EducationResource::File { display_name, .. }
            | EducationResource::Link { display_name, .. } => display_name,
        }
    }
}

/// A resource together with how it is handed out to students.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachedResource {
    pub resource: EducationResource,
    pub distribute_for_student_work: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedResource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub distribute_for_student_work: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetKind {
    Assignment,
    Module,
}

impl TargetKind {
    /// Path segment used by Graph for this collection.
    pub fn collection(&self) -> &'static str {
        match self {
            TargetKind::Assignment => "assignments",
            TargetKind::Module => "modules",
        }
    }
}

/// The assignment or module resources get attached to.
///
/// Never mutated in place: provisioning a resources folder yields a new value
/// via [`ResourceTarget::with_resources_folder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTarget {
    pub kind: TargetKind,
    pub class_id: String,
    pub id: String,
    pub display_name: String,
    pub resources_folder_url: Option<String>,
}

impl ResourceTarget {
    pub fn is_assignment(&self) -> bool {
        self.kind == TargetKind::Assignment
    }

    pub fn with_resources_folder(self, url: impl Into<String>) -> Self {
        Self {
            resources_folder_url: Some(url.into()),
            ..self
        }
    }

    pub fn resources_folder(&self) -> Option<Result<ResourcesFolder, AppError>> {
        self.resources_folder_url
            .as_deref()
            .map(ResourcesFolder::parse)
    }
}

impl From<&EducationAssignment> for ResourceTarget {
    fn from(assignment: &EducationAssignment) -> Self {
        Self {
            kind: TargetKind::Assignment,
            class_id: assignment.class_id.clone(),
            id: assignment.id.clone(),
            display_name: assignment.display_name.clone(),
            resources_folder_url: assignment.resources_folder_url.clone(),
        }
    }
}

impl From<&EducationModule> for ResourceTarget {
    fn from(module: &EducationModule) -> Self {
        Self {
            kind: TargetKind::Module,
            class_id: module.class_id.clone(),
            id: module.id.clone(),
            display_name: module.display_name.clone(),
            resources_folder_url: module.resources_folder_url.clone(),
        }
    }
}

/// Drive location behind a resources folder URL of the form
/// `.../drives/{driveId}/items/{itemId}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcesFolder {
    pub drive_id: String,
    pub item_id: String,
}

impl ResourcesFolder {
    /// Positional parse: the last four segments must read `drives/{driveId}/items/{itemId}`.
    pub fn parse(url: &str) -> Result<Self, AppError> {
        let segments: Vec<&str> = url.trim_end_matches('/').split('/').collect();
        match segments.as_slice() {
            [.., "drives", drive_id, "items", item_id]
                if !drive_id.is_empty() && !item_id.is_empty() =>
            {
                Ok(Self {
                    drive_id: drive_id.to_string(),
                    item_id: item_id.to_string(),
                })
            }
            _ => Err(AppError::InvalidFolderUrl(url.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubmissionStatus {
    Working,
    Submitted,
    Released,
    Returned,
    Reassigned,
    Excused,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationSubmission {
    pub id: String,
    #[serde(default)]
    pub status: SubmissionStatus,
    #[serde(default)]
    pub submitted_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub returned_date_time: Option<DateTime<Utc>>,
}
