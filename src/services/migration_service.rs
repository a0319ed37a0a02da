use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::classroom::ClassroomClient;
use crate::config::lookup_or;
use crate::error::AppError;
use crate::graph::EducationClient;
use crate::models::{
    AttachedResource, CourseWork, CourseWorkMaterial, DriveFile, ItemBody, ItemOutcome, ItemState,
    Material, MigrationFailure, MigrationReport, MigrationRequest, NewAssignment, ResourceTarget,
    ShareMode, TargetKind,
};
use crate::services::file_transfer::FileTransferAgent;
use crate::services::poll::PollPolicy;
use crate::services::resource_mapper::{self, FileFormat, ResourceMapper};

const DUE_DAYS_RANGE: RangeInclusive<i64> = 1..=3650;

#[derive(Clone, Debug)]
pub struct MigrationConfig {
    /// Due date offset applied when the caller does not supply one.
    pub default_due_days: i64,
    pub poll: PollPolicy,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            default_due_days: 7,
            poll: PollPolicy::default(),
        }
    }
}

impl MigrationConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let default_due_days = lookup_or(lookup, "DEFAULT_DUE_DAYS", defaults.default_due_days)?;
        if !DUE_DAYS_RANGE.contains(&default_due_days) {
            return Err(AppError::Config(format!(
                "DEFAULT_DUE_DAYS must be between 1 and {}, got {}",
                DUE_DAYS_RANGE.end(),
                default_due_days
            )));
        }

        Ok(Self {
            default_due_days,
            poll: PollPolicy {
                max_attempts: lookup_or(lookup, "POLL_MAX_ATTEMPTS", defaults.poll.max_attempts)?,
                interval: Duration::from_millis(lookup_or(
                    lookup,
                    "POLL_INTERVAL_MS",
                    defaults.poll.interval.as_millis() as u64,
                )?),
            },
        })
    }
}

/// Result of handling one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Attached,
    Skipped,
}

/// Drives one migration run: coursework becomes assignments, coursework
/// materials become modules, and every attachment is re-created as a resource.
///
/// Items and their materials are processed one at a time. A failure is
/// recorded against the smallest unit it hit and the run moves on; nothing
/// already created is rolled back.
pub struct MigrationService {
    source: Arc<dyn ClassroomClient>,
    destination: Arc<dyn EducationClient>,
    transfer: FileTransferAgent,
    mapper: ResourceMapper,
    config: MigrationConfig,
}

impl MigrationService {
    pub fn new(
        source: Arc<dyn ClassroomClient>,
        destination: Arc<dyn EducationClient>,
        config: MigrationConfig,
    ) -> Self {
        let transfer = FileTransferAgent::new(source.clone(), destination.clone());
        Self {
            source,
            destination,
            transfer,
            mapper: ResourceMapper::default(),
            config,
        }
    }

    pub fn with_mapper(mut self, mapper: ResourceMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Runs the migration. Consumes the service so no folder state leaks
    /// into a later run.
    pub async fn run(
        self,
        class_id: &str,
        request: MigrationRequest,
    ) -> Result<MigrationReport, AppError> {
        // Without both tokens nothing can succeed; stop before any write.
        self.source.ensure_authenticated()?;
        self.destination.ensure_authenticated()?;

        let mut report = MigrationReport::new(class_id);
        info!(
            "Migration {} started: {} coursework, {} materials into class {}",
            report.run_id,
            request.course_work.len(),
            request.course_work_materials.len(),
            class_id
        );

        info!("Step 1: Migrating coursework to assignments");
        for course_work in &request.course_work {
            let outcome = self
                .migrate_course_work(class_id, course_work, request.due_date_time, &mut report)
                .await;
            report.items.push(outcome);
        }

        info!("Step 2: Migrating coursework materials to modules");
        for material_item in &request.course_work_materials {
            let outcome = self
                .migrate_course_work_material(class_id, material_item, &mut report)
                .await;
            report.items.push(outcome);
        }

        info!(
            "Migration {} finished - assignments: {}, modules: {}, skipped materials: {}, failures: {}",
            report.run_id,
            report.assignments_created.len(),
            report.modules_created.len(),
            report.materials_skipped,
            report.failures.len()
        );
        Ok(report)
    }

    async fn migrate_course_work(
        &self,
        class_id: &str,
        course_work: &CourseWork,
        due_override: Option<DateTime<Utc>>,
        report: &mut MigrationReport,
    ) -> ItemOutcome {
        let mut outcome = ItemOutcome {
            source_id: course_work.id.clone(),
            kind: TargetKind::Assignment,
            display_name: course_work.title.clone(),
            entity_id: None,
            state: ItemState::Pending,
            resources_attached: 0,
        };

        let created = match self.to_assignment(course_work, due_override) {
            Ok(new_assignment) => {
                self.destination
                    .create_assignment(class_id, &new_assignment)
                    .await
            }
            Err(e) => Err(e),
        };
        let assignment = match created {
            Ok(assignment) => assignment,
            Err(e) => {
                fail(&mut outcome, report, &e);
                return outcome;
            }
        };

        outcome.entity_id = Some(assignment.id.clone());
        advance(&mut outcome, ItemState::AssignmentCreated);
        report
            .assignments_created
            .push(assignment.display_name.clone());

        let mut target = ResourceTarget::from(&assignment);
        if target.class_id.is_empty() {
            target.class_id = class_id.to_string();
        }

        if !course_work.materials.is_empty() {
            self.attach_materials(target, &course_work.materials, &mut outcome, report)
                .await;
        }

        advance(&mut outcome, ItemState::Done);
        outcome
    }

    async fn migrate_course_work_material(
        &self,
        class_id: &str,
        item: &CourseWorkMaterial,
        report: &mut MigrationReport,
    ) -> ItemOutcome {
        let mut outcome = ItemOutcome {
            source_id: item.id.clone(),
            kind: TargetKind::Module,
            display_name: item.title.clone(),
            entity_id: None,
            state: ItemState::Pending,
            resources_attached: 0,
        };

        let description = item.description.clone().unwrap_or_default();
        let module = match self
            .destination
            .create_module(class_id, &item.title, &description)
            .await
        {
            Ok(module) => module,
            Err(e) => {
                fail(&mut outcome, report, &e);
                return outcome;
            }
        };

        outcome.entity_id = Some(module.id.clone());
        advance(&mut outcome, ItemState::AssignmentCreated);
        report.modules_created.push(module.display_name.clone());

        let mut target = ResourceTarget::from(&module);
        if target.class_id.is_empty() {
            target.class_id = class_id.to_string();
        }

        if !item.materials.is_empty() {
            self.attach_materials(target, &item.materials, &mut outcome, report)
                .await;
        }

        advance(&mut outcome, ItemState::Done);
        outcome
    }

    /// Attaches every material to `target`, threading the target through so
    /// the resources folder is provisioned at most once.
    async fn attach_materials(
        &self,
        mut target: ResourceTarget,
        materials: &[Material],
        outcome: &mut ItemOutcome,
        report: &mut MigrationReport,
    ) {
        for material in materials {
            let had_folder = target.resources_folder_url.is_some();
            let (next, result) = self.attach_material(target, material).await;
            target = next;

            if !had_folder && target.resources_folder_url.is_some() {
                advance(outcome, ItemState::FolderReady);
            }

            match result {
                Ok(Step::Attached) => {
                    outcome.resources_attached += 1;
                    advance(outcome, ItemState::ResourcesAttached);
                }
                Ok(Step::Skipped) => {
                    report.materials_skipped += 1;
                }
                Err(e) => {
                    warn!(
                        "Material '{}' of '{}' failed: {}",
                        material.title(),
                        outcome.display_name,
                        e
                    );
                    report.failures.push(MigrationFailure {
                        item: outcome.display_name.clone(),
                        material: Some(material.title().to_string()),
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    async fn attach_material(
        &self,
        target: ResourceTarget,
        material: &Material,
    ) -> (ResourceTarget, Result<Step, AppError>) {
        match material {
            Material::DriveFile(file) => self.attach_drive_file(target, file).await,
            Material::Link(link) => {
                let result = self.post_link(&target, &link.url, &link.title).await;
                (target, result)
            }
            Material::YoutubeVideo(video) => {
                let result = self.post_link(&target, &video.alternate_link, &video.title).await;
                (target, result)
            }
        }
    }

    async fn post_link(
        &self,
        target: &ResourceTarget,
        url: &str,
        title: &str,
    ) -> Result<Step, AppError> {
        let attached = AttachedResource {
            resource: resource_mapper::link_resource(url, title),
            distribute_for_student_work: false,
        };
        self.destination.post_resource(target, &attached).await?;
        debug!("Attached link '{}' to {}", title, target.display_name);
        Ok(Step::Attached)
    }

    async fn attach_drive_file(
        &self,
        target: ResourceTarget,
        file: &DriveFile,
    ) -> (ResourceTarget, Result<Step, AppError>) {
        let context = target.display_name.clone();

        let mime_type = match self.resolve_mime_type(&context, file).await {
            Ok(mime_type) => mime_type,
            Err(e) => return (target, Err(e)),
        };

        let format = match self.mapper.file_details(&mime_type) {
            Ok(format) => format,
            Err(AppError::UnsupportedMaterial { mime_type }) => {
                info!(
                    "Skipping '{}' on '{}': {} is not supported in Teams",
                    file.title, context, mime_type
                );
                return (target, Ok(Step::Skipped));
            }
            Err(e) => return (target, Err(e)),
        };

        let bytes = match self
            .transfer
            .fetch_source_file(&context, &file.id, &format.target_mime, format.is_export())
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => return (target, Err(e)),
        };

        let target = if target.resources_folder_url.is_none() {
            match self.destination.setup_resources_folder(&target).await {
                Ok(ready) => {
                    debug!("Resources folder ready for {}", ready.display_name);
                    ready
                }
                Err(e) => return (target, Err(e)),
            }
        } else {
            target
        };

        let result = self
            .upload_and_post(&target, file, &mime_type, &format, bytes)
            .await;
        (target, result)
    }

    async fn upload_and_post(
        &self,
        target: &ResourceTarget,
        file: &DriveFile,
        mime_type: &str,
        format: &FileFormat,
        bytes: Vec<u8>,
    ) -> Result<Step, AppError> {
        let folder = target
            .resources_folder()
            .ok_or_else(|| AppError::InvalidFolderUrl(String::new()))??;

        let file_name = format!("{}{}", file.title, format.extension);
        let item = self
            .transfer
            .upload_to_destination(&target.display_name, &folder, &file_name, bytes)
            .await?;

        let file_url = resource_mapper::build_file_url(&folder.drive_id, &item.id);
        let resource = self.mapper.map_resource(mime_type, &file_url, &file_name)?;
        let attached = AttachedResource {
            resource,
            distribute_for_student_work: target.is_assignment()
                && file.share_mode == ShareMode::StudentCopy,
        };

        self.destination.post_resource(target, &attached).await?;
        debug!("Attached file '{}' to {}", file_name, target.display_name);
        Ok(Step::Attached)
    }

    async fn resolve_mime_type(&self, context: &str, file: &DriveFile) -> Result<String, AppError> {
        if let Some(mime_type) = file.mime_type.as_deref().filter(|m| !m.is_empty()) {
            return Ok(mime_type.to_string());
        }
        let metadata = self
            .source
            .get_file_metadata(&file.id)
            .await
            .map_err(|e| AppError::file_fetch(context, &file.id, e))?;
        Ok(metadata.mime_type)
    }

    fn to_assignment(
        &self,
        course_work: &CourseWork,
        due_override: Option<DateTime<Utc>>,
    ) -> Result<NewAssignment, AppError> {
        let due_date_time = match due_override {
            Some(due) => due,
            None => TimeDelta::try_days(self.config.default_due_days)
                .and_then(|offset| Utc::now().checked_add_signed(offset))
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "due date offset of {} days is out of range",
                        self.config.default_due_days
                    ))
                })?,
        };

        Ok(NewAssignment {
            display_name: course_work.title.clone(),
            instructions: ItemBody::text(course_work.description.clone().unwrap_or_default()),
            due_date_time,
            grading: course_work.max_points.map(|points| {
                json!({
                    "@odata.type": "#microsoft.graph.educationAssignmentPointsGradeType",
                    "maxPoints": points
                })
            }),
            assign_to: Some(json!({
                "@odata.type": "#microsoft.graph.educationAssignmentClassRecipient"
            })),
        })
    }
}

fn advance(outcome: &mut ItemOutcome, state: ItemState) {
    if outcome.state != state {
        debug!(
            "'{}': {:?} -> {:?}",
            outcome.display_name, outcome.state, state
        );
        outcome.state = state;
    }
}

fn fail(outcome: &mut ItemOutcome, report: &mut MigrationReport, error: &AppError) {
    warn!("'{}' failed: {}", outcome.display_name, error);
    advance(outcome, ItemState::Failed);
    report.failures.push(MigrationFailure {
        item: outcome.display_name.clone(),
        material: None,
        message: error.to_string(),
    });
}
