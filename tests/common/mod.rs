//! In-memory Classroom and Graph clients that record every call.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use classroom_bridge::classroom::ClassroomClient;
use classroom_bridge::error::AppError;
use classroom_bridge::graph::EducationClient;
use classroom_bridge::models::*;

#[derive(Debug, Clone, PartialEq)]
pub enum SourceCall {
    Metadata(String),
    Export { file_id: String, mime_type: String },
    Download(String),
}

#[derive(Default)]
pub struct FakeClassroom {
    pub courses: Vec<Course>,
    pub course_work: Vec<CourseWork>,
    pub materials: Vec<CourseWorkMaterial>,
    /// file id -> MIME type reported by Drive metadata
    pub metadata: HashMap<String, String>,
    pub failing_files: HashSet<String>,
    pub unauthenticated: bool,
    pub calls: Mutex<Vec<SourceCall>>,
}

impl FakeClassroom {
    pub fn calls(&self) -> Vec<SourceCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: SourceCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn bytes_for(&self, file_id: &str) -> Result<Vec<u8>, AppError> {
        if self.failing_files.contains(file_id) {
            return Err(AppError::Transient {
                status: 404,
                body: "file not found".to_string(),
            });
        }
        Ok(format!("content of {}", file_id).into_bytes())
    }
}

#[async_trait]
impl ClassroomClient for FakeClassroom {
    fn ensure_authenticated(&self) -> Result<(), AppError> {
        if self.unauthenticated {
            Err(AppError::Auth)
        } else {
            Ok(())
        }
    }

    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        self.ensure_authenticated()?;
        Ok(self.courses.clone())
    }

    async fn list_course_work(&self, course_id: &str) -> Result<Vec<CourseWork>, AppError> {
        self.ensure_authenticated()?;
        Ok(self
            .course_work
            .iter()
            .filter(|cw| cw.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn list_course_work_materials(
        &self,
        course_id: &str,
    ) -> Result<Vec<CourseWorkMaterial>, AppError> {
        self.ensure_authenticated()?;
        Ok(self
            .materials
            .iter()
            .filter(|m| m.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn get_file_metadata(&self, file_id: &str) -> Result<DriveFileMetadata, AppError> {
        self.record(SourceCall::Metadata(file_id.to_string()));
        let mime_type = self.metadata.get(file_id).cloned().ok_or(AppError::NotFound)?;
        Ok(DriveFileMetadata {
            id: file_id.to_string(),
            name: file_id.to_string(),
            mime_type,
        })
    }

    async fn export_file(&self, file_id: &str, mime_type: &str) -> Result<Vec<u8>, AppError> {
        self.record(SourceCall::Export {
            file_id: file_id.to_string(),
            mime_type: mime_type.to_string(),
        });
        self.bytes_for(file_id)
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, AppError> {
        self.record(SourceCall::Download(file_id.to_string()));
        self.bytes_for(file_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DestCall {
    CreateAssignment {
        class_id: String,
        assignment: NewAssignment,
    },
    CreateModule {
        class_id: String,
        display_name: String,
        description: String,
    },
    SetupFolder {
        kind: TargetKind,
        id: String,
    },
    Upload {
        drive_id: String,
        item_id: String,
        file_name: String,
        size: usize,
    },
    PostResource {
        kind: TargetKind,
        target_id: String,
        resource: AttachedResource,
    },
    GetAssignment(String),
    Publish(String),
    GetSubmission(String),
    ReturnSubmission(String),
}

#[derive(Default)]
pub struct FakeEducation {
    pub calls: Mutex<Vec<DestCall>>,
    /// Resource display names whose post fails.
    pub failing_posts: HashSet<String>,
    /// Uploaded file names whose upload fails.
    pub failing_uploads: HashSet<String>,
    /// Assignment / module titles whose creation fails.
    pub failing_creates: HashSet<String>,
    /// Created entities come back with a resources folder already set.
    pub preprovisioned_folders: bool,
    /// Statuses handed out by `get_assignment`, the last one repeats.
    pub assignment_statuses: Mutex<VecDeque<AssignmentStatus>>,
    pub submission_statuses: Mutex<VecDeque<SubmissionStatus>>,
    pub submissions: Vec<EducationSubmission>,
    pub next_id: AtomicUsize,
}

pub fn folder_url_for(id: &str) -> String {
    format!(
        "https://graph.microsoft.com/v1.0/drives/drive-{}/items/folder-{}",
        id, id
    )
}

impl FakeEducation {
    pub fn calls(&self) -> Vec<DestCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<AttachedResource> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DestCall::PostResource { resource, .. } => Some(resource),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&DestCall) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    fn record(&self, call: DestCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{}", prefix, n)
    }

    fn next_status<T: Copy + Default>(queue: &Mutex<VecDeque<T>>) -> T {
        let mut queue = queue.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap_or_default()
        } else {
            queue.front().copied().unwrap_or_default()
        }
    }
}

#[async_trait]
impl EducationClient for FakeEducation {
    fn ensure_authenticated(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn list_classes(&self) -> Result<Vec<EducationClass>, AppError> {
        Ok(vec![EducationClass {
            id: "class-1".to_string(),
            display_name: "Biology".to_string(),
            description: None,
        }])
    }

    async fn create_assignment(
        &self,
        class_id: &str,
        assignment: &NewAssignment,
    ) -> Result<EducationAssignment, AppError> {
        self.record(DestCall::CreateAssignment {
            class_id: class_id.to_string(),
            assignment: assignment.clone(),
        });
        if self.failing_creates.contains(&assignment.display_name) {
            return Err(AppError::destination_write(
                "createAssignment",
                class_id,
                None,
                AppError::Transient {
                    status: 500,
                    body: "boom".to_string(),
                },
            ));
        }
        let id = self.next_id("assignment");
        Ok(EducationAssignment {
            resources_folder_url: self.preprovisioned_folders.then(|| folder_url_for(&id)),
            id,
            class_id: class_id.to_string(),
            display_name: assignment.display_name.clone(),
            instructions: Some(assignment.instructions.clone()),
            due_date_time: Some(assignment.due_date_time),
            status: AssignmentStatus::Draft,
            grading: assignment.grading.clone(),
        })
    }

    async fn create_module(
        &self,
        class_id: &str,
        display_name: &str,
        description: &str,
    ) -> Result<EducationModule, AppError> {
        self.record(DestCall::CreateModule {
            class_id: class_id.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
        });
        if self.failing_creates.contains(display_name) {
            return Err(AppError::destination_write(
                "createModule",
                class_id,
                None,
                AppError::Transient {
                    status: 500,
                    body: "boom".to_string(),
                },
            ));
        }
        let id = self.next_id("module");
        Ok(EducationModule {
            resources_folder_url: self.preprovisioned_folders.then(|| folder_url_for(&id)),
            id,
            class_id: class_id.to_string(),
            display_name: display_name.to_string(),
            description: Some(description.to_string()),
        })
    }

    async fn setup_resources_folder(
        &self,
        target: &ResourceTarget,
    ) -> Result<ResourceTarget, AppError> {
        self.record(DestCall::SetupFolder {
            kind: target.kind,
            id: target.id.clone(),
        });
        Ok(target.clone().with_resources_folder(folder_url_for(&target.id)))
    }

    async fn post_resource(
        &self,
        target: &ResourceTarget,
        resource: &AttachedResource,
    ) -> Result<PostedResource, AppError> {
        self.record(DestCall::PostResource {
            kind: target.kind,
            target_id: target.id.clone(),
            resource: resource.clone(),
        });
        if self.failing_posts.contains(resource.resource.display_name()) {
            return Err(AppError::destination_write(
                "postResource",
                &target.class_id,
                Some(&target.id),
                AppError::Transient {
                    status: 400,
                    body: "bad resource".to_string(),
                },
            ));
        }
        Ok(PostedResource {
            id: Some(self.next_id("resource")),
            distribute_for_student_work: Some(resource.distribute_for_student_work),
        })
    }

    async fn upload_file(
        &self,
        drive_id: &str,
        item_id: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<DriveItem, AppError> {
        self.record(DestCall::Upload {
            drive_id: drive_id.to_string(),
            item_id: item_id.to_string(),
            file_name: file_name.to_string(),
            size: content.len(),
        });
        if self.failing_uploads.contains(file_name) {
            return Err(AppError::Transient {
                status: 507,
                body: "insufficient storage".to_string(),
            });
        }
        Ok(DriveItem {
            id: self.next_id("item"),
            name: Some(file_name.to_string()),
        })
    }

    async fn get_assignment(
        &self,
        class_id: &str,
        assignment_id: &str,
    ) -> Result<EducationAssignment, AppError> {
        self.record(DestCall::GetAssignment(assignment_id.to_string()));
        Ok(EducationAssignment {
            id: assignment_id.to_string(),
            class_id: class_id.to_string(),
            display_name: "Polled".to_string(),
            instructions: None,
            due_date_time: None,
            status: Self::next_status(&self.assignment_statuses),
            resources_folder_url: None,
            grading: None,
        })
    }

    async fn publish_assignment(
        &self,
        class_id: &str,
        assignment_id: &str,
    ) -> Result<EducationAssignment, AppError> {
        self.record(DestCall::Publish(assignment_id.to_string()));
        Ok(EducationAssignment {
            id: assignment_id.to_string(),
            class_id: class_id.to_string(),
            display_name: "Polled".to_string(),
            instructions: None,
            due_date_time: None,
            status: AssignmentStatus::Published,
            resources_folder_url: None,
            grading: None,
        })
    }

    async fn list_submissions(
        &self,
        _class_id: &str,
        _assignment_id: &str,
    ) -> Result<Vec<EducationSubmission>, AppError> {
        Ok(self.submissions.clone())
    }

    async fn get_submission(
        &self,
        _class_id: &str,
        _assignment_id: &str,
        submission_id: &str,
    ) -> Result<EducationSubmission, AppError> {
        self.record(DestCall::GetSubmission(submission_id.to_string()));
        Ok(EducationSubmission {
            id: submission_id.to_string(),
            status: Self::next_status(&self.submission_statuses),
            submitted_date_time: None,
            returned_date_time: None,
        })
    }

    async fn return_submission(
        &self,
        _class_id: &str,
        _assignment_id: &str,
        submission_id: &str,
    ) -> Result<EducationSubmission, AppError> {
        self.record(DestCall::ReturnSubmission(submission_id.to_string()));
        Ok(EducationSubmission {
            id: submission_id.to_string(),
            status: SubmissionStatus::Submitted,
            submitted_date_time: None,
            returned_date_time: None,
        })
    }
}

pub fn course_work(id: &str, title: &str, materials: Vec<Material>) -> CourseWork {
    CourseWork {
        id: id.to_string(),
        course_id: "course-1".to_string(),
        title: title.to_string(),
        description: None,
        state: "PUBLISHED".to_string(),
        materials,
        due_date: None,
        due_time: None,
        max_points: None,
    }
}

pub fn course_work_material(id: &str, title: &str, materials: Vec<Material>) -> CourseWorkMaterial {
    CourseWorkMaterial {
        id: id.to_string(),
        course_id: "course-1".to_string(),
        title: title.to_string(),
        description: None,
        materials,
    }
}

pub fn drive_file(
    id: &str,
    title: &str,
    mime_type: Option<&str>,
    share_mode: ShareMode,
) -> Material {
    Material::DriveFile(DriveFile {
        id: id.to_string(),
        title: title.to_string(),
        share_mode,
        mime_type: mime_type.map(str::to_string),
    })
}

pub fn youtube_video(alternate_link: &str, title: &str) -> Material {
    Material::YoutubeVideo(YoutubeVideo {
        alternate_link: alternate_link.to_string(),
        title: title.to_string(),
    })
}

pub fn link(url: &str, title: &str) -> Material {
    Material::Link(Link {
        url: url.to_string(),
        title: title.to_string(),
    })
}
