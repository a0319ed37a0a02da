pub mod course;
pub mod education;
pub mod migration;

pub use course::{
    Course, CourseWork, CourseWorkMaterial, DriveFile, DriveFileMetadata, DueDate, DueTime, Link,
    Material, ShareMode, YoutubeVideo,
};
pub use education::{
    AssignmentStatus, AttachedResource, DriveItem, EducationAssignment, EducationClass,
    EducationModule, EducationResource, EducationSubmission, FileKind, ItemBody, NewAssignment,
    PostedResource, ResourceKind, ResourceTarget, ResourcesFolder, SubmissionStatus, TargetKind,
};
pub use migration::{ItemOutcome, ItemState, MigrationFailure, MigrationReport, MigrationRequest};
