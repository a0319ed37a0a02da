pub mod file_transfer;
pub mod migration_service;
pub mod poll;
pub mod publishing;
pub mod resource_mapper;

pub use file_transfer::FileTransferAgent;
pub use migration_service::{MigrationConfig, MigrationService};
pub use poll::{PollOutcome, PollPolicy, poll_until};
pub use resource_mapper::{Disposition, FileFormat, FormatRule, ResourceMapper};
