use tracing::info;

use crate::error::AppError;
use crate::graph::EducationClient;
use crate::models::{AssignmentStatus, SubmissionStatus};
use crate::services::poll::{PollOutcome, PollPolicy, poll_until};

/// Publishes a draft assignment and waits for Graph to report it as assigned.
///
/// Publishing is asynchronous on the Graph side; when the ceiling is hit the
/// last status seen is returned instead of an error.
pub async fn publish_assignment(
    client: &dyn EducationClient,
    class_id: &str,
    assignment_id: &str,
    policy: &PollPolicy,
) -> Result<PollOutcome<AssignmentStatus>, AppError> {
    let published = client.publish_assignment(class_id, assignment_id).await?;
    info!(
        "Publish requested for assignment {} (status: {:?})",
        assignment_id, published.status
    );

    let outcome = poll_until(
        policy,
        || async move {
            client
                .get_assignment(class_id, assignment_id)
                .await
                .map(|assignment| assignment.status)
        },
        |status| *status == AssignmentStatus::Assigned,
    )
    .await?;

    info!(
        "Assignment {} status after {} poll(s): {:?}",
        assignment_id, outcome.attempts, outcome.value
    );
    Ok(outcome)
}

/// Returns a submission to the student and waits until it reads as returned.
pub async fn return_submission(
    client: &dyn EducationClient,
    class_id: &str,
    assignment_id: &str,
    submission_id: &str,
    policy: &PollPolicy,
) -> Result<PollOutcome<SubmissionStatus>, AppError> {
    client
        .return_submission(class_id, assignment_id, submission_id)
        .await?;

    wait_for_submission_status(
        client,
        class_id,
        assignment_id,
        submission_id,
        SubmissionStatus::Returned,
        policy,
    )
    .await
}

pub async fn wait_for_submission_status(
    client: &dyn EducationClient,
    class_id: &str,
    assignment_id: &str,
    submission_id: &str,
    expected: SubmissionStatus,
    policy: &PollPolicy,
) -> Result<PollOutcome<SubmissionStatus>, AppError> {
    poll_until(
        policy,
        || async move {
            client
                .get_submission(class_id, assignment_id, submission_id)
                .await
                .map(|submission| submission.status)
        },
        |status| *status == expected,
    )
    .await
}
