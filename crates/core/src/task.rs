//! Task vocabulary and the task lifecycle state machine.
//!
//! ```text
//! pending -> published -> claimed -> accepted -> completed
//!               ^            |
//!               +------------+   (rejected or expired offer)
//! pending | published -> cancelled
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::TaskStatus;

/// Maximum length of a task title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length of a free-text confirmation reason.
pub const MAX_REASON_LENGTH: usize = 2_000;

/// Maximum number of required skills on a single task.
pub const MAX_REQUIRED_SKILLS: usize = 16;

/* --------------------------------------------------------------------------
Task type / urgency
-------------------------------------------------------------------------- */

/// Kind of legal work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    DebtCollection,
    ContractReview,
    LegalConsultation,
    LawyerLetter,
}

impl TaskType {
    pub const ALL: [TaskType; 4] = [
        Self::DebtCollection,
        Self::ContractReview,
        Self::LegalConsultation,
        Self::LawyerLetter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DebtCollection => "debt_collection",
            Self::ContractReview => "contract_review",
            Self::LegalConsultation => "legal_consultation",
            Self::LawyerLetter => "lawyer_letter",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid task type '{value}'. Must be one of: {}",
                    Self::ALL.map(Self::as_str).join(", ")
                ))
            })
    }

    /// Whether completing this kind of task yields a document that goes
    /// through the review workflow before dispatch.
    pub fn produces_document(self) -> bool {
        matches!(self, Self::DebtCollection | Self::LawyerLetter)
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How quickly a task should be picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[default]
    Normal,
    High,
    Urgent,
}

impl Urgency {
    pub const ALL: [Urgency; 3] = [Self::Normal, Self::High, Self::Urgent];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|u| u.as_str() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid urgency '{value}'. Must be one of: normal, high, urgent"
                ))
            })
    }
}

/* --------------------------------------------------------------------------
Confirmation
-------------------------------------------------------------------------- */

/// Lawyer's answer to an offered claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmAction {
    Accept,
    Reject,
}

/// How an offer (assignment) was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentResolution {
    Accepted,
    Rejected,
    /// The offer was never confirmed within the offer timeout.
    Expired,
}

impl AssignmentResolution {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }
}

impl From<ConfirmAction> for AssignmentResolution {
    fn from(action: ConfirmAction) -> Self {
        match action {
            ConfirmAction::Accept => Self::Accepted,
            ConfirmAction::Reject => Self::Rejected,
        }
    }
}

/* --------------------------------------------------------------------------
State machine
-------------------------------------------------------------------------- */

/// Statuses that hold a live claim by a lawyer.
pub const HELD_STATUSES: [TaskStatus; 2] = [TaskStatus::Claimed, TaskStatus::Accepted];

/// Returns the statuses reachable from `from` in one step.
pub fn valid_transitions(from: TaskStatus) -> &'static [TaskStatus] {
    match from {
        TaskStatus::Pending => &[TaskStatus::Published, TaskStatus::Cancelled],
        TaskStatus::Published => &[TaskStatus::Claimed, TaskStatus::Cancelled],
        // Back to published on rejection or offer expiry.
        TaskStatus::Claimed => &[TaskStatus::Accepted, TaskStatus::Published],
        TaskStatus::Accepted => &[TaskStatus::Completed],
        TaskStatus::Completed | TaskStatus::Cancelled => &[],
    }
}

pub fn can_transition(from: TaskStatus, to: TaskStatus) -> bool {
    valid_transitions(from).contains(&to)
}

/// Validate a task transition, returning `InvalidState` for illegal ones.
pub fn validate_transition(from: TaskStatus, to: TaskStatus) -> Result<(), CoreError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::InvalidState(format!(
            "task cannot move from {from} to {to}"
        )))
    }
}

pub fn is_terminal(status: TaskStatus) -> bool {
    valid_transitions(status).is_empty()
}

/* --------------------------------------------------------------------------
Validation
-------------------------------------------------------------------------- */

pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Task title must not be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Task title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_amount_cents(amount_cents: i64) -> Result<(), CoreError> {
    if amount_cents < 0 {
        return Err(CoreError::Validation(
            "Task amount must not be negative".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_required_skills(skills: &[String]) -> Result<(), CoreError> {
    if skills.len() > MAX_REQUIRED_SKILLS {
        return Err(CoreError::Validation(format!(
            "A task may require at most {MAX_REQUIRED_SKILLS} skills"
        )));
    }
    if let Some(i) = skills.iter().position(|s| s.trim().is_empty()) {
        return Err(CoreError::Validation(format!(
            "Required skill at index {i} must not be empty"
        )));
    }
    Ok(())
}

pub fn validate_reason(reason: Option<&str>) -> Result<(), CoreError> {
    if reason.is_some_and(|r| r.chars().count() > MAX_REASON_LENGTH) {
        return Err(CoreError::Validation(format!(
            "Reason exceeds maximum length of {MAX_REASON_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_can_be_claimed_or_cancelled() {
        assert!(can_transition(TaskStatus::Published, TaskStatus::Claimed));
        assert!(can_transition(TaskStatus::Published, TaskStatus::Cancelled));
    }

    #[test]
    fn claimed_returns_to_pool_on_rejection() {
        assert!(can_transition(TaskStatus::Claimed, TaskStatus::Published));
        assert!(can_transition(TaskStatus::Claimed, TaskStatus::Accepted));
    }

    #[test]
    fn claimed_cannot_be_cancelled_or_completed() {
        assert!(!can_transition(TaskStatus::Claimed, TaskStatus::Cancelled));
        assert!(!can_transition(TaskStatus::Claimed, TaskStatus::Completed));
    }

    #[test]
    fn pending_cannot_be_claimed_directly() {
        assert!(!can_transition(TaskStatus::Pending, TaskStatus::Claimed));
    }

    #[test]
    fn terminal_statuses_have_no_transitions() {
        assert!(is_terminal(TaskStatus::Completed));
        assert!(is_terminal(TaskStatus::Cancelled));
        assert!(!is_terminal(TaskStatus::Accepted));
    }

    #[test]
    fn validate_transition_reports_both_ends() {
        let err = validate_transition(TaskStatus::Accepted, TaskStatus::Published).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("accepted"));
        assert!(msg.contains("published"));
    }

    #[test]
    fn task_type_parse_roundtrip() {
        for t in TaskType::ALL {
            assert_eq!(TaskType::parse(t.as_str()).unwrap(), t);
        }
        assert!(TaskType::parse("divorce").is_err());
    }

    #[test]
    fn only_letters_and_collections_produce_documents() {
        assert!(TaskType::DebtCollection.produces_document());
        assert!(TaskType::LawyerLetter.produces_document());
        assert!(!TaskType::ContractReview.produces_document());
        assert!(!TaskType::LegalConsultation.produces_document());
    }

    #[test]
    fn urgency_defaults_to_normal() {
        assert_eq!(Urgency::default(), Urgency::Normal);
        assert_eq!(Urgency::parse("urgent").unwrap(), Urgency::Urgent);
        assert!(Urgency::parse("asap").is_err());
    }

    #[test]
    fn confirm_action_maps_to_resolution() {
        assert_eq!(
            AssignmentResolution::from(ConfirmAction::Reject),
            AssignmentResolution::Rejected
        );
        assert_eq!(AssignmentResolution::Expired.as_str(), "expired");
    }

    #[test]
    fn title_validation() {
        assert!(validate_title("Collect invoice 42").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }

    #[test]
    fn negative_amount_rejected() {
        assert!(validate_amount_cents(0).is_ok());
        assert!(validate_amount_cents(-1).is_err());
    }

    #[test]
    fn required_skills_validation() {
        assert!(validate_required_skills(&["civil".into(), "bankruptcy".into()]).is_ok());
        assert!(validate_required_skills(&["".into()]).is_err());
        let many: Vec<String> = (0..=MAX_REQUIRED_SKILLS).map(|i| format!("s{i}")).collect();
        assert!(validate_required_skills(&many).is_err());
    }

    #[test]
    fn long_reason_rejected() {
        assert!(validate_reason(None).is_ok());
        assert!(validate_reason(Some("too busy")).is_ok());
        assert!(validate_reason(Some(&"r".repeat(MAX_REASON_LENGTH + 1))).is_err());
    }
}
