//! Document review state machine and validation rules.
//!
//! ```text
//! pending -> in_review -> approved -> authorized -> sent
//!                |            |
//!                v            v
//!        modification_requested -> modified -> in_review
//! in_review -> rejected
//! any non-terminal -> cancelled
//! ```

use crate::error::CoreError;
use crate::status::ReviewStatus;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Lowest (least urgent) review priority.
pub const MIN_PRIORITY: i16 = 1;

/// Highest review priority.
pub const MAX_PRIORITY: i16 = 5;

/// Priority used when the creator does not specify one.
pub const DEFAULT_PRIORITY: i16 = 3;

/// Maximum size of a document body, in characters.
pub const MAX_CONTENT_LENGTH: usize = 500_000;

/// Maximum length of a transition comment.
pub const MAX_COMMENT_LENGTH: usize = 10_000;

/// Statuses an auto-approved document is walked through on creation.
pub const AUTO_APPROVE_PATH: [ReviewStatus; 2] = [ReviewStatus::InReview, ReviewStatus::Approved];

/// Statuses that count as outstanding work for the assigned lawyer.
pub const PENDING_REVIEW_STATUSES: [ReviewStatus; 4] = [
    ReviewStatus::Pending,
    ReviewStatus::InReview,
    ReviewStatus::ModificationRequested,
    ReviewStatus::Modified,
];

/* --------------------------------------------------------------------------
Transition table
-------------------------------------------------------------------------- */

/// Returns the statuses reachable from `from` in one step.
pub fn valid_transitions(from: ReviewStatus) -> &'static [ReviewStatus] {
    use ReviewStatus::*;
    match from {
        Pending => &[InReview, Cancelled],
        InReview => &[Approved, Rejected, ModificationRequested, Cancelled],
        Approved => &[Authorized, ModificationRequested, Cancelled],
        ModificationRequested => &[Modified, Cancelled],
        Modified => &[InReview, Cancelled],
        Authorized => &[Sent, Cancelled],
        Rejected => &[Cancelled],
        Sent | Cancelled => &[],
    }
}

pub fn can_transition(from: ReviewStatus, to: ReviewStatus) -> bool {
    valid_transitions(from).contains(&to)
}

pub fn is_terminal(status: ReviewStatus) -> bool {
    valid_transitions(status).is_empty()
}

/// `final_content` is populated exactly in these statuses.
pub fn holds_final_content(status: ReviewStatus) -> bool {
    matches!(status, ReviewStatus::Authorized | ReviewStatus::Sent)
}

/// A signature may be attached while the document has not been authorized
/// and the workflow is still live.
pub fn can_attach_signature(status: ReviewStatus) -> bool {
    !is_terminal(status)
        && !matches!(status, ReviewStatus::Authorized | ReviewStatus::Rejected)
}

/// Facts about the review task that some edges depend on.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionContext<'a> {
    pub comment: Option<&'a str>,
    pub requires_signature: bool,
    pub has_signature: bool,
}

/// Validate a requested transition.
///
/// Checks, in order: the edge exists, a modification request carries a
/// non-empty comment, and authorization has its signature when one is
/// required.
pub fn validate_transition(
    from: ReviewStatus,
    to: ReviewStatus,
    ctx: &TransitionContext<'_>,
) -> Result<(), CoreError> {
    if !can_transition(from, to) {
        return Err(CoreError::IllegalTransition { from, to });
    }

    if to == ReviewStatus::ModificationRequested
        && ctx.comment.is_none_or(|c| c.trim().is_empty())
    {
        return Err(CoreError::MissingComment(to));
    }

    if to == ReviewStatus::Authorized && ctx.requires_signature && !ctx.has_signature {
        return Err(CoreError::InvalidState(
            "document requires a signature before it can be authorized".to_string(),
        ));
    }

    validate_comment(ctx.comment)
}

/* --------------------------------------------------------------------------
Field validation
-------------------------------------------------------------------------- */

pub fn validate_priority(priority: i16) -> Result<(), CoreError> {
    if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
        return Err(CoreError::Validation(format!(
            "Priority must be between {MIN_PRIORITY} and {MAX_PRIORITY}, got {priority}"
        )));
    }
    Ok(())
}

pub fn validate_content(content: &str) -> Result<(), CoreError> {
    if content.trim().is_empty() {
        return Err(CoreError::Validation(
            "Document content must not be empty".to_string(),
        ));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Document content exceeds maximum length of {MAX_CONTENT_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_comment(comment: Option<&str>) -> Result<(), CoreError> {
    if comment.is_some_and(|c| c.chars().count() > MAX_COMMENT_LENGTH) {
        return Err(CoreError::Validation(format!(
            "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// A signature must be a JSON object naming its signer.
pub fn validate_signature(signature: &serde_json::Value) -> Result<(), CoreError> {
    let signer = signature
        .as_object()
        .and_then(|o| o.get("signer_name"))
        .and_then(|v| v.as_str());
    match signer {
        Some(name) if !name.trim().is_empty() => Ok(()),
        _ => Err(CoreError::Validation(
            "Signature must be an object with a non-empty 'signer_name'".to_string(),
        )),
    }
}
