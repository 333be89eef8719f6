/// API route handlers
///
/// - `health`: liveness and database checks
/// - `auth`: signup, login, refresh, invite preview and acceptance
/// - `users`: profile and password management
/// - `projects`: activity feeds and invite creation
/// - `releases`: per-environment release state
/// - `transaction_events`: event code catalogue
/// - `organizations`: project summaries as organizations

pub mod auth;
pub mod health;
pub mod organizations;
pub mod projects;
pub mod releases;
pub mod transaction_events;
pub mod users;

use crate::error::{ApiError, ValidationErrorDetail};

/// Maps validator failures onto the 422 response shape
pub(crate) fn validation_details(errors: validator::ValidationErrors) -> ApiError {
    let details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();

    ApiError::ValidationError(details)
}
