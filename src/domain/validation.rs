//! Submit-time checks applied before any write reaches the backend.

use storydesk_api_types::Entity;

use super::error::DomainError;

pub fn ensure_non_empty(value: &str, field: &'static str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("`{field}` must not be empty")));
    }
    Ok(())
}

/// Reject records whose required fields are blank.
pub fn ensure_complete<E: Entity>(entity: &E) -> Result<(), DomainError> {
    let missing = entity.missing_fields();
    if missing.is_empty() {
        return Ok(());
    }
    Err(DomainError::validation(format!(
        "{} is missing required field(s): {}",
        E::LABEL,
        missing.join(", ")
    )))
}

/// Ids typed by a user: trimmed, blanks dropped, first occurrence kept.
pub fn normalize_ids<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for id in ids {
        let id = id.as_ref().trim();
        if !id.is_empty() && !out.iter().any(|seen| seen == id) {
            out.push(id.to_string());
        }
    }
    out
}
