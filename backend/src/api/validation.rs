//! Shared input validation helpers.
//!
//! Project names become directory names under the data directory, so the
//! path rules for them are defined here once and shared by every handler
//! that accepts one.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{AppError, Result};

/// Return the trimmed value of a required parameter, or a validation error
/// carrying `message` when it is missing or blank.
pub fn require<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(message.to_string())),
    }
}

/// Validate that a project name is usable as a single directory name.
///
/// `label` is used in error messages (e.g. "Project name").
pub fn validate_project_name(name: &str, label: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", label)));
    }
    if name != name.trim() {
        return Err(AppError::Validation(format!(
            "{} must not start or end with whitespace",
            label
        )));
    }
    if name.len() > 100 {
        return Err(AppError::Validation(format!(
            "{} must be at most 100 characters",
            label
        )));
    }
    if name.starts_with('.') || name.contains("..") {
        return Err(AppError::Validation(format!(
            "{} '{}' is not allowed",
            label, name
        )));
    }
    if name
        .chars()
        .any(|c| c == '/' || c == '\\' || c == ':' || c.is_control())
    {
        return Err(AppError::Validation(format!(
            "{} must not contain path separators or control characters",
            label
        )));
    }
    Ok(())
}

/// Parse the date formats the dashboard sends: RFC 3339 timestamps, naive
/// timestamps and plain dates.
fn parse_moment(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Reject ranges whose start is after their end. Values that do not parse
/// are passed through for Azure DevOps to judge.
pub fn validate_date_range(start: &str, end: &str) -> Result<()> {
    if let (Some(s), Some(e)) = (parse_moment(start), parse_moment(end)) {
        if s > e {
            return Err(AppError::Validation(
                "Start date must not be after end date".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Required parameters
    // -----------------------------------------------------------------------

    #[test]
    fn test_require_present() {
        assert_eq!(require(Some(" CHMP "), "missing").unwrap(), "CHMP");
    }

    #[test]
    fn test_require_missing_or_blank() {
        for value in [None, Some(""), Some("   ")] {
            let err = require(value, "Missing start or end date").unwrap_err();
            assert_eq!(
                err.to_string(),
                "Validation error: Missing start or end date"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Project names
    // -----------------------------------------------------------------------

    #[test]
    fn test_allows_plain_names() {
        assert!(validate_project_name("CHMP", "Project name").is_ok());
        assert!(validate_project_name("Onboard Me 2", "Project name").is_ok());
        assert!(validate_project_name("team-a_b.v2", "Project name").is_ok());
    }

    #[test]
    fn test_rejects_blank() {
        assert!(validate_project_name("", "Project name").is_err());
        assert!(validate_project_name("  ", "Project name").is_err());
    }

    #[test]
    fn test_rejects_traversal() {
        assert!(validate_project_name("..", "Project name").is_err());
        assert!(validate_project_name("../etc", "Project name").is_err());
        assert!(validate_project_name("a..b", "Project name").is_err());
        assert!(validate_project_name(".hidden", "Project name").is_err());
    }

    #[test]
    fn test_rejects_separators() {
        assert!(validate_project_name("a/b", "Project name").is_err());
        assert!(validate_project_name("a\\b", "Project name").is_err());
        assert!(validate_project_name("C:", "Project name").is_err());
        assert!(validate_project_name("a\nb", "Project name").is_err());
    }

    #[test]
    fn test_rejects_padded_and_long_names() {
        assert!(validate_project_name(" CHMP", "Project name").is_err());
        assert!(validate_project_name(&"x".repeat(101), "Project name").is_err());
    }

    #[test]
    fn test_label_appears_in_error_message() {
        let err = validate_project_name("a/b", "Project name").unwrap_err();
        assert!(err.to_string().contains("Project name"));
    }

    // -----------------------------------------------------------------------
    // Date ranges
    // -----------------------------------------------------------------------

    #[test]
    fn test_date_range_ordering() {
        assert!(validate_date_range("2024-01-01", "2024-01-31").is_ok());
        assert!(validate_date_range("2024-01-31", "2024-01-31").is_ok());
        assert!(validate_date_range("2024-02-01", "2024-01-31").is_err());
    }

    #[test]
    fn test_date_range_mixed_formats() {
        assert!(validate_date_range("2024-01-01T00:00:00Z", "2024-01-31").is_ok());
        assert!(validate_date_range("2024-01-31T12:00:00", "2024-01-31").is_err());
    }

    #[test]
    fn test_unparseable_dates_pass_through() {
        assert!(validate_date_range("last sprint", "2024-01-01").is_ok());
    }
}
