//! Structural checks shared by the builders.

use crate::builder::types::TableFilter;
use crate::error_handling::BuildError;

/// Fails when `value` is empty or whitespace.
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), BuildError> {
    if value.trim().is_empty() {
        return Err(BuildError::MissingField(field));
    }
    Ok(())
}

/// Resolves the configured port, falling back to `default`.
pub(crate) fn port(port: Option<i32>, default: u16) -> Result<u16, BuildError> {
    match port {
        None => Ok(default),
        Some(p) => u16::try_from(p)
            .ok()
            .filter(|p| *p != 0)
            .ok_or(BuildError::InvalidPort(p)),
    }
}

/// Rejects empty entries and names present in both lists.
pub(crate) fn filter(filter: &TableFilter, label: &'static str) -> Result<(), BuildError> {
    if filter
        .include
        .iter()
        .chain(filter.exclude.iter())
        .any(|name| name.is_empty())
    {
        return Err(BuildError::EmptyFilterEntry(label));
    }
    if let Some(name) = filter
        .include
        .iter()
        .find(|name| filter.exclude.contains(name))
    {
        return Err(BuildError::ConflictingFilter(name.clone()));
    }
    Ok(())
}
