use crate::DomainError;

pub(crate) fn require_non_blank(value: &str, field: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!(
            "{} cannot be null or whitespace",
            field
        )));
    }
    Ok(())
}

/// Lengths are counted in chars, not bytes.
pub(crate) fn require_max_chars(value: &str, max: usize, field: &str) -> Result<(), DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{} cannot exceed {} characters",
            field, max
        )));
    }
    Ok(())
}

pub(crate) fn require_content(value: &str, max: usize) -> Result<(), DomainError> {
    require_non_blank(value, "Content")?;
    require_max_chars(value, max, "Content")
}

pub(crate) fn decrement(count: &mut u32, label: &str) -> Result<(), DomainError> {
    match count.checked_sub(1) {
        Some(next) => {
            *count = next;
            Ok(())
        }
        None => Err(DomainError::state(format!("{} cannot be negative", label))),
    }
}
