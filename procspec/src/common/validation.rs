//! Validation rules for process names and environment variable keys

/// Maximum process name length, kept short for tables and log file names
pub const MAX_PROCESS_NAME_LEN: usize = 100;

/// Characters that are problematic in log file names derived from a process name
const INVALID_NAME_CHARS: &[char] = &[':', '*', '?', '"', '<', '>', '|', '\0'];

/// Validate process name
/// Ensures the name is usable as an identifier and as part of a log file name.
/// Emptiness is reported separately as a missing field.
pub fn validate_process_name(name: &str) -> Result<(), String> {
    if name == "." || name == ".." {
        return Err("cannot be '.' or '..'".to_string());
    }

    if name.contains('/') || name.contains('\\') {
        return Err("cannot contain path separators (/ or \\)".to_string());
    }

    if let Some(invalid_char) = name.chars().find(|c| INVALID_NAME_CHARS.contains(c)) {
        return Err(format!("cannot contain {:?}", invalid_char));
    }

    if name != name.trim() {
        return Err("cannot have leading or trailing whitespace".to_string());
    }

    if name.chars().any(|c| c.is_control()) {
        return Err("cannot contain control characters".to_string());
    }

    if name.chars().count() > MAX_PROCESS_NAME_LEN {
        return Err(format!(
            "cannot exceed {} characters",
            MAX_PROCESS_NAME_LEN
        ));
    }

    Ok(())
}

/// Validate an environment variable key
pub fn validate_env_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("key cannot be empty".to_string());
    }

    if key.contains('=') {
        return Err("key cannot contain '='".to_string());
    }

    if key.contains('\0') {
        return Err("key cannot contain NUL".to_string());
    }

    Ok(())
}
