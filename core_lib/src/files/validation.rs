use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

pub const MAX_FILENAME_LENGTH: usize = 255;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File name is empty after sanitization")]
    EmptyName,

    #[error("Filename too long: {length} characters (max: {max_length})")]
    NameTooLong { length: usize, max_length: usize },
}

const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Reduces an untrusted client name to a safe, flat file name.
///
/// Only the last path component survives. Accented letters are decomposed
/// so their ASCII base letter is kept. Whitespace runs become `_`,
/// anything outside `[A-Za-z0-9._-]` is dropped, and leading or trailing
/// dots and underscores are trimmed so the result can never be `.`, `..`
/// or a hidden file. Every entry point of the file manager goes through here.
pub fn sanitize_filename(raw: &str) -> Result<String, ValidationError> {
    let base = base_component(raw);

    let mut collapsed = String::with_capacity(base.len());
    let mut pending_space = false;
    for c in base.nfkd().filter(|c| (c.is_ascii() && !c.is_ascii_control()) || c.is_whitespace()) {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !collapsed.is_empty() {
            collapsed.push('_');
        }
        pending_space = false;
        collapsed.push(c);
    }

    let kept: String = collapsed
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    let mut name = kept.trim_matches(|c: char| c == '.' || c == '_').to_string();

    if cfg!(windows) && is_reserved_name(&name) {
        name.insert(0, '_');
    }

    validate_filename(&name)?;
    Ok(name)
}

/// Returns `true` when `name` is already in sanitized form.
pub fn is_sanitized(name: &str) -> bool {
    matches!(sanitize_filename(name), Ok(ref clean) if clean == name)
}

fn base_component(raw: &str) -> &str {
    raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("")
}

fn is_reserved_name(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or(name).to_uppercase();
    RESERVED_NAMES.contains(&stem.as_str())
}

fn validate_filename(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    if name.len() > MAX_FILENAME_LENGTH {
        return Err(ValidationError::NameTooLong {
            length: name.len(),
            max_length: MAX_FILENAME_LENGTH,
        });
    }

    Ok(())
}
