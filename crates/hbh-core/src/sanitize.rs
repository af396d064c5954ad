//! Filename sanitization for bundle and book names.
//!
//! The same rule is applied to the bundle name (used as a directory hint) and
//! to every book name (used as a file stem). The result never contains
//! characters that are illegal on common filesystems and is never empty.

/// Placeholder for a book name that sanitizes to nothing.
pub const ITEM_PLACEHOLDER: &str = "sanitized_item";

/// Placeholder for a bundle name that sanitizes to nothing.
pub const BUNDLE_PLACEHOLDER: &str = "Unknown_Bundle";

/// Characters rejected by at least one of Windows, macOS or Linux.
const ILLEGAL: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Sanitizes `name` for use as a filename, substituting `placeholder` when
/// nothing usable remains.
///
/// - Replaces `< > : " / \ | ? *` and control characters with `_`
/// - Collapses runs of whitespace and underscores into a single `_`
/// - Trims leading/trailing `_`, `.` and whitespace
///
/// Total and idempotent: `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize_filename(name: &str, placeholder: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let replacement = if ILLEGAL.contains(&c) || c.is_control() || c.is_whitespace() {
            '_'
        } else {
            c
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c: char| c == '_' || c == '.' || c.is_whitespace());
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Sanitizes a book name; falls back to [`ITEM_PLACEHOLDER`].
pub fn sanitize_item_name(name: &str) -> String {
    sanitize_filename(name, ITEM_PLACEHOLDER)
}

/// Sanitizes a bundle name; falls back to [`BUNDLE_PLACEHOLDER`].
pub fn sanitize_bundle_name(name: &str) -> String {
    sanitize_filename(name, BUNDLE_PLACEHOLDER)
}

/// True if `name` is non-empty and free of illegal and control characters.
pub fn is_filesystem_safe(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| ILLEGAL.contains(&c) || c.is_control())
}
