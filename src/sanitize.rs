//! Skill name sanitization.
//!
//! Display names come from frontmatter or remote sources and may contain
//! anything: spaces, punctuation, non-ASCII text, or hostile traversal
//! sequences like `../`. [`sanitize`] maps them onto safe directory names.
//!
//! # Rules
//!
//! - lowercase the input
//! - every maximal run of characters outside `[a-z0-9._]` becomes one `-`
//! - leading/trailing runs of `.` and `-` are stripped
//! - the result is truncated to 255 characters
//! - an empty result falls back to [`FALLBACK_NAME`]
//!
//! The function is pure, total, and idempotent.

/// Name used when sanitization produces an empty string.
pub const FALLBACK_NAME: &str = "skill";

/// Maximum length of a sanitized name (most filesystems cap entries at 255).
pub const MAX_SANITIZED_LENGTH: usize = 255;

/// Convert an arbitrary display string into a filesystem-safe directory name.
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for ch in raw.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '.' || ch == '_' {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(ch);
        } else {
            pending_separator = true;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '-');
    let truncated: String = trimmed.chars().take(MAX_SANITIZED_LENGTH).collect();
    // Truncation can re-expose a trailing '.' or '-'.
    let name = truncated.trim_end_matches(|c| c == '.' || c == '-');

    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// A looser slug used only as a reconciliation probe: lowercase the display
/// name, collapse whitespace runs into hyphens, and drop path separators.
///
/// Some tools create skill folders this way, so checking for it tolerates
/// superficial naming drift without a full directory scan.
pub fn simple_slug(display: &str) -> String {
    let mut out = String::with_capacity(display.len());
    let mut pending_hyphen = false;

    for ch in display.to_lowercase().chars() {
        if ch.is_whitespace() {
            pending_hyphen = true;
            continue;
        }
        if ch == '/' || ch == '\\' {
            continue;
        }
        if pending_hyphen && !out.is_empty() {
            out.push('-');
        }
        pending_hyphen = false;
        out.push(ch);
    }

    out
}
