#![no_main]

use libfuzzer_sys::fuzz_target;

use agent_skills_sync::sanitize::{sanitize, MAX_SANITIZED_LENGTH};

fuzz_target!(|data: &str| {
    let result = sanitize(data);

    assert!(!result.is_empty());
    assert!(result.chars().count() <= MAX_SANITIZED_LENGTH);
    assert!(!result.starts_with('.') && !result.starts_with('-'));
    assert!(!result.ends_with('.') && !result.ends_with('-'));
    assert!(!result.contains('/') && !result.contains('\\'));
    assert!(result
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_' || c == '-'));

    // Idempotence
    assert_eq!(sanitize(&result), result);
});
