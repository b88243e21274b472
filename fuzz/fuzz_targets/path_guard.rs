#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;

use agent_skills_sync::paths::is_safe;
use agent_skills_sync::sanitize::sanitize;

fuzz_target!(|data: &str| {
    let base = Path::new("/srv/skills");

    // A sanitized name joined onto the base must always stay inside it.
    let joined = base.join(sanitize(data));
    assert!(is_safe(base, &joined));

    // The raw check must never panic, whatever the candidate looks like.
    let _ = is_safe(base, Path::new(data));
});
