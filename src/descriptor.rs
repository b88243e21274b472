//! SKILL.md descriptor reading.
//!
//! A canonical entry or a consumer directory counts as a skill only if it
//! carries a parseable descriptor. Anything unreadable is treated as "not a
//! skill" and skipped silently; scans never fail because of one bad file.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

/// The parsed identity of a skill directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillDescriptor {
    pub name: String,
    pub description: String,
}

/// Find the descriptor file in a directory, preferring uppercase `SKILL.md`
/// over lowercase `skill.md`.
pub fn find_skill_md(skill_dir: &Path) -> Option<PathBuf> {
    for name in ["SKILL.md", "skill.md"] {
        let path = skill_dir.join(name);
        if path.is_file() {
            return Some(path);
        }
    }
    None
}

/// Read and parse the descriptor in `skill_dir`.
///
/// Returns `None` when the file is absent, unreadable, or malformed.
pub fn read_descriptor(skill_dir: &Path) -> Option<SkillDescriptor> {
    let path = find_skill_md(skill_dir)?;
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "skipping unreadable descriptor");
            return None;
        }
    };
    parse_descriptor(&content)
}

/// Parse the frontmatter of a SKILL.md document into a descriptor.
pub fn parse_descriptor(content: &str) -> Option<SkillDescriptor> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    if !content.starts_with("---") {
        return None;
    }
    let parts: Vec<&str> = content.splitn(3, "---").collect();
    if parts.len() < 3 {
        return None;
    }

    let parsed: Value = serde_yaml::from_str(parts[1]).ok()?;
    let Value::Mapping(map) = parsed else {
        return None;
    };

    let name = map.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }
    let description = map
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim();

    Some(SkillDescriptor {
        name: name.to_string(),
        description: description.to_string(),
    })
}

/// Render a minimal descriptor document for a skill that arrived without one
/// (e.g. a remote file-map skill). Without it the reconciler could never see
/// the installation.
pub fn render_descriptor(name: &str, description: &str) -> String {
    let mut doc = String::from("---\n");
    doc.push_str(&format!("name: {}\n", yaml_scalar(name)));
    doc.push_str(&format!("description: {}\n", yaml_scalar(description)));
    doc.push_str("---\n");
    doc
}

fn yaml_scalar(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.contains(':')
        || value.contains('#')
        || value.contains('\n')
        || value.starts_with([' ', '\t', '-', '?', '!', '@', '&', '*', '>', '|', '{', '[']);
    if needs_quotes {
        format!(
            "\"{}\"",
            value.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
        )
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn parse_descriptor_valid() {
        let content = "---\nname: my-skill\ndescription: A test skill\n---\n# Title\n";
        let descriptor = parse_descriptor(content).expect("descriptor");
        assert_eq!(descriptor.name, "my-skill");
        assert_eq!(descriptor.description, "A test skill");
    }

    #[test]
    fn parse_descriptor_tolerates_bom_and_missing_description() {
        let content = "\u{feff}---\nname: my-skill\n---\nBody";
        let descriptor = parse_descriptor(content).expect("descriptor");
        assert_eq!(descriptor.name, "my-skill");
        assert_eq!(descriptor.description, "");
    }

    #[test]
    fn parse_descriptor_rejects_malformed() {
        assert!(parse_descriptor("no frontmatter").is_none());
        assert!(parse_descriptor("---\nname: [broken\n---\nBody").is_none());
        assert!(parse_descriptor("---\nname: unclosed\n").is_none());
        assert!(parse_descriptor("---\n- a\n- list\n---\nBody").is_none());
        assert!(parse_descriptor("---\ndescription: nameless\n---\nBody").is_none());
        assert!(parse_descriptor("---\nname: \"  \"\n---\nBody").is_none());
    }

    #[test]
    fn find_skill_md_prefers_uppercase() {
        let tmp = TempDir::new().expect("temp dir");
        fs::write(tmp.path().join("skill.md"), "lower").expect("write");
        fs::write(tmp.path().join("SKILL.md"), "upper").expect("write");
        let found = find_skill_md(tmp.path()).expect("found");
        assert_eq!(found.file_name().unwrap().to_string_lossy(), "SKILL.md");
    }

    #[test]
    fn read_descriptor_absent_is_none() {
        let tmp = TempDir::new().expect("temp dir");
        assert!(read_descriptor(tmp.path()).is_none());
    }

    #[test]
    fn render_descriptor_round_trips() {
        let doc = render_descriptor("my-skill", "Does things: carefully");
        let descriptor = parse_descriptor(&doc).expect("descriptor");
        assert_eq!(descriptor.name, "my-skill");
        assert_eq!(descriptor.description, "Does things: carefully");
    }
}
