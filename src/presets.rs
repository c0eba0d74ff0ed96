use crate::config::{Profile, ToolSpec};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Preset names in the order they are tried when no profile is named
pub const PRESET_NAMES: &[&str] = &["python", "web"];

/// Built-in presets that can be referenced in lintgate.yaml via `presets: ["name"]`
pub static PRESETS: LazyLock<HashMap<&'static str, Profile>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    m.insert(
        "python",
        Profile {
            name: "python".to_string(),
            extensions: vec!["py".to_string()],
            exclude: Vec::new(),
            fix: ToolSpec::new("ruff", &["check", "--fix"]),
            format: ToolSpec::new("black", &[]),
        },
    );

    m.insert(
        "web",
        Profile {
            name: "web".to_string(),
            extensions: vec!["ts".to_string(), "tsx".to_string(), "js".to_string()],
            exclude: Vec::new(),
            fix: ToolSpec::new("npx", &["eslint", "--fix"]),
            format: ToolSpec::new("npx", &["prettier", "--write"]),
        },
    );

    m
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_presets_exist() {
        for name in PRESET_NAMES {
            assert!(PRESETS.contains_key(name), "missing preset {}", name);
        }
        assert_eq!(PRESETS.len(), PRESET_NAMES.len());
    }

    #[test]
    fn test_preset_fields_valid() {
        for (name, profile) in PRESETS.iter() {
            assert_eq!(profile.name, *name);
            assert!(!profile.extensions.is_empty(), "preset {} has no extensions", name);
            assert!(!profile.fix.program.is_empty(), "preset {} has no fix tool", name);
            assert!(
                !profile.format.program.is_empty(),
                "preset {} has no format tool",
                name
            );
        }
    }

    #[test]
    fn test_extension_allow_lists() {
        let python = PRESETS.get("python").unwrap();
        let web = PRESETS.get("web").unwrap();

        assert!(python.matches_extension(Path::new("src/app.py")));
        assert!(!python.matches_extension(Path::new("src/app.ts")));

        for path in ["a.ts", "b.tsx", "c.js"] {
            assert!(web.matches_extension(Path::new(path)), "{}", path);
        }
        assert!(!web.matches_extension(Path::new("foo.py")));

        assert!(!python.matches_extension(Path::new("foo.md")));
        assert!(!web.matches_extension(Path::new("foo.md")));
    }
}
