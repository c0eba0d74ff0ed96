use anyhow::{bail, Context, Result};
use glob::{MatchOptions, Pattern};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::presets::{PRESETS, PRESET_NAMES};

const CONFIG_FILENAME: &str = "lintgate.yaml";

/// An external command; the target file path is appended as the last argument
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolSpec {
    pub fn new(program: &str, args: &[&str]) -> Self {
        ToolSpec {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Program and fixed arguments, space separated
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// One stack's extension allow-list and tool pair
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub name: String,
    /// File extensions handled by this profile, with or without the leading dot
    pub extensions: Vec<String>,
    /// Glob patterns for paths to leave alone; `*` stops at `/`, `**` does not
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Auto-fixing linter; its exit status decides the result
    pub fix: ToolSpec,
    /// Formatter; run after the linter, status ignored
    pub format: ToolSpec,
}

impl Profile {
    /// Whether the path's extension is in this profile's allow-list
    pub fn matches_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.') == ext)
    }

    /// Whether any candidate spelling of the path matches an exclude pattern
    pub fn is_excluded(&self, candidates: &[&str]) -> bool {
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::new()
        };
        self.exclude
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .any(|pattern| candidates.iter().any(|c| pattern.matches_with(c, options)))
    }
}

/// Raw configuration structure (as parsed from YAML)
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LintgateConfigRaw {
    /// Built-in preset names to include
    presets: Option<Vec<String>>,
    /// Custom profile definitions
    profiles: Option<Vec<Profile>>,
}

/// Resolved configuration (presets expanded)
#[derive(Debug)]
pub struct LintgateConfig {
    pub profiles: Vec<Profile>,
}

/// Configuration with where it came from
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: LintgateConfig,
    /// Config file path, or None when running on built-in presets
    pub source: Option<PathBuf>,
}

impl LintgateConfig {
    /// All built-in presets, used when no config file exists
    pub fn builtin() -> Self {
        let profiles = PRESET_NAMES
            .iter()
            .filter_map(|name| PRESETS.get(name).cloned())
            .collect();
        LintgateConfig { profiles }
    }

    /// Profiles eligible for a run: the named one only, or all of them in order
    pub fn eligible(&self, name: Option<&str>) -> Result<Vec<&Profile>> {
        match name {
            None => Ok(self.profiles.iter().collect()),
            Some(name) => match self.profiles.iter().find(|p| p.name == name) {
                Some(profile) => Ok(vec![profile]),
                None => {
                    let known: Vec<&str> = self.profiles.iter().map(|p| p.name.as_str()).collect();
                    bail!(
                        "Unknown profile '{}' (available: {})",
                        name,
                        known.join(", ")
                    );
                }
            },
        }
    }
}

/// Resolves preset names to their built-in profiles
fn resolve_presets(preset_names: &[String], config_path: &Path) -> Result<Vec<Profile>> {
    let mut profiles = Vec::new();

    for name in preset_names {
        match PRESETS.get(name.as_str()) {
            Some(profile) => profiles.push(profile.clone()),
            None => bail!(
                "Invalid config at {}: unknown preset '{}' (available: {})",
                config_path.display(),
                name,
                PRESET_NAMES.join(", ")
            ),
        }
    }

    Ok(profiles)
}

fn validate_tool(
    tool: &ToolSpec,
    field: &str,
    profile: &Profile,
    config_path: &Path,
) -> Result<()> {
    if tool.program.trim().is_empty() {
        bail!(
            "Invalid config at {}: profile '{}' missing '{}.program'",
            config_path.display(),
            profile.name,
            field
        );
    }
    Ok(())
}

/// Validates a profile definition
fn validate_profile(profile: &Profile, config_path: &Path) -> Result<()> {
    if profile.name.is_empty() {
        bail!(
            "Invalid config at {}: profile missing 'name'",
            config_path.display()
        );
    }
    if profile.extensions.is_empty() {
        bail!(
            "Invalid config at {}: profile '{}' has no 'extensions'",
            config_path.display(),
            profile.name
        );
    }
    if profile
        .extensions
        .iter()
        .any(|e| e.trim_start_matches('.').is_empty())
    {
        bail!(
            "Invalid config at {}: profile '{}' has an empty extension",
            config_path.display(),
            profile.name
        );
    }
    for pattern in &profile.exclude {
        if let Err(e) = Pattern::new(pattern) {
            bail!(
                "Invalid config at {}: profile '{}' has invalid exclude pattern '{}': {}",
                config_path.display(),
                profile.name,
                pattern,
                e
            );
        }
    }
    validate_tool(&profile.fix, "fix", profile, config_path)?;
    validate_tool(&profile.format, "format", profile, config_path)?;
    Ok(())
}

/// Loads and parses a lintgate.yaml config file.
/// Resolves presets and merges custom profiles over them.
pub fn load_config(config_path: &Path) -> Result<LintgateConfig> {
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

    let parsed: LintgateConfigRaw = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;

    if parsed.presets.is_none() && parsed.profiles.is_none() {
        bail!(
            "Invalid config at {}: no profiles defined (add 'presets' or 'profiles')",
            config_path.display()
        );
    }

    let mut merged = match &parsed.presets {
        Some(presets) => resolve_presets(presets, config_path)?,
        None => Vec::new(),
    };

    let user_profiles = parsed.profiles.unwrap_or_default();

    // Validate user profiles (presets are trusted)
    for (i, profile) in user_profiles.iter().enumerate() {
        validate_profile(profile, config_path)?;
        if user_profiles[..i].iter().any(|p| p.name == profile.name) {
            bail!(
                "Invalid config at {}: duplicate profile '{}'",
                config_path.display(),
                profile.name
            );
        }
    }

    // Custom profiles replace presets of the same name
    for profile in user_profiles {
        match merged.iter_mut().find(|p| p.name == profile.name) {
            Some(existing) => *existing = profile,
            None => merged.push(profile),
        }
    }

    if merged.is_empty() {
        bail!(
            "Invalid config at {}: no profiles defined (add 'presets' or 'profiles')",
            config_path.display()
        );
    }

    Ok(LintgateConfig { profiles: merged })
}

/// Finds the nearest lintgate.yaml by walking up from a directory.
/// A config file that exists but fails to load is an error.
pub fn find_nearest_config(start_dir: &Path) -> Result<Option<LoadedConfig>> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILENAME);

        if config_path.is_file() {
            let config = load_config(&config_path)?;
            return Ok(Some(LoadedConfig {
                config,
                source: Some(config_path),
            }));
        }

        if !current.pop() {
            return Ok(None);
        }
    }
}

/// Loads the nearest config file, falling back to the built-in presets
pub fn load_for_dir(start_dir: &Path) -> Result<LoadedConfig> {
    Ok(find_nearest_config(start_dir)?.unwrap_or_else(|| LoadedConfig {
        config: LintgateConfig::builtin(),
        source: None,
    }))
}
