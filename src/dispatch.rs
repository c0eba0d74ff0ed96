use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Profile;
use crate::input::HookInput;
use crate::runner::ProcessRunner;

/// Exit code telling the host the linter found issues
pub const ISSUES_EXIT_CODE: u8 = 2;

/// Why a run did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Event carried no file path
    NoPath,
    /// No eligible profile handles the file's extension
    UnmatchedExtension,
    /// Path matched a profile exclude pattern
    Excluded,
    /// File no longer exists (deleted or renamed since the edit)
    Missing,
}

/// Result of one dispatcher run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    /// Linter passed; formatter ran
    Clean { path: String },
    /// Linter exited non-zero; formatter still ran
    Issues {
        path: String,
        tool: String,
        output: String,
    },
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Skipped(_) | Outcome::Clean { .. } => 0,
            Outcome::Issues { .. } => ISSUES_EXIT_CODE,
        }
    }

    /// Text for stderr, only for Issues
    pub fn report(&self) -> Option<String> {
        match self {
            Outcome::Issues { path, tool, output } => {
                let mut report = format!("{} reported issues in {}:\n", tool, path);
                report.push_str(output);
                if !report.ends_with('\n') {
                    report.push('\n');
                }
                Some(report)
            }
            _ => None,
        }
    }
}

/// Spellings of the path tried against exclude patterns
fn exclude_candidates(raw: &str, resolved: &Path, cwd: &Path) -> Vec<String> {
    let mut candidates = vec![raw.to_string()];
    if let Ok(relative) = resolved.strip_prefix(cwd) {
        let relative = relative.to_string_lossy().to_string();
        if relative != raw {
            candidates.push(relative);
        }
    }
    candidates
}

/// Run the fix-then-format pipeline for the file named by a hook event.
///
/// The first profile whose extensions match is used. Only the linter's exit
/// status decides the outcome; the formatter runs regardless and its result
/// is only logged. Errs if the linter cannot be started.
pub fn dispatch<R: ProcessRunner + ?Sized>(
    input: &HookInput,
    profiles: &[&Profile],
    cwd: &Path,
    runner: &R,
) -> Result<Outcome> {
    let Some(raw) = input.file_path() else {
        debug!("no file path in event");
        return Ok(Outcome::Skipped(SkipReason::NoPath));
    };

    let path = Path::new(raw);
    let Some(profile) = profiles.iter().find(|p| p.matches_extension(path)) else {
        debug!(path = raw, "no profile for extension");
        return Ok(Outcome::Skipped(SkipReason::UnmatchedExtension));
    };

    let resolved: PathBuf = cwd.join(path);

    let candidates = exclude_candidates(raw, &resolved, cwd);
    let candidate_refs: Vec<&str> = candidates.iter().map(|c| c.as_str()).collect();
    if profile.is_excluded(&candidate_refs) {
        debug!(path = raw, profile = %profile.name, "path excluded");
        return Ok(Outcome::Skipped(SkipReason::Excluded));
    }

    if !resolved.is_file() {
        debug!(path = %resolved.display(), "file missing, skipping");
        return Ok(Outcome::Skipped(SkipReason::Missing));
    }

    info!(path = raw, profile = %profile.name, "running fix and format");

    let fix = runner
        .run(&profile.fix, path, cwd)
        .with_context(|| format!("Failed to run {}", profile.fix.program))?;
    debug!(tool = %profile.fix.program, code = ?fix.code, "fix finished");

    match runner.run(&profile.format, path, cwd) {
        Ok(format) if format.success() => {
            debug!(tool = %profile.format.program, "format finished");
        }
        Ok(format) => {
            warn!(
                tool = %profile.format.program,
                code = ?format.code,
                output = %format.combined(),
                "format failed, ignoring"
            );
        }
        Err(e) => {
            warn!(tool = %profile.format.program, error = %e, "format could not start, ignoring");
        }
    }

    if fix.success() {
        Ok(Outcome::Clean {
            path: raw.to_string(),
        })
    } else {
        Ok(Outcome::Issues {
            path: raw.to_string(),
            tool: profile.fix.command_line(),
            output: fix.combined(),
        })
    }
}
