use std::io;
use std::path::Path;
use std::process::Command;

use crate::config::ToolSpec;

/// Captured result of one external tool run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, or None if the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !out.is_empty() && !self.stderr.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&self.stderr);
        out
    }
}

/// Runs an external tool against a file
pub trait ProcessRunner {
    /// Err only if the process could not be started
    fn run(&self, tool: &ToolSpec, target: &Path, cwd: &Path) -> io::Result<ToolOutput>;
}

/// Spawns real processes found on PATH
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, tool: &ToolSpec, target: &Path, cwd: &Path) -> io::Result<ToolOutput> {
        let output = Command::new(&tool.program)
            .args(&tool.args)
            .arg(target)
            .current_dir(cwd)
            .output()?;

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
