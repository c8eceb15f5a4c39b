//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use anyhow::{bail, Context, Result};

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute with inherited stdio and return status only.
    pub fn status(&self) -> Result<ExitStatus> {
        let mut cmd = self.build_command();
        cmd.status()
            .with_context(|| format!("failed to execute `{}`", self.display_command()))
    }

    /// Execute with inherited stdio and require success.
    pub fn status_and_check(&self) -> Result<()> {
        let status = self.status()?;
        if !status.success() {
            match self.cwd {
                Some(ref cwd) => bail!(
                    "`{}` failed with exit code {:?} in {}",
                    self.display_command(),
                    status.code(),
                    cwd.display()
                ),
                None => bail!(
                    "`{}` failed with exit code {:?}",
                    self.display_command(),
                    status.code()
                ),
            }
        }
        Ok(())
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Resolve a package manager command, failing early when it is not installed.
pub fn find_package_manager(manager: &str) -> Result<PathBuf> {
    match find_executable(manager) {
        Some(path) => Ok(path),
        None => bail!("package manager `{}` was not found in PATH", manager),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("npm").arg("install").arg("--no-audit");

        assert_eq!(pb.display_command(), "npm install --no-audit");
    }

    #[cfg(unix)]
    #[test]
    fn test_status_and_check_reports_failure() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = ProcessBuilder::new("false")
            .cwd(tmp.path())
            .status_and_check()
            .unwrap_err();

        assert!(err.to_string().contains("`false` failed"));
    }

    #[cfg(unix)]
    #[test]
    fn test_status_and_check_success() {
        ProcessBuilder::new("true").status_and_check().unwrap();
    }

    #[test]
    fn test_find_package_manager_missing() {
        assert!(find_package_manager("definitely-not-a-package-manager-xyz").is_err());
    }
}
