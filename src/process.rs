//! Subprocess execution seam.
//!
//! The archiver and publisher talk to external tools only through
//! [`CommandRunner`], so tests can substitute a mock.

use std::io;
use std::path::Path;
use std::process::{Command, Output};

/// Runs an external command to completion and captures its output.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Run `program` with `args` inside `cwd`.
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<Output>;
}

/// Runs commands on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<Output> {
        Command::new(program).args(args).current_dir(cwd).output()
    }
}

#[cfg(test)]
pub(crate) fn fake_output(code: i32, stdout: &str, stderr: &str) -> Output {
    use std::os::unix::process::ExitStatusExt;

    Output {
        // Raw wait status: exit code lives in the high byte.
        status: std::process::ExitStatus::from_raw(code << 8),
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_system_runner_captures_stdout() {
        let output = SystemRunner
            .run("echo", &["hello".to_string()], Path::new("."))
            .unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }

    #[test]
    fn test_system_runner_uses_working_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker"), "").unwrap();

        let output = SystemRunner.run("ls", &[], temp.path()).unwrap();
        assert!(String::from_utf8_lossy(&output.stdout).contains("marker"));
    }

    #[test]
    fn test_system_runner_missing_program() {
        let err = SystemRunner
            .run("definitely_not_a_real_command_12345", &[], Path::new("."))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_fake_output_status() {
        assert!(fake_output(0, "", "").status.success());
        assert_eq!(fake_output(2, "", "").status.code(), Some(2));
    }
}
