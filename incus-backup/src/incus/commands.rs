use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command as AsyncCommand;
use tracing::debug;

use crate::errors::CommandError;

/// Trait for executing commands - allows mocking in tests
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` to completion and return its stdout.
    ///
    /// A non-zero exit status is an error carrying stderr (or stdout when
    /// stderr is empty). There is no timeout.
    async fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError>;
}

/// Runner that spawns real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        let command = render_command(program, args);
        debug!("Running command: {}", command);

        let output = AsyncCommand::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            debug!("Command output: {}", stdout.trim());
            return Ok(stdout);
        }

        let message = if !stderr.trim().is_empty() {
            stderr.trim().to_string()
        } else if !stdout.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            format!("exited with {}", output.status)
        };

        Err(CommandError::Failed { command, message })
    }
}

/// Render a command line for logs and error messages
pub fn render_command(program: &str, args: &[String]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_successful_command_returns_stdout() {
        let output = SystemCommandRunner
            .run("echo", &args(&["hello", "world"]))
            .await
            .unwrap();

        assert_eq!(output.trim(), "hello world");
    }

    #[tokio::test]
    async fn test_failing_command_reports_stderr() {
        let err = SystemCommandRunner
            .run("sh", &args(&["-c", "echo boom >&2; exit 3"]))
            .await
            .unwrap_err();

        match err {
            CommandError::Failed { command, message } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let err = SystemCommandRunner
            .run("incus-backup-no-such-binary", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[test]
    fn test_render_command() {
        assert_eq!(
            render_command("incus", &args(&["snapshot", "delete", "web1", "s1"])),
            "incus snapshot delete web1 s1"
        );
    }
}
