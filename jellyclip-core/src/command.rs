use std::ffi::OsString;
use std::process::Output;

use tokio::process::Command;

/// Runs external media tools. Implementations must not outlive the future
/// returned by [`CommandExecutor::run`]: dropping it terminates the child.
#[async_trait::async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, command: &mut Command) -> std::io::Result<Output>;
}

#[derive(Debug, Default)]
pub struct SystemCommandExecutor;

#[async_trait::async_trait]
impl CommandExecutor for SystemCommandExecutor {
    async fn run(&self, command: &mut Command) -> std::io::Result<Output> {
        command.kill_on_drop(true).output().await
    }
}

/// Renders a command as a single shell-like line for logs and error messages.
pub fn describe(command: &Command) -> String {
    let std = command.as_std();
    let mut parts: Vec<OsString> = vec![std.get_program().to_os_string()];
    parts.extend(std.get_args().map(|arg| arg.to_os_string()));
    parts
        .iter()
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
