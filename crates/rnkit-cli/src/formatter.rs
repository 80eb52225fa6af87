//! External formatter run after a commit.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

/// Runs `command` with the written files appended, from the project root.
/// Failures are reported as warnings; generated files are already valid.
pub async fn run(root: &Path, command: &[String], files: &[PathBuf]) {
    let Some((program, args)) = command.split_first() else {
        return;
    };
    if files.is_empty() {
        return;
    }

    let spinner = crate::ui::spinner(&format!("Formatting with {program}..."));
    let result = Command::new(program)
        .args(args)
        .args(files)
        .current_dir(root)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(output) if output.status.success() => {
            tracing::debug!(program, files = files.len(), "formatter finished");
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let first = stderr.lines().next().unwrap_or("no output");
            crate::ui::warning(&format!("{program} exited with {}: {first}", output.status));
        }
        Err(e) => {
            crate::ui::warning(&format!("Could not run {program}: {e}"));
        }
    }
}
