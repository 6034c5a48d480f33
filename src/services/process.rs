use anyhow::{Context, Result, bail};
use log::debug;
use std::process::Command;

/// Renders a command as a shell-like line for logs and the dry-run plan.
#[must_use]
pub fn render(cmd: &Command) -> String {
    let mut line = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        line.push(' ');
        let arg = arg.to_string_lossy();
        if arg.contains(' ') {
            line.push('"');
            line.push_str(&arg);
            line.push('"');
        } else {
            line.push_str(&arg);
        }
    }
    line
}

/// Runs a command to completion with inherited stdio, failing fast.
///
/// # Errors
/// Returns an error if the command cannot be spawned or exits with a
/// non-zero status.
pub fn run(cmd: &mut Command, what: &str) -> Result<()> {
    let line = render(cmd);
    debug!("running: {line}");
    let status = cmd.status().with_context(|| format!("Failed to execute {what}"))?;
    if !status.success() {
        bail!("Command '{line}' failed with status {status}");
    }
    Ok(())
}

/// First line of a command's stdout, when it exits successfully.
#[must_use]
pub fn capture_first_line(cmd: &mut Command) -> Option<String> {
    let output = cmd.output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout.lines().next().map(|line| line.trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_quotes_arguments_with_spaces() {
        let mut cmd = Command::new("pyinstaller");
        cmd.args(["--name", "Whisper Fedora", "--windowed", "main.py"]);
        assert_eq!(render(&cmd), r#"pyinstaller --name "Whisper Fedora" --windowed main.py"#);
    }

    #[test]
    fn run_reports_the_failing_command_line() {
        let mut cmd = Command::new("false");
        let error = run(&mut cmd, "a doomed step").unwrap_err();
        assert!(error.to_string().contains("Command 'false' failed with status"));
    }

    #[test]
    fn run_reports_what_could_not_be_spawned() {
        let mut cmd = Command::new("wfpack-no-such-binary");
        let error = run(&mut cmd, "the probe").unwrap_err();
        assert!(error.to_string().contains("Failed to execute the probe"));
    }
}
