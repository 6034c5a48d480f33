use crate::services::process;
use anyhow::{Context, Result};
use log::debug;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Interpreter used for pip and import probes.
pub const PYTHON: &str = "python3";

/// The packaging executable.
pub const PYINSTALLER: &str = "pyinstaller";

/// The Python environment the packaging run executes under.
///
/// "Activation" never touches the parent process: a local virtual
/// environment is expressed as an overlay (`VIRTUAL_ENV` plus a `PATH`
/// prepend) applied to each spawned command, the explicit equivalent of
/// `source .venv/bin/activate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PythonEnv {
    /// A virtual environment was already active when the tool started;
    /// the ambient environment is used untouched.
    ActiveExternal { virtual_env: PathBuf },
    /// The project-local `.venv` will be activated per spawned command.
    Local { venv_dir: PathBuf },
    /// No virtual environment anywhere; the system toolchain is used as-is.
    System,
}

impl PythonEnv {
    /// Picks the environment for a run.
    ///
    /// # Result
    /// `ActiveExternal` when the `VIRTUAL_ENV` marker is set (a local
    /// environment on disk is deliberately ignored then), `Local` when the
    /// project has a `.venv` directory, `System` otherwise.
    #[must_use]
    pub fn resolve(marker: Option<OsString>, local_venv: Option<&Path>) -> Self {
        if let Some(virtual_env) = marker.filter(|value| !value.is_empty()) {
            return Self::ActiveExternal { virtual_env: PathBuf::from(virtual_env) };
        }

        match local_venv {
            Some(venv_dir) if venv_dir.is_dir() => Self::Local { venv_dir: venv_dir.to_path_buf() },
            _ => Self::System,
        }
    }

    /// The environment variables to lay over a spawned command.
    ///
    /// # Result
    /// An empty list for `ActiveExternal`/`System`; for `Local` the
    /// `VIRTUAL_ENV` marker plus a `PATH` with the environment's `bin`
    /// directory prepended to the ambient one.
    ///
    /// # Errors
    /// Returns an error if the rebuilt `PATH` cannot be joined.
    pub fn overlay(&self) -> Result<Vec<(&'static str, OsString)>> {
        self.overlay_with_base(env::var_os("PATH"))
    }

    fn overlay_with_base(
        &self,
        base_path: Option<OsString>,
    ) -> Result<Vec<(&'static str, OsString)>> {
        let Self::Local { venv_dir } = self else {
            return Ok(Vec::new());
        };

        let mut paths = vec![venv_dir.join("bin")];
        if let Some(base) = base_path {
            paths.extend(env::split_paths(&base));
        }
        let path = env::join_paths(paths)
            .context("Could not rebuild PATH for the virtual environment")?;

        Ok(vec![("VIRTUAL_ENV", venv_dir.clone().into_os_string()), ("PATH", path)])
    }

    /// Applies the activation overlay to a command.
    ///
    /// # Errors
    /// Returns an error if the overlay cannot be computed.
    pub fn apply_to_command(&self, cmd: &mut Command) -> Result<()> {
        for (key, value) in self.overlay()? {
            debug!("env overlay: {key}={}", value.to_string_lossy());
            cmd.env(key, value);
        }
        Ok(())
    }

    /// The `PATH` external tools are resolved against under this environment.
    #[must_use]
    pub fn search_path(&self) -> Option<OsString> {
        match self.overlay() {
            Ok(pairs) => pairs
                .into_iter()
                .find(|(key, _)| *key == "PATH")
                .map(|(_, value)| value)
                .or_else(|| env::var_os("PATH")),
            Err(_) => env::var_os("PATH"),
        }
    }

    /// Checks whether `tool` runs under this environment.
    #[must_use]
    pub fn tool_available(&self, tool: &str) -> bool {
        let mut cmd = Command::new(tool);
        cmd.arg("--version").stdout(Stdio::null()).stderr(Stdio::null());
        if self.apply_to_command(&mut cmd).is_err() {
            return false;
        }
        cmd.status().map(|status| status.success()).unwrap_or(false)
    }

    /// First line of `tool --version`, when the tool runs.
    #[must_use]
    pub fn tool_version(&self, tool: &str) -> Option<String> {
        let mut cmd = Command::new(tool);
        cmd.arg("--version");
        self.apply_to_command(&mut cmd).ok()?;
        process::capture_first_line(&mut cmd)
    }

    /// Resolves `tool` to an executable path under this environment's `PATH`.
    #[must_use]
    pub fn resolve_tool(&self, tool: &str) -> Option<PathBuf> {
        let cwd = env::current_dir().ok()?;
        which::which_in(tool, self.search_path(), cwd).ok()
    }

    /// Checks whether `import <module>` succeeds under this environment.
    #[must_use]
    pub fn module_available(&self, module: &str) -> bool {
        let mut cmd = Command::new(PYTHON);
        cmd.arg("-c")
            .arg(format!("import {module}"))
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if self.apply_to_command(&mut cmd).is_err() {
            return false;
        }
        cmd.status().map(|status| status.success()).unwrap_or(false)
    }

    /// Installs PyInstaller with pip under this environment.
    ///
    /// # Errors
    /// Returns an error if the interpreter cannot be spawned or pip exits
    /// with a non-zero status. A failure here is fatal to the pipeline.
    pub fn install_pyinstaller(&self) -> Result<()> {
        let mut cmd = Command::new(PYTHON);
        cmd.args(["-m", "pip", "install", PYINSTALLER]);
        self.apply_to_command(&mut cmd)?;
        debug!("installing {PYINSTALLER} via {PYTHON} -m pip");
        process::run(&mut cmd, "pip install pyinstaller")
    }

    /// One-line description for status output and the dry-run plan.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::ActiveExternal { virtual_env } => {
                format!("already-active virtual environment at {}", virtual_env.display())
            },
            Self::Local { venv_dir } => {
                format!("project virtual environment at {}", venv_dir.display())
            },
            Self::System => "system Python toolchain (no virtual environment)".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venv_on_disk() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let venv = dir.path().join(".venv");
        std::fs::create_dir_all(venv.join("bin")).unwrap();
        (dir, venv)
    }

    #[test]
    fn active_marker_wins_over_a_local_environment() {
        let (_guard, venv) = venv_on_disk();
        let env = PythonEnv::resolve(Some(OsString::from("/elsewhere/venv")), Some(&venv));
        assert_eq!(
            env,
            PythonEnv::ActiveExternal { virtual_env: PathBuf::from("/elsewhere/venv") }
        );
        assert!(env.overlay().unwrap().is_empty(), "ambient environment must be used untouched");
    }

    #[test]
    fn empty_marker_counts_as_unset() {
        let (_guard, venv) = venv_on_disk();
        let env = PythonEnv::resolve(Some(OsString::new()), Some(&venv));
        assert_eq!(env, PythonEnv::Local { venv_dir: venv });
    }

    #[test]
    fn missing_venv_falls_back_to_the_system_toolchain() {
        let dir = tempfile::tempdir().unwrap();
        let env = PythonEnv::resolve(None, Some(&dir.path().join(".venv")));
        assert_eq!(env, PythonEnv::System);
        assert!(env.overlay().unwrap().is_empty());
    }

    #[test]
    fn missing_tool_probe_reports_unavailable() {
        let env = PythonEnv::System;
        assert!(!env.tool_available("wfpack-no-such-tool"));
        assert_eq!(env.tool_version("wfpack-no-such-tool"), None);
    }

    #[cfg(unix)]
    #[test]
    fn venv_tools_resolve_through_the_overlay() {
        use std::os::unix::fs::PermissionsExt;

        let (_guard, venv) = venv_on_disk();
        let tool = venv.join("bin/faketool");
        std::fs::write(&tool, "#!/bin/sh\necho faketool 1.0\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let env = PythonEnv::Local { venv_dir: venv.clone() };
        assert!(env.tool_available("faketool"));
        assert_eq!(env.tool_version("faketool").as_deref(), Some("faketool 1.0"));
        assert_eq!(env.resolve_tool("faketool"), Some(tool));

        assert!(!PythonEnv::System.tool_available("faketool"));
    }

    #[test]
    fn local_overlay_prepends_the_venv_bin_directory() {
        let (_guard, venv) = venv_on_disk();
        let env = PythonEnv::resolve(None, Some(&venv));

        let base = env::join_paths([Path::new("/usr/bin"), Path::new("/bin")]).unwrap();
        let overlay = env.overlay_with_base(Some(base)).unwrap();

        let virtual_env = &overlay.iter().find(|(key, _)| *key == "VIRTUAL_ENV").unwrap().1;
        assert_eq!(PathBuf::from(virtual_env), venv);

        let path = &overlay.iter().find(|(key, _)| *key == "PATH").unwrap().1;
        let entries: Vec<PathBuf> = env::split_paths(path).collect();
        assert_eq!(entries[0], venv.join("bin"));
        assert!(entries.contains(&PathBuf::from("/usr/bin")));
        assert!(entries.contains(&PathBuf::from("/bin")));
    }
}
