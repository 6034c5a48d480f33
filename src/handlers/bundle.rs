use crate::handlers::clean;
use crate::models::plan::BundlePlan;
use crate::services::process;
use crate::services::project::ProjectLayout;
use crate::services::python::{self, PythonEnv};
use anyhow::{Result, bail};
use log::debug;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Packages the application into a macOS bundle with PyInstaller.
///
/// The previous run's artifacts are removed first and PyInstaller is
/// installed on demand, so a fresh checkout and a dirty one go through the
/// same pipeline.
///
/// # Errors
/// Returns an error as soon as any stage fails: an unusable checkout, a
/// missing explicit icon, a PyInstaller install that does not take, or a
/// packaging run with a non-zero exit.
pub fn run_bundle(project_dir: Option<&Path>, icon: Option<&Path>, dry_run: bool) -> Result<()> {
    let layout = ProjectLayout::discover(project_dir)?;
    layout.validate()?;

    let plan = BundlePlan { icon: resolve_icon(&layout, icon)?, ..BundlePlan::default() };

    println!("📦 Packaging {} for macOS...", plan.app_name);

    let env = PythonEnv::resolve(env::var_os("VIRTUAL_ENV"), Some(&layout.venv_dir()));
    match &env {
        PythonEnv::ActiveExternal { virtual_env } => {
            println!("🐍 Virtual environment already active: {}", virtual_env.display());
        },
        PythonEnv::Local { venv_dir } => {
            println!("🐍 Activating virtual environment at {}", venv_dir.display());
        },
        PythonEnv::System => {
            println!("⚠️ No virtual environment found. Relying on the system Python toolchain.");
        },
    }

    if dry_run {
        print_plan(&layout, &env, &plan);
        return Ok(());
    }

    ensure_pyinstaller(&env)?;

    println!("🧹 Removing stale build artifacts...");
    clean::remove_build_artifacts(&layout, &plan)?;

    println!("🛠️ Running PyInstaller...");
    let mut cmd = pyinstaller_command(&plan);
    cmd.current_dir(layout.root());
    env.apply_to_command(&mut cmd)?;
    process::run(&mut cmd, "PyInstaller")?;

    let bundle = layout.dist_dir().join(plan.bundle_file_name());
    println!("✨ Bundle ready: {}", bundle.display());
    Ok(())
}

/// Picks the icon for the bundle.
///
/// # Result
/// The explicit icon when one was passed, the conventional
/// `packaging/icon.icns` when it exists, `None` otherwise. Paths under the
/// project root come back relative to it, matching the packaging working
/// directory.
///
/// # Errors
/// Returns an error if an explicitly requested icon does not exist.
fn resolve_icon(layout: &ProjectLayout, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    let full = match explicit {
        Some(icon) if icon.is_absolute() => icon.to_path_buf(),
        Some(icon) => layout.root().join(icon),
        None => layout.default_icon(),
    };
    if !full.is_file() {
        if explicit.is_some() {
            bail!("Icon not found: {}", full.display());
        }
        debug!("no icon at {}, bundling without one", full.display());
        return Ok(None);
    }
    let shown = full.strip_prefix(layout.root()).map_or(full.clone(), Path::to_path_buf);
    Ok(Some(shown))
}

fn ensure_pyinstaller(env: &PythonEnv) -> Result<()> {
    if let Some(version) = env.tool_version(python::PYINSTALLER) {
        println!("✅ PyInstaller {version} is available.");
        return Ok(());
    }

    println!("📥 PyInstaller not found. Installing...");
    env.install_pyinstaller()?;
    if !env.tool_available(python::PYINSTALLER) {
        bail!("PyInstaller is still unresolvable after installation");
    }
    println!("✅ PyInstaller installed.");
    Ok(())
}

fn pyinstaller_command(plan: &BundlePlan) -> Command {
    let mut cmd = Command::new(python::PYINSTALLER);
    cmd.args(plan.pyinstaller_args());
    cmd
}

fn print_plan(layout: &ProjectLayout, env: &PythonEnv, plan: &BundlePlan) {
    println!("ℹ️ Dry run, nothing will be executed.");
    println!("   project:      {layout}");
    println!("   environment:  {}", env.describe());
    if let PythonEnv::Local { venv_dir } = env {
        println!("   PATH prepend: {}", venv_dir.join("bin").display());
    }
    println!("   would remove: build/, dist/, {}", plan.spec_file_name());
    println!("   would run:    {}", process::render(&pyinstaller_command(plan)));
    println!("   bundle path:  {}", layout.dist_dir().join(plan.bundle_file_name()).display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scaffold() -> (tempfile::TempDir, ProjectLayout) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("ui")).unwrap();
        fs::create_dir_all(dir.path().join("models")).unwrap();
        fs::write(dir.path().join("main.py"), "print('hi')\n").unwrap();
        let layout = ProjectLayout::at(dir.path()).unwrap();
        (dir, layout)
    }

    #[test]
    fn default_icon_is_picked_up_only_when_present() {
        let (_guard, layout) = scaffold();
        assert_eq!(resolve_icon(&layout, None).unwrap(), None);

        fs::create_dir_all(layout.root().join("packaging")).unwrap();
        fs::write(layout.root().join("packaging/icon.icns"), b"icns").unwrap();
        assert_eq!(
            resolve_icon(&layout, None).unwrap(),
            Some(PathBuf::from("packaging/icon.icns"))
        );
    }

    #[test]
    fn explicit_icon_must_exist() {
        let (_guard, layout) = scaffold();
        let error = resolve_icon(&layout, Some(Path::new("art/app.icns"))).unwrap_err();
        assert!(error.to_string().contains("Icon not found"));

        fs::create_dir_all(layout.root().join("art")).unwrap();
        fs::write(layout.root().join("art/app.icns"), b"icns").unwrap();
        assert_eq!(
            resolve_icon(&layout, Some(Path::new("art/app.icns"))).unwrap(),
            Some(PathBuf::from("art/app.icns"))
        );
    }
}
