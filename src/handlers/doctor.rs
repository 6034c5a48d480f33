use crate::services::gpu::{self, GpuAccel};
use crate::services::project::ProjectLayout;
use crate::services::python::{self, PythonEnv};
use anyhow::{Context, Result, bail};
use std::env;
use std::path::Path;

/// Reports the health of the checkout and the packaging toolchain.
///
/// Unlike `bundle`, this command never refuses to look at a broken
/// checkout; every problem is reported and the command fails at the end
/// when a required piece is missing.
///
/// # Errors
/// Returns an error when any required check fails.
pub fn run_doctor(project_dir: Option<&Path>) -> Result<()> {
    let layout = match project_dir {
        Some(dir) => ProjectLayout::at(dir)?,
        None => {
            let cwd = env::current_dir().context("Could not determine the current directory")?;
            ProjectLayout::at(&cwd)?
        },
    };

    println!("🧪 Checking the Whisper Fedora toolchain in {layout}...");
    let mut ok = true;

    let required_dirs =
        [(layout.ui_dir(), "ui/ directory"), (layout.models_dir(), "models/ directory")];
    for (path, label) in required_dirs {
        if path.is_dir() {
            println!("✅ {label} present");
        } else {
            println!("❌ {label} is missing");
            ok = false;
        }
    }
    if layout.entry_point().is_file() {
        println!("✅ main.py present");
    } else {
        println!("❌ main.py is missing");
        ok = false;
    }
    if layout.default_icon().is_file() {
        println!("ℹ️ Bundle icon found at packaging/icon.icns");
    } else {
        println!("ℹ️ No bundle icon at packaging/icon.icns (the bundle will use the default)");
    }

    let env = PythonEnv::resolve(env::var_os("VIRTUAL_ENV"), Some(&layout.venv_dir()));
    match &env {
        PythonEnv::ActiveExternal { virtual_env } => {
            println!("✅ Virtual environment active: {}", virtual_env.display());
        },
        PythonEnv::Local { venv_dir } => {
            println!("✅ Project virtual environment at {}", venv_dir.display());
        },
        PythonEnv::System => {
            println!("⚠️ No virtual environment, packaging would use the system toolchain");
        },
    }

    match env.tool_version(python::PYTHON) {
        Some(version) => println!("✅ {version}"),
        None => {
            println!("❌ python3 not found on PATH");
            ok = false;
        },
    }

    match env.tool_version(python::PYINSTALLER) {
        Some(version) => match env.resolve_tool(python::PYINSTALLER) {
            Some(path) => println!("✅ PyInstaller {version} at {}", path.display()),
            None => println!("✅ PyInstaller {version}"),
        },
        None => println!("⚠️ PyInstaller not found (wfpack bundle will install it)"),
    }

    for module in ["pyannote.audio", "torch"] {
        if env.module_available(module) {
            println!("✅ Python module {module} importable");
        } else {
            println!("⚠️ Python module {module} not importable (pip install pyannote.audio torch)");
        }
    }

    let device = gpu::detect();
    match device.accel {
        GpuAccel::Cpu => println!("ℹ️ Compute device: {device}"),
        _ => println!("🚀 Compute device: {device}"),
    }

    if !ok {
        bail!("doctor checks failed");
    }
    println!("✨ Everything the packaging pipeline needs is in place.");
    Ok(())
}
