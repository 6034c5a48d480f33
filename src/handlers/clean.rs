use crate::models::plan::BundlePlan;
use crate::services::project::ProjectLayout;
use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Removes leftover packaging artifacts from the project.
///
/// # Errors
/// Returns an error if the project cannot be located or an artifact exists
/// but cannot be removed.
pub fn run_clean(project_dir: Option<&Path>) -> Result<()> {
    let layout = ProjectLayout::discover(project_dir)?;
    let plan = BundlePlan::default();

    println!("🧹 Cleaning packaging artifacts in {layout}...");
    let removed = remove_build_artifacts(&layout, &plan)?;
    if removed.is_empty() {
        println!("✨ Nothing to remove.");
    } else {
        for path in &removed {
            let shown = path.strip_prefix(layout.root()).unwrap_or(path);
            println!("   removed {}", shown.display());
        }
        println!("✨ Clean.");
    }
    Ok(())
}

/// Deletes the PyInstaller outputs of a previous run, returning what was
/// actually removed. Artifacts that are already absent are skipped.
///
/// # Errors
/// Returns an error if an existing artifact cannot be deleted.
pub fn remove_build_artifacts(layout: &ProjectLayout, plan: &BundlePlan) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    for dir in [layout.build_dir(), layout.dist_dir()] {
        if remove_dir_if_present(&dir)? {
            removed.push(dir);
        }
    }

    let spec_file = layout.root().join(plan.spec_file_name());
    if remove_file_if_present(&spec_file)? {
        removed.push(spec_file);
    }

    Ok(removed)
}

fn remove_dir_if_present(dir: &Path) -> Result<bool> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
        Err(error) => {
            Err(error).with_context(|| format!("Could not remove directory {}", dir.display()))
        },
    }
}

fn remove_file_if_present(file: &Path) -> Result<bool> {
    match fs::remove_file(file) {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
        Err(error) => Err(error).with_context(|| format!("Could not remove {}", file.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaffold() -> (tempfile::TempDir, ProjectLayout) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("ui")).unwrap();
        fs::create_dir_all(dir.path().join("models")).unwrap();
        fs::write(dir.path().join("main.py"), "print('hi')\n").unwrap();
        let layout = ProjectLayout::at(dir.path()).unwrap();
        (dir, layout)
    }

    #[test]
    fn removes_every_stale_artifact() {
        let (_guard, layout) = scaffold();
        let plan = BundlePlan::default();
        fs::create_dir_all(layout.build_dir().join("nested")).unwrap();
        fs::create_dir_all(layout.dist_dir()).unwrap();
        fs::write(layout.root().join(plan.spec_file_name()), "# stale\n").unwrap();

        let removed = remove_build_artifacts(&layout, &plan).unwrap();

        assert_eq!(removed.len(), 3);
        assert!(!layout.build_dir().exists());
        assert!(!layout.dist_dir().exists());
        assert!(!layout.root().join(plan.spec_file_name()).exists());
    }

    #[test]
    fn absent_artifacts_are_not_an_error() {
        let (_guard, layout) = scaffold();
        let plan = BundlePlan::default();

        let removed = remove_build_artifacts(&layout, &plan).unwrap();
        assert!(removed.is_empty());

        // a second pass right after a real one is just as quiet
        fs::create_dir_all(layout.build_dir()).unwrap();
        assert_eq!(remove_build_artifacts(&layout, &plan).unwrap().len(), 1);
        assert!(remove_build_artifacts(&layout, &plan).unwrap().is_empty());
    }
}
