use anyhow::{Context, Result, bail};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

const UI_DIR: &str = "ui";
const MODELS_DIR: &str = "models";
const ENTRY_POINT: &str = "main.py";
const VENV_DIR: &str = ".venv";
const BUILD_DIR: &str = "build";
const DIST_DIR: &str = "dist";
const DEFAULT_ICON: &str = "packaging/icon.icns";

/// Resolved filesystem layout of a Whisper Fedora checkout.
///
/// All paths are derived from the project root; nothing is read from the
/// process environment and the working directory is never changed.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    /// Wraps an existing directory as the project root, without judging
    /// whether it actually contains the application (`doctor` diagnoses
    /// incomplete checkouts itself).
    ///
    /// # Errors
    /// Returns an error if the directory does not exist.
    pub fn at(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            bail!("Project directory not found: {}", root.display());
        }
        Ok(Self { root: root.to_path_buf() })
    }

    /// Locates the project root: the explicit directory when given,
    /// otherwise the current directory if it holds the expected layout.
    ///
    /// # Errors
    /// Returns an error if the explicit directory does not exist, the
    /// current directory cannot be read, or the current directory does not
    /// look like a Whisper Fedora checkout.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(dir) = explicit {
            return Self::at(dir);
        }

        let cwd = env::current_dir().context("Could not read the current directory")?;
        let layout = Self { root: cwd };
        if layout.looks_like_project() {
            Ok(layout)
        } else {
            bail!(
                "{} does not look like a Whisper Fedora checkout. \
                 Run from the project root or pass --project-dir.",
                layout.root.display()
            )
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn ui_dir(&self) -> PathBuf {
        self.root.join(UI_DIR)
    }

    #[must_use]
    pub fn models_dir(&self) -> PathBuf {
        self.root.join(MODELS_DIR)
    }

    #[must_use]
    pub fn entry_point(&self) -> PathBuf {
        self.root.join(ENTRY_POINT)
    }

    #[must_use]
    pub fn venv_dir(&self) -> PathBuf {
        self.root.join(VENV_DIR)
    }

    #[must_use]
    pub fn build_dir(&self) -> PathBuf {
        self.root.join(BUILD_DIR)
    }

    #[must_use]
    pub fn dist_dir(&self) -> PathBuf {
        self.root.join(DIST_DIR)
    }

    /// Where the bundle icon is expected when none is passed explicitly.
    #[must_use]
    pub fn default_icon(&self) -> PathBuf {
        self.root.join(DEFAULT_ICON)
    }

    /// Whether the directory holds the pieces the packaging run needs.
    #[must_use]
    pub fn looks_like_project(&self) -> bool {
        self.ui_dir().is_dir() && self.models_dir().is_dir() && self.entry_point().is_file()
    }

    /// Verifies the required layout and names everything that is missing.
    ///
    /// # Errors
    /// Returns an error listing the missing entries (`ui/`, `models/`,
    /// `main.py`). The icon and the virtual environment are optional and
    /// not part of this check.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if !self.ui_dir().is_dir() {
            missing.push("ui/");
        }
        if !self.models_dir().is_dir() {
            missing.push("models/");
        }
        if !self.entry_point().is_file() {
            missing.push(ENTRY_POINT);
        }

        if missing.is_empty() {
            Ok(())
        } else {
            bail!(
                "{} is not a usable Whisper Fedora checkout: missing {}",
                self.root.display(),
                missing.join(", ")
            )
        }
    }
}

impl fmt::Display for ProjectLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.display())
    }
}
