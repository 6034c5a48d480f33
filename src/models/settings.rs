//! User Settings Management
//!
//! The desktop application keeps its user settings in
//! `~/.whisper-fedora/config.json`; the toolkit reads and writes the same
//! file so diarization setup done here is picked up by the app. Loading
//! degrades gracefully: a missing or unreadable file yields the defaults,
//! and unknown fields written by newer app versions are ignored.

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_DIR: &str = ".whisper-fedora";
const SETTINGS_FILE: &str = "config.json";

/// User settings shared with the Whisper Fedora desktop application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hugging Face access token for the pyannote diarization models.
    pub hf_token: Option<String>,

    /// Whether speaker diarization is enabled in the app.
    pub diarization_enabled: bool,

    /// Fixed speaker count, or `None` for auto-detection.
    pub default_num_speakers: Option<u32>,

    /// Output directory for batch transcription runs.
    pub batch_output_dir: String,

    /// Whether batch runs export transcripts automatically.
    pub batch_auto_export: bool,

    /// Base URL of the local LM Studio endpoint.
    pub lm_studio_url: String,

    /// UI preference: show timestamps in the transcript view.
    pub show_timestamps: bool,

    /// UI preference: show speaker labels in the transcript view.
    pub show_speaker_labels: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hf_token: None,
            diarization_enabled: false,
            default_num_speakers: None,
            batch_output_dir: String::new(),
            batch_auto_export: true,
            lm_studio_url: "http://localhost:1234/v1".to_owned(),
            show_timestamps: true,
            show_speaker_labels: true,
        }
    }
}

impl Settings {
    /// Loads the settings from the user's home directory.
    ///
    /// # Result
    /// Returns the stored settings, or the defaults when the file is missing
    /// or cannot be parsed (the failure is logged, not surfaced).
    #[must_use]
    pub fn load() -> Self {
        match settings_path() {
            Ok(path) => Self::load_from(&path),
            Err(error) => {
                warn!("could not resolve the settings path: {error}");
                Self::default()
            },
        }
    }

    fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => settings,
                Err(error) => {
                    warn!("failed to parse {}: {error}", path.display());
                    Self::default()
                },
            },
            Err(error) => {
                warn!("failed to read {}: {error}", path.display());
                Self::default()
            },
        }
    }

    /// Saves the settings to the user's home directory, creating it if needed.
    ///
    /// # Result
    /// Returns the path the settings were written to.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be resolved or the file
    /// cannot be written.
    pub fn save(&self) -> Result<PathBuf> {
        let path = settings_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("Settings serialization failed")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Whether a usable Hugging Face token is configured. Implausibly short
    /// values do not count.
    #[must_use]
    pub fn has_hf_token(&self) -> bool {
        self.hf_token.as_deref().is_some_and(|token| token.len() > 10)
    }

    /// A display-safe rendering of the stored token: an 8-character prefix,
    /// or `***` when the token is too short to truncate meaningfully.
    #[must_use]
    pub fn masked_token(&self) -> Option<String> {
        self.hf_token.as_deref().filter(|token| !token.is_empty()).map(|token| {
            if token.chars().count() > 8 {
                let prefix: String = token.chars().take(8).collect();
                format!("{prefix}...")
            } else {
                "***".to_owned()
            }
        })
    }
}

/// Path of the settings file (`~/.whisper-fedora/config.json`).
///
/// # Errors
/// Returns an error if the home directory cannot be determined.
pub fn settings_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine the home directory")?;
    Ok(home.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip_preserves_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut settings = Settings::default();
        settings.hf_token = Some("hf_0123456789abcdef".to_owned());
        settings.diarization_enabled = true;
        settings.default_num_speakers = Some(2);
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.hf_token.as_deref(), Some("hf_0123456789abcdef"));
        assert!(loaded.diarization_enabled);
        assert_eq!(loaded.default_num_speakers, Some(2));
        assert_eq!(loaded.lm_studio_url, "http://localhost:1234/v1");
    }

    #[test]
    fn unknown_and_missing_fields_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"hf_token": "hf_secret", "theme": "dark"}"#).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.hf_token.as_deref(), Some("hf_secret"));
        assert!(loaded.batch_auto_export, "omitted fields fall back to defaults");
    }

    #[test]
    fn corrupt_settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json at all").unwrap();

        let loaded = Settings::load_from(&path);
        assert!(loaded.hf_token.is_none());
        assert!(!loaded.diarization_enabled);
    }

    #[test]
    fn masked_token_shows_only_a_prefix() {
        let mut settings = Settings::default();
        assert_eq!(settings.masked_token(), None);

        settings.hf_token = Some("hf_0123456789abcdef".to_owned());
        assert!(settings.has_hf_token());
        assert_eq!(settings.masked_token().as_deref(), Some("hf_01234..."));

        settings.hf_token = Some("short".to_owned());
        assert!(!settings.has_hf_token(), "implausibly short tokens do not count");
        assert_eq!(settings.masked_token().as_deref(), Some("***"));
    }
}
