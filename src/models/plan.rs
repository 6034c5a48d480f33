use std::ffi::OsString;
use std::path::PathBuf;

/// The fixed packaging configuration for the Whisper Fedora bundle.
///
/// Everything here is static: the application name, the PyInstaller flags,
/// the data directories shipped inside the bundle, and the libraries whose
/// imports PyInstaller cannot discover on its own. The only computed field
/// is the optional icon, filled in after icon detection.
#[derive(Debug, Clone)]
pub struct BundlePlan {
    pub app_name: String,
    pub entry_point: String,
    pub windowed: bool,
    pub icon: Option<PathBuf>,
    pub add_data: Vec<(String, String)>,
    pub collect_all: Vec<String>,
    pub hidden_imports: Vec<String>,
}

impl Default for BundlePlan {
    fn default() -> Self {
        Self {
            app_name: "Whisper Fedora".to_owned(),
            entry_point: "main.py".to_owned(),
            windowed: true,
            icon: None,
            add_data: vec![
                ("ui".to_owned(), "ui".to_owned()),
                ("models".to_owned(), "models".to_owned()),
            ],
            collect_all: vec!["pywhispercpp".to_owned()],
            hidden_imports: vec![
                "pywhispercpp".to_owned(),
                "qdarktheme".to_owned(),
                "PyQt6".to_owned(),
            ],
        }
    }
}

impl BundlePlan {
    /// Renders the full PyInstaller argument list for this plan.
    ///
    /// # Result
    /// Returns the arguments in a stable order: name, windowing mode, icon
    /// (when present), data mappings, collect-all directives, hidden imports,
    /// and finally the entry-point script.
    #[must_use]
    pub fn pyinstaller_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();

        args.push("--name".into());
        args.push(self.app_name.clone().into());

        if self.windowed {
            args.push("--windowed".into());
        }

        if let Some(icon) = &self.icon {
            args.push("--icon".into());
            args.push(icon.clone().into_os_string());
        }

        for (source, dest) in &self.add_data {
            args.push("--add-data".into());
            // PyInstaller uses `:` as the source/destination separator on macOS.
            args.push(format!("{source}:{dest}").into());
        }

        for package in &self.collect_all {
            args.push("--collect-all".into());
            args.push(package.clone().into());
        }

        for module in &self.hidden_imports {
            args.push("--hidden-import".into());
            args.push(module.clone().into());
        }

        args.push(self.entry_point.clone().into());
        args
    }

    /// Name of the descriptor file PyInstaller generates next to the build.
    #[must_use]
    pub fn spec_file_name(&self) -> String {
        format!("{}.spec", self.app_name)
    }

    /// Name of the final bundle inside the distribution directory.
    #[must_use]
    pub fn bundle_file_name(&self) -> String {
        format!("{}.app", self.app_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(plan: &BundlePlan) -> String {
        let args: Vec<String> =
            plan.pyinstaller_args().iter().map(|a| a.to_string_lossy().into_owned()).collect();
        args.join(" ")
    }

    #[test]
    fn default_plan_renders_the_fixed_argument_set() {
        let line = rendered(&BundlePlan::default());
        assert!(line.starts_with("--name Whisper Fedora --windowed"));
        assert!(line.contains("--add-data ui:ui"));
        assert!(line.contains("--add-data models:models"));
        assert!(line.contains("--collect-all pywhispercpp"));
        assert!(line.contains("--hidden-import pywhispercpp"));
        assert!(line.contains("--hidden-import qdarktheme"));
        assert!(line.contains("--hidden-import PyQt6"));
        assert!(line.ends_with("main.py"));
    }

    #[test]
    fn icon_flag_is_present_only_when_an_icon_was_detected() {
        let mut plan = BundlePlan::default();
        assert!(!rendered(&plan).contains("--icon"));

        plan.icon = Some(PathBuf::from("packaging/icon.icns"));
        assert!(rendered(&plan).contains("--icon packaging/icon.icns"));
    }

    #[test]
    fn derived_artifact_names_follow_the_app_name() {
        let plan = BundlePlan::default();
        assert_eq!(plan.spec_file_name(), "Whisper Fedora.spec");
        assert_eq!(plan.bundle_file_name(), "Whisper Fedora.app");
    }
}
