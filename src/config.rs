use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::error::{FxStudioError, FxStudioResult};

pub const SETTINGS_FILE_NAME: &str = "fxstudio.settings.json";

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Where new projects are created by default.
    pub projects_dir: PathBuf,
    pub show_start_page: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        let docs = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            projects_dir: docs.join("FX Studio").join("Projects"),
            show_start_page: true,
        }
    }
}

impl EditorSettings {
    /// Reads settings from `path`, writing the defaults there first if the file is missing.
    pub fn load_or_default(path: &Path) -> FxStudioResult<Self> {
        if !path.exists() {
            let settings = Self::default();
            settings.save(path)?;
            return Ok(settings);
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        serde_json::from_str(&text).map_err(|e| {
            FxStudioError::config(format!("invalid settings '{}': {e}", path.display()))
        })
    }

    pub fn save(&self, path: &Path) -> FxStudioResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create '{}'", parent.display()))?;
        }
        let text =
            serde_json::to_string_pretty(self).map_err(|e| FxStudioError::config(e.to_string()))?;
        std::fs::write(path, text).with_context(|| format!("write '{}'", path.display()))?;
        Ok(())
    }

    pub fn ensure_projects_dir(&self) -> FxStudioResult<&Path> {
        std::fs::create_dir_all(&self.projects_dir)
            .with_context(|| format!("create '{}'", self.projects_dir.display()))?;
        Ok(&self.projects_dir)
    }
}
