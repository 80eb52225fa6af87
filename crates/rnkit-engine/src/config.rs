//! Project configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diagnostic::EngineError;
use crate::model::ComponentKind;
use crate::naming::NamingRules;

/// File name of the per-project configuration.
pub const CONFIG_FILE: &str = "rnkit.json";

/// Configuration read from `rnkit.json`. Directories are relative to the
/// project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    pub src_dir: PathBuf,

    /// Folder of screen views.
    pub views_dir: PathBuf,

    /// Folder of reusable components.
    pub components_dir: PathBuf,

    pub store_dir: PathBuf,
    pub reducers_dir: PathBuf,
    pub thunks_dir: PathBuf,

    /// Folder of standalone navigators.
    pub navigators_dir: PathBuf,

    pub theme_dir: PathBuf,

    /// Kind offered first when creating a view.
    pub default_component_kind: ComponentKind,

    pub naming: NamingRules,

    /// External formatter run on written files, e.g. `["npx", "prettier", "--write"]`.
    pub formatter: Option<Vec<String>>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("src"),
            views_dir: PathBuf::from("src/views"),
            components_dir: PathBuf::from("src/components"),
            store_dir: PathBuf::from("src/store"),
            reducers_dir: PathBuf::from("src/store/reducers"),
            thunks_dir: PathBuf::from("src/store/thunks"),
            navigators_dir: PathBuf::from("src/navigators"),
            theme_dir: PathBuf::from("src/theme"),
            default_component_kind: ComponentKind::Function,
            naming: NamingRules::default(),
            formatter: None,
        }
    }
}

impl ProjectConfig {
    /// Loads `rnkit.json` from `root`. A missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self, EngineError> {
        let path = root.join(CONFIG_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(EngineError::io(&path, e.to_string())),
        };

        serde_json::from_str(&text).map_err(|e| EngineError::Config {
            path,
            message: e.to_string(),
        })
    }

    /// Module combining all reducers.
    pub fn root_reducer_path(&self) -> PathBuf {
        self.reducers_dir.join("index.ts")
    }
}

/// Walks up from `start` to the nearest directory holding `rnkit.json` or
/// `package.json`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE).is_file() || dir.join("package.json").is_file())
        .map(Path::to_path_buf)
}
