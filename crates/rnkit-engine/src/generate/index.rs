//! Project index: the views, reducers, thunks and navigators a generator can
//! pick from.
//!
//! Building the index parses every view file, so a [`GeneratorContext`]
//! builds it at most once per invocation. It is never written to disk.
//!
//! [`GeneratorContext`]: super::GeneratorContext

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::ProjectConfig;
use crate::diagnostic::EngineError;
use crate::locate::{find_component, find_interface, find_jsx_element, top_level_declarations, declared_name};
use crate::model::{ComponentKind, FieldSpec};
use crate::naming::NamingPolicy;
use crate::source::{NodeKind, Origin, SourceFile};

use super::templates::NavigatorKind;

const VIEW_INDEX_FILES: &[&str] = &["index.tsx", "index.ts", "index.jsx", "index.js"];
const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

/// Which folder a view lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewLocation {
    Screen,
    Component,
}

impl ViewLocation {
    pub fn label(self) -> &'static str {
        match self {
            Self::Screen => "screen",
            Self::Component => "component",
        }
    }

    pub fn dir(self, config: &ProjectConfig) -> &Path {
        match self {
            Self::Screen => &config.views_dir,
            Self::Component => &config.components_dir,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewEntry {
    /// Component name, or the folder name when no component was found.
    pub name: String,
    pub location: ViewLocation,
    /// View folder, relative to the project root.
    pub folder: PathBuf,
    /// The folder's `index` file, relative to the project root.
    pub index: PathBuf,
    pub kind: Option<ComponentKind>,
    pub props_type: Option<String>,
}

impl ViewEntry {
    pub fn props_path(&self) -> PathBuf {
        self.folder.join("props.ts")
    }

    pub fn state_path(&self) -> PathBuf {
        self.folder.join("state.ts")
    }

    pub fn nav_path(&self) -> PathBuf {
        self.folder.join("nav.tsx")
    }

    pub fn label(&self) -> String {
        match self.kind {
            Some(kind) => format!("{} ({} {})", self.name, kind.label(), self.location.label()),
            None => format!("{} ({})", self.name, self.location.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducerEntry {
    /// Folder name and `combineReducers` key.
    pub key: String,
    pub folder: PathBuf,
    /// Fields of the reducer's state interface, in declaration order.
    pub fields: Vec<FieldSpec>,
}

impl ReducerEntry {
    pub fn state_path(&self) -> PathBuf {
        self.folder.join("state.ts")
    }

    pub fn actions_path(&self) -> PathBuf {
        self.folder.join("actions.ts")
    }

    pub fn index_path(&self) -> PathBuf {
        self.folder.join("index.ts")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThunkEntry {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigatorEntry {
    /// Name of the exported navigator component.
    pub name: String,
    pub path: PathBuf,
    pub kind: NavigatorKind,
    pub param_list: Option<String>,
}

/// Everything a generator can target, scanned from the configured folders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectIndex {
    pub views: Vec<ViewEntry>,
    pub reducers: Vec<ReducerEntry>,
    pub thunks: Vec<ThunkEntry>,
    pub navigators: Vec<NavigatorEntry>,
}

impl ProjectIndex {
    /// Scans the project at `root`. Missing folders are empty; files that do
    /// not parse are skipped with a warning.
    pub fn scan(root: &Path, config: &ProjectConfig, naming: &NamingPolicy) -> Result<Self, EngineError> {
        let mut index = Self::default();
        for location in [ViewLocation::Screen, ViewLocation::Component] {
            index.scan_views(root, config, location)?;
        }
        index.scan_reducers(root, config, naming)?;
        index.scan_thunks(root, config)?;
        index.scan_navigators(root, config)?;
        tracing::debug!(
            views = index.views.len(),
            reducers = index.reducers.len(),
            thunks = index.thunks.len(),
            navigators = index.navigators.len(),
            "project indexed"
        );
        Ok(index)
    }

    pub fn view(&self, name: &str) -> Option<&ViewEntry> {
        self.views.iter().find(|v| v.name == name).or_else(|| {
            self.views
                .iter()
                .find(|v| v.folder.file_name().map(|f| f == name).unwrap_or(false))
        })
    }

    pub fn reducer(&self, key: &str) -> Option<&ReducerEntry> {
        self.reducers.iter().find(|r| r.key == key)
    }

    pub fn thunk(&self, name: &str) -> Option<&ThunkEntry> {
        self.thunks.iter().find(|t| t.name == name)
    }

    pub fn navigator(&self, name: &str) -> Option<&NavigatorEntry> {
        self.navigators.iter().find(|n| n.name == name)
    }

    fn scan_views(&mut self, root: &Path, config: &ProjectConfig, location: ViewLocation) -> Result<(), EngineError> {
        let dir = location.dir(config);
        for folder in subfolders(root, dir) {
            let Some(index_file) = VIEW_INDEX_FILES.iter().map(|f| folder.join(f)).find(|p| root.join(p).is_file())
            else {
                continue;
            };
            let folder_name = file_name(&folder);
            let component = match load(root, &index_file)? {
                Some(file) => find_component(&file).ok().flatten(),
                None => None,
            };
            self.views.push(ViewEntry {
                name: component.as_ref().map(|c| c.name.clone()).unwrap_or(folder_name),
                location,
                kind: component.as_ref().map(|c| c.kind),
                props_type: component.and_then(|c| c.props_type),
                folder,
                index: index_file,
            });
        }
        Ok(())
    }

    fn scan_reducers(&mut self, root: &Path, config: &ProjectConfig, naming: &NamingPolicy) -> Result<(), EngineError> {
        for folder in subfolders(root, &config.reducers_dir) {
            if !root.join(&folder).join("index.ts").is_file() {
                continue;
            }
            let key = file_name(&folder);
            let fields = match load(root, &folder.join("state.ts"))? {
                Some(file) => interface_fields(&file, &naming.reducer_state(&key)),
                None => Vec::new(),
            };
            self.reducers.push(ReducerEntry { key, folder, fields });
        }
        Ok(())
    }

    fn scan_thunks(&mut self, root: &Path, config: &ProjectConfig) -> Result<(), EngineError> {
        for path in source_files(root, &config.thunks_dir) {
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };
            if stem != "index" {
                self.thunks.push(ThunkEntry { name: stem, path });
            }
        }
        Ok(())
    }

    fn scan_navigators(&mut self, root: &Path, config: &ProjectConfig) -> Result<(), EngineError> {
        let attached: Vec<PathBuf> = self
            .views
            .iter()
            .map(|v| v.nav_path())
            .filter(|p| root.join(p).is_file())
            .collect();
        for path in source_files(root, &config.navigators_dir).into_iter().chain(attached) {
            let Some(file) = load(root, &path)? else {
                continue;
            };
            if let Some(entry) = navigator_entry(&file, path) {
                self.navigators.push(entry);
            }
        }
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default()
}

/// Immediate subfolders of `dir`, relative to `root`, sorted.
fn subfolders(root: &Path, dir: &Path) -> Vec<PathBuf> {
    let mut folders: Vec<PathBuf> = WalkDir::new(root.join(dir))
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| dir.join(e.file_name()))
        .collect();
    folders.sort();
    folders
}

/// Source files directly inside `dir`, relative to `root`, sorted.
fn source_files(root: &Path, dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(root.join(dir))
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            let extension = e.path().extension().map(|x| x.to_string_lossy().to_string()).unwrap_or_default();
            SOURCE_EXTENSIONS.contains(&extension.as_str()) && !name.ends_with(".d.ts")
        })
        .map(|e| dir.join(e.file_name()))
        .collect()
}

/// Parses `path` for inspection. A missing file is `None`; a file that does
/// not parse is skipped.
fn load(root: &Path, path: &Path) -> Result<Option<SourceFile>, EngineError> {
    let absolute = root.join(path);
    let text = match std::fs::read_to_string(&absolute) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(EngineError::io(&absolute, e.to_string())),
    };
    match SourceFile::parse(absolute, text, Origin::Loaded) {
        Ok(file) => Ok(Some(file)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unparsable file");
            Ok(None)
        }
    }
}

/// Properties of the interface `name` as field specs.
pub fn interface_fields(file: &SourceFile, name: &str) -> Vec<FieldSpec> {
    let src = file.text();
    let Some(body) = find_interface(file, name).and_then(|i| i.child_by_field("body")) else {
        return Vec::new();
    };
    body.children_of_kind(NodeKind::PropertySignature)
        .filter_map(|property| {
            let name = property.child_by_field("name")?.text(src);
            let type_text = property
                .child_by_field("type")
                .and_then(|t| t.significant_children().next())
                .map(|t| t.text(src))
                .unwrap_or("any");
            let field = FieldSpec::new(name, type_text);
            Some(if property.has_token("?") { field.optional() } else { field })
        })
        .collect()
}

fn navigator_entry(file: &SourceFile, path: PathBuf) -> Option<NavigatorEntry> {
    let src = file.text();
    let kind = NavigatorKind::ALL
        .into_iter()
        .find(|k| find_jsx_element(file.root(), src, &k.navigator_tag()).is_some())?;
    let name = file
        .statements()
        .filter(|s| s.kind() == NodeKind::ExportStatement)
        .filter_map(|s| s.child_by_field("declaration"))
        .filter(|d| d.kind() == NodeKind::FunctionDeclaration)
        .find_map(|d| declared_name(d, src))
        .map(str::to_string)
        .unwrap_or_else(|| file_name(&path));
    let param_list = top_level_declarations(file)
        .filter_map(|(_, declaration)| declared_name(declaration, src))
        .find(|n| n.ends_with("ParamList"))
        .map(str::to_string);
    Some(NavigatorEntry {
        name,
        path,
        kind,
        param_list,
    })
}
