//! Generators: one user-facing action each.
//!
//! A generator runs in two phases:
//!
//! ```text
//!   prompt    ask the Prompter for whatever the request left open
//!      │      (validation happens here, nothing is read for writing yet)
//!      ▼
//!   generate  stage every change in a private Project session
//!      │      (templates for new files, mutators for existing ones)
//!      ▼
//!   commit    normalize and write all dirty files at once
//! ```
//!
//! A failure in either phase leaves the project untouched on disk.

pub mod connect;
pub mod index;
pub mod navigator;
pub mod prompt;
pub mod reducer;
pub mod templates;
pub mod theme;
pub mod thunk;
pub mod view;

use std::path::{Path, PathBuf};

use crate::config::ProjectConfig;
use crate::diagnostic::EngineError;
use crate::mutate::ModuleRef;
use crate::naming::NamingPolicy;
use crate::source::{Origin, Project};

pub use connect::{ConnectView, StoreField};
pub use index::{NavigatorEntry, ProjectIndex, ReducerEntry, ThunkEntry, ViewEntry, ViewLocation};
pub use navigator::{AddNavigatorScreen, CreateNavigator};
pub use prompt::{collect_fields, parse_field, Answer, FieldOutcome, Prompter, ScriptedPrompter};
pub use reducer::{ActionSpec, AddActionTypes, AddReducerState, CreateReducer};
pub use templates::NavigatorKind;
pub use theme::{AddThemeColors, ApplyTheme, InitTheme, ThemeColor};
pub use thunk::CreateThunk;
pub use view::{AddViewProps, AddViewState, CreateView, WrapView};

/// Configuration and per-invocation caches shared by generators.
#[derive(Debug)]
pub struct GeneratorContext {
    root: PathBuf,
    config: ProjectConfig,
    naming: NamingPolicy,
    index: Option<ProjectIndex>,
}

impl GeneratorContext {
    pub fn new(root: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        let naming = NamingPolicy::new(config.naming.clone());
        Self {
            root: root.into(),
            config,
            naming,
            index: None,
        }
    }

    /// Loads `rnkit.json` from `root`.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let root = root.into();
        let config = ProjectConfig::load(&root)?;
        Ok(Self::new(root, config))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn naming(&self) -> &NamingPolicy {
        &self.naming
    }

    /// The project index, scanned on first use.
    pub fn index(&mut self) -> Result<&ProjectIndex, EngineError> {
        if self.index.is_none() {
            self.index = Some(ProjectIndex::scan(&self.root, &self.config, &self.naming)?);
        }
        self.index
            .as_ref()
            .ok_or_else(|| EngineError::validation("project index unavailable"))
    }

    /// Drops the cached index after files were written.
    pub fn invalidate_index(&mut self) {
        self.index = None;
    }

    pub(crate) fn view(&mut self, name: &str) -> Result<ViewEntry, EngineError> {
        let views_dir = self.config.views_dir.clone();
        self.index()?.view(name).cloned().ok_or_else(|| EngineError::DeclarationNotFound {
            what: format!("view {name}"),
            path: views_dir,
        })
    }

    pub(crate) fn reducer(&mut self, key: &str) -> Result<ReducerEntry, EngineError> {
        let reducers_dir = self.config.reducers_dir.clone();
        self.index()?.reducer(key).cloned().ok_or_else(|| EngineError::DeclarationNotFound {
            what: format!("reducer {key}"),
            path: reducers_dir,
        })
    }

    /// Asks for one of the indexed views.
    pub(crate) fn pick_view(&mut self, prompter: &mut dyn Prompter, message: &str) -> Result<String, EngineError> {
        let views = &self.index()?.views;
        if views.is_empty() {
            return Err(EngineError::validation("the project has no views yet"));
        }
        let labels: Vec<String> = views.iter().map(ViewEntry::label).collect();
        let chosen = prompter.select(message, &labels)?;
        Ok(views[chosen].name.clone())
    }

    /// Asks for one of the indexed reducers.
    pub(crate) fn pick_reducer(&mut self, prompter: &mut dyn Prompter, message: &str) -> Result<String, EngineError> {
        let reducers = &self.index()?.reducers;
        if reducers.is_empty() {
            return Err(EngineError::validation("the project has no reducers yet"));
        }
        let labels: Vec<String> = reducers.iter().map(|r| r.key.clone()).collect();
        let chosen = prompter.select(message, &labels)?;
        Ok(reducers[chosen].key.clone())
    }
}

/// Files written by one generator run, relative to the project root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub generator: &'static str,
    pub created: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.modified.is_empty()
    }

    /// Every written file, created ones first.
    pub fn written(&self) -> impl Iterator<Item = &PathBuf> {
        self.created.iter().chain(self.modified.iter())
    }
}

/// One user-facing action.
pub trait Generator {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Fills in whatever the request left open. Runs before any file is
    /// staged; cancelling here changes nothing.
    fn prompt(&mut self, _ctx: &mut GeneratorContext, _prompter: &mut dyn Prompter) -> Result<(), EngineError> {
        Ok(())
    }

    /// Stages every change in `project`. Nothing is written here.
    fn generate(&self, ctx: &mut GeneratorContext, project: &mut Project) -> Result<(), EngineError>;
}

/// Prompts, stages and commits one generator.
pub fn run(
    generator: &mut dyn Generator,
    ctx: &mut GeneratorContext,
    prompter: &mut dyn Prompter,
) -> Result<Report, EngineError> {
    generator.prompt(ctx, prompter)?;
    execute(generator, ctx)
}

/// Stages and commits a generator whose request is complete.
pub fn execute(generator: &dyn Generator, ctx: &mut GeneratorContext) -> Result<Report, EngineError> {
    let span = tracing::info_span!("generate", generator = generator.name());
    let _enter = span.enter();

    let mut project = Project::new(ctx.root());
    generator.generate(ctx, &mut project)?;

    let mut report = Report {
        generator: generator.name(),
        ..Report::default()
    };
    let created: Vec<PathBuf> = project
        .dirty_files()
        .filter(|f| f.origin() == Origin::Created)
        .map(|f| f.path().to_path_buf())
        .collect();
    for path in project.commit()? {
        let relative = project.relative(&path);
        if created.contains(&path) {
            report.created.push(relative);
        } else {
            report.modified.push(relative);
        }
    }
    ctx.invalidate_index();
    tracing::info!(created = report.created.len(), modified = report.modified.len(), "committed");
    Ok(report)
}

/// Module reference to a project file, for import mutators.
pub(crate) fn project_module(project: &Project, path: impl AsRef<Path>) -> ModuleRef {
    ModuleRef::file(project.resolve(path))
}

/// Fails with a conflict when `path` already exists.
pub(crate) fn ensure_absent(project: &Project, path: impl AsRef<Path>) -> Result<(), EngineError> {
    if project.exists(&path) {
        return Err(EngineError::Conflict {
            path: project.relative(path),
        });
    }
    Ok(())
}

/// Value of a required request field, or a validation error naming it.
pub(crate) fn required<'a, T>(value: &'a Option<T>, what: &str) -> Result<&'a T, EngineError> {
    value
        .as_ref()
        .ok_or_else(|| EngineError::validation(format!("{what} is required")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Touch(&'static str);

    impl Generator for Touch {
        fn name(&self) -> &'static str {
            "touch"
        }

        fn generate(&self, _ctx: &mut GeneratorContext, project: &mut Project) -> Result<(), EngineError> {
            project.create(self.0, "export const a = 1;\n")?;
            Ok(())
        }
    }

    struct Failing;

    impl Generator for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn generate(&self, _ctx: &mut GeneratorContext, project: &mut Project) -> Result<(), EngineError> {
            project.create("src/a.ts", "export const a = 1;\n")?;
            Err(EngineError::validation("stop"))
        }
    }

    #[test]
    fn test_execute_reports_created_files() {
        let dir = TempDir::new().unwrap();
        let mut ctx = GeneratorContext::load(dir.path()).unwrap();
        let report = execute(&Touch("src/a.ts"), &mut ctx).unwrap();
        assert_eq!(report.created, vec![PathBuf::from("src/a.ts")]);
        assert!(report.modified.is_empty());
        assert!(dir.path().join("src/a.ts").is_file());

        let err = execute(&Touch("src/a.ts"), &mut ctx).unwrap_err();
        assert!(matches!(err, EngineError::Conflict { .. }));
    }

    #[test]
    fn test_failed_generator_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut ctx = GeneratorContext::load(dir.path()).unwrap();
        assert!(execute(&Failing, &mut ctx).is_err());
        assert!(!dir.path().join("src/a.ts").exists());
    }
}
