//! Thunk generator.

use crate::diagnostic::EngineError;
use crate::mutate::{add_named_import_if_absent, add_reexport_if_absent, ModuleRef};
use crate::naming::validate_identifier;
use crate::source::Project;

use super::prompt::{ask_name, Prompter};
use super::templates::generate_thunk;
use super::{ensure_absent, project_module, required, Generator, GeneratorContext};

/// Creates `thunks/<name>.ts` and re-exports it from the thunks barrel.
#[derive(Debug, Clone, Default)]
pub struct CreateThunk {
    pub name: Option<String>,
    /// Reducer whose action types the thunk dispatches; `Some(None)` means
    /// a plain `Dispatch`, `None` asks.
    pub reducer: Option<Option<String>>,
}

impl Generator for CreateThunk {
    fn name(&self) -> &'static str {
        "thunk"
    }

    fn prompt(&mut self, ctx: &mut GeneratorContext, prompter: &mut dyn Prompter) -> Result<(), EngineError> {
        if self.name.is_none() {
            self.name = Some(ask_name(prompter, "Thunk name")?);
        }
        let thunk = ctx.naming().thunk(required(&self.name, "thunk name")?);
        let path = ctx.config().thunks_dir.join(format!("{thunk}.ts"));
        ensure_absent(&Project::new(ctx.root()), path)?;

        if self.reducer.is_none() {
            let has_reducers = !ctx.index()?.reducers.is_empty();
            self.reducer = Some(if has_reducers && prompter.confirm("Type dispatch with a reducer's actions?", true)? {
                Some(ctx.pick_reducer(prompter, "Which reducer?")?)
            } else {
                None
            });
        }
        Ok(())
    }

    fn generate(&self, ctx: &mut GeneratorContext, project: &mut Project) -> Result<(), EngineError> {
        let thunk = ctx.naming().thunk(required(&self.name, "thunk name")?);
        validate_identifier(&thunk)?;
        let thunks_dir = ctx.config().thunks_dir.clone();
        let path = thunks_dir.join(format!("{thunk}.ts"));
        ensure_absent(project, &path)?;

        let actions = match self.reducer.clone().flatten() {
            Some(key) => {
                let entry = ctx.reducer(&key)?;
                Some((ctx.naming().action_types(&entry.key), entry.actions_path()))
            }
            None => None,
        };
        let dispatch_type = match &actions {
            Some((name, _)) => format!("Dispatch<{name}>"),
            None => "Dispatch".to_string(),
        };
        tracing::info!(thunk = %thunk, dispatch = %dispatch_type, "creating thunk");

        let root_reducer = project_module(project, ctx.config().root_reducer_path());
        let actions_module = actions.as_ref().map(|(_, path)| project_module(project, path));
        let file = project.create(&path, generate_thunk(&thunk, &dispatch_type))?;
        add_named_import_if_absent(file, &ModuleRef::package("redux"), "Dispatch")?;
        add_named_import_if_absent(file, &root_reducer, "RootState")?;
        if let (Some((name, _)), Some(module)) = (&actions, &actions_module) {
            add_named_import_if_absent(file, module, name)?;
        }

        let barrel = thunks_dir.join("index.ts");
        let module = project_module(project, &path);
        let index = if project.exists(&barrel) {
            project.open(&barrel)?
        } else {
            project.create_empty(&barrel)?
        };
        add_reexport_if_absent(index, &module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use crate::generate::{execute, run, CreateReducer, ScriptedPrompter};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_thunk_typed_with_reducer_actions() {
        let dir = TempDir::new().unwrap();
        let mut ctx = GeneratorContext::new(dir.path(), ProjectConfig::default());
        let reducer = CreateReducer {
            name: Some("task".to_string()),
            fields: Some(vec![]),
            setters: Some(vec![]),
            actions: Some(vec![]),
        };
        execute(&reducer, &mut ctx).unwrap();

        let thunk = CreateThunk {
            name: Some("fetch tasks".to_string()),
            reducer: Some(Some("task".to_string())),
        };
        let report = execute(&thunk, &mut ctx).unwrap();
        assert_eq!(
            report.created,
            vec![
                PathBuf::from("src/store/thunks/fetchTasks.ts"),
                PathBuf::from("src/store/thunks/index.ts"),
            ]
        );

        let text = fs::read_to_string(dir.path().join("src/store/thunks/fetchTasks.ts")).unwrap();
        assert!(text.contains("import { Dispatch } from 'redux';"));
        assert!(text.contains("import { RootState } from '../reducers';"));
        assert!(text.contains("import { TaskActionTypes } from '../reducers/task/actions';"));
        assert!(text.contains("async (dispatch: Dispatch<TaskActionTypes>, getState: () => RootState) =>"));
        assert_eq!(
            fs::read_to_string(dir.path().join("src/store/thunks/index.ts")).unwrap(),
            "export * from './fetchTasks';\n"
        );
    }

    #[test]
    fn test_prompted_thunks_share_the_barrel() {
        let dir = TempDir::new().unwrap();
        let mut ctx = GeneratorContext::new(dir.path(), ProjectConfig::default());

        let mut prompter = ScriptedPrompter::default().with_text("fetchTasks");
        run(&mut CreateThunk::default(), &mut ctx, &mut prompter).unwrap();
        let mut prompter = ScriptedPrompter::default().with_text("saveTask");
        let report = run(&mut CreateThunk::default(), &mut ctx, &mut prompter).unwrap();
        assert_eq!(report.modified, vec![PathBuf::from("src/store/thunks/index.ts")]);

        let barrel = fs::read_to_string(dir.path().join("src/store/thunks/index.ts")).unwrap();
        assert_eq!(barrel, "export * from './fetchTasks';\nexport * from './saveTask';\n");
        let text = fs::read_to_string(dir.path().join("src/store/thunks/saveTask.ts")).unwrap();
        assert!(text.contains("(dispatch: Dispatch, getState: () => RootState)"));

        let mut prompter = ScriptedPrompter::default().with_text("saveTask");
        let err = run(&mut CreateThunk::default(), &mut ctx, &mut prompter).unwrap_err();
        assert!(matches!(err, EngineError::Conflict { .. }));
    }

    #[test]
    fn test_prompted_thunk_picks_a_reducer() {
        let dir = TempDir::new().unwrap();
        let mut ctx = GeneratorContext::new(dir.path(), ProjectConfig::default());
        let reducer = CreateReducer {
            name: Some("task".to_string()),
            fields: Some(vec![]),
            setters: Some(vec![]),
            actions: Some(vec![]),
        };
        execute(&reducer, &mut ctx).unwrap();

        let mut prompter = ScriptedPrompter::default()
            .with_text("loadTasks")
            .with_confirm(true)
            .with_select(0);
        run(&mut CreateThunk::default(), &mut ctx, &mut prompter).unwrap();
        assert_eq!(prompter.remaining(), 0);

        let text = fs::read_to_string(dir.path().join("src/store/thunks/loadTasks.ts")).unwrap();
        assert!(text.contains("Dispatch<TaskActionTypes>"));
    }
}
