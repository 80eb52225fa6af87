//! Reducer generators.
//!
//! A reducer folder holds three files kept in step by name:
//!
//! ```text
//!   state.ts    export interface TaskState { ... }
//!   actions.ts  export type TaskActionTypes = | { type: 'TASK/SET_TITLE'; payload: string } | ...
//!   index.ts    initialState + taskReducer(state, action: TaskActionTypes): TaskState
//! ```
//!
//! Every state field may get a setter action; custom actions get a case
//! returning the state unchanged.

use std::path::PathBuf;

use crate::diagnostic::EngineError;
use crate::locate::{find_combine_reducers_object, find_variable_object};
use crate::model::{FieldSpec, ObjectProperty};
use crate::mutate::{
    add_default_import_if_absent, append_union_member, insert_case_clauses_before_default,
    merge_object_literal_properties, not_found, render_interface, render_union, set_interface_fields, NewCase,
};
use crate::naming::validate_identifier;
use crate::source::Project;

use super::index::ReducerEntry;
use super::prompt::{ask_name, collect_fields, reason, Prompter};
use super::templates::{generate_reducer, generate_root_reducer};
use super::{ensure_absent, project_module, required, Generator, GeneratorContext};

/// A custom action: `name[:payload type]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpec {
    pub name: String,
    pub payload: Option<String>,
}

impl ActionSpec {
    pub fn new(name: impl Into<String>, payload: Option<&str>) -> Self {
        Self {
            name: name.into(),
            payload: payload.map(str::to_string),
        }
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        let (name, payload) = match text.split_once(':') {
            Some((name, payload)) => (name.trim(), Some(payload.trim()).filter(|p| !p.is_empty())),
            None => (text.trim(), None),
        };
        validate_identifier(name).map_err(reason)?;
        Ok(Self::new(name, payload))
    }
}

/// Names derived for one reducer.
struct ReducerNames {
    key: String,
    folder: PathBuf,
    reducer: String,
    state: String,
    actions: String,
}

impl ReducerNames {
    fn new(ctx: &GeneratorContext, key: &str) -> Self {
        let naming = ctx.naming();
        Self {
            key: key.to_string(),
            folder: ctx.config().reducers_dir.join(key),
            reducer: naming.reducer(key),
            state: naming.reducer_state(key),
            actions: naming.action_types(key),
        }
    }

    fn state_path(&self) -> PathBuf {
        self.folder.join("state.ts")
    }

    fn actions_path(&self) -> PathBuf {
        self.folder.join("actions.ts")
    }

    fn index_path(&self) -> PathBuf {
        self.folder.join("index.ts")
    }
}

/// Creates a reducer folder and registers it in the root reducer.
#[derive(Debug, Clone, Default)]
pub struct CreateReducer {
    pub name: Option<String>,
    pub fields: Option<Vec<FieldSpec>>,
    /// Fields that get a generated setter action.
    pub setters: Option<Vec<String>>,
    pub actions: Option<Vec<ActionSpec>>,
}

impl Generator for CreateReducer {
    fn name(&self) -> &'static str {
        "reducer"
    }

    fn prompt(&mut self, ctx: &mut GeneratorContext, prompter: &mut dyn Prompter) -> Result<(), EngineError> {
        if self.name.is_none() {
            self.name = Some(ask_name(prompter, "Reducer name")?);
        }
        let key = ctx.naming().reducer_key(required(&self.name, "reducer name")?);
        let names = ReducerNames::new(ctx, &key);
        ensure_absent(&Project::new(ctx.root()), &names.folder)?;

        if self.fields.is_none() {
            self.fields = Some(collect_fields(prompter, "State field", &[], true)?);
        }
        if self.setters.is_none() {
            let fields = self.fields.clone().unwrap_or_default();
            self.setters = Some(ask_setters(prompter, &fields)?);
        }
        if self.actions.is_none() {
            self.actions = Some(collect_actions(prompter, &[])?);
        }
        Ok(())
    }

    fn generate(&self, ctx: &mut GeneratorContext, project: &mut Project) -> Result<(), EngineError> {
        let key = ctx.naming().reducer_key(required(&self.name, "reducer name")?);
        validate_identifier(&key)?;
        let names = ReducerNames::new(ctx, &key);
        ensure_absent(project, &names.folder)?;

        let fields = self.fields.clone().unwrap_or_default();
        let setters = select_setters(&fields, self.setters.as_deref().unwrap_or_default())?;
        let actions = self.actions.clone().unwrap_or_default();
        check_initial_values(&fields)?;
        tracing::info!(reducer = %names.reducer, fields = fields.len(), "creating reducer");

        project.create(names.state_path(), render_interface(&names.state, &[], &[]))?;
        project.create(names.actions_path(), render_union(&names.actions, &[]))?;
        project.create(names.index_path(), generate_reducer(&names.reducer, &names.state, &names.actions))?;
        stage_additions(ctx, project, &names, &fields, &setters, &actions)?;
        register(ctx, project, &names)
    }
}

/// Adds state fields, and optionally their setter actions, to a reducer.
#[derive(Debug, Clone, Default)]
pub struct AddReducerState {
    pub reducer: Option<String>,
    pub fields: Option<Vec<FieldSpec>>,
    pub setters: Option<Vec<String>>,
}

impl Generator for AddReducerState {
    fn name(&self) -> &'static str {
        "reducer-state"
    }

    fn prompt(&mut self, ctx: &mut GeneratorContext, prompter: &mut dyn Prompter) -> Result<(), EngineError> {
        if self.reducer.is_none() {
            self.reducer = Some(ctx.pick_reducer(prompter, "Which reducer?")?);
        }
        let entry = ctx.reducer(required(&self.reducer, "reducer")?)?;
        if self.fields.is_none() {
            let taken: Vec<String> = entry.fields.iter().map(|f| f.name.clone()).collect();
            self.fields = Some(collect_fields(prompter, "State field", &taken, true)?);
        }
        if self.setters.is_none() {
            let fields = self.fields.clone().unwrap_or_default();
            self.setters = Some(ask_setters(prompter, &fields)?);
        }
        Ok(())
    }

    fn generate(&self, ctx: &mut GeneratorContext, project: &mut Project) -> Result<(), EngineError> {
        let entry = ctx.reducer(required(&self.reducer, "reducer")?)?;
        let names = ReducerNames::new(ctx, &entry.key);
        let fields = self.fields.clone().unwrap_or_default();
        let setters = select_setters(&fields, self.setters.as_deref().unwrap_or_default())?;
        check_initial_values(&fields)?;
        stage_additions(ctx, project, &names, &fields, &setters, &[])
    }
}

/// Adds setter actions for existing fields and custom actions to a reducer.
/// Selecting nothing is valid and changes nothing.
#[derive(Debug, Clone, Default)]
pub struct AddActionTypes {
    pub reducer: Option<String>,
    pub setters: Option<Vec<String>>,
    pub actions: Option<Vec<ActionSpec>>,
}

impl Generator for AddActionTypes {
    fn name(&self) -> &'static str {
        "actions"
    }

    fn prompt(&mut self, ctx: &mut GeneratorContext, prompter: &mut dyn Prompter) -> Result<(), EngineError> {
        if self.reducer.is_none() {
            self.reducer = Some(ctx.pick_reducer(prompter, "Which reducer?")?);
        }
        let entry = ctx.reducer(required(&self.reducer, "reducer")?)?;
        if self.setters.is_none() {
            self.setters = Some(ask_setters(prompter, &entry.fields)?);
        }
        if self.actions.is_none() {
            self.actions = Some(collect_actions(prompter, &[])?);
        }
        Ok(())
    }

    fn generate(&self, ctx: &mut GeneratorContext, project: &mut Project) -> Result<(), EngineError> {
        let entry: ReducerEntry = ctx.reducer(required(&self.reducer, "reducer")?)?;
        let names = ReducerNames::new(ctx, &entry.key);
        let setters = select_setters(&entry.fields, self.setters.as_deref().unwrap_or_default())?;
        let actions = self.actions.clone().unwrap_or_default();
        if setters.is_empty() && actions.is_empty() {
            tracing::info!(reducer = %names.reducer, "no actions selected");
            return Ok(());
        }
        stage_additions(ctx, project, &names, &[], &setters, &actions)
    }
}

fn ask_setters(prompter: &mut dyn Prompter, fields: &[FieldSpec]) -> Result<Vec<String>, EngineError> {
    if fields.is_empty() {
        return Ok(Vec::new());
    }
    let labels: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();
    let chosen = prompter.multiselect("Generate setter actions for", &labels)?;
    Ok(chosen.into_iter().map(|i| labels[i].clone()).collect())
}

/// Asks for custom actions until an empty answer.
fn collect_actions(prompter: &mut dyn Prompter, taken: &[String]) -> Result<Vec<ActionSpec>, EngineError> {
    let mut actions: Vec<ActionSpec> = Vec::new();
    loop {
        let validate = |text: &str| -> Result<(), String> {
            if text.trim().is_empty() {
                return Ok(());
            }
            let action = ActionSpec::parse(text)?;
            if taken.contains(&action.name) || actions.iter().any(|a| a.name == action.name) {
                return Err(format!("'{}' already exists", action.name));
            }
            Ok(())
        };
        let answer = prompter.input("Custom action", "name:payloadType (empty to finish)", &validate)?;
        if answer.trim().is_empty() {
            return Ok(actions);
        }
        actions.push(ActionSpec::parse(&answer).map_err(EngineError::validation)?);
    }
}

fn select_setters(fields: &[FieldSpec], names: &[String]) -> Result<Vec<FieldSpec>, EngineError> {
    names
        .iter()
        .map(|name| {
            fields
                .iter()
                .find(|f| &f.name == name)
                .cloned()
                .ok_or_else(|| EngineError::validation(format!("'{name}' is not a state field")))
        })
        .collect()
}

fn check_initial_values(fields: &[FieldSpec]) -> Result<(), EngineError> {
    match fields.iter().find(|f| !f.optional && f.initial_value.is_none()) {
        Some(field) => Err(EngineError::MissingInitialValue {
            field: field.name.clone(),
        }),
        None => Ok(()),
    }
}

/// `{ type: 'TASK/SET_TITLE'; payload: string }`
fn action_member(tag: &str, payload: Option<&str>) -> String {
    match payload {
        Some(payload) => format!("{{ type: '{tag}'; payload: {payload} }}"),
        None => format!("{{ type: '{tag}' }}"),
    }
}

/// Stages fields, setter actions and custom actions across the three files.
fn stage_additions(
    ctx: &GeneratorContext,
    project: &mut Project,
    names: &ReducerNames,
    fields: &[FieldSpec],
    setters: &[FieldSpec],
    actions: &[ActionSpec],
) -> Result<(), EngineError> {
    let naming = ctx.naming();
    let mut members = Vec::new();
    let mut cases = Vec::new();
    for field in setters {
        let tag = naming.action_tag(&names.key, &naming.setter_action(&field.name));
        members.push(action_member(&tag, Some(&field.type_text)));
        cases.push(NewCase::new(&tag, format!("return {{ ...state, {}: action.payload }};", field.name)));
    }
    for action in actions {
        let tag = naming.action_tag(&names.key, &action.name);
        members.push(action_member(&tag, action.payload.as_deref()));
        cases.push(NewCase::new(&tag, "return state;"));
    }

    if !fields.is_empty() {
        set_interface_fields(project.open(names.state_path())?, &names.state, fields, false)?;
        let initial: Vec<ObjectProperty> = fields
            .iter()
            .filter_map(|f| f.initial_value.as_ref().map(|v| ObjectProperty::new(&f.name, v)))
            .collect();
        let index = project.open(names.index_path())?;
        let object = find_variable_object(index, "initialState").ok_or_else(|| not_found(index, "initialState object"))?;
        let handle = index.node_ref(object);
        merge_object_literal_properties(index, &handle, &initial)?;
    }
    if !members.is_empty() {
        append_union_member(project.open(names.actions_path())?, &names.actions, &members)?;
        insert_case_clauses_before_default(project.open(names.index_path())?, &cases)?;
    }
    tracing::debug!(
        reducer = %names.reducer,
        fields = fields.len(),
        actions = members.len(),
        "reducer additions staged"
    );
    Ok(())
}

/// Adds the reducer to `combineReducers` in the root reducer, creating the
/// root reducer when the project has none.
fn register(ctx: &GeneratorContext, project: &mut Project, names: &ReducerNames) -> Result<(), EngineError> {
    let root: PathBuf = ctx.config().root_reducer_path();
    if !project.exists(&root) {
        project.create(&root, generate_root_reducer())?;
    }
    let module = project_module(project, names.index_path());
    let file = project.open(&root)?;
    add_default_import_if_absent(file, &module, &names.reducer)?;

    let object = find_combine_reducers_object(file).ok_or_else(|| not_found(file, "combineReducers({ ... }) call"))?;
    let handle = file.node_ref(object);
    merge_object_literal_properties(file, &handle, &[ObjectProperty::new(&names.key, &names.reducer)])?;
    tracing::debug!(root = %root.display(), key = %names.key, "reducer registered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use crate::generate::{execute, run, ScriptedPrompter};
    use std::fs;
    use tempfile::TempDir;

    fn read(dir: &TempDir, path: &str) -> String {
        fs::read_to_string(dir.path().join(path)).unwrap()
    }

    #[test]
    fn test_action_spec_parse() {
        assert_eq!(ActionSpec::parse("anotherAction: string").unwrap(), ActionSpec::new("anotherAction", Some("string")));
        assert_eq!(ActionSpec::parse("reset").unwrap(), ActionSpec::new("reset", None));
        assert!(ActionSpec::parse("bad name").is_err());
    }

    #[test]
    fn test_create_reducer_registers_in_root() {
        let dir = TempDir::new().unwrap();
        let mut ctx = GeneratorContext::new(dir.path(), ProjectConfig::default());
        let generator = CreateReducer {
            name: Some("task".to_string()),
            fields: Some(vec![FieldSpec::new("title", "string").with_initial("''")]),
            setters: Some(vec!["title".to_string()]),
            actions: Some(vec![]),
        };
        let report = execute(&generator, &mut ctx).unwrap();
        assert_eq!(report.created.len(), 4);

        let root = read(&dir, "src/store/reducers/index.ts");
        assert!(root.contains("import taskReducer from './task';"));
        assert!(root.contains("const rootReducer = combineReducers({\n  task: taskReducer,\n});"));
        assert_eq!(
            read(&dir, "src/store/reducers/task/actions.ts"),
            "export type TaskActionTypes = { type: 'TASK/SET_TITLE'; payload: string };\n"
        );

        let second = CreateReducer {
            name: Some("user".to_string()),
            fields: Some(vec![]),
            setters: Some(vec![]),
            actions: Some(vec![]),
        };
        let report = execute(&second, &mut ctx).unwrap();
        assert_eq!(report.modified, vec![PathBuf::from("src/store/reducers/index.ts")]);
        let root = read(&dir, "src/store/reducers/index.ts");
        assert!(root.contains("  task: taskReducer,\n  user: userReducer,\n"));
        assert!(root.contains("import taskReducer from './task';\nimport userReducer from './user';"));
        assert_eq!(read(&dir, "src/store/reducers/user/actions.ts"), "export type UserActionTypes = any;\n");
    }

    #[test]
    fn test_existing_reducer_is_a_conflict() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/store/reducers/task")).unwrap();
        let mut ctx = GeneratorContext::new(dir.path(), ProjectConfig::default());
        let generator = CreateReducer {
            name: Some("task".to_string()),
            ..CreateReducer::default()
        };
        let err = execute(&generator, &mut ctx).unwrap_err();
        assert!(matches!(err, EngineError::Conflict { .. }));
    }

    #[test]
    fn test_required_field_without_initial_value_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut ctx = GeneratorContext::new(dir.path(), ProjectConfig::default());
        let generator = CreateReducer {
            name: Some("task".to_string()),
            fields: Some(vec![FieldSpec::new("title", "string")]),
            ..CreateReducer::default()
        };
        let err = execute(&generator, &mut ctx).unwrap_err();
        assert!(matches!(err, EngineError::MissingInitialValue { .. }));
        assert!(!dir.path().join("src/store").exists());
    }

    #[test]
    fn test_prompted_reducer_and_empty_action_selection() {
        let dir = TempDir::new().unwrap();
        let mut ctx = GeneratorContext::new(dir.path(), ProjectConfig::default());
        let mut prompter = ScriptedPrompter::default()
            .with_text("task")
            .with_text("done:boolean")
            .with_text("done:boolean=false")
            .with_text("")
            .with_multi(Vec::new())
            .with_text("clear")
            .with_text("");
        let mut generator = CreateReducer::default();
        run(&mut generator, &mut ctx, &mut prompter).unwrap();
        assert_eq!(prompter.rejected().len(), 1);
        assert_eq!(
            read(&dir, "src/store/reducers/task/actions.ts"),
            "export type TaskActionTypes = { type: 'TASK/CLEAR' };\n"
        );

        let mut nothing = AddActionTypes {
            reducer: Some("task".to_string()),
            setters: Some(vec![]),
            actions: Some(vec![]),
        };
        let mut prompter = ScriptedPrompter::default();
        let report = run(&mut nothing, &mut ctx, &mut prompter).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_add_action_types_for_existing_fields() {
        let dir = TempDir::new().unwrap();
        let mut ctx = GeneratorContext::new(dir.path(), ProjectConfig::default());
        let create = CreateReducer {
            name: Some("task".to_string()),
            fields: Some(vec![FieldSpec::new("title", "string").with_initial("''")]),
            setters: Some(vec![]),
            actions: Some(vec![]),
        };
        execute(&create, &mut ctx).unwrap();

        let add = AddActionTypes {
            reducer: Some("task".to_string()),
            setters: Some(vec!["title".to_string()]),
            actions: Some(vec![ActionSpec::new("reset", None)]),
        };
        execute(&add, &mut ctx).unwrap();
        let index = read(&dir, "src/store/reducers/task/index.ts");
        assert!(index.contains(
            "    case 'TASK/SET_TITLE':\n      return { ...state, title: action.payload };\n    case 'TASK/RESET':\n      return state;\n    default:\n      return state;\n"
        ));

        let unknown = AddActionTypes {
            reducer: Some("task".to_string()),
            setters: Some(vec!["missing".to_string()]),
            actions: Some(vec![]),
        };
        assert!(matches!(execute(&unknown, &mut ctx).unwrap_err(), EngineError::Validation { .. }));
    }
}
