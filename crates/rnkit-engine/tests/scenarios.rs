//! End-to-end generator runs against a temporary project.

use std::fs;
use std::path::Path;

use rnkit_engine::format::normalize;
use rnkit_engine::generate::connect::StoreField;
use rnkit_engine::generate::index::interface_fields;
use rnkit_engine::generate::{
    execute, run, ActionSpec, AddReducerState, Answer, ConnectView, CreateReducer, CreateThunk, CreateView,
    GeneratorContext, ScriptedPrompter, ViewLocation,
};
use rnkit_engine::locate::{component_nodes, find_action_type_union, find_decorator_or_hoc, find_dispatch_block};
use rnkit_engine::mutate::{
    add_named_import_if_absent, append_union_member, insert_case_clauses_before_default, set_interface_fields,
    ModuleRef, NewCase,
};
use rnkit_engine::source::{Origin, SourceFile};
use rnkit_engine::{ComponentKind, EngineError, FieldSpec, ProjectConfig};
use tempfile::TempDir;

const REDUCER: &str = "src/store/reducers/task/index.ts";
const STATE: &str = "src/store/reducers/task/state.ts";
const ACTIONS: &str = "src/store/reducers/task/actions.ts";
const VIEW: &str = "src/views/Home/index.tsx";

fn load(root: &Path, path: &str) -> SourceFile {
    let text = fs::read_to_string(root.join(path)).unwrap();
    SourceFile::parse(path, text, Origin::Loaded).unwrap()
}

fn context(dir: &TempDir) -> GeneratorContext {
    GeneratorContext::new(dir.path(), ProjectConfig::default())
}

fn field_names(root: &Path) -> Vec<String> {
    interface_fields(&load(root, STATE), "TaskState")
        .into_iter()
        .map(|f| f.name)
        .collect()
}

fn union_texts(root: &Path) -> Vec<String> {
    find_action_type_union(&load(root, ACTIONS), "TaskActionTypes")
        .unwrap()
        .members
        .into_iter()
        .map(|m| m.text)
        .collect()
}

fn scenario_a(ctx: &mut GeneratorContext) {
    let generator = CreateReducer {
        name: Some("task".to_string()),
        fields: Some(vec![
            FieldSpec::new("state1", "string").with_initial("''"),
            FieldSpec::new("state2", "number").with_initial("0"),
        ]),
        setters: Some(vec!["state1".to_string(), "state2".to_string()]),
        actions: Some(vec![ActionSpec::new("anotherAction", Some("string"))]),
    };
    execute(&generator, ctx).unwrap();
}

#[test]
fn test_scenario_a_reducer_with_setters_and_custom_action() {
    let dir = TempDir::new().unwrap();
    let mut ctx = context(&dir);
    scenario_a(&mut ctx);

    assert_eq!(field_names(dir.path()), vec!["state1", "state2"]);

    let union = find_action_type_union(&load(dir.path(), ACTIONS), "TaskActionTypes").unwrap();
    assert!(!union.is_sentinel);
    let tags: Vec<&str> = union.tags().collect();
    assert_eq!(tags, vec!["TASK/SET_STATE_1", "TASK/SET_STATE_2", "TASK/ANOTHER_ACTION"]);

    let block = find_dispatch_block(&load(dir.path(), REDUCER)).unwrap();
    let tests: Vec<Option<&str>> = block.clauses.iter().map(|c| c.test.as_deref()).collect();
    assert_eq!(
        tests,
        vec![
            Some("TASK/SET_STATE_1"),
            Some("TASK/SET_STATE_2"),
            Some("TASK/ANOTHER_ACTION"),
            None,
        ]
    );

    let reducer = fs::read_to_string(dir.path().join(REDUCER)).unwrap();
    assert!(reducer.contains("const initialState: TaskState = {\n  state1: '',\n  state2: 0,\n};"));
}

#[test]
fn test_scenario_b_add_state_keeps_existing_members() {
    let dir = TempDir::new().unwrap();
    let mut ctx = context(&dir);
    scenario_a(&mut ctx);
    let members_before = union_texts(dir.path());
    let clauses_before = find_dispatch_block(&load(dir.path(), REDUCER)).unwrap().clauses;

    let generator = AddReducerState {
        reducer: Some("task".to_string()),
        fields: Some(vec![
            FieldSpec::new("state3", "any").with_initial("10"),
            FieldSpec::new("state4", "number").with_initial("333"),
        ]),
        setters: Some(vec!["state3".to_string(), "state4".to_string()]),
    };
    let report = execute(&generator, &mut ctx).unwrap();
    assert!(report.created.is_empty());
    assert_eq!(report.modified.len(), 3);

    assert_eq!(field_names(dir.path()), vec!["state1", "state2", "state3", "state4"]);
    let members_after = union_texts(dir.path());
    assert_eq!(members_after.len(), 5);
    assert_eq!(members_after[..3], members_before[..]);

    let block = find_dispatch_block(&load(dir.path(), REDUCER)).unwrap();
    assert_eq!(block.cases().count(), 5);
    assert_eq!(block.default_count(), 1);
    assert!(block.clauses.last().unwrap().is_default());
    assert_eq!(block.clauses[..3], clauses_before[..3]);
}

#[test]
fn test_scenario_c_connect_class_view_twice() {
    let dir = TempDir::new().unwrap();
    let mut ctx = context(&dir);
    scenario_a(&mut ctx);
    execute(
        &CreateThunk {
            name: Some("fetchTasks".to_string()),
            reducer: Some(Some("task".to_string())),
        },
        &mut ctx,
    )
    .unwrap();
    execute(
        &CreateView {
            name: Some("Home".to_string()),
            kind: Some(ComponentKind::Class),
            location: Some(ViewLocation::Screen),
            props: Some(vec![]),
            state: Some(vec![]),
            navigator: Some(None),
        },
        &mut ctx,
    )
    .unwrap();

    let field = |name: &str| StoreField {
        reducer: "task".to_string(),
        field: FieldSpec::new(name, "string"),
    };
    let first = ConnectView {
        view: Some("Home".to_string()),
        fields: Some(vec![field("state1")]),
        thunks: Some(vec!["fetchTasks".to_string()]),
    };
    execute(&first, &mut ctx).unwrap();

    let file = load(dir.path(), VIEW);
    let nodes = component_nodes(&file).unwrap().unwrap();
    let call = find_decorator_or_hoc(&file, &nodes, "connect").unwrap();
    assert_eq!(call.arguments.len(), 2);
    assert_eq!(call.type_arguments, vec!["HomeStateProps", "HomeDispatchProps"]);
    assert_eq!(file.text().matches("@connect").count(), 1);

    let second = ConnectView {
        view: Some("Home".to_string()),
        fields: Some(vec![field("state2")]),
        thunks: Some(vec![]),
    };
    execute(&second, &mut ctx).unwrap();

    let file = load(dir.path(), VIEW);
    assert_eq!(file.text().matches("@connect").count(), 1);
    let nodes = component_nodes(&file).unwrap().unwrap();
    let call = find_decorator_or_hoc(&file, &nodes, "connect").unwrap();
    assert_eq!(call.arguments.len(), 2);
    assert!(call.arguments[0].text.contains("state1: state.task.state1"));
    assert!(call.arguments[0].text.contains("state2: state.task.state2"));
    assert_eq!(call.arguments[1].text, "{ fetchTasks }");
}

#[test]
fn test_committed_files_are_already_normalized() {
    let dir = TempDir::new().unwrap();
    let mut ctx = context(&dir);
    scenario_a(&mut ctx);

    let on_disk = fs::read_to_string(dir.path().join(REDUCER)).unwrap();
    let once = normalize(&load(dir.path(), REDUCER)).unwrap();
    let reparsed = SourceFile::parse(REDUCER, once.clone(), Origin::Loaded).unwrap();
    let twice = normalize(&reparsed).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once, on_disk);
}

#[test]
fn test_set_interface_fields_is_idempotent() {
    let mut file = SourceFile::parse(
        "src/views/Home/props.ts",
        "export interface HomeProps {\n  title: string;\n  // keep\n  count?: number;\n}\n",
        Origin::Loaded,
    )
    .unwrap();
    let fields = [FieldSpec::new("count", "number"), FieldSpec::new("done", "boolean")];
    set_interface_fields(&mut file, "HomeProps", &fields, false).unwrap();
    let once = file.text().to_string();
    set_interface_fields(&mut file, "HomeProps", &fields, false).unwrap();
    assert_eq!(file.text(), once);
    assert_eq!(
        once,
        "export interface HomeProps {\n  title: string;\n  // keep\n  count: number;\n  done: boolean;\n}\n"
    );
}

#[test]
fn test_import_dedup_is_order_independent() {
    let module = ModuleRef::file("src/store/reducers/index.ts");
    let names = ["RootState", "AppDispatch", "rootSelector"];
    let orders = [[0, 1, 2], [2, 0, 1], [1, 2, 0]];

    let mut results = Vec::new();
    for order in orders {
        let mut file = SourceFile::parse(VIEW, "export const a = 1;\n", Origin::Loaded).unwrap();
        for i in order {
            add_named_import_if_absent(&mut file, &module, names[i]).unwrap();
        }
        assert_eq!(file.text().matches("from '../../store/reducers'").count(), 1);
        for name in names {
            assert!(file.text().contains(name));
        }
        results.push(normalize(&file).unwrap());
    }
    assert!(results.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_sentinel_union_is_replaced() {
    let mut file = SourceFile::parse(ACTIONS, "export type TaskActionTypes = any;\n", Origin::Loaded).unwrap();
    append_union_member(&mut file, "TaskActionTypes", &["{ type: 'X' }".to_string()]).unwrap();
    assert_eq!(file.text(), "export type TaskActionTypes = { type: 'X' };\n");
    let union = find_action_type_union(&file, "TaskActionTypes").unwrap();
    assert!(!union.is_sentinel);
    assert_eq!(union.tags().collect::<Vec<_>>(), vec!["X"]);
}

#[test]
fn test_default_clause_stays_last_and_existing_clauses_untouched() {
    let text = "export default function r(state = {}, action: A) {\n  switch (action.type) {\n    case 'A':\n      // hand-written\n      return { ...state, a: 1 };\n    default:\n      return state;\n  }\n}\n";
    let mut file = SourceFile::parse(REDUCER, text, Origin::Loaded).unwrap();
    let before = find_dispatch_block(&file).unwrap().clauses;

    insert_case_clauses_before_default(
        &mut file,
        &[NewCase::new("B", "return state;"), NewCase::new("A", "return state;")],
    )
    .unwrap();
    let after = find_dispatch_block(&file).unwrap();
    assert_eq!(after.cases().count(), 2);
    assert_eq!(after.default_count(), 1);
    assert!(after.clauses.last().unwrap().is_default());
    assert_eq!(after.clauses[0], before[0]);
}

#[test]
fn test_cancelled_prompt_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut ctx = context(&dir);
    let mut prompter = ScriptedPrompter::new([Answer::Text("task".to_string()), Answer::Cancel]);
    let err = run(&mut CreateReducer::default(), &mut ctx, &mut prompter).unwrap_err();
    assert!(matches!(err, EngineError::Cancelled));
    assert!(!dir.path().join("src").exists());
}

#[test]
fn test_malformed_dispatch_block_aborts_the_whole_run() {
    let dir = TempDir::new().unwrap();
    let mut ctx = context(&dir);
    scenario_a(&mut ctx);
    let broken = fs::read_to_string(dir.path().join(REDUCER))
        .unwrap()
        .replace("    default:\n      return state;\n", "");
    fs::write(dir.path().join(REDUCER), &broken).unwrap();
    let state_before = fs::read_to_string(dir.path().join(STATE)).unwrap();

    let generator = AddReducerState {
        reducer: Some("task".to_string()),
        fields: Some(vec![FieldSpec::new("state3", "any").with_initial("10")]),
        setters: Some(vec!["state3".to_string()]),
    };
    let err = execute(&generator, &mut ctx).unwrap_err();
    assert!(matches!(err, EngineError::Malformed { .. }));
    assert_eq!(fs::read_to_string(dir.path().join(STATE)).unwrap(), state_before);
    assert_eq!(fs::read_to_string(dir.path().join(REDUCER)).unwrap(), broken);
}
