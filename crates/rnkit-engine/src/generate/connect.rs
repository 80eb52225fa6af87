//! Store connection.
//!
//! Connecting a view threads store state and thunks into its props:
//!
//! ```text
//!   props.ts   HomeStateProps { title: string }
//!              HomeDispatchProps { fetchTasks: typeof fetchTasks }
//!              HomeProps extends HomeStateProps, HomeDispatchProps
//!   index.tsx  connect<HomeStateProps, HomeDispatchProps>(
//!                (state: RootState) => ({ title: state.task.title }),
//!                { fetchTasks },
//!              )
//! ```
//!
//! Class components get a decorator, function and arrow components a
//! wrapping call. Connecting again merges into the same call.

use crate::diagnostic::EngineError;
use crate::model::{FieldSpec, ObjectProperty};
use crate::mutate::{
    add_named_import_if_absent, extend_interface_heritage, set_interface_fields, set_or_merge_decorator_or_hoc,
    MapperArgs, ModuleRef,
};
use crate::source::Project;

use super::index::ThunkEntry;
use super::prompt::Prompter;
use super::view::{component_of, import_type, interface_home, stage_props};
use super::{project_module, required, Generator, GeneratorContext};

/// A reducer state field mapped into props.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreField {
    /// Reducer key in the root state.
    pub reducer: String,
    pub field: FieldSpec,
}

impl StoreField {
    fn label(&self) -> String {
        format!("{}.{}: {}", self.reducer, self.field.name, self.field.type_text)
    }

    /// `state.task.title`
    fn selector(&self) -> String {
        format!("state.{}.{}", self.reducer, self.field.name)
    }
}

/// Maps store state and thunks into a view's props.
#[derive(Debug, Clone, Default)]
pub struct ConnectView {
    pub view: Option<String>,
    pub fields: Option<Vec<StoreField>>,
    /// Thunk names dispatched through props.
    pub thunks: Option<Vec<String>>,
}

impl Generator for ConnectView {
    fn name(&self) -> &'static str {
        "connect"
    }

    fn prompt(&mut self, ctx: &mut GeneratorContext, prompter: &mut dyn Prompter) -> Result<(), EngineError> {
        if self.view.is_none() {
            self.view = Some(ctx.pick_view(prompter, "Which view?")?);
        }
        if self.fields.is_none() {
            let available: Vec<StoreField> = ctx
                .index()?
                .reducers
                .iter()
                .flat_map(|r| {
                    r.fields.iter().map(|f| StoreField {
                        reducer: r.key.clone(),
                        field: f.clone(),
                    })
                })
                .collect();
            let chosen = if available.is_empty() {
                Vec::new()
            } else {
                let labels: Vec<String> = available.iter().map(StoreField::label).collect();
                prompter.multiselect("State to map into props", &labels)?
            };
            self.fields = Some(chosen.into_iter().map(|i| available[i].clone()).collect());
        }
        if self.thunks.is_none() {
            let names: Vec<String> = ctx.index()?.thunks.iter().map(|t| t.name.clone()).collect();
            let chosen = if names.is_empty() {
                Vec::new()
            } else {
                prompter.multiselect("Thunks to dispatch from props", &names)?
            };
            self.thunks = Some(chosen.into_iter().map(|i| names[i].clone()).collect());
        }
        Ok(())
    }

    fn generate(&self, ctx: &mut GeneratorContext, project: &mut Project) -> Result<(), EngineError> {
        let entry = ctx.view(required(&self.view, "view")?)?;
        let fields = self.fields.clone().unwrap_or_default();
        let thunks = self.thunk_entries(ctx)?;
        if fields.is_empty() && thunks.is_empty() {
            return Err(EngineError::validation("select at least one state field or thunk to connect"));
        }
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.field.name == field.field.name) {
                return Err(EngineError::validation(format!(
                    "'{}' is selected from more than one reducer",
                    field.field.name
                )));
            }
        }

        let info = component_of(project, &entry)?;
        let naming = ctx.naming();
        let state_props = naming.state_props(&info.name);
        let dispatch_props = naming.dispatch_props(&info.name);
        tracing::info!(view = %entry.name, fields = fields.len(), thunks = thunks.len(), "connecting view");

        let props_name = stage_props(ctx, project, &entry, &[], false)?;
        let props_path = entry.props_path();
        if !project.exists(&props_path) {
            project.create_empty(&props_path)?;
        }
        let thunk_modules: Vec<(String, ModuleRef)> = thunks
            .iter()
            .map(|t| (t.name.clone(), project_module(project, &t.path)))
            .collect();

        let props = project.open(&props_path)?;
        let state_fields: Vec<FieldSpec> = fields
            .iter()
            .map(|f| FieldSpec::new(&f.field.name, &f.field.type_text))
            .collect();
        set_interface_fields(props, &state_props, &state_fields, false)?;
        let dispatch_fields: Vec<FieldSpec> = thunks
            .iter()
            .map(|t| FieldSpec::new(&t.name, format!("typeof {}", t.name)))
            .collect();
        set_interface_fields(props, &dispatch_props, &dispatch_fields, false)?;
        for (name, module) in &thunk_modules {
            add_named_import_if_absent(props, module, name)?;
        }

        let home = interface_home(project, &entry, &props_name, props_path.clone())?;
        let props_module = project_module(project, &props_path);
        let file = project.open(&home)?;
        extend_interface_heritage(file, &props_name, &[state_props.clone(), dispatch_props.clone()])?;
        if home != props_path {
            add_named_import_if_absent(file, &props_module, &state_props)?;
            add_named_import_if_absent(file, &props_module, &dispatch_props)?;
        }

        let args = MapperArgs {
            state_mapper: fields
                .iter()
                .map(|f| ObjectProperty::new(&f.field.name, f.selector()))
                .collect(),
            action_mapper: thunks.iter().map(|t| ObjectProperty::shorthand(&t.name)).collect(),
            state_param: "state: RootState".to_string(),
            state_type: state_props.clone(),
            dispatch_type: dispatch_props.clone(),
        };
        let root_reducer = project_module(project, ctx.config().root_reducer_path());
        let index = project.open(&entry.index)?;
        set_or_merge_decorator_or_hoc(index, "connect", &args)?;
        add_named_import_if_absent(index, &ModuleRef::package("react-redux"), "connect")?;
        if !fields.is_empty() {
            add_named_import_if_absent(index, &root_reducer, "RootState")?;
        }
        for (name, module) in &thunk_modules {
            add_named_import_if_absent(index, module, name)?;
        }
        import_type(project, &entry, &props_path, &state_props)?;
        import_type(project, &entry, &props_path, &dispatch_props)
    }
}

impl ConnectView {
    fn thunk_entries(&self, ctx: &mut GeneratorContext) -> Result<Vec<ThunkEntry>, EngineError> {
        let thunks_dir = ctx.config().thunks_dir.clone();
        let index = ctx.index()?;
        self.thunks
            .iter()
            .flatten()
            .map(|name| {
                index.thunk(name).cloned().ok_or_else(|| EngineError::DeclarationNotFound {
                    what: format!("thunk {name}"),
                    path: thunks_dir.clone(),
                })
            })
            .collect()
    }
}
