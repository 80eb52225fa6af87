//! View generators: create a view, add props or state, wrap its render output.

use std::path::{Path, PathBuf};

use crate::diagnostic::EngineError;
use crate::locate::{component_nodes, find_component, find_interface, find_method, find_type_alias};
use crate::model::{ComponentInfo, ComponentKind, FieldSpec, StateHook};
use crate::mutate::{
    add_named_import_if_absent, insert_state_hooks, replace_returned_jsx_with_wrapper, set_class_state_initializer,
    set_first_parameter_type, set_heritage_type_argument, set_interface_fields, set_or_insert_constructor, ModuleRef,
};
use crate::naming::validate_identifier;
use crate::source::Project;

use super::index::{ViewEntry, ViewLocation};
use super::navigator::{stage_navigator, NavigatorTarget};
use super::prompt::{ask_name, collect_fields, Prompter};
use super::templates::{generate_view, NavigatorKind};
use super::{ensure_absent, project_module, required, Generator, GeneratorContext};

const COMPONENT_KINDS: [ComponentKind; 3] = [ComponentKind::Class, ComponentKind::Function, ComponentKind::ArrowFunction];

/// Creates a view folder with `index.tsx`, `props.ts` and, for class
/// components, `state.ts`.
#[derive(Debug, Clone, Default)]
pub struct CreateView {
    pub name: Option<String>,
    pub kind: Option<ComponentKind>,
    pub location: Option<ViewLocation>,
    pub props: Option<Vec<FieldSpec>>,
    pub state: Option<Vec<FieldSpec>>,
    /// `Some(None)` creates no navigator; `None` asks.
    pub navigator: Option<Option<NavigatorKind>>,
}

impl CreateView {
    fn entry(&self, ctx: &GeneratorContext) -> Result<ViewEntry, EngineError> {
        let name = ctx.naming().component(required(&self.name, "view name")?);
        validate_identifier(&name)?;
        let location = self.location.unwrap_or(ViewLocation::Screen);
        let folder = location.dir(ctx.config()).join(&name);
        Ok(ViewEntry {
            index: folder.join("index.tsx"),
            kind: Some(self.kind.unwrap_or(ctx.config().default_component_kind)),
            props_type: None,
            name,
            location,
            folder,
        })
    }
}

impl Generator for CreateView {
    fn name(&self) -> &'static str {
        "view"
    }

    fn prompt(&mut self, ctx: &mut GeneratorContext, prompter: &mut dyn Prompter) -> Result<(), EngineError> {
        if self.name.is_none() {
            self.name = Some(ask_name(prompter, "View name")?);
        }
        if self.location.is_none() {
            let options = vec!["Screen".to_string(), "Component".to_string()];
            self.location = Some(match prompter.select("Where does it live?", &options)? {
                0 => ViewLocation::Screen,
                _ => ViewLocation::Component,
            });
        }
        let entry = self.entry(ctx)?;
        ensure_absent(&Project::new(ctx.root()), &entry.folder)?;

        if self.kind.is_none() {
            let default = ctx.config().default_component_kind;
            let mut kinds = COMPONENT_KINDS.to_vec();
            kinds.sort_by_key(|k| *k != default);
            let labels: Vec<String> = kinds.iter().map(|k| k.label().to_string()).collect();
            self.kind = Some(kinds[prompter.select("Component kind", &labels)?]);
        }
        if self.props.is_none() {
            self.props = Some(collect_fields(prompter, "Props field", &[], false)?);
        }
        if self.state.is_none() {
            let class = self.kind == Some(ComponentKind::Class);
            self.state = Some(collect_fields(prompter, "State field", &[], class)?);
        }
        if self.navigator.is_none() {
            self.navigator = Some(match prompter.confirm("Attach a navigator?", false)? {
                true => {
                    let labels: Vec<String> = NavigatorKind::ALL.iter().map(|k| k.label().to_string()).collect();
                    Some(NavigatorKind::ALL[prompter.select("Navigator kind", &labels)?])
                }
                false => None,
            });
        }
        Ok(())
    }

    fn generate(&self, ctx: &mut GeneratorContext, project: &mut Project) -> Result<(), EngineError> {
        let entry = self.entry(ctx)?;
        ensure_absent(project, &entry.folder)?;
        let kind = entry.kind.unwrap_or(ComponentKind::Function);
        tracing::info!(view = %entry.name, kind = kind.label(), folder = %entry.folder.display(), "creating view");

        project.create(&entry.index, generate_view(kind, &entry.name))?;
        let props = self.props.clone().unwrap_or_default();
        let state = self.state.clone().unwrap_or_default();
        stage_props(ctx, project, &entry, &props, false)?;
        if kind == ComponentKind::Class || !state.is_empty() {
            stage_state(ctx, project, &entry, &state)?;
        }

        if let Some(Some(navigator)) = self.navigator {
            let name = ctx.naming().navigator(&entry.name);
            let target = NavigatorTarget {
                path: entry.nav_path(),
                kind: navigator,
                param_list: ctx.naming().param_list(&entry.name),
                name,
            };
            stage_navigator(project, &target, &[entry])?;
        }
        Ok(())
    }
}

/// Adds or retypes props of an existing view.
#[derive(Debug, Clone, Default)]
pub struct AddViewProps {
    pub view: Option<String>,
    pub fields: Option<Vec<FieldSpec>>,
    /// Delete props not listed in `fields`.
    pub remove_unlisted: bool,
}

impl Generator for AddViewProps {
    fn name(&self) -> &'static str {
        "props"
    }

    fn prompt(&mut self, ctx: &mut GeneratorContext, prompter: &mut dyn Prompter) -> Result<(), EngineError> {
        if self.view.is_none() {
            self.view = Some(ctx.pick_view(prompter, "Which view?")?);
        }
        if self.fields.is_none() {
            self.fields = Some(collect_fields(prompter, "Props field", &[], false)?);
        }
        Ok(())
    }

    fn generate(&self, ctx: &mut GeneratorContext, project: &mut Project) -> Result<(), EngineError> {
        let entry = ctx.view(required(&self.view, "view")?)?;
        let fields = self.fields.clone().unwrap_or_default();
        stage_props(ctx, project, &entry, &fields, self.remove_unlisted)?;
        Ok(())
    }
}

/// Adds state to an existing view: a state interface for class components,
/// `useState` hooks for function and arrow components.
#[derive(Debug, Clone, Default)]
pub struct AddViewState {
    pub view: Option<String>,
    pub fields: Option<Vec<FieldSpec>>,
}

impl Generator for AddViewState {
    fn name(&self) -> &'static str {
        "state"
    }

    fn prompt(&mut self, ctx: &mut GeneratorContext, prompter: &mut dyn Prompter) -> Result<(), EngineError> {
        if self.view.is_none() {
            self.view = Some(ctx.pick_view(prompter, "Which view?")?);
        }
        if self.fields.is_none() {
            let entry = ctx.view(required(&self.view, "view")?)?;
            let class = entry.kind == Some(ComponentKind::Class);
            self.fields = Some(collect_fields(prompter, "State field", &[], class)?);
        }
        Ok(())
    }

    fn generate(&self, ctx: &mut GeneratorContext, project: &mut Project) -> Result<(), EngineError> {
        let entry = ctx.view(required(&self.view, "view")?)?;
        let fields = self.fields.clone().unwrap_or_default();
        stage_state(ctx, project, &entry, &fields)
    }
}

/// Wraps a view's render output in a container element.
#[derive(Debug, Clone, Default)]
pub struct WrapView {
    pub view: Option<String>,
    /// Wrapper tag, e.g. `SafeAreaView`.
    pub wrapper: Option<String>,
    /// Package the wrapper is imported from; `react-native` when unset.
    pub module: Option<String>,
    pub attributes: String,
}

impl Generator for WrapView {
    fn name(&self) -> &'static str {
        "wrap"
    }

    fn prompt(&mut self, ctx: &mut GeneratorContext, prompter: &mut dyn Prompter) -> Result<(), EngineError> {
        if self.view.is_none() {
            self.view = Some(ctx.pick_view(prompter, "Which view?")?);
        }
        if self.wrapper.is_none() {
            let validate = |text: &str| validate_tag(text.trim());
            self.wrapper = Some(prompter.input("Wrapper element", "SafeAreaView", &validate)?.trim().to_string());
        }
        Ok(())
    }

    fn generate(&self, ctx: &mut GeneratorContext, project: &mut Project) -> Result<(), EngineError> {
        let entry = ctx.view(required(&self.view, "view")?)?;
        let wrapper = required(&self.wrapper, "wrapper")?;
        validate_tag(wrapper).map_err(EngineError::validation)?;
        let module = ModuleRef::package(self.module.clone().unwrap_or_else(|| "react-native".to_string()));
        wrap_render(project, &entry, wrapper, &self.attributes, &module)
    }
}

fn validate_tag(tag: &str) -> Result<(), String> {
    tag.split('.')
        .try_for_each(|part| validate_identifier(part).map_err(super::prompt::reason))
}

/// The principal component of a view's index file.
pub(crate) fn component_of(project: &mut Project, entry: &ViewEntry) -> Result<ComponentInfo, EngineError> {
    let file = project.open(&entry.index)?;
    find_component(file)?.ok_or_else(|| EngineError::DeclarationNotFound {
        what: "a component".to_string(),
        path: file.path().to_path_buf(),
    })
}

/// Makes the view's props interface declare `fields` and attaches it to the
/// component. Returns the interface name.
pub(crate) fn stage_props(
    ctx: &GeneratorContext,
    project: &mut Project,
    entry: &ViewEntry,
    fields: &[FieldSpec],
    remove_unlisted: bool,
) -> Result<String, EngineError> {
    let info = component_of(project, entry)?;
    let props_name = info.props_type.clone().unwrap_or_else(|| ctx.naming().props(&info.name));
    let target = interface_home(project, entry, &props_name, entry.props_path())?;

    if !project.exists(&target) {
        project.create_empty(&target)?;
    }
    set_interface_fields(project.open(&target)?, &props_name, fields, remove_unlisted)?;
    tracing::debug!(view = %info.name, props = %props_name, fields = fields.len(), "props staged");

    if info.props_type.is_none() {
        let index = project.open(&entry.index)?;
        match info.kind {
            ComponentKind::Class => set_heritage_type_argument(index, &info.name, 0, &props_name)?,
            _ => set_first_parameter_type(index, &props_name)?,
        }
    }
    import_type(project, entry, &target, &props_name)?;
    Ok(props_name)
}

/// Adds state fields: a state interface plus initializer for classes, hooks
/// otherwise.
pub(crate) fn stage_state(
    ctx: &GeneratorContext,
    project: &mut Project,
    entry: &ViewEntry,
    fields: &[FieldSpec],
) -> Result<(), EngineError> {
    let info = component_of(project, entry)?;
    if info.kind != ComponentKind::Class {
        let hooks: Vec<StateHook> = fields
            .iter()
            .map(|f| StateHook {
                name: f.name.clone(),
                setter: Some(ctx.naming().hook_setter(&f.name)),
                initial_value: f.initial_value.clone(),
                type_argument: Some(if f.optional {
                    format!("{} | undefined", f.type_text)
                } else {
                    f.type_text.clone()
                }),
            })
            .collect();
        if hooks.is_empty() {
            return Ok(());
        }
        let index = project.open(&entry.index)?;
        insert_state_hooks(index, &hooks)?;
        add_named_import_if_absent(index, &ModuleRef::package("react"), "useState")?;
        return Ok(());
    }

    if let Some(field) = fields.iter().find(|f| !f.optional && f.initial_value.is_none()) {
        return Err(EngineError::MissingInitialValue {
            field: field.name.clone(),
        });
    }
    let props_name = stage_props(ctx, project, entry, &[], false)?;
    let state_name = info.state_type.clone().unwrap_or_else(|| ctx.naming().state(&info.name));
    let target = interface_home(project, entry, &state_name, entry.state_path())?;
    if !project.exists(&target) {
        project.create_empty(&target)?;
    }
    set_interface_fields(project.open(&target)?, &state_name, fields, false)?;

    let index = project.open(&entry.index)?;
    set_heritage_type_argument(index, &info.name, 1, &state_name)?;
    set_or_insert_constructor(index, &info.name, &props_name)?;
    set_class_state_initializer(index, &info.name, fields)?;
    import_type(project, entry, &target, &state_name)?;
    tracing::debug!(view = %info.name, state = %state_name, fields = fields.len(), "state staged");
    Ok(())
}

/// The file declaring `name`: the view's index when it declares the type
/// itself, otherwise `default`.
pub(crate) fn interface_home(
    project: &mut Project,
    entry: &ViewEntry,
    name: &str,
    default: PathBuf,
) -> Result<PathBuf, EngineError> {
    let index = project.open(&entry.index)?;
    if find_interface(index, name).is_some() || find_type_alias(index, name).is_some() {
        return Ok(entry.index.clone());
    }
    Ok(default)
}

pub(crate) fn import_type(project: &mut Project, entry: &ViewEntry, from: &Path, name: &str) -> Result<(), EngineError> {
    if from == entry.index {
        return Ok(());
    }
    let module = project_module(project, from);
    add_named_import_if_absent(project.open(&entry.index)?, &module, name)
}

/// Wraps the render output of the view's component in `wrapper` and imports
/// it from `module`.
pub(crate) fn wrap_render(
    project: &mut Project,
    entry: &ViewEntry,
    wrapper: &str,
    attributes: &str,
    module: &ModuleRef,
) -> Result<(), EngineError> {
    let file = project.open(&entry.index)?;
    let handle = {
        let src = file.text();
        let nodes = component_nodes(file)?.ok_or_else(|| EngineError::DeclarationNotFound {
            what: "a component".to_string(),
            path: file.path().to_path_buf(),
        })?;
        let render = match nodes.kind {
            ComponentKind::Class => find_method(nodes.declaration, src, "render"),
            _ => nodes.function,
        };
        let render = render.ok_or_else(|| EngineError::DeclarationNotFound {
            what: format!("render function of {}", nodes.name),
            path: file.path().to_path_buf(),
        })?;
        file.node_ref(render)
    };
    replace_returned_jsx_with_wrapper(file, &handle, wrapper, attributes)?;

    let binding = wrapper.split('.').next().unwrap_or(wrapper);
    add_named_import_if_absent(file, module, binding)?;
    tracing::debug!(view = %entry.name, wrapper, "render output wrapped");
    Ok(())
}
