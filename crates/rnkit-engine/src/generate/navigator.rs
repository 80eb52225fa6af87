//! Navigator generators.
//!
//! A navigator attached to a view lives next to it as `nav.tsx`; a standalone
//! one lives in the navigators folder. Registering a screen touches three
//! places in the navigator file:
//!
//! ```text
//!   import Settings from '../views/Settings';          import
//!   export type AppNavigatorParamList = {
//!     Settings: undefined;                              param list
//!   };
//!   <Stack.Navigator>
//!     <Stack.Screen name="Settings" component={Settings} />   element
//!   </Stack.Navigator>
//! ```

use std::path::{Path, PathBuf};

use crate::diagnostic::EngineError;
use crate::model::{ExportStyle, FieldSpec};
use crate::mutate::{
    add_default_import_if_absent, add_named_import_if_absent, insert_jsx_child_if_absent, set_interface_fields, JsxChild,
    ModuleRef,
};
use crate::source::Project;

use super::index::{NavigatorEntry, ViewEntry};
use super::prompt::{ask_name, Prompter};
use super::templates::{generate_navigator, NavigatorKind};
use super::view::component_of;
use super::{ensure_absent, project_module, required, Generator, GeneratorContext};

/// Where a new navigator goes and what it is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NavigatorTarget {
    pub name: String,
    pub path: PathBuf,
    pub kind: NavigatorKind,
    pub param_list: String,
}

/// Creates a navigator, attached to a view or standalone, with its initial screens.
#[derive(Debug, Clone, Default)]
pub struct CreateNavigator {
    /// Base name of a standalone navigator. Ignored when attached.
    pub name: Option<String>,
    pub kind: Option<NavigatorKind>,
    /// View the navigator is attached to; `Some(None)` makes it standalone,
    /// `None` asks.
    pub attach_to: Option<Option<String>>,
    /// Views registered as screens, after the attached view.
    pub screens: Option<Vec<String>>,
}

impl Generator for CreateNavigator {
    fn name(&self) -> &'static str {
        "navigator"
    }

    fn prompt(&mut self, ctx: &mut GeneratorContext, prompter: &mut dyn Prompter) -> Result<(), EngineError> {
        if self.attach_to.is_none() {
            let has_views = !ctx.index()?.views.is_empty();
            self.attach_to = Some(if has_views && prompter.confirm("Attach it to an existing view?", false)? {
                Some(ctx.pick_view(prompter, "Which view?")?)
            } else {
                None
            });
        }
        if matches!(self.attach_to, Some(None)) && self.name.is_none() {
            self.name = Some(ask_name(prompter, "Navigator name")?);
        }
        if self.kind.is_none() {
            let labels: Vec<String> = NavigatorKind::ALL.iter().map(|k| k.label().to_string()).collect();
            self.kind = Some(NavigatorKind::ALL[prompter.select("Navigator kind", &labels)?]);
        }
        if self.screens.is_none() {
            let attached = self.attach_to.clone().flatten();
            let candidates: Vec<String> = ctx
                .index()?
                .views
                .iter()
                .map(|v| v.name.clone())
                .filter(|n| Some(n) != attached.as_ref())
                .collect();
            let chosen = if candidates.is_empty() {
                Vec::new()
            } else {
                prompter.multiselect("Screens", &candidates)?
            };
            self.screens = Some(chosen.into_iter().map(|i| candidates[i].clone()).collect());
        }
        Ok(())
    }

    fn generate(&self, ctx: &mut GeneratorContext, project: &mut Project) -> Result<(), EngineError> {
        let kind = self.kind.unwrap_or(NavigatorKind::Stack);
        let mut screens: Vec<ViewEntry> = Vec::new();
        let (base, path) = match self.attach_to.clone().flatten() {
            Some(view) => {
                let entry = ctx.view(&view)?;
                let path = entry.nav_path();
                let base = entry.name.clone();
                screens.push(entry);
                (base, path)
            }
            None => {
                let base = ctx.naming().component(required(&self.name, "navigator name")?);
                let file = format!("{}.tsx", ctx.naming().navigator(&base));
                (base.clone(), ctx.config().navigators_dir.join(file))
            }
        };
        for screen in self.screens.iter().flatten() {
            let entry = ctx.view(screen)?;
            if !screens.iter().any(|s| s.index == entry.index) {
                screens.push(entry);
            }
        }

        let target = NavigatorTarget {
            name: ctx.naming().navigator(&base),
            path,
            kind,
            param_list: ctx.naming().param_list(&base),
        };
        tracing::info!(navigator = %target.name, kind = kind.label(), screens = screens.len(), "creating navigator");
        stage_navigator(project, &target, &screens)
    }
}

/// Registers a view as a screen of an existing navigator.
#[derive(Debug, Clone, Default)]
pub struct AddNavigatorScreen {
    pub navigator: Option<String>,
    pub screen: Option<String>,
}

impl AddNavigatorScreen {
    fn navigator_entry(ctx: &mut GeneratorContext, name: &str) -> Result<NavigatorEntry, EngineError> {
        let navigators_dir = ctx.config().navigators_dir.clone();
        ctx.index()?.navigator(name).cloned().ok_or_else(|| EngineError::DeclarationNotFound {
            what: format!("navigator {name}"),
            path: navigators_dir,
        })
    }
}

impl Generator for AddNavigatorScreen {
    fn name(&self) -> &'static str {
        "screen"
    }

    fn prompt(&mut self, ctx: &mut GeneratorContext, prompter: &mut dyn Prompter) -> Result<(), EngineError> {
        if self.navigator.is_none() {
            let names: Vec<String> = ctx.index()?.navigators.iter().map(|n| n.name.clone()).collect();
            if names.is_empty() {
                return Err(EngineError::validation("the project has no navigators yet"));
            }
            self.navigator = Some(names[prompter.select("Which navigator?", &names)?].clone());
        }
        if self.screen.is_none() {
            self.screen = Some(ctx.pick_view(prompter, "Which view becomes a screen?")?);
        }
        Ok(())
    }

    fn generate(&self, ctx: &mut GeneratorContext, project: &mut Project) -> Result<(), EngineError> {
        let navigator = Self::navigator_entry(ctx, required(&self.navigator, "navigator")?)?;
        let screen = ctx.view(required(&self.screen, "screen")?)?;
        let param_list = navigator.param_list.clone().ok_or_else(|| EngineError::DeclarationNotFound {
            what: "a ParamList type".to_string(),
            path: navigator.path.clone(),
        })?;
        stage_screen(project, &navigator.path, navigator.kind, &param_list, &screen)
    }
}

/// Creates the navigator file and registers `screens` in order.
pub(crate) fn stage_navigator(
    project: &mut Project,
    target: &NavigatorTarget,
    screens: &[ViewEntry],
) -> Result<(), EngineError> {
    ensure_absent(project, &target.path)?;
    let file = project.create(
        &target.path,
        generate_navigator(target.kind, &target.name, &target.param_list),
    )?;
    add_named_import_if_absent(file, &ModuleRef::package(target.kind.package()), target.kind.factory())?;
    for screen in screens {
        stage_screen(project, &target.path, target.kind, &target.param_list, screen)?;
    }
    Ok(())
}

/// Adds `screen` to the param list, imports it and renders its screen element.
pub(crate) fn stage_screen(
    project: &mut Project,
    navigator: &Path,
    kind: NavigatorKind,
    param_list: &str,
    screen: &ViewEntry,
) -> Result<(), EngineError> {
    let export = component_of(project, screen)?.export;
    let module = project_module(project, &screen.index);
    let file = project.open(navigator)?;

    set_interface_fields(file, param_list, &[FieldSpec::new(&screen.name, "undefined")], false)?;
    match export {
        ExportStyle::Default => add_default_import_if_absent(file, &module, &screen.name)?,
        ExportStyle::Named(name) => add_named_import_if_absent(file, &module, &name)?,
    }
    let tag = kind.screen_tag();
    let child = JsxChild {
        text: format!("<{tag} name=\"{0}\" component={{{0}}} />", screen.name),
        tag,
        name: Some(screen.name.clone()),
    };
    insert_jsx_child_if_absent(file, &kind.navigator_tag(), &child)?;
    tracing::debug!(navigator = %navigator.display(), screen = %screen.name, "screen registered");
    Ok(())
}
