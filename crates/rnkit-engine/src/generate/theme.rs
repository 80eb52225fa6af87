//! Theme generators.

use crate::diagnostic::EngineError;
use crate::locate::find_variable_object;
use crate::model::ObjectProperty;
use crate::mutate::{merge_object_literal_properties, not_found};
use crate::naming::validate_identifier;
use crate::source::Project;

use super::prompt::{reason, Prompter};
use super::templates::{generate_theme, generate_theme_provider};
use super::view::wrap_render;
use super::{ensure_absent, project_module, required, Generator, GeneratorContext};

const PROVIDER: &str = "ThemeProvider";

/// Creates the theme module and its context provider.
#[derive(Debug, Clone, Default)]
pub struct InitTheme;

impl Generator for InitTheme {
    fn name(&self) -> &'static str {
        "theme-init"
    }

    fn generate(&self, ctx: &mut GeneratorContext, project: &mut Project) -> Result<(), EngineError> {
        let dir = &ctx.config().theme_dir;
        let index = dir.join("index.ts");
        let provider = dir.join(format!("{PROVIDER}.tsx"));
        ensure_absent(project, &index)?;
        ensure_absent(project, &provider)?;
        tracing::info!(dir = %dir.display(), "creating theme");
        project.create(&index, generate_theme())?;
        project.create(&provider, generate_theme_provider())?;
        Ok(())
    }
}

/// A palette entry: `name=value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeColor {
    pub name: String,
    pub value: String,
}

impl ThemeColor {
    pub fn parse(text: &str) -> Result<Self, String> {
        let (name, value) = text
            .split_once('=')
            .ok_or_else(|| format!("expected name=value, got '{}'", text.trim()))?;
        let name = name.trim();
        validate_identifier(name).map_err(reason)?;
        let value = value.trim().trim_matches(|c| c == '\'' || c == '"');
        if value.is_empty() {
            return Err(format!("'{name}' has no value"));
        }
        Ok(Self {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    fn property(&self) -> ObjectProperty {
        ObjectProperty::new(&self.name, format!("'{}'", self.value))
    }
}

/// Adds colors to the theme palette. Existing colors keep their value.
#[derive(Debug, Clone, Default)]
pub struct AddThemeColors {
    pub colors: Option<Vec<ThemeColor>>,
}

impl Generator for AddThemeColors {
    fn name(&self) -> &'static str {
        "theme-colors"
    }

    fn prompt(&mut self, _ctx: &mut GeneratorContext, prompter: &mut dyn Prompter) -> Result<(), EngineError> {
        if self.colors.is_some() {
            return Ok(());
        }
        let mut colors: Vec<ThemeColor> = Vec::new();
        loop {
            let validate = |text: &str| -> Result<(), String> {
                if text.trim().is_empty() {
                    return Ok(());
                }
                let color = ThemeColor::parse(text)?;
                if colors.iter().any(|c| c.name == color.name) {
                    return Err(format!("'{}' already entered", color.name));
                }
                Ok(())
            };
            let answer = prompter.input("Color", "accent=#03dac6 (empty to finish)", &validate)?;
            if answer.trim().is_empty() {
                break;
            }
            colors.push(ThemeColor::parse(&answer).map_err(EngineError::validation)?);
        }
        self.colors = Some(colors);
        Ok(())
    }

    fn generate(&self, ctx: &mut GeneratorContext, project: &mut Project) -> Result<(), EngineError> {
        let colors = required(&self.colors, "colors")?;
        if colors.is_empty() {
            return Ok(());
        }
        let file = project.open(ctx.config().theme_dir.join("index.ts"))?;
        let object = find_variable_object(file, "colors").ok_or_else(|| not_found(file, "colors object"))?;
        let handle = file.node_ref(object);
        let properties: Vec<ObjectProperty> = colors.iter().map(ThemeColor::property).collect();
        merge_object_literal_properties(file, &handle, &properties)?;
        Ok(())
    }
}

/// Wraps a view's render output in the theme provider.
#[derive(Debug, Clone, Default)]
pub struct ApplyTheme {
    pub view: Option<String>,
}

impl Generator for ApplyTheme {
    fn name(&self) -> &'static str {
        "theme-apply"
    }

    fn prompt(&mut self, ctx: &mut GeneratorContext, prompter: &mut dyn Prompter) -> Result<(), EngineError> {
        if self.view.is_none() {
            self.view = Some(ctx.pick_view(prompter, "Which view?")?);
        }
        Ok(())
    }

    fn generate(&self, ctx: &mut GeneratorContext, project: &mut Project) -> Result<(), EngineError> {
        let entry = ctx.view(required(&self.view, "view")?)?;
        let provider = ctx.config().theme_dir.join(format!("{PROVIDER}.tsx"));
        if !project.exists(&provider) {
            return Err(EngineError::DeclarationNotFound {
                what: PROVIDER.to_string(),
                path: provider,
            });
        }
        let module = project_module(project, &provider);
        wrap_render(project, &entry, PROVIDER, "", &module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use crate::generate::{execute, run, CreateView, ScriptedPrompter, ViewLocation};
    use crate::model::ComponentKind;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_color_parse() {
        assert_eq!(
            ThemeColor::parse("accent = '#03dac6'").unwrap(),
            ThemeColor {
                name: "accent".to_string(),
                value: "#03dac6".to_string()
            }
        );
        assert!(ThemeColor::parse("accent").is_err());
        assert!(ThemeColor::parse("accent=").is_err());
    }

    #[test]
    fn test_init_and_extend_theme() {
        let dir = TempDir::new().unwrap();
        let mut ctx = GeneratorContext::new(dir.path(), ProjectConfig::default());
        let report = execute(&InitTheme, &mut ctx).unwrap();
        assert_eq!(
            report.created,
            vec![PathBuf::from("src/theme/ThemeProvider.tsx"), PathBuf::from("src/theme/index.ts")]
        );
        assert!(matches!(execute(&InitTheme, &mut ctx).unwrap_err(), EngineError::Conflict { .. }));

        let mut prompter = ScriptedPrompter::default()
            .with_text("accent=#03dac6")
            .with_text("primary=#000000")
            .with_text("");
        run(&mut AddThemeColors::default(), &mut ctx, &mut prompter).unwrap();
        let theme = fs::read_to_string(dir.path().join("src/theme/index.ts")).unwrap();
        assert!(theme.contains("  primary: '#6200ee',\n  background: '#ffffff',\n  text: '#000000',\n  accent: '#03dac6',\n};"));
        assert!(!theme.contains("primary: '#000000'"));
    }

    #[test]
    fn test_apply_theme_wraps_render_output() {
        let dir = TempDir::new().unwrap();
        let mut ctx = GeneratorContext::new(dir.path(), ProjectConfig::default());
        let view = CreateView {
            name: Some("Home".to_string()),
            kind: Some(ComponentKind::ArrowFunction),
            location: Some(ViewLocation::Component),
            props: Some(vec![]),
            state: Some(vec![]),
            navigator: Some(None),
        };
        execute(&view, &mut ctx).unwrap();

        let apply = ApplyTheme {
            view: Some("Home".to_string()),
        };
        assert!(matches!(
            execute(&apply, &mut ctx).unwrap_err(),
            EngineError::DeclarationNotFound { .. }
        ));

        execute(&InitTheme, &mut ctx).unwrap();
        execute(&apply, &mut ctx).unwrap();
        let index = fs::read_to_string(dir.path().join("src/components/Home/index.tsx")).unwrap();
        assert!(index.contains("import { ThemeProvider } from '../../theme/ThemeProvider';"));
        assert!(index.contains("<ThemeProvider>\n"));

        execute(&apply, &mut ctx).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("src/components/Home/index.tsx")).unwrap(),
            index
        );
    }
}
