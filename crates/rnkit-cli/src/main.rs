//! rnkit CLI.
//!
//! Scaffolds and evolves views, reducers, thunks, navigators and themes in a
//! React Native project. Every subcommand takes what it can from arguments
//! and asks for the rest.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use rnkit_engine::generate::connect::StoreField;
use rnkit_engine::generate::{
    self, ActionSpec, AddActionTypes, AddNavigatorScreen, AddReducerState, AddThemeColors, AddViewProps,
    AddViewState, ApplyTheme, ConnectView, CreateNavigator, CreateReducer, CreateThunk, CreateView, Generator,
    GeneratorContext, InitTheme, NavigatorKind, ThemeColor, ViewLocation, WrapView,
};
use rnkit_engine::{find_project_root, ComponentKind, EngineError};

mod formatter;
mod ui;
mod wizard;

use wizard::{fields, list, TermPrompter};

#[derive(Parser)]
#[command(name = "rnkit")]
#[command(version)]
#[command(about = "Scaffold and evolve React Native views, reducers, navigators and themes")]
struct Cli {
    /// Project root (default: nearest directory with rnkit.json or package.json)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Log engine decisions (RNKIT_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Skip the configured formatter
    #[arg(long, global = true)]
    no_format: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Class,
    Function,
    Arrow,
}

impl From<KindArg> for ComponentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Class => ComponentKind::Class,
            KindArg::Function => ComponentKind::Function,
            KindArg::Arrow => ComponentKind::ArrowFunction,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LocationArg {
    Screen,
    Component,
}

#[derive(Clone, Copy, ValueEnum)]
enum NavigatorArg {
    Stack,
    Tab,
    Drawer,
    None,
}

impl NavigatorArg {
    fn kind(self) -> Option<NavigatorKind> {
        match self {
            Self::Stack => Some(NavigatorKind::Stack),
            Self::Tab => Some(NavigatorKind::Tab),
            Self::Drawer => Some(NavigatorKind::Drawer),
            Self::None => None,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a view
    View {
        name: Option<String>,

        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,

        #[arg(short, long, value_enum)]
        location: Option<LocationArg>,

        /// Prop as name[?]:type (repeatable)
        #[arg(short, long = "prop")]
        props: Vec<String>,

        /// State field as name[?]:type[=initial] (repeatable)
        #[arg(short, long = "state")]
        state: Vec<String>,

        /// Navigator created next to the view
        #[arg(short, long, value_enum)]
        navigator: Option<NavigatorArg>,
    },

    /// Add or retype props of a view
    Props {
        view: Option<String>,

        /// Prop as name[?]:type (repeatable)
        #[arg(short, long = "field")]
        fields: Vec<String>,

        /// Remove props not listed
        #[arg(long)]
        replace: bool,
    },

    /// Add state to a view (hooks or class state)
    State {
        view: Option<String>,

        /// Field as name[?]:type[=initial] (repeatable)
        #[arg(short, long = "field")]
        fields: Vec<String>,
    },

    /// Wrap a view's render output in an element
    Wrap {
        view: Option<String>,

        /// Wrapper tag, e.g. SafeAreaView
        wrapper: Option<String>,

        /// Package the wrapper comes from
        #[arg(long, default_value = "react-native")]
        from: String,

        /// Attributes written on the wrapper, e.g. 'style={styles.root}'
        #[arg(long, default_value = "")]
        attributes: String,
    },

    /// Create a reducer and register it in the root reducer
    Reducer {
        name: Option<String>,

        /// Field as name[?]:type=initial (repeatable)
        #[arg(short, long = "field")]
        fields: Vec<String>,

        /// Field that gets a setter action (repeatable)
        #[arg(short, long = "setter")]
        setters: Vec<String>,

        /// Custom action as name[:payload] (repeatable)
        #[arg(short, long = "action")]
        actions: Vec<String>,
    },

    /// Add state fields to a reducer
    ReducerState {
        reducer: Option<String>,

        #[arg(short, long = "field")]
        fields: Vec<String>,

        #[arg(short, long = "setter")]
        setters: Vec<String>,
    },

    /// Add action types to a reducer
    Actions {
        reducer: Option<String>,

        /// Existing field that gets a setter action (repeatable)
        #[arg(short, long = "setter")]
        setters: Vec<String>,

        /// Custom action as name[:payload] (repeatable)
        #[arg(short, long = "action")]
        actions: Vec<String>,
    },

    /// Create a thunk
    Thunk {
        name: Option<String>,

        /// Reducer whose actions the thunk dispatches
        #[arg(short, long)]
        reducer: Option<String>,
    },

    /// Connect a view to the store
    Connect {
        view: Option<String>,

        /// State field as reducer.field (repeatable)
        #[arg(short, long = "field")]
        fields: Vec<String>,

        /// Thunk dispatched from props (repeatable)
        #[arg(short, long = "thunk")]
        thunks: Vec<String>,
    },

    /// Create a navigator
    Navigator {
        /// Base name of a standalone navigator
        name: Option<String>,

        #[arg(short, long, value_enum)]
        kind: Option<NavigatorArg>,

        /// Attach the navigator to this view
        #[arg(long, conflicts_with = "standalone")]
        attach: Option<String>,

        /// Create it in the navigators folder
        #[arg(long)]
        standalone: bool,

        /// View registered as a screen (repeatable)
        #[arg(short, long = "screen")]
        screens: Vec<String>,
    },

    /// Register a view as a screen of a navigator
    Screen {
        navigator: Option<String>,
        screen: Option<String>,
    },

    /// Theme commands
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },

    /// List views, reducers, thunks and navigators
    List,
}

#[derive(Subcommand)]
enum ThemeAction {
    /// Create the theme module and provider
    Init,

    /// Add palette colors
    Colors {
        /// Color as name=value (repeatable)
        #[arg(short, long = "color")]
        colors: Vec<String>,
    },

    /// Wrap a view in the theme provider
    Apply { view: Option<String> },
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let start = std::env::current_dir().map_err(|e| miette::miette!("Cannot read current directory: {}", e))?;
    let root = match cli.root.clone() {
        Some(root) => root,
        None => find_project_root(&start).unwrap_or(start),
    };
    let mut ctx = GeneratorContext::load(&root)?;
    let interactive = console::Term::stdout().is_term();
    tracing::debug!(root = %root.display(), interactive, "starting");

    let mut generator: Box<dyn Generator> = match cli.command {
        None if interactive => {
            cliclack::intro(ui::title(env!("CARGO_PKG_VERSION"))).map_err(|e| miette::miette!("{}", e))?;
            match wizard::menu() {
                Ok(generator) => generator,
                Err(EngineError::Cancelled) => return cancelled(),
                Err(e) => return Err(e.into()),
            }
        }
        None => {
            eprintln!("Run 'rnkit --help' for usage or 'rnkit' in a terminal for the interactive menu.");
            std::process::exit(1);
        }
        Some(Commands::List) => {
            ui::index(ctx.index()?);
            return Ok(());
        }
        Some(command) => build(command, &mut ctx)?,
    };

    let mut prompter = TermPrompter::new(interactive);
    let report = match generate::run(generator.as_mut(), &mut ctx, &mut prompter) {
        Ok(report) => report,
        Err(EngineError::Cancelled) => return cancelled(),
        Err(e) => {
            ui::error(&format!("{} failed; nothing was written", generator.name()));
            return Err(e.into());
        }
    };
    ui::report(&report);

    if let Some(command) = ctx.config().formatter.clone() {
        if !cli.no_format {
            let files: Vec<PathBuf> = report.written().cloned().collect();
            formatter::run(ctx.root(), &command, &files).await;
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "rnkit_engine=debug,rnkit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("RNKIT_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn cancelled() -> miette::Result<()> {
    ui::dim("Cancelled. Nothing was written.");
    Ok(())
}

/// Turns a subcommand into a generator request. Anything left unset is asked.
fn build(command: Commands, ctx: &mut GeneratorContext) -> miette::Result<Box<dyn Generator>> {
    let generator: Box<dyn Generator> = match command {
        Commands::View {
            name,
            kind,
            location,
            props,
            state,
            navigator,
        } => Box::new(CreateView {
            name,
            kind: kind.map(Into::into),
            location: location.map(|l| match l {
                LocationArg::Screen => ViewLocation::Screen,
                LocationArg::Component => ViewLocation::Component,
            }),
            props: fields(&props)?,
            state: fields(&state)?,
            navigator: navigator.map(NavigatorArg::kind),
        }),
        Commands::Props { view, fields: args, replace } => Box::new(AddViewProps {
            view,
            fields: fields(&args)?,
            remove_unlisted: replace,
        }),
        Commands::State { view, fields: args } => Box::new(AddViewState {
            view,
            fields: fields(&args)?,
        }),
        Commands::Wrap {
            view,
            wrapper,
            from,
            attributes,
        } => Box::new(WrapView {
            view,
            wrapper,
            module: Some(from),
            attributes,
        }),
        Commands::Reducer {
            name,
            fields: args,
            setters,
            actions,
        } => {
            let fields = fields(&args)?;
            // Fields given without setters or actions means none of either.
            let defaulted = fields.is_some();
            Box::new(CreateReducer {
                name,
                fields,
                setters: list(setters).or_else(|| defaulted.then(Vec::new)),
                actions: actions_arg(&actions)?.or_else(|| defaulted.then(Vec::new)),
            })
        }
        Commands::ReducerState {
            reducer,
            fields: args,
            setters,
        } => {
            let fields = fields(&args)?;
            let defaulted = fields.is_some();
            Box::new(AddReducerState {
                reducer,
                fields,
                setters: list(setters).or_else(|| defaulted.then(Vec::new)),
            })
        }
        Commands::Actions {
            reducer,
            setters,
            actions,
        } => {
            let actions = actions_arg(&actions)?;
            let setters = list(setters);
            let given = actions.is_some() || setters.is_some();
            Box::new(AddActionTypes {
                reducer,
                setters: setters.or_else(|| given.then(Vec::new)),
                actions: actions.or_else(|| given.then(Vec::new)),
            })
        }
        Commands::Thunk { name, reducer } => Box::new(CreateThunk {
            name,
            reducer: reducer.map(Some),
        }),
        Commands::Connect { view, fields, thunks } => {
            let store_fields = store_fields(ctx, &fields)?;
            let thunks = list(thunks);
            let given = store_fields.is_some() || thunks.is_some();
            Box::new(ConnectView {
                view,
                fields: store_fields.or_else(|| given.then(Vec::new)),
                thunks: thunks.or_else(|| given.then(Vec::new)),
            })
        }
        Commands::Navigator {
            name,
            kind,
            attach,
            standalone,
            screens,
        } => Box::new(CreateNavigator {
            attach_to: match (attach, standalone || name.is_some()) {
                (Some(view), _) => Some(Some(view)),
                (None, true) => Some(None),
                (None, false) => None,
            },
            name,
            kind: kind.and_then(NavigatorArg::kind),
            screens: list(screens),
        }),
        Commands::Screen { navigator, screen } => Box::new(AddNavigatorScreen { navigator, screen }),
        Commands::Theme { action } => match action {
            ThemeAction::Init => Box::new(InitTheme),
            ThemeAction::Colors { colors } => Box::new(AddThemeColors {
                colors: colors_arg(&colors)?,
            }),
            ThemeAction::Apply { view } => Box::new(ApplyTheme { view }),
        },
        Commands::List => return Err(miette::miette!("list is not a generator")),
    };
    Ok(generator)
}

fn actions_arg(args: &[String]) -> miette::Result<Option<Vec<ActionSpec>>> {
    if args.is_empty() {
        return Ok(None);
    }
    args.iter()
        .map(|arg| ActionSpec::parse(arg).map_err(|reason| miette::miette!("--action {arg}: {reason}")))
        .collect::<miette::Result<Vec<_>>>()
        .map(Some)
}

fn colors_arg(args: &[String]) -> miette::Result<Option<Vec<ThemeColor>>> {
    if args.is_empty() {
        return Ok(None);
    }
    args.iter()
        .map(|arg| ThemeColor::parse(arg).map_err(|reason| miette::miette!("--color {arg}: {reason}")))
        .collect::<miette::Result<Vec<_>>>()
        .map(Some)
}

/// Resolves `reducer.field` arguments against the reducers' state interfaces.
fn store_fields(ctx: &mut GeneratorContext, args: &[String]) -> miette::Result<Option<Vec<StoreField>>> {
    if args.is_empty() {
        return Ok(None);
    }
    let index = ctx.index()?;
    args.iter()
        .map(|arg| {
            let (reducer, name) = arg
                .split_once('.')
                .ok_or_else(|| miette::miette!("--field {arg}: expected reducer.field"))?;
            let entry = index
                .reducer(reducer)
                .ok_or_else(|| miette::miette!("--field {arg}: no reducer named '{reducer}'"))?;
            let field = entry
                .fields
                .iter()
                .find(|f| f.name == name)
                .ok_or_else(|| miette::miette!("--field {arg}: '{reducer}' has no field '{name}'"))?;
            Ok(StoreField {
                reducer: entry.key.clone(),
                field: field.clone(),
            })
        })
        .collect::<miette::Result<Vec<_>>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_navigator_without_attach_is_standalone_when_named() {
        let cli = Cli::try_parse_from(["rnkit", "navigator", "app", "--kind", "tab"]).unwrap();
        let Some(Commands::Navigator { name, attach, standalone, .. }) = cli.command else {
            panic!("expected navigator command");
        };
        assert_eq!(name.as_deref(), Some("app"));
        assert!(attach.is_none());
        assert!(!standalone);
    }

    #[test]
    fn test_action_arguments() {
        assert_eq!(actions_arg(&[]).unwrap(), None);
        let parsed = actions_arg(&["reset".to_string(), "load:Task[]".to_string()]).unwrap().unwrap();
        assert_eq!(parsed, vec![ActionSpec::new("reset", None), ActionSpec::new("load", Some("Task[]"))]);
        assert!(actions_arg(&["not valid".to_string()]).is_err());
    }
}
