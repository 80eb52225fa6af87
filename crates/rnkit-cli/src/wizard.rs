//! Terminal prompting and the interactive menu.

use std::io;

use rnkit_engine::generate::prompt::Validator;
use rnkit_engine::generate::{
    parse_field, AddActionTypes, AddNavigatorScreen, AddReducerState, AddThemeColors, AddViewProps, AddViewState,
    ApplyTheme, ConnectView, CreateNavigator, CreateReducer, CreateThunk, CreateView, Generator, InitTheme, Prompter,
    WrapView,
};
use rnkit_engine::{EngineError, FieldSpec};

/// [`Prompter`] backed by cliclack.
///
/// Without a terminal every question takes its default: empty text where
/// the validator accepts it, the default answer of a confirmation, no
/// options of a multiselect. Questions without a default fail and name the
/// missing answer.
pub struct TermPrompter {
    interactive: bool,
}

impl TermPrompter {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }

    fn unanswered(message: &str) -> EngineError {
        EngineError::validation(format!(
            "'{message}' needs an answer; pass it as an argument or run in a terminal"
        ))
    }
}

/// Ctrl-C and Esc surface as `Interrupted`.
fn terminal_error(error: io::Error) -> EngineError {
    if error.kind() == io::ErrorKind::Interrupted {
        EngineError::Cancelled
    } else {
        EngineError::io("<terminal>", error.to_string())
    }
}

impl Prompter for TermPrompter {
    fn input(&mut self, message: &str, placeholder: &str, validate: Validator<'_>) -> Result<String, EngineError> {
        if !self.interactive {
            return match validate("") {
                Ok(()) => Ok(String::new()),
                Err(_) => Err(Self::unanswered(message)),
            };
        }
        loop {
            let answer: String = cliclack::input(message)
                .placeholder(placeholder)
                .required(false)
                .interact()
                .map_err(terminal_error)?;
            match validate(&answer) {
                Ok(()) => return Ok(answer),
                Err(reason) => {
                    tracing::debug!(%reason, "answer rejected");
                    cliclack::log::warning(reason).map_err(terminal_error)?;
                }
            }
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, EngineError> {
        if !self.interactive {
            return Ok(default);
        }
        cliclack::confirm(message)
            .initial_value(default)
            .interact()
            .map_err(terminal_error)
    }

    fn select(&mut self, message: &str, options: &[String]) -> Result<usize, EngineError> {
        if !self.interactive {
            return Err(Self::unanswered(message));
        }
        let mut select = cliclack::select(message);
        for (i, option) in options.iter().enumerate() {
            select = select.item(i, option, "");
        }
        select.interact().map_err(terminal_error)
    }

    fn multiselect(&mut self, message: &str, options: &[String]) -> Result<Vec<usize>, EngineError> {
        if !self.interactive {
            return Ok(Vec::new());
        }
        let mut multi = cliclack::multiselect(message);
        for (i, option) in options.iter().enumerate() {
            multi = multi.item(i, option, "");
        }
        multi.required(false).interact().map_err(terminal_error)
    }
}

/// Parses repeated `--field name[?]:type[=initial]` arguments. No arguments
/// means "ask".
pub fn fields(args: &[String]) -> miette::Result<Option<Vec<FieldSpec>>> {
    if args.is_empty() {
        return Ok(None);
    }
    args.iter()
        .map(|arg| parse_field(arg).map_err(|reason| miette::miette!("--field {arg}: {reason}")))
        .collect::<miette::Result<Vec<_>>>()
        .map(Some)
}

/// Repeated list arguments; none means "ask".
pub fn list(args: Vec<String>) -> Option<Vec<String>> {
    if args.is_empty() {
        None
    } else {
        Some(args)
    }
}

/// Menu entries in display order.
const MENU: &[(&str, &str)] = &[
    ("view", "Create a view"),
    ("props", "Add props to a view"),
    ("state", "Add state to a view"),
    ("wrap", "Wrap a view's render output"),
    ("reducer", "Create a reducer"),
    ("reducer-state", "Add state to a reducer"),
    ("actions", "Add action types to a reducer"),
    ("thunk", "Create a thunk"),
    ("connect", "Connect a view to the store"),
    ("navigator", "Create a navigator"),
    ("screen", "Add a screen to a navigator"),
    ("theme-init", "Create the theme"),
    ("theme-colors", "Add theme colors"),
    ("theme-apply", "Apply the theme to a view"),
];

/// A generator with nothing filled in, for the menu entry `key`.
pub fn blank(key: &str) -> Option<Box<dyn Generator>> {
    let generator: Box<dyn Generator> = match key {
        "view" => Box::new(CreateView::default()),
        "props" => Box::new(AddViewProps::default()),
        "state" => Box::new(AddViewState::default()),
        "wrap" => Box::new(WrapView::default()),
        "reducer" => Box::new(CreateReducer::default()),
        "reducer-state" => Box::new(AddReducerState::default()),
        "actions" => Box::new(AddActionTypes::default()),
        "thunk" => Box::new(CreateThunk::default()),
        "connect" => Box::new(ConnectView::default()),
        "navigator" => Box::new(CreateNavigator::default()),
        "screen" => Box::new(AddNavigatorScreen::default()),
        "theme-init" => Box::new(InitTheme),
        "theme-colors" => Box::new(AddThemeColors::default()),
        "theme-apply" => Box::new(ApplyTheme::default()),
        _ => return None,
    };
    Some(generator)
}

/// Asks which generator to run.
pub fn menu() -> Result<Box<dyn Generator>, EngineError> {
    let mut select = cliclack::select("What do you want to do?");
    for (key, label) in MENU {
        select = select.item(*key, *label, *key);
    }
    let key: &str = select.interact().map_err(terminal_error)?;
    blank(key).ok_or_else(|| EngineError::validation(format!("unknown action '{key}'")))
}
