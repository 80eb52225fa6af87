//! Name derivation.
//!
//! Every generated identifier goes through [`NamingPolicy`] so names agree
//! across all files touched in a run: the state interface a reducer imports is
//! the one the state file exports, the action tags in the union are the ones
//! the dispatch block switches on.

use serde::{Deserialize, Serialize};

use crate::diagnostic::EngineError;

/// Case convention applied to a derived name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaseStyle {
    Pascal,
    Camel,
    Snake,
    Kebab,
    ScreamingSnake,
    /// Concatenate prefix, base and suffix as given.
    Preserve,
}

impl CaseStyle {
    /// Joins words in this case. `Preserve` concatenates them unchanged.
    pub fn join(self, words: &[String]) -> String {
        match self {
            Self::Pascal => words.iter().map(|w| capitalize(w)).collect(),
            Self::Camel => words
                .iter()
                .enumerate()
                .map(|(i, w)| if i == 0 { w.to_lowercase() } else { capitalize(w) })
                .collect(),
            Self::Snake => join_lower(words, "_"),
            Self::Kebab => join_lower(words, "-"),
            Self::ScreamingSnake => words
                .iter()
                .map(|w| w.to_uppercase())
                .collect::<Vec<_>>()
                .join("_"),
            Self::Preserve => words.concat(),
        }
    }

    /// Splits `name` into words and joins them in this case.
    pub fn apply(self, name: &str) -> String {
        match self {
            Self::Preserve => name.to_string(),
            _ => self.join(&split_words(name)),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

fn join_lower(words: &[String], separator: &str) -> String {
    words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Splits an identifier or phrase into words.
///
/// Breaks on non-alphanumeric characters, lower-to-upper transitions, the end
/// of an acronym (`HTTPServer` → `HTTP`, `Server`) and letter/digit
/// boundaries (`state1` → `state`, `1`).
pub fn split_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some(prev) = current.chars().last() {
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_alphabetic() && c.is_ascii_digit())
                || (prev.is_ascii_digit() && c.is_alphabetic())
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && next.map(|n| n.is_lowercase()).unwrap_or(false));
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Prefix, suffix and case for one kind of derived name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NameRule {
    pub prefix: String,
    pub suffix: String,
    pub case: CaseStyle,
}

impl NameRule {
    pub fn new(prefix: &str, suffix: &str, case: CaseStyle) -> Self {
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            case,
        }
    }

    /// Derives a name from `base`.
    pub fn apply(&self, base: &str) -> String {
        if self.case == CaseStyle::Preserve {
            return format!("{}{}{}", self.prefix, base, self.suffix);
        }
        let mut words = split_words(&self.prefix);
        words.extend(split_words(base));
        words.extend(split_words(&self.suffix));
        self.case.join(&words)
    }
}

impl Default for NameRule {
    fn default() -> Self {
        Self::new("", "", CaseStyle::Preserve)
    }
}

/// Configurable rules for every derived name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamingRules {
    pub component: NameRule,
    pub props: NameRule,
    pub state: NameRule,
    pub reducer: NameRule,
    pub reducer_state: NameRule,
    pub action_types: NameRule,
    pub navigator: NameRule,
    pub param_list: NameRule,
    pub thunk: NameRule,
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            component: NameRule::new("", "", CaseStyle::Pascal),
            props: NameRule::new("", "Props", CaseStyle::Pascal),
            state: NameRule::new("", "State", CaseStyle::Pascal),
            reducer: NameRule::new("", "Reducer", CaseStyle::Camel),
            reducer_state: NameRule::new("", "State", CaseStyle::Pascal),
            action_types: NameRule::new("", "ActionTypes", CaseStyle::Pascal),
            navigator: NameRule::new("", "Navigator", CaseStyle::Pascal),
            param_list: NameRule::new("", "ParamList", CaseStyle::Pascal),
            thunk: NameRule::new("", "", CaseStyle::Camel),
        }
    }
}

/// Pure name derivation driven by [`NamingRules`].
#[derive(Debug, Clone, Default)]
pub struct NamingPolicy {
    rules: NamingRules,
}

impl NamingPolicy {
    pub fn new(rules: NamingRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &NamingRules {
        &self.rules
    }

    /// `home screen` → `HomeScreen`
    pub fn component(&self, base: &str) -> String {
        self.rules.component.apply(base)
    }

    /// Props interface of a component: `Home` → `HomeProps`.
    pub fn props(&self, component: &str) -> String {
        self.rules.props.apply(component)
    }

    /// State interface of a class component: `Home` → `HomeState`.
    pub fn state(&self, component: &str) -> String {
        self.rules.state.apply(component)
    }

    /// Interface holding the mapped store fields: `Home` → `HomeStateProps`.
    pub fn state_props(&self, component: &str) -> String {
        format!("{component}StateProps")
    }

    /// Interface holding the mapped actions: `Home` → `HomeDispatchProps`.
    pub fn dispatch_props(&self, component: &str) -> String {
        format!("{component}DispatchProps")
    }

    /// Folder and `combineReducers` key of a reducer: `Task List` → `taskList`.
    pub fn reducer_key(&self, base: &str) -> String {
        CaseStyle::Camel.apply(base)
    }

    /// `task` → `taskReducer`
    pub fn reducer(&self, base: &str) -> String {
        self.rules.reducer.apply(base)
    }

    /// `task` → `TaskState`
    pub fn reducer_state(&self, base: &str) -> String {
        self.rules.reducer_state.apply(base)
    }

    /// `task` → `TaskActionTypes`
    pub fn action_types(&self, base: &str) -> String {
        self.rules.action_types.apply(base)
    }

    /// Literal tag of an action: (`task`, `anotherAction`) → `TASK/ANOTHER_ACTION`.
    pub fn action_tag(&self, reducer: &str, action: &str) -> String {
        format!(
            "{}/{}",
            CaseStyle::ScreamingSnake.apply(reducer),
            CaseStyle::ScreamingSnake.apply(action)
        )
    }

    /// Name of the action that sets one state field: `state1` → `setState1`.
    pub fn setter_action(&self, field: &str) -> String {
        let mut words = vec!["set".to_string()];
        words.extend(split_words(field));
        CaseStyle::Camel.join(&words)
    }

    /// Setter bound by a state hook; same shape as [`setter_action`](Self::setter_action).
    pub fn hook_setter(&self, field: &str) -> String {
        self.setter_action(field)
    }

    /// `home` → `HomeNavigator`
    pub fn navigator(&self, base: &str) -> String {
        self.rules.navigator.apply(base)
    }

    /// Param list of a navigator: `home` → `HomeNavigatorParamList`.
    pub fn param_list(&self, base: &str) -> String {
        self.rules.param_list.apply(&self.navigator(base))
    }

    /// `Fetch tasks` → `fetchTasks`
    pub fn thunk(&self, base: &str) -> String {
        self.rules.thunk.apply(base)
    }
}

const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "let", "static", "yield", "await", "interface",
    "implements", "package", "private", "protected", "public",
];

/// Checks that `name` can be used as an identifier in generated code.
pub fn validate_identifier(name: &str) -> Result<(), EngineError> {
    let mut chars = name.chars();
    let first = chars
        .next()
        .ok_or_else(|| EngineError::validation("name cannot be empty"))?;

    if !(first.is_alphabetic() || first == '_' || first == '$') {
        return Err(EngineError::validation(format!(
            "'{name}' must start with a letter, '_' or '$'"
        )));
    }
    if let Some(bad) = chars.find(|c| !(c.is_alphanumeric() || *c == '_' || *c == '$')) {
        return Err(EngineError::validation(format!("'{name}' contains '{bad}'")));
    }
    if RESERVED.contains(&name) {
        return Err(EngineError::validation(format!("'{name}' is a reserved word")));
    }
    Ok(())
}

/// Checks a base name typed by the user, which may contain spaces or dashes.
pub fn validate_base_name(name: &str) -> Result<(), EngineError> {
    let words = split_words(name);
    if words.is_empty() {
        return Err(EngineError::validation("name cannot be empty"));
    }
    if words[0].chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
        return Err(EngineError::validation(format!("'{name}' cannot start with a digit")));
    }
    if name.chars().any(|c| !(c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))) {
        return Err(EngineError::validation(format!(
            "'{name}' may only contain letters, digits, spaces, '-' and '_'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("state1"), vec!["state", "1"]);
        assert_eq!(split_words("anotherAction"), vec!["another", "Action"]);
        assert_eq!(split_words("HTTPServer"), vec!["HTTP", "Server"]);
        assert_eq!(split_words("task list-item"), vec!["task", "list", "item"]);
    }

    #[test]
    fn test_case_conversions() {
        assert_eq!(CaseStyle::Pascal.apply("task list"), "TaskList");
        assert_eq!(CaseStyle::Camel.apply("TaskList"), "taskList");
        assert_eq!(CaseStyle::Snake.apply("TaskList"), "task_list");
        assert_eq!(CaseStyle::Kebab.apply("TaskList"), "task-list");
        assert_eq!(CaseStyle::ScreamingSnake.apply("setState1"), "SET_STATE_1");
        assert_eq!(CaseStyle::Preserve.apply("my_Thing"), "my_Thing");
    }

    #[test]
    fn test_default_policy() {
        let naming = NamingPolicy::default();
        assert_eq!(naming.component("home"), "Home");
        assert_eq!(naming.props("Home"), "HomeProps");
        assert_eq!(naming.state("Home"), "HomeState");
        assert_eq!(naming.reducer("task"), "taskReducer");
        assert_eq!(naming.reducer_state("task"), "TaskState");
        assert_eq!(naming.action_types("task"), "TaskActionTypes");
        assert_eq!(naming.navigator("home"), "HomeNavigator");
        assert_eq!(naming.param_list("home"), "HomeNavigatorParamList");
        assert_eq!(naming.thunk("fetch tasks"), "fetchTasks");
    }

    #[test]
    fn test_action_tags() {
        let naming = NamingPolicy::default();
        let setter = naming.setter_action("state1");
        assert_eq!(setter, "setState1");
        assert_eq!(naming.action_tag("task", &setter), "TASK/SET_STATE_1");
        assert_eq!(naming.action_tag("task", "anotherAction"), "TASK/ANOTHER_ACTION");
    }

    #[test]
    fn test_configured_rules() {
        let mut rules = NamingRules::default();
        rules.component = NameRule::new("", "Screen", CaseStyle::Pascal);
        rules.reducer_state = NameRule::new("I", "State", CaseStyle::Preserve);
        let naming = NamingPolicy::new(rules);
        assert_eq!(naming.component("home"), "HomeScreen");
        assert_eq!(naming.reducer_state("Task"), "ITaskState");
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("state1").is_ok());
        assert!(validate_identifier("$el").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("1abc").is_err());
        assert!(validate_identifier("a-b").is_err());
        assert!(validate_identifier("class").is_err());
    }

    #[test]
    fn test_validate_base_name() {
        assert!(validate_base_name("task list").is_ok());
        assert!(validate_base_name("   ").is_err());
        assert!(validate_base_name("9lives").is_err());
        assert!(validate_base_name("a/b").is_err());
    }
}
