//! The prompt boundary.
//!
//! Generators ask for missing input through a [`Prompter`]. The CLI backs it
//! with terminal prompts; tests use [`ScriptedPrompter`]. Input is validated
//! here, before a generator touches any file, and a rejected answer is asked
//! again rather than propagated.

use std::collections::VecDeque;

use crate::diagnostic::EngineError;
use crate::model::FieldSpec;
use crate::naming::{validate_base_name, validate_identifier};

/// Validator run on every text answer; `Err` carries the reason shown to the user.
pub type Validator<'a> = &'a dyn Fn(&str) -> Result<(), String>;

/// Interactive input. Every method returns [`EngineError::Cancelled`] when
/// the user aborts.
pub trait Prompter {
    /// Free text, re-asked until `validate` accepts it.
    fn input(&mut self, message: &str, placeholder: &str, validate: Validator<'_>) -> Result<String, EngineError>;

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, EngineError>;

    /// Index of the chosen option.
    fn select(&mut self, message: &str, options: &[String]) -> Result<usize, EngineError>;

    /// Indices of the chosen options, possibly none.
    fn multiselect(&mut self, message: &str, options: &[String]) -> Result<Vec<usize>, EngineError>;
}

/// Result of reading one `name[?]:type[=initial]` answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome {
    /// Empty answer: stop collecting.
    Skip,
    FieldAdded(FieldSpec),
    ValidationFailed { reason: String },
}

impl FieldOutcome {
    /// Classifies an answer. `taken` holds names that already exist;
    /// `require_initial` rejects required fields without an initial value.
    pub fn parse(input: &str, taken: &[String], require_initial: bool) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return Self::Skip;
        }
        match parse_field(input) {
            Err(reason) => Self::ValidationFailed { reason },
            Ok(field) if taken.contains(&field.name) => Self::ValidationFailed {
                reason: format!("'{}' already exists", field.name),
            },
            Ok(field) if require_initial && !field.optional && field.initial_value.is_none() => {
                Self::ValidationFailed {
                    reason: format!("'{}' needs an initial value ({}:{}=value)", field.name, field.name, field.type_text),
                }
            }
            Ok(field) => Self::FieldAdded(field),
        }
    }
}

/// Parses `name[?]:type[=initial]`. The type defaults to `any` when omitted.
pub fn parse_field(input: &str) -> Result<FieldSpec, String> {
    let (head, rest) = match input.split_once(':') {
        Some((head, rest)) => (head.trim(), rest.trim()),
        None => (input.trim(), ""),
    };
    let (name, optional) = match head.strip_suffix('?') {
        Some(name) => (name.trim(), true),
        None => (head, false),
    };
    validate_identifier(name).map_err(reason)?;

    let (type_text, initial) = match initializer_split(rest) {
        Some(at) => (rest[..at].trim(), Some(rest[at + 1..].trim())),
        None => (rest, None),
    };
    if let Some("") = initial {
        return Err(format!("'{name}' has an empty initial value"));
    }

    let mut field = FieldSpec::new(name, if type_text.is_empty() { "any" } else { type_text });
    if optional {
        field = field.optional();
    }
    if let Some(initial) = initial {
        field = field.with_initial(initial);
    }
    Ok(field)
}

/// Message of a validation error, without the error prefix.
pub fn reason(error: EngineError) -> String {
    match error {
        EngineError::Validation { message } => message,
        other => other.to_string(),
    }
}

/// Byte offset of the `=` starting an initializer, skipping `=>` and
/// comparison operators inside function types.
fn initializer_split(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    (0..bytes.len()).find(|&i| {
        bytes[i] == b'='
            && bytes.get(i + 1).map_or(true, |next| *next != b'>' && *next != b'=')
            && (i == 0 || !matches!(bytes[i - 1], b'=' | b'!' | b'<' | b'>'))
    })
}

/// Asks for fields until an empty answer. Names in `taken` and names already
/// collected are rejected.
pub fn collect_fields(
    prompter: &mut dyn Prompter,
    message: &str,
    taken: &[String],
    require_initial: bool,
) -> Result<Vec<FieldSpec>, EngineError> {
    let mut fields: Vec<FieldSpec> = Vec::new();
    loop {
        let names: Vec<String> = taken
            .iter()
            .cloned()
            .chain(fields.iter().map(|f| f.name.clone()))
            .collect();
        let validate = |text: &str| match FieldOutcome::parse(text, &names, require_initial) {
            FieldOutcome::ValidationFailed { reason } => Err(reason),
            _ => Ok(()),
        };
        let answer = prompter.input(message, "name?:type=initial (empty to finish)", &validate)?;

        match FieldOutcome::parse(&answer, &names, require_initial) {
            FieldOutcome::Skip => return Ok(fields),
            FieldOutcome::FieldAdded(field) => {
                tracing::debug!(field = %field.signature(), "field added");
                fields.push(field);
            }
            FieldOutcome::ValidationFailed { reason } => {
                tracing::debug!(%reason, "field rejected");
            }
        }
    }
}

/// Asks for a non-empty identifier-like name.
pub fn ask_name(prompter: &mut dyn Prompter, message: &str) -> Result<String, EngineError> {
    let validate = |text: &str| validate_base_name(text.trim()).map_err(reason);
    Ok(prompter.input(message, "", &validate)?.trim().to_string())
}

/// One queued answer of a [`ScriptedPrompter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Confirm(bool),
    Select(usize),
    Multi(Vec<usize>),
    Cancel,
}

/// A [`Prompter`] answering from a queue. Text answers rejected by the
/// validator are recorded and the next answer is used, like a re-prompt.
/// Running out of answers cancels.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    rejected: Vec<(String, String)>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, answer: impl Into<String>) -> Self {
        self.answers.push_back(Answer::Text(answer.into()));
        self
    }

    pub fn with_confirm(mut self, answer: bool) -> Self {
        self.answers.push_back(Answer::Confirm(answer));
        self
    }

    pub fn with_select(mut self, index: usize) -> Self {
        self.answers.push_back(Answer::Select(index));
        self
    }

    pub fn with_multi(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.answers.push_back(Answer::Multi(indices.into_iter().collect()));
        self
    }

    /// `(answer, reason)` for every answer the validator turned down.
    pub fn rejected(&self) -> &[(String, String)] {
        &self.rejected
    }

    /// Messages asked so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, message: &str) -> Result<Answer, EngineError> {
        self.asked.push(message.to_string());
        match self.answers.pop_front() {
            Some(Answer::Cancel) | None => Err(EngineError::Cancelled),
            Some(answer) => Ok(answer),
        }
    }

    fn mismatch(message: &str, answer: &Answer) -> EngineError {
        EngineError::validation(format!("scripted answer {answer:?} does not fit prompt '{message}'"))
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, message: &str, _placeholder: &str, validate: Validator<'_>) -> Result<String, EngineError> {
        loop {
            match self.next(message)? {
                Answer::Text(text) => match validate(&text) {
                    Ok(()) => return Ok(text),
                    Err(reason) => self.rejected.push((text, reason)),
                },
                other => return Err(Self::mismatch(message, &other)),
            }
        }
    }

    fn confirm(&mut self, message: &str, _default: bool) -> Result<bool, EngineError> {
        match self.next(message)? {
            Answer::Confirm(value) => Ok(value),
            other => Err(Self::mismatch(message, &other)),
        }
    }

    fn select(&mut self, message: &str, options: &[String]) -> Result<usize, EngineError> {
        match self.next(message)? {
            Answer::Select(index) if index < options.len() => Ok(index),
            other => Err(Self::mismatch(message, &other)),
        }
    }

    fn multiselect(&mut self, message: &str, options: &[String]) -> Result<Vec<usize>, EngineError> {
        match self.next(message)? {
            Answer::Multi(indices) if indices.iter().all(|i| *i < options.len()) => Ok(indices),
            other => Err(Self::mismatch(message, &other)),
        }
    }
}
