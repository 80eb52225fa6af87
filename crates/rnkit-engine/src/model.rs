//! Domain values shared by locators, mutators and generators.
//!
//! These are derived views over file text: locators build them from a
//! [`SourceFile`](crate::source::SourceFile) on demand and nothing caches them
//! across edits.

use serde::{Deserialize, Serialize};

/// A props, state, hook or payload field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    /// TypeScript type text, e.g. `string` or `Task[]`.
    pub type_text: String,
    pub optional: bool,
    /// Initial value expression, e.g. `''` or `0`.
    pub initial_value: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, type_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_text: type_text.into(),
            optional: false,
            initial_value: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_initial(mut self, value: impl Into<String>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    /// `name?: type` as it appears in an interface.
    pub fn signature(&self) -> String {
        let marker = if self.optional { "?" } else { "" };
        format!("{}{}: {}", self.name, marker, self.type_text)
    }
}

/// A property of an object literal: `key: value`, or shorthand `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectProperty {
    pub key: String,
    pub value: String,
}

impl ObjectProperty {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A shorthand property (`{ fetchTasks }`).
    pub fn shorthand(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            value: key.clone(),
            key,
        }
    }

    pub fn render(&self) -> String {
        if self.key == self.value {
            self.key.clone()
        } else {
            format!("{}: {}", self.key, self.value)
        }
    }
}

/// Which syntactic form a component is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentKind {
    Class,
    Function,
    ArrowFunction,
}

impl ComponentKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Function => "function",
            Self::ArrowFunction => "arrow function",
        }
    }
}

/// How the component leaves its module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStyle {
    Default,
    Named(String),
}

/// The principal component of a view file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
    /// Declared name: the class or function name, or the variable for arrows.
    pub name: String,
    pub kind: ComponentKind,
    pub props_type: Option<String>,
    /// Only ever set for class components.
    pub state_type: Option<String>,
    pub export: ExportStyle,
    /// Callee text of the call wrapping the component, if any (`memo`, `connect(...)`).
    pub wrapped_by: Option<String>,
}

/// One `const [value, setValue] = useState(initial)` binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateHook {
    pub name: String,
    pub setter: Option<String>,
    pub initial_value: Option<String>,
    pub type_argument: Option<String>,
}

/// Where a decorator-or-HOC call sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSite {
    /// `@connect(...)` on a class.
    Decorator,
    /// `connect(...)(Component)` around a function or arrow component.
    Hoc,
}

/// Rough shape of a call argument, enough to decide how to merge into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Null,
    ObjectLiteral,
    /// An arrow function whose expression body is an (optionally
    /// parenthesized) object literal.
    ArrowReturningObject,
    Identifier,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArgument {
    pub text: String,
    pub kind: ArgumentKind,
}

/// A decorator invocation on a class, or a higher-order wrapping call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratorOrHocCall {
    pub callee: String,
    pub site: CallSite,
    pub arguments: Vec<CallArgument>,
    pub type_arguments: Vec<String>,
}

/// A member of an action-type union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTypeMember {
    /// Value of the literal `type` property, without quotes.
    pub tag: Option<String>,
    pub payload_type: Option<String>,
    pub text: String,
}

/// A named union of action shapes: `type TaskActionTypes = { type: 'X' } | ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTypeUnion {
    pub name: String,
    /// The alias is the placeholder `any`.
    pub is_sentinel: bool,
    pub members: Vec<ActionTypeMember>,
}

impl ActionTypeUnion {
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.members.iter().filter_map(|m| m.tag.as_deref())
    }
}
