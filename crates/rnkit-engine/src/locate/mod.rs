//! Declaration locators.
//!
//! Pure queries over a [`SourceFile`](crate::source::SourceFile). A construct
//! that is not there is `None`; only input that cannot be classified at all is
//! an error.

mod component;
mod declarations;
mod decorator;
mod hooks;
mod reducer;

pub use component::{call_chain, component_nodes, find_component, unwrap_calls, ComponentNodes};
pub use declarations::{
    declaration_of, declared_name, find_class, find_class_field, find_constructor, find_function,
    find_interface, find_jsx_element, find_method, find_type_alias, find_variable, find_variable_object,
    is_default_export, jsx_tag_name, statement_declaring, top_level_declarations,
};
pub use decorator::{arrow_returned_object, classify_argument, decorator_or_hoc_nodes, find_decorator_or_hoc, CallNodes};
pub use hooks::{find_state_hooks, state_hook_declarations};
pub use reducer::{
    case_test, dispatch_switch, find_action_type_union, find_combine_reducers_object, find_dispatch_block,
    is_sentinel, member_tag, union_members, CaseClause, DispatchBlock,
};
