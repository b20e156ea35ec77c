/// State management module
///
/// This module holds application state that is not owned by a widget:
/// - The action selector (action.rs)

pub mod action;
