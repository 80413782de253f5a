//! UI components.

pub mod diagram;
pub mod dialogs;
