//! Bridge between the egui thread and the backend worker running the view controller.

pub mod commands;
pub mod runtime;
