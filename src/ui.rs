//! Ratatui front-end for the library system: a numbered main menu, modal
//! prompts that collect input for each operation, and output screens that hold
//! results until the user presses Enter.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
