//! Ratatui front-end for the trip binder. The grid shows every item as a card;
//! opening one selects it in the store and switches to the detail screen,
//! which stays up exactly as long as the store has a selection.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
