//! Mnemograph TUI - interactive terminal viewer for retention graphs

pub mod app;
pub mod event;
pub mod tui;
pub mod ui;
pub mod views;

pub use app::App;
pub use tui::Tui;
