// Kitty Notes library exports

pub mod app;
pub mod config;
pub mod export;
pub mod notepad;
pub mod notify;
pub mod store;
pub mod ui;
pub mod ui_state;

pub use app::{App, Mode};
pub use config::Config;
pub use notepad::Notepad;
pub use notify::NotificationCenter;
pub use store::Store;
pub use ui_state::UiState;
