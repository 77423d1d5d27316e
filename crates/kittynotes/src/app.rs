use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::time::Duration;

use crate::config::Config;
use crate::export::Exporter;
use crate::notepad::Notepad;
use crate::store::Store;
use crate::ui_state::UiState;
use notecore::Metrics;

pub use crate::ui_state::Mode;

const WELCOME_MSG: &str = "Welcome to Kitty Notes!";
const CLEARED_MSG: &str = "Text cleared!";
const EMPTY_EXPORT_MSG: &str = "Nothing to save! Write something first";

/// The application context: every piece of state, owned in one place and
/// passed to the UI by reference. No ambient globals.
pub struct App {
    pub notepad: Notepad,
    pub config: Config,
    pub ui_state: UiState,
    pub store: Store,
    pub exporter: Exporter,
    pub metrics: Metrics,
}

impl App {
    pub async fn new() -> Result<Self> {
        let config = Config::load().await?;
        let store = Store::load(Duration::from_millis(config.autosave.debounce_ms)).await;
        Ok(Self::assemble(config, store))
    }

    fn assemble(config: Config, store: Store) -> Self {
        let mut notepad = Notepad::new();
        if let Some(saved) = store.saved_content() {
            notepad.set_text(saved);
        }
        let metrics = Metrics::compute(&notepad.text());
        let exporter = Exporter::new(config.export.directory.clone());

        Self {
            notepad,
            config,
            ui_state: UiState::new(),
            store,
            exporter,
            metrics,
        }
    }

    /// Show the one-time welcome banner.
    pub fn greet_on_first_run(&mut self) {
        if !self.store.has_seen_welcome() {
            self.ui_state.notifications.notify(WELCOME_MSG);
            self.store.mark_welcome_seen();
        }
    }

    pub fn mode(&self) -> Mode {
        self.ui_state.mode()
    }

    pub fn should_quit(&self) -> bool {
        self.ui_state.should_quit()
    }

    pub fn quit(&mut self) {
        self.ui_state.quit();
    }

    /// Per-tick housekeeping between input events.
    pub fn update(&mut self) {
        self.ui_state.update();
    }

    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        match self.ui_state.mode() {
            Mode::Editing => self.handle_editing_key(key).await,
            Mode::ClearConfirm => {
                self.handle_clear_confirm_key(key);
                Ok(())
            }
            Mode::Help => {
                self.handle_help_key(key);
                Ok(())
            }
        }
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        // The mascot lives in the title bar; a click there changes its mood.
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            if mouse.row == 0 {
                self.ui_state.cycle_mood();
            }
        }
    }

    async fn handle_editing_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => self.export_plain_text().await,
                KeyCode::Char('p') => self.export_pdf().await,
                KeyCode::Char('l') => self.request_clear(),
                KeyCode::Char('q') => self.ui_state.quit(),
                _ => {}
            }
            return Ok(());
        }

        let select = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Char(c) => {
                self.notepad.insert_char(c);
                self.after_edit();
            }
            KeyCode::Enter => {
                self.notepad.insert_newline();
                self.after_edit();
            }
            KeyCode::Tab => {
                self.notepad.insert_tab();
                self.after_edit();
            }
            KeyCode::Backspace => {
                if self.notepad.backspace() {
                    self.after_edit();
                }
            }
            KeyCode::Delete => {
                if self.notepad.delete_forward() {
                    self.after_edit();
                }
            }
            KeyCode::Left => self.notepad.move_left(select),
            KeyCode::Right => self.notepad.move_right(select),
            KeyCode::Up => self.notepad.move_up(select),
            KeyCode::Down => self.notepad.move_down(select),
            KeyCode::Home => self.notepad.move_home(select),
            KeyCode::End => self.notepad.move_end(select),
            KeyCode::PageUp => self.notepad.page_up(),
            KeyCode::PageDown => self.notepad.page_down(),
            KeyCode::F(1) => self.ui_state.toggle_help(),
            _ => {}
        }
        Ok(())
    }

    fn handle_clear_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.notepad.clear();
                self.after_edit();
                self.ui_state.notifications.notify(CLEARED_MSG);
                self.ui_state.set_mode(Mode::Editing);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.ui_state.set_mode(Mode::Editing);
            }
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::F(1) => self.ui_state.toggle_help(),
            _ => {}
        }
    }

    /// Recompute counters and queue the autosave after any buffer change.
    fn after_edit(&mut self) {
        let text = self.notepad.text();
        self.metrics = Metrics::compute(&text);
        self.store.record_change(text);
    }

    fn request_clear(&mut self) {
        // Clearing an empty buffer is a silent no-op.
        if self.notepad.is_empty() {
            return;
        }
        self.ui_state.enter_clear_confirm();
    }

    async fn export_plain_text(&mut self) {
        if self.notepad.is_empty() {
            self.ui_state.notifications.notify(EMPTY_EXPORT_MSG);
            return;
        }
        let text = self.notepad.text();
        match self.exporter.export_plain_text(&text).await {
            Ok(name) => self
                .ui_state
                .notifications
                .notify(format!("TXT file saved: {}", name)),
            Err(e) => {
                log::error!("Plain text export failed: {:#}", e);
                self.ui_state
                    .notifications
                    .notify("Could not save the TXT file");
            }
        }
    }

    async fn export_pdf(&mut self) {
        if self.notepad.is_empty() {
            self.ui_state.notifications.notify(EMPTY_EXPORT_MSG);
            return;
        }
        let text = self.notepad.text();
        match self.exporter.export_pdf(&text, &self.metrics).await {
            Ok(name) => self
                .ui_state
                .notifications
                .notify(format!("PDF saved: {}", name)),
            Err(e) => {
                log::error!("PDF export failed: {:#}", e);
                self.ui_state.notifications.notify("Could not save the PDF");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn test_app() -> App {
        App::assemble(Config::default(), Store::in_memory())
    }

    async fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            let code = if c == '\n' {
                KeyCode::Enter
            } else {
                KeyCode::Char(c)
            };
            app.handle_key_event(key(code)).await.unwrap();
        }
    }

    #[test]
    fn test_app_starts_empty() {
        let app = test_app();
        assert_eq!(app.mode(), Mode::Editing);
        assert!(app.notepad.is_empty());
        assert_eq!(app.metrics, Metrics::compute(""));
        assert_eq!(app.metrics.lines, 1);
        assert!(!app.should_quit());
    }

    #[test]
    fn test_restored_content_feeds_metrics() {
        let store = Store::in_memory_restored("saved note\nsecond line");
        let app = App::assemble(Config::default(), store);
        assert_eq!(app.notepad.text(), "saved note\nsecond line");
        assert_eq!(app.metrics.words, 4);
        assert_eq!(app.metrics.lines, 2);
    }

    #[tokio::test]
    async fn test_typing_updates_metrics_and_autosave() {
        let mut app = test_app();
        type_str(&mut app, "hello world").await;

        assert_eq!(app.notepad.text(), "hello world");
        assert_eq!(app.metrics.words, 2);
        assert_eq!(app.metrics.chars, 11);
        assert!(app.store.is_dirty());
    }

    #[tokio::test]
    async fn test_tab_key_inserts_literal_tab() {
        let mut app = test_app();
        type_str(&mut app, "ab").await;
        app.notepad.set_caret(1);
        app.handle_key_event(key(KeyCode::Tab)).await.unwrap();

        assert_eq!(app.notepad.text(), "a\tb");
        assert_eq!(app.notepad.caret(), 2);
        assert_eq!(app.metrics.chars, 3);
    }

    #[tokio::test]
    async fn test_clear_needs_confirmation() {
        let mut app = test_app();
        type_str(&mut app, "precious text").await;

        app.handle_key_event(ctrl('l')).await.unwrap();
        assert_eq!(app.mode(), Mode::ClearConfirm);

        // Declining leaves the buffer untouched.
        app.handle_key_event(key(KeyCode::Char('n'))).await.unwrap();
        assert_eq!(app.mode(), Mode::Editing);
        assert_eq!(app.notepad.text(), "precious text");

        // Confirming empties it and the counters follow.
        app.handle_key_event(ctrl('l')).await.unwrap();
        app.handle_key_event(key(KeyCode::Char('y'))).await.unwrap();
        assert!(app.notepad.is_empty());
        assert_eq!(app.metrics, Metrics::compute(""));
        assert!(app
            .ui_state
            .notifications
            .active()
            .iter()
            .any(|(n, _)| n.message == "Text cleared!"));
    }

    #[tokio::test]
    async fn test_clear_on_empty_buffer_is_silent() {
        let mut app = test_app();
        app.handle_key_event(ctrl('l')).await.unwrap();
        assert_eq!(app.mode(), Mode::Editing);
        assert!(app.ui_state.notifications.is_empty());
    }

    #[tokio::test]
    async fn test_escape_also_declines_clear() {
        let mut app = test_app();
        type_str(&mut app, "keep me").await;
        app.handle_key_event(ctrl('l')).await.unwrap();
        app.handle_key_event(key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.notepad.text(), "keep me");
    }

    #[tokio::test]
    async fn test_empty_export_notifies_and_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = test_app();
        app.exporter = Exporter::new(Some(temp_dir.path().to_path_buf()));

        app.handle_key_event(ctrl('s')).await.unwrap();
        assert!(app
            .ui_state
            .notifications
            .active()
            .iter()
            .any(|(n, _)| n.message == EMPTY_EXPORT_MSG));
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_plain_text_export_writes_named_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = test_app();
        app.exporter = Exporter::new(Some(temp_dir.path().to_path_buf()));

        type_str(&mut app, "purr").await;
        app.handle_key_event(ctrl('s')).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("kitty-notes-"));
        assert!(names[0].ends_with(".txt"));
    }

    #[tokio::test]
    async fn test_pdf_export_writes_named_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = test_app();
        app.exporter = Exporter::new(Some(temp_dir.path().to_path_buf()));

        type_str(&mut app, "purr purr").await;
        app.handle_key_event(ctrl('p')).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".pdf"));
    }

    #[tokio::test]
    async fn test_ctrl_q_quits() {
        let mut app = test_app();
        app.handle_key_event(ctrl('q')).await.unwrap();
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn test_help_toggle() {
        let mut app = test_app();
        app.handle_key_event(key(KeyCode::F(1))).await.unwrap();
        assert_eq!(app.mode(), Mode::Help);

        // Keys other than Esc/F1 are ignored in help.
        app.handle_key_event(key(KeyCode::Char('x'))).await.unwrap();
        assert_eq!(app.mode(), Mode::Help);
        assert!(app.notepad.is_empty());

        app.handle_key_event(key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.mode(), Mode::Editing);
    }

    #[test]
    fn test_welcome_shown_once() {
        let mut app = test_app();
        app.greet_on_first_run();
        assert_eq!(app.ui_state.notifications.len(), 1);

        app.greet_on_first_run();
        assert_eq!(app.ui_state.notifications.len(), 1);
    }

    #[test]
    fn test_title_bar_click_changes_mood() {
        let mut app = test_app();
        let before = app.ui_state.mood();
        app.handle_mouse_event(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert_ne!(app.ui_state.mood(), before);

        // Clicks elsewhere do nothing.
        let mood = app.ui_state.mood();
        app.handle_mouse_event(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: 5,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(app.ui_state.mood(), mood);
    }
}
