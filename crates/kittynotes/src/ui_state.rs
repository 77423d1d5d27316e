use crate::notify::NotificationCenter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Editing,
    ClearConfirm,
    Help,
}

/// Cat moods for the title-bar mascot, cycled on click.
pub const MOODS: [&str; 8] = [
    "=^.^=", "=^o^=", "=^w^=", "=^_^=", "=T.T=", "=o.o=", "=-.-=", "=>.<=",
];

pub struct UiState {
    mode: Mode,
    pub notifications: NotificationCenter,
    should_quit: bool,
    mood_index: usize,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            mode: Mode::Editing,
            notifications: NotificationCenter::new(),
            should_quit: false,
            mood_index: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn enter_clear_confirm(&mut self) {
        self.mode = Mode::ClearConfirm;
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            Mode::Help => Mode::Editing,
            _ => Mode::Help,
        };
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Advance per-tick state: notification lifecycles.
    pub fn update(&mut self) {
        self.notifications.update();
    }

    pub fn mood(&self) -> &'static str {
        MOODS[self.mood_index]
    }

    pub fn cycle_mood(&mut self) {
        self.mood_index = (self.mood_index + 1) % MOODS.len();
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_state_creation() {
        let state = UiState::new();
        assert_eq!(state.mode(), Mode::Editing);
        assert!(!state.should_quit());
        assert!(state.notifications.is_empty());
    }

    #[test]
    fn test_mode_transitions() {
        let mut state = UiState::new();

        state.enter_clear_confirm();
        assert_eq!(state.mode(), Mode::ClearConfirm);

        state.set_mode(Mode::Editing);
        state.toggle_help();
        assert_eq!(state.mode(), Mode::Help);
        state.toggle_help();
        assert_eq!(state.mode(), Mode::Editing);
    }

    #[test]
    fn test_mood_cycles_through_all_faces() {
        let mut state = UiState::new();
        let first = state.mood();
        for _ in 0..MOODS.len() {
            state.cycle_mood();
        }
        assert_eq!(state.mood(), first);
    }

    #[test]
    fn test_quit_flag() {
        let mut state = UiState::new();
        state.quit();
        assert!(state.should_quit());
    }
}
