use std::time::{Duration, Instant};

/// How long a banner stays fully visible.
pub const DISPLAY: Duration = Duration::from_millis(3000);
/// How long the leaving transition lasts before removal.
pub const FADE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Visible,
    Leaving,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    created_at: Instant,
}

impl Notification {
    fn new(message: String) -> Self {
        Self {
            message,
            created_at: Instant::now(),
        }
    }

    fn phase_at(&self, display: Duration, fade: Duration) -> Option<Phase> {
        let elapsed = self.created_at.elapsed();
        if elapsed < display {
            Some(Phase::Visible)
        } else if elapsed < display + fade {
            Some(Phase::Leaving)
        } else {
            None
        }
    }
}

/// Transient banners, each on its own lifecycle timer. The UI renders the
/// list as-is; no deduplication, no cap.
pub struct NotificationCenter {
    items: Vec<Notification>,
    display: Duration,
    fade: Duration,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::with_timings(DISPLAY, FADE)
    }

    pub fn with_timings(display: Duration, fade: Duration) -> Self {
        Self {
            items: Vec::new(),
            display,
            fade,
        }
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("notify: {}", message);
        self.items.push(Notification::new(message));
    }

    /// Drop banners whose leaving transition has finished. Called once per
    /// event-loop tick.
    pub fn update(&mut self) {
        let (display, fade) = (self.display, self.fade);
        self.items.retain(|n| n.phase_at(display, fade).is_some());
    }

    /// Everything currently on screen, oldest first, with its phase.
    pub fn active(&self) -> Vec<(&Notification, Phase)> {
        self.items
            .iter()
            .filter_map(|n| n.phase_at(self.display, self.fade).map(|p| (n, p)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_notify_is_immediately_visible() {
        let mut center = NotificationCenter::new();
        center.notify("TXT file saved!");

        let active = center.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].0.message, "TXT file saved!");
        assert_eq!(active[0].1, Phase::Visible);
    }

    #[test]
    fn test_notifications_stack_without_dedup() {
        let mut center = NotificationCenter::new();
        center.notify("same");
        center.notify("same");
        center.notify("same");
        assert_eq!(center.len(), 3);
    }

    #[test]
    fn test_lifecycle_visible_then_leaving_then_gone() {
        let mut center = NotificationCenter::with_timings(
            Duration::from_millis(20),
            Duration::from_millis(20),
        );
        center.notify("bye");
        assert_eq!(center.active()[0].1, Phase::Visible);

        thread::sleep(Duration::from_millis(25));
        center.update();
        assert_eq!(center.len(), 1);
        assert_eq!(center.active()[0].1, Phase::Leaving);

        thread::sleep(Duration::from_millis(25));
        center.update();
        assert!(center.is_empty());
    }

    #[test]
    fn test_independent_timers() {
        let mut center = NotificationCenter::with_timings(
            Duration::from_millis(30),
            Duration::from_millis(5),
        );
        center.notify("old");
        thread::sleep(Duration::from_millis(40));
        center.notify("new");
        center.update();

        assert_eq!(center.len(), 1);
        assert_eq!(center.active()[0].0.message, "new");
    }
}
