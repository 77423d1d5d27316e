/// Derived counters for a buffer of text.
///
/// Always a pure function of the text at the instant of computation; nothing
/// here is cached or persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub words: usize,
    pub chars: usize,
    pub lines: usize,
}

impl Metrics {
    /// Count words, characters, and lines.
    ///
    /// Words are whitespace-delimited non-empty tokens. Characters are
    /// counted without any normalization or trimming. An empty buffer still
    /// reports one line.
    pub fn compute(text: &str) -> Self {
        let chars = text.chars().count();
        let words = text.split_whitespace().count();
        let lines = text.split('\n').count().max(1);

        Self {
            words,
            chars,
            lines,
        }
    }

    /// The one-line summary rendered into the export header.
    pub fn stats_line(&self) -> String {
        format!(
            "Words: {} | Characters: {} | Lines: {}",
            self.words, self.chars, self.lines
        )
    }
}
