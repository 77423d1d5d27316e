use ropey::Rope;
use std::cmp;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

/// Columns a tab occupies on screen. Kept in sync with the expansion the
/// paginator applies on export.
pub const TAB_DISPLAY_COLS: usize = 4;

/// The single text field: a rope, a caret, and an optional selection.
///
/// The caret is a char index into the rope; the selection is the span
/// between the anchor and the caret, in either order. There is no undo
/// history and no clipboard.
#[derive(Clone)]
pub struct Notepad {
    rope: Rope,
    caret: usize,
    anchor: Option<usize>,
    viewport_offset: usize,
    viewport_height: usize,
}

impl Notepad {
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            caret: 0,
            anchor: None,
            viewport_offset: 0,
            viewport_height: 24, // Default, will be updated
        }
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Replace the whole buffer, placing the caret after the content.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.caret = self.rope.len_chars();
        self.anchor = None;
        self.viewport_offset = 0;
        self.adjust_viewport();
    }

    pub fn clear(&mut self) {
        self.rope = Rope::new();
        self.caret = 0;
        self.anchor = None;
        self.viewport_offset = 0;
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn set_caret(&mut self, pos: usize) {
        self.caret = pos.min(self.rope.len_chars());
        self.anchor = None;
        self.adjust_viewport();
    }

    /// The active selection as a normalized (start, end) char range.
    pub fn selection(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        if anchor == self.caret {
            return None;
        }
        Some((anchor.min(self.caret), anchor.max(self.caret)))
    }

    pub fn select_range(&mut self, anchor: usize, caret: usize) {
        let len = self.rope.len_chars();
        self.anchor = Some(anchor.min(len));
        self.caret = caret.min(len);
        self.adjust_viewport();
    }

    // -- Editing ---------------------------------------------------------

    pub fn insert_char(&mut self, c: char) {
        self.delete_selection();
        self.rope.insert_char(self.caret, c);
        self.caret += 1;
        self.adjust_viewport();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Insert a literal tab at the caret, replacing any active selection,
    /// and leave the caret just after it.
    pub fn insert_tab(&mut self) {
        self.insert_char('\t');
    }

    /// Remove the selection, or the grapheme before the caret. Returns
    /// whether anything changed.
    pub fn backspace(&mut self) -> bool {
        if self.delete_selection() {
            self.adjust_viewport();
            return true;
        }
        if self.caret == 0 {
            return false;
        }
        let step = self.prev_grapheme_len();
        self.rope.remove(self.caret - step..self.caret);
        self.caret -= step;
        self.adjust_viewport();
        true
    }

    /// Remove the selection, or the grapheme after the caret.
    pub fn delete_forward(&mut self) -> bool {
        if self.delete_selection() {
            self.adjust_viewport();
            return true;
        }
        if self.caret >= self.rope.len_chars() {
            return false;
        }
        let step = self.next_grapheme_len();
        self.rope.remove(self.caret..self.caret + step);
        true
    }

    fn delete_selection(&mut self) -> bool {
        if let Some((start, end)) = self.selection() {
            self.rope.remove(start..end);
            self.caret = start;
            self.anchor = None;
            true
        } else {
            self.anchor = None;
            false
        }
    }

    // -- Movement --------------------------------------------------------

    pub fn move_left(&mut self, select: bool) {
        self.update_anchor(select);
        if self.caret > 0 {
            self.caret -= self.prev_grapheme_len();
        }
        self.adjust_viewport();
    }

    pub fn move_right(&mut self, select: bool) {
        self.update_anchor(select);
        if self.caret < self.rope.len_chars() {
            self.caret += self.next_grapheme_len();
        }
        self.adjust_viewport();
    }

    pub fn move_up(&mut self, select: bool) {
        self.update_anchor(select);
        let (line, col) = self.caret_line_col();
        if line > 0 {
            self.caret = self.line_col_to_char(line - 1, col);
        }
        self.adjust_viewport();
    }

    pub fn move_down(&mut self, select: bool) {
        self.update_anchor(select);
        let (line, col) = self.caret_line_col();
        if line + 1 < self.rope.len_lines() {
            self.caret = self.line_col_to_char(line + 1, col);
        }
        self.adjust_viewport();
    }

    pub fn move_home(&mut self, select: bool) {
        self.update_anchor(select);
        let (line, _) = self.caret_line_col();
        self.caret = self.rope.line_to_char(line);
        self.adjust_viewport();
    }

    pub fn move_end(&mut self, select: bool) {
        self.update_anchor(select);
        let (line, _) = self.caret_line_col();
        self.caret = self.rope.line_to_char(line) + self.line_len(line);
        self.adjust_viewport();
    }

    pub fn page_up(&mut self) {
        self.update_anchor(false);
        let (line, col) = self.caret_line_col();
        let target = line.saturating_sub(self.viewport_height);
        self.caret = self.line_col_to_char(target, col);
        self.viewport_offset = self.viewport_offset.saturating_sub(self.viewport_height);
        self.adjust_viewport();
    }

    pub fn page_down(&mut self) {
        self.update_anchor(false);
        let (line, col) = self.caret_line_col();
        let max_line = self.rope.len_lines().saturating_sub(1);
        let target = cmp::min(line + self.viewport_height, max_line);
        self.caret = self.line_col_to_char(target, col);
        self.adjust_viewport();
    }

    fn update_anchor(&mut self, select: bool) {
        if select {
            if self.anchor.is_none() {
                self.anchor = Some(self.caret);
            }
        } else {
            self.anchor = None;
        }
    }

    // -- Geometry for the UI ---------------------------------------------

    pub fn caret_line_col(&self) -> (usize, usize) {
        let line = self.rope.char_to_line(self.caret);
        let col = self.caret - self.rope.line_to_char(line);
        (line, col)
    }

    /// Caret position as (line, display column), with tabs expanded the
    /// same way the renderer expands them.
    pub fn caret_screen_position(&self) -> (usize, usize) {
        let (line, col) = self.caret_line_col();
        let line_start = self.rope.line_to_char(line);
        let prefix = self.rope.slice(line_start..line_start + col);

        let mut width = 0usize;
        for ch in prefix.chars() {
            width += match ch {
                '\t' => TAB_DISPLAY_COLS,
                _ => UnicodeWidthChar::width(ch).unwrap_or(0),
            };
        }
        (line, width)
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height.max(1);
        self.adjust_viewport();
    }

    pub fn viewport_offset(&self) -> usize {
        self.viewport_offset
    }

    /// The visible slice of the buffer, one entry per line, without
    /// trailing newlines.
    pub fn viewport_lines(&self) -> Vec<String> {
        let end = cmp::min(
            self.viewport_offset + self.viewport_height,
            self.rope.len_lines(),
        );
        (self.viewport_offset..end)
            .map(|i| {
                let line = self.rope.line(i).to_string();
                line.trim_end_matches('\n').to_string()
            })
            .collect()
    }

    fn adjust_viewport(&mut self) {
        let (line, _) = self.caret_line_col();
        if line < self.viewport_offset {
            self.viewport_offset = line;
        } else if line >= self.viewport_offset + self.viewport_height {
            self.viewport_offset = line + 1 - self.viewport_height;
        }
    }

    // -- Internals -------------------------------------------------------

    /// Length of the line in chars, excluding its trailing newline.
    fn line_len(&self, line: usize) -> usize {
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    fn line_col_to_char(&self, line: usize, col: usize) -> usize {
        self.rope.line_to_char(line) + col.min(self.line_len(line))
    }

    /// Chars in the grapheme ending at the caret. Stepping over a line
    /// break is always a single char.
    fn prev_grapheme_len(&self) -> usize {
        let (line, col) = self.caret_line_col();
        if col == 0 {
            return 1;
        }
        let line_start = self.rope.line_to_char(line);
        let prefix = self.rope.slice(line_start..line_start + col).to_string();
        prefix
            .graphemes(true)
            .next_back()
            .map(|g| g.chars().count())
            .unwrap_or(1)
    }

    /// Chars in the grapheme starting at the caret.
    fn next_grapheme_len(&self) -> usize {
        let (line, col) = self.caret_line_col();
        if col >= self.line_len(line) {
            return 1; // the newline
        }
        let line_start = self.rope.line_to_char(line);
        let rest = self
            .rope
            .slice(line_start + col..line_start + self.line_len(line))
            .to_string();
        rest.graphemes(true)
            .next()
            .map(|g| g.chars().count())
            .unwrap_or(1)
    }
}

impl Default for Notepad {
    fn default() -> Self {
        Self::new()
    }
}
