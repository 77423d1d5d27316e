use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Millimetres per point. PDF space is measured in points; the layout below
/// is kept in millimetres because that is what the export format was
/// designed around.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

/// Body text size and the mean glyph advance used to derive a column budget
/// for wrapping. Times at 12 pt averages close to half an em per glyph,
/// which is plenty accurate for a left-aligned body.
const BODY_FONT_PT: f64 = 12.0;
const MEAN_ADVANCE_EM: f64 = 0.5;

/// Tabs have no intrinsic width in a proportional font; they are expanded
/// before wrapping.
const TAB_SPACES: &str = "    ";

/// Page geometry in millimetres. All vertical offsets are from the top of
/// the page, so every page renders its header block at identical positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_width: f64,
    pub page_height: f64,
    pub margin_x: f64,
    pub title_y: f64,
    pub date_y: f64,
    pub stats_y: f64,
    pub rule_y: f64,
    pub body_start_y: f64,
    pub line_step: f64,
    pub bottom_margin: f64,
}

impl PageLayout {
    /// A4 with the classic Kitty Notes header band.
    pub fn a4() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin_x: 20.0,
            title_y: 18.0,
            date_y: 26.0,
            stats_y: 34.0,
            rule_y: 38.0,
            body_start_y: 50.0,
            line_step: 7.0,
            bottom_margin: 20.0,
        }
    }

    pub fn content_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin_x
    }

    /// Number of body rows that fit between the header and the bottom
    /// margin. A row may sit exactly on the limit; the next one starts a
    /// new page.
    pub fn rows_per_page(&self) -> usize {
        let span = self.page_height - self.bottom_margin - self.body_start_y;
        if span < 0.0 {
            return 1;
        }
        (span / self.line_step) as usize + 1
    }

    /// Display-column budget for one body row, derived from the content
    /// width and the body font's mean advance.
    pub fn body_columns(&self) -> usize {
        let advance_mm = BODY_FONT_PT * MEAN_ADVANCE_EM * MM_PER_PT;
        ((self.content_width() / advance_mm) as usize).max(1)
    }
}

/// The block repeated at the top of every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
    pub title: String,
    pub date_line: String,
    pub stats_line: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub rows: Vec<String>,
}

/// A fully laid-out document: the header (identical on every page) plus the
/// body rows split into pages. Rendering backends consume this; nothing in
/// here knows about PDF syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedDoc {
    pub layout: PageLayout,
    pub header: HeaderBlock,
    pub pages: Vec<Page>,
}

impl PaginatedDoc {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Reflow `text` against `layout` and split it into pages under `header`.
///
/// Hard newlines are preserved; lines wider than the content width are
/// soft-wrapped at word boundaries, falling back to a mid-word break when a
/// single word overflows a whole row. Runs linear in the text length.
pub fn paginate(text: &str, header: HeaderBlock, layout: PageLayout) -> PaginatedDoc {
    let rows = wrap_text(text, layout.body_columns());
    let per_page = layout.rows_per_page().max(1);

    let mut pages: Vec<Page> = rows
        .chunks(per_page)
        .map(|chunk| Page {
            rows: chunk.to_vec(),
        })
        .collect();

    if pages.is_empty() {
        pages.push(Page { rows: Vec::new() });
    }

    PaginatedDoc {
        layout,
        header,
        pages,
    }
}

/// Wrap `text` to `max_cols` display columns, preserving hard line breaks.
pub fn wrap_text(text: &str, max_cols: usize) -> Vec<String> {
    let mut rows = Vec::new();
    for line in text.split('\n') {
        wrap_line(line, max_cols, &mut rows);
    }
    rows
}

fn wrap_line(line: &str, max_cols: usize, out: &mut Vec<String>) {
    let expanded = line.replace('\t', TAB_SPACES);
    let mut rest = expanded.as_str();

    loop {
        if UnicodeWidthStr::width(rest) <= max_cols {
            out.push(rest.to_string());
            return;
        }

        // Walk until the column budget runs out, remembering the last
        // breakable position.
        let mut width = 0usize;
        let mut overflow_at = rest.len();
        let mut last_space: Option<usize> = None;
        for (idx, ch) in rest.char_indices() {
            let w = UnicodeWidthChar::width(ch).unwrap_or(0);
            if width + w > max_cols {
                overflow_at = idx;
                break;
            }
            if ch == ' ' {
                last_space = Some(idx);
            }
            width += w;
        }

        match last_space {
            Some(space) if space > 0 => {
                out.push(rest[..space].to_string());
                rest = rest[space..].trim_start_matches(' ');
            }
            _ => {
                // One unbroken word wider than the row: hard-split it,
                // always consuming at least one character.
                let cut = if overflow_at == 0 {
                    rest.chars().next().map(char::len_utf8).unwrap_or(1)
                } else {
                    overflow_at
                };
                out.push(rest[..cut].to_string());
                rest = &rest[cut..];
            }
        }
    }
}
