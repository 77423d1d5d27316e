//! Minimal PDF 1.4 writer for paginated note documents.
//!
//! Emits A4 pages with the three standard Type1 fonts the header and body
//! use (no font embedding, WinAnsi encoding), one content stream per page,
//! and a classic cross-reference table. Pure: `render` turns a
//! [`PaginatedDoc`](crate::paginate::PaginatedDoc) into bytes.

use crate::paginate::{Page, PaginatedDoc, MM_PER_PT};

const PT_PER_MM: f64 = 1.0 / MM_PER_PT;

// Font resource names, in object order right after catalog and page tree.
const FONT_TITLE: &str = "F1"; // Helvetica-Bold
const FONT_DATE: &str = "F2"; // Helvetica-Oblique
const FONT_BODY: &str = "F3"; // Times-Roman

const TITLE_SIZE: f64 = 20.0;
const DATE_SIZE: f64 = 10.0;
const STATS_SIZE: f64 = 11.0;
const BODY_SIZE: f64 = 12.0;

// Colors from the classic theme, as 0..255 RGB.
const TITLE_COLOR: [u8; 3] = [72, 61, 139];
const DATE_COLOR: [u8; 3] = [130, 130, 130];
const STATS_COLOR: [u8; 3] = [0, 0, 0];
const BODY_COLOR: [u8; 3] = [40, 40, 40];
const RULE_COLOR: [u8; 3] = [200, 200, 200];
const RULE_WIDTH_MM: f64 = 0.3;

/// Render a paginated document to PDF bytes.
pub fn render(doc: &PaginatedDoc) -> Vec<u8> {
    let mut w = Writer::new();

    let page_count = doc.pages.len();
    // 1 catalog, 2 page tree, 3..=5 fonts, then (page, contents) pairs.
    let first_page_obj = 6;

    w.begin();

    w.object(1, "<< /Type /Catalog /Pages 2 0 R >>");

    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", first_page_obj + 2 * i))
        .collect();
    w.object(
        2,
        &format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_count
        ),
    );

    w.object(3, &font_dict("Helvetica-Bold"));
    w.object(4, &font_dict("Helvetica-Oblique"));
    w.object(5, &font_dict("Times-Roman"));

    let media_w = doc.layout.page_width * PT_PER_MM;
    let media_h = doc.layout.page_height * PT_PER_MM;

    for (i, page) in doc.pages.iter().enumerate() {
        let page_obj = first_page_obj + 2 * i;
        let contents_obj = page_obj + 1;

        w.object(
            page_obj,
            &format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Resources << /Font << /{} 3 0 R /{} 4 0 R /{} 5 0 R >> >> \
                 /Contents {} 0 R >>",
                media_w, media_h, FONT_TITLE, FONT_DATE, FONT_BODY, contents_obj
            ),
        );

        let stream = page_content(doc, page);
        w.stream_object(contents_obj, stream.as_bytes());
    }

    w.finish(1)
}

fn font_dict(base: &str) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        base
    )
}

/// The drawing operators for one page: the repeated header block, the
/// separator rule, then the body rows walking down from `body_start_y`.
fn page_content(doc: &PaginatedDoc, page: &Page) -> String {
    let l = &doc.layout;
    let h = &doc.header;
    let center_x = l.page_width / 2.0;
    let mut ops = String::new();

    centered_text(
        &mut ops,
        l.page_height,
        FONT_TITLE,
        TITLE_SIZE,
        TITLE_COLOR,
        center_x,
        l.title_y,
        &h.title,
    );
    centered_text(
        &mut ops,
        l.page_height,
        FONT_DATE,
        DATE_SIZE,
        DATE_COLOR,
        center_x,
        l.date_y,
        &h.date_line,
    );
    centered_text(
        &mut ops,
        l.page_height,
        FONT_TITLE,
        STATS_SIZE,
        STATS_COLOR,
        center_x,
        l.stats_y,
        &h.stats_line,
    );

    let rule_y = (l.page_height - l.rule_y) * PT_PER_MM;
    ops.push_str(&format!(
        "{} RG {:.2} w {:.2} {:.2} m {:.2} {:.2} l S\n",
        rgb(RULE_COLOR),
        RULE_WIDTH_MM * PT_PER_MM,
        l.margin_x * PT_PER_MM,
        rule_y,
        (l.page_width - l.margin_x) * PT_PER_MM,
        rule_y,
    ));

    ops.push_str(&format!("{} rg\n", rgb(BODY_COLOR)));
    let mut y = l.body_start_y;
    for row in &page.rows {
        if !row.is_empty() {
            text_op(
                &mut ops,
                FONT_BODY,
                BODY_SIZE,
                l.margin_x * PT_PER_MM,
                (l.page_height - y) * PT_PER_MM,
                row,
            );
        }
        y += l.line_step;
    }

    ops
}

#[allow(clippy::too_many_arguments)]
fn centered_text(
    ops: &mut String,
    page_height_mm: f64,
    font: &str,
    size: f64,
    color: [u8; 3],
    center_x_mm: f64,
    y_mm: f64,
    text: &str,
) {
    let x = center_x_mm * PT_PER_MM - text_width_pt(text, size) / 2.0;
    ops.push_str(&format!("{} rg\n", rgb(color)));
    text_op(
        ops,
        font,
        size,
        x.max(0.0),
        (page_height_mm - y_mm) * PT_PER_MM,
        text,
    );
}

fn text_op(ops: &mut String, font: &str, size: f64, x_pt: f64, y_pt: f64, text: &str) {
    ops.push_str(&format!(
        "BT /{} {:.0} Tf {:.2} {:.2} Td ({}) Tj ET\n",
        font,
        size,
        x_pt,
        y_pt,
        escape_text(text)
    ));
}

fn rgb([r, g, b]: [u8; 3]) -> String {
    format!(
        "{:.3} {:.3} {:.3}",
        r as f64 / 255.0,
        g as f64 / 255.0,
        b as f64 / 255.0
    )
}

/// Approximate advance widths in milli-ems for the standard fonts. Only
/// used to centre the header lines; body text is left-aligned.
fn char_width_milliem(ch: char) -> u32 {
    match ch {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '!' | '\'' | '|' => 280,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | ' ' => 330,
        'm' | 'w' | 'M' | 'W' | '@' => 830,
        'A'..='Z' | '%' | '&' => 700,
        '0'..='9' => 556,
        _ => 500,
    }
}

fn text_width_pt(text: &str, size: f64) -> f64 {
    let milliems: u32 = text.chars().map(char_width_milliem).sum();
    milliems as f64 / 1000.0 * size
}

/// Escape text for a PDF literal string. Latin-1 code points are written as
/// octal escapes (the fonts use WinAnsi encoding); anything beyond that has
/// no glyph in the standard fonts and degrades to `?`.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            ' '..='~' => out.push(ch),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("\\{:03o}", ch as u32)),
            _ => out.push('?'),
        }
    }
    out
}

/// Accumulates objects and their byte offsets, then emits the xref table
/// and trailer.
struct Writer {
    buf: Vec<u8>,
    offsets: Vec<(usize, usize)>, // (object id, byte offset)
}

impl Writer {
    fn new() -> Self {
        Self {
            buf: Vec::new(),
            offsets: Vec::new(),
        }
    }

    fn begin(&mut self) {
        self.buf.extend_from_slice(b"%PDF-1.4\n");
        // Binary marker so transports treat the file as binary.
        self.buf.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");
    }

    fn object(&mut self, id: usize, body: &str) {
        self.offsets.push((id, self.buf.len()));
        self.buf
            .extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", id, body).as_bytes());
    }

    fn stream_object(&mut self, id: usize, data: &[u8]) {
        self.offsets.push((id, self.buf.len()));
        self.buf
            .extend_from_slice(format!("{} 0 obj\n<< /Length {} >>\nstream\n", id, data.len()).as_bytes());
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"endstream\nendobj\n");
    }

    fn finish(mut self, root: usize) -> Vec<u8> {
        self.offsets.sort_by_key(|&(id, _)| id);
        let count = self.offsets.len();

        let xref_at = self.buf.len();
        self.buf
            .extend_from_slice(format!("xref\n0 {}\n", count + 1).as_bytes());
        self.buf.extend_from_slice(b"0000000000 65535 f \n");
        for &(_, offset) in &self.offsets {
            self.buf
                .extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        self.buf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{}\n%%EOF\n",
                count + 1,
                root,
                xref_at
            )
            .as_bytes(),
        );

        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paginate::{paginate, HeaderBlock, PageLayout};

    fn doc(text: &str) -> PaginatedDoc {
        paginate(
            text,
            HeaderBlock {
                title: "Kitty Notepad".to_string(),
                date_line: "Created: 2026-01-01".to_string(),
                stats_line: "Words: 2 | Characters: 11 | Lines: 1".to_string(),
            },
            PageLayout::a4(),
        )
    }

    fn as_latin1(bytes: &[u8]) -> String {
        bytes.iter().map(|&b| b as char).collect()
    }

    #[test]
    fn test_structural_markers() {
        let bytes = render(&doc("hello world"));
        let text = as_latin1(&bytes);
        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("/Type /Catalog"));
        assert!(text.contains("/BaseFont /Times-Roman"));
        assert!(text.contains("startxref"));
    }

    #[test]
    fn test_one_page_object_per_page() {
        let layout = PageLayout::a4();
        let long: Vec<String> = (0..layout.rows_per_page() * 2).map(|i| i.to_string()).collect();
        let d = doc(&long.join("\n"));
        assert_eq!(d.page_count(), 2);

        let text = as_latin1(&render(&d));
        assert_eq!(text.matches("/Type /Page ").count(), 2);
        assert_eq!(text.matches("/Count 2").count(), 1);
    }

    #[test]
    fn test_header_repeats_identically_on_every_page() {
        let layout = PageLayout::a4();
        let long: Vec<String> = (0..layout.rows_per_page() + 1).map(|i| i.to_string()).collect();
        let text = as_latin1(&render(&doc(&long.join("\n"))));

        assert_eq!(text.matches("(Kitty Notepad) Tj").count(), 2);
        assert_eq!(text.matches("(Created: 2026-01-01) Tj").count(), 2);
        assert_eq!(
            text.matches("(Words: 2 | Characters: 11 | Lines: 1) Tj").count(),
            2
        );
    }

    #[test]
    fn test_balanced_text_blocks() {
        let text = as_latin1(&render(&doc("a\nb\nc")));
        assert_eq!(text.matches("BT ").count(), text.matches(" ET").count());
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let bytes = render(&doc("hello"));
        // Offsets are byte positions in the raw file, so check against the
        // bytes, not a decoded copy.
        let xref = bytes.windows(6).position(|w| w == b"\nxref\n").unwrap() + 1;
        let table = std::str::from_utf8(&bytes[xref..]).unwrap();
        // Skip "xref", the subsection header, and the free entry.
        for (i, line) in table.lines().skip(3).take(7).enumerate() {
            let offset: usize = line[..10].parse().unwrap();
            let head = format!("{} 0 obj", i + 1);
            assert_eq!(&bytes[offset..offset + head.len()], head.as_bytes());
        }
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_text("a(b)c"), "a\\(b\\)c");
        assert_eq!(escape_text("back\\slash"), "back\\\\slash");
        assert_eq!(escape_text("café"), "caf\\351");
        assert_eq!(escape_text("ねこ"), "??");
    }
}
