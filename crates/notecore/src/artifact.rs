use chrono::{DateTime, Datelike, Local, Timelike};

use crate::metrics::Metrics;
use crate::paginate::{self, HeaderBlock, PageLayout};
use crate::pdf;

/// Stem shared by every exported filename.
pub const FILE_STEM: &str = "kitty-notes";

/// Title rendered at the top of every exported page.
pub const DOC_TITLE: &str = "Kitty Notepad";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    PlainText,
    Pdf,
}

impl ArtifactKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::PlainText => "txt",
            ArtifactKind::Pdf => "pdf",
        }
    }
}

/// A finished export: bytes plus the filename they should be saved under.
/// Ephemeral; handed to the host for writing and then discarded.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub kind: ArtifactKind,
}

/// `YYYYMMDD-HHMM` in local time. The format is a compatibility contract
/// for anyone parsing exported filenames; do not change it.
pub fn timestamp(now: &DateTime<Local>) -> String {
    format!(
        "{}{:02}{:02}-{:02}{:02}",
        now.year(),
        now.month(),
        now.day(),
        now.hour(),
        now.minute()
    )
}

fn filename(kind: ArtifactKind, now: &DateTime<Local>) -> String {
    format!("{}-{}.{}", FILE_STEM, timestamp(now), kind.extension())
}

/// The buffer as-is, named for the moment of export.
pub fn build_plain_text(text: &str, now: &DateTime<Local>) -> ExportArtifact {
    ExportArtifact {
        filename: filename(ArtifactKind::PlainText, now),
        bytes: text.as_bytes().to_vec(),
        kind: ArtifactKind::PlainText,
    }
}

/// The buffer paginated onto A4 pages with the repeated header block.
pub fn build_pdf(text: &str, metrics: &Metrics, now: &DateTime<Local>) -> ExportArtifact {
    let header = HeaderBlock {
        title: DOC_TITLE.to_string(),
        date_line: format!("Created: {}", now.format("%Y-%m-%d")),
        stats_line: metrics.stats_line(),
    };
    let doc = paginate::paginate(text, header, PageLayout::a4());

    ExportArtifact {
        filename: filename(ArtifactKind::Pdf, now),
        bytes: pdf::render(&doc),
        kind: ArtifactKind::Pdf,
    }
}
