// Kitty Notes core: counters, pagination, and export artifact assembly.

pub mod artifact;
pub mod metrics;
pub mod paginate;
pub mod pdf;

pub use artifact::{timestamp, ArtifactKind, ExportArtifact};
pub use metrics::Metrics;
