//! Walking the source tree and producing the target tree.

pub mod deadline;
pub mod engine;
pub mod manifest;
pub mod walker;
pub mod writer;

pub use deadline::Deadline;
pub use engine::{TransferEngine, TransferOutcome};
pub use manifest::{
    content_hash, EntryStatus, GenerationManifest, ManifestEntry, MANIFEST_FILE,
};
pub use walker::{EntryKind, SourceEntry, SourceWalker, WalkFailure, WalkOutcome};
pub use writer::{DiskWriter, MemoryWriter, OutputWriter};
