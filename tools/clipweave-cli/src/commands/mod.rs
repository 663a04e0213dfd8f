pub mod info;
pub mod init;
pub mod pack;
pub mod preview;
pub mod unpack;
pub mod validate;

use std::path::Path;

use anyhow::Context;
use clipweave_project_model::ProjectDocument;

/// Read and decode a `.project` file, compressed or legacy JSON.
pub fn load_document(path: &Path) -> anyhow::Result<ProjectDocument> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    clipweave_engine::unpack_document(&bytes)
        .with_context(|| format!("Failed to load project {}", path.display()))
}
