//! Compress a plain JSON document into the `.project` format.

use std::path::PathBuf;

use anyhow::Context;
use clipweave_engine::pack_document;
use clipweave_project_model::ProjectDocument;

pub fn run(input: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let json = std::fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?;
    let doc = ProjectDocument::from_json_slice(&json)
        .with_context(|| format!("{} is not a project document", input.display()))?;

    let output = output.unwrap_or_else(|| input.with_extension("project"));
    let bytes = pack_document(&doc)?;
    std::fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Packed '{}': {} -> {} bytes ({})",
        doc.name,
        json.len(),
        bytes.len(),
        output.display()
    );
    Ok(())
}
