//! Decompress a `.project` file into pretty JSON.

use std::path::PathBuf;

use anyhow::Context;

pub fn run(path: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let doc = super::load_document(&path)?;
    let json = serde_json::to_string_pretty(&doc)?;

    match output {
        Some(output) => {
            std::fs::write(&output, json)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Unpacked '{}' to {}", doc.name, output.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
