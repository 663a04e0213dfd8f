//! Validate a Clipweave project file.

use std::path::PathBuf;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating project at: {}", path.display());

    let doc = super::load_document(&path)?;
    println!("  Name: {}", doc.name);
    println!("  Version: {}", doc.version);
    println!("  Elements: {}", doc.elements.len());
    println!("  Animations: {}", doc.animations.len());

    let issues = doc.validate();
    if issues.is_empty() {
        println!("\nProject is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!(
            "\n{} issue(s) found. Loading will skip or drop the affected items.",
            issues.len()
        );
    }

    Ok(())
}
