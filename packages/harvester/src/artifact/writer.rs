//! YAML writer for artifacts.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::DocumentArtifact;
use crate::config::validate_document_id;
use crate::error::Result;

/// Where the artifact for `document_id` lives under `output_dir`.
pub fn artifact_path(output_dir: &Path, document_id: &str) -> Result<PathBuf> {
    validate_document_id(document_id)?;
    Ok(output_dir.join(format!("{document_id}.yaml")))
}

/// Serialize an artifact with a document start marker and no trailing blanks.
pub fn generate_yaml(artifact: &DocumentArtifact) -> Result<String> {
    let yaml = serde_yaml_ng::to_string(artifact)?;
    let lines: Vec<&str> = yaml.lines().map(str::trim_end).collect();
    Ok(format!("---\n{}\n", lines.join("\n")))
}

/// Save an artifact under `output_dir`, creating the directory if needed.
///
/// Written to a hidden temp file, synced, then renamed, so the artifact path
/// only ever holds a complete file. That matters because its presence is
/// what marks the document as done.
pub fn save_artifact(artifact: &DocumentArtifact, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let output_file = artifact_path(output_dir, artifact.id())?;
    let temp_file = output_dir.join(format!(".{}.yaml.tmp", artifact.id()));

    let content = generate_yaml(artifact)?;

    {
        let mut file = File::create(&temp_file)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if output_file.exists() {
        fs::remove_file(&output_file)?;
    }

    fs::rename(&temp_file, &output_file)?;
    tracing::debug!(path = %output_file.display(), "Artifact written");

    Ok(output_file)
}
