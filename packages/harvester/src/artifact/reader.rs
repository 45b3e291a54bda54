use std::fs;
use std::path::Path;

use super::DocumentArtifact;
use crate::error::Result;

/// Read one artifact file.
pub fn load_artifact(path: &Path) -> Result<DocumentArtifact> {
    let yaml = fs::read_to_string(path)?;
    Ok(serde_yaml_ng::from_str(&yaml)?)
}

/// Read every `*.yaml` artifact in `dir`, ordered by file name.
///
/// Hidden files (in-flight temp files) are ignored.
pub fn read_artifacts(dir: &Path) -> Result<Vec<DocumentArtifact>> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "yaml")
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| !n.starts_with('.'))
        })
        .collect();
    paths.sort();

    let mut artifacts = Vec::with_capacity(paths.len());
    for path in paths {
        tracing::debug!(path = %path.display(), "Reading artifact");
        artifacts.push(load_artifact(&path)?);
    }
    Ok(artifacts)
}
