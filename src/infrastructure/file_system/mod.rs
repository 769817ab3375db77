pub mod file_sample_query_repository;
pub mod file_table_metadata_repository;

pub use file_sample_query_repository::FileSampleQueryRepository;
pub use file_table_metadata_repository::FileTableMetadataRepository;

use std::path::Path;

/// Stems of every `*.{extension}` file in `dir`, in name order.
pub(crate) fn list_file_stems(dir: &Path, extension: &str) -> Result<Vec<String>, String> {
    let entries = std::fs::read_dir(dir).map_err(|e| e.to_string())?;

    let mut stems = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| e.to_string())?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            stems.push(stem.to_string());
        }
    }
    stems.sort();
    Ok(stems)
}
