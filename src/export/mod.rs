use crate::cli::ExportFormat;
use crate::error::{AnnotatorError, Result};
use std::path::{Path, PathBuf};
use top5_annotator_common::export::{to_csv, to_json};
use top5_annotator_common::AnnotationMap;

pub const JSON_FILE_NAME: &str = "annotations.json";
pub const CSV_FILE_NAME: &str = "annotations.csv";

fn output_path_for_format(output: &Path, file_name: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(file_name)
    } else {
        output.to_path_buf()
    }
}

fn output_paths_for_both(output: &Path) -> (PathBuf, PathBuf) {
    if output.is_dir() || output.extension().is_none() {
        (output.join(JSON_FILE_NAME), output.join(CSV_FILE_NAME))
    } else {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("annotations");
        (
            parent.join(format!("{}.json", stem)),
            parent.join(format!("{}.csv", stem)),
        )
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)
        .map_err(|e| AnnotatorError::Export(format!("{}: {}", path.display(), e)))
}

pub fn write_json(entries: &AnnotationMap, path: &Path) -> Result<()> {
    write_file(path, &to_json(entries)?)
}

pub fn write_csv(entries: &AnnotationMap, path: &Path) -> Result<()> {
    write_file(path, &to_csv(entries))
}

/// アノテーションをファイルに書き出し、出力先を返す
pub fn export_annotations(
    entries: &AnnotationMap,
    format: &ExportFormat,
    output: &Path,
) -> Result<Vec<PathBuf>> {
    let written = match format {
        ExportFormat::Json => {
            let path = output_path_for_format(output, JSON_FILE_NAME);
            write_json(entries, &path)?;
            vec![path]
        }
        ExportFormat::Csv => {
            let path = output_path_for_format(output, CSV_FILE_NAME);
            write_csv(entries, &path)?;
            vec![path]
        }
        ExportFormat::Both => {
            let (json_path, csv_path) = output_paths_for_both(output);
            write_json(entries, &json_path)?;
            write_csv(entries, &csv_path)?;
            vec![json_path, csv_path]
        }
    };

    tracing::info!(entries = entries.len(), files = written.len(), "annotations exported");
    Ok(written)
}
