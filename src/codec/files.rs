//! Save and read data files
//!
//! The node operations [`save_data`] and [`read_data`] report failures as
//! their return value so a graph keeps running when a file cannot be written
//! or read. [`write_data`] and [`load_data`] propagate them instead.

use std::fs;
use std::path::{Path, PathBuf};

use super::{decode, encode, CodecError, DataFormat};

/// Encodes `data` and writes it as `{output_dir}/{filename}.{ext}`
pub fn write_data(data: &str, output_dir: &Path, filename: &str, format: DataFormat) -> Result<PathBuf, CodecError> {
    let document = encode(data, format)?;
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{}.{}", filename, format.extension()));
    fs::write(&path, document)?;
    Ok(path)
}

/// Reads `path` and converts it by extension
pub fn load_data(path: &Path) -> Result<String, CodecError> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content = fs::read_to_string(path)?;
    decode(&content, &extension)
}

/// Writes `data` as `{output_dir}/{filename}.{ext}` and returns the path,
/// or `Error: …`
pub fn save_data(data: &str, output_dir: &Path, filename: &str, format: DataFormat) -> String {
    match write_data(data, output_dir, filename, format) {
        Ok(path) => {
            tracing::info!(path = %path.display(), %format, "Saved data");
            path.display().to_string()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to save data");
            format!("Error: {}", e)
        }
    }
}

/// Reads `{dir}/{filename}`, converting by extension
///
/// A missing file yields `File not found: {path}`; other failures yield
/// `Error: …`.
pub fn read_data(dir: &Path, filename: &str) -> String {
    let path = dir.join(filename);
    if !path.exists() {
        let message = format!("File not found: {}", path.display());
        tracing::warn!("{}", message);
        return message;
    }

    match load_data(&path) {
        Ok(data) => {
            tracing::info!(path = %path.display(), "Read data");
            data
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read data");
            format!("Error: {}", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_creates_directories() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("data");

        let path = save_data("[1, 2]", &out, "numbers", DataFormat::Yaml);
        assert_eq!(path, out.join("numbers.yaml").display().to_string());
        assert_eq!(fs::read_to_string(&path).unwrap(), "- 1\n- 2\n");
    }

    #[test]
    fn save_then_read_json() {
        let dir = TempDir::new().unwrap();
        save_data("```json\n{\"k\":\"v\"}\n```", dir.path(), "doc", DataFormat::Json);

        let data = read_data(dir.path(), "doc.json");
        assert_eq!(data, "{\n  \"k\": \"v\"\n}");
    }

    #[test]
    fn read_missing_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let data = read_data(dir.path(), "absent.json");
        assert!(data.starts_with("File not found: "));
        assert!(data.contains(&dir.path().join("absent.json").display().to_string()));
    }

    #[test]
    fn read_corrupt_file_reports_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.json"), "{nope").unwrap();
        assert!(read_data(dir.path(), "bad.json").starts_with("Error: "));
    }

    #[test]
    fn read_plain_text_unchanged() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.md"), "# Notes\n").unwrap();
        assert_eq!(read_data(dir.path(), "notes.md"), "# Notes\n");
    }

    #[test]
    fn save_mixed_rows_reports_error() {
        let dir = TempDir::new().unwrap();
        let result = save_data("[{\"a\": 1}, 2]", dir.path(), "rows", DataFormat::Csv);
        assert!(result.starts_with("Error: "));
    }
}
