//! Timestamped text log files

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

/// Default file name when none is given
pub const DEFAULT_LOG_NAME: &str = "logfile";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Resolves the log path; blank parts fall back to `output_dir` and `logfile`
pub fn log_file_path(dir: &str, name: &str, output_dir: &Path) -> PathBuf {
    let dir = dir.trim();
    let base = if dir.is_empty() {
        output_dir.to_path_buf()
    } else {
        PathBuf::from(dir)
    };

    let name = match name.trim() {
        "" => DEFAULT_LOG_NAME,
        name => name,
    };
    let file_name = if name.to_ascii_lowercase().ends_with(".txt") {
        name.to_string()
    } else {
        format!("{}.txt", name)
    };

    base.join(file_name)
}

/// Formats one log line with the current local time
pub fn format_entry(entry: &str) -> String {
    format!("[{}] {}\n\n", Local::now().format(TIMESTAMP_FORMAT), entry)
}

fn append_entry(path: &Path, entry: &str) -> std::io::Result<String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(format_entry(entry).as_bytes())?;
    drop(file);

    fs::read_to_string(path)
}

/// Appends `entry` and returns the whole log
pub fn write_log(entry: &str, dir: &str, name: &str, output_dir: &Path) -> String {
    let path = log_file_path(dir, name, output_dir);
    match append_entry(&path, entry) {
        Ok(content) => {
            tracing::info!(path = %path.display(), "Wrote log entry");
            content
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to write log");
            format!("❌ Error writing log: {}", e)
        }
    }
}

/// Returns the whole log, or a message when it is missing or unreadable
pub fn read_log(dir: &str, name: &str, output_dir: &Path) -> String {
    let path = log_file_path(dir, name, output_dir);
    if !path.exists() {
        tracing::warn!(path = %path.display(), "Log file not found");
        return format!("⚠️ Log file not found: {}", path.display());
    }

    match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read log");
            format!("❌ Error reading log file: {}", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn path_defaults() {
        let out = Path::new("/tmp/out");
        assert_eq!(log_file_path("", "", out), out.join("logfile.txt"));
        assert_eq!(log_file_path("  ", "run", out), out.join("run.txt"));
        assert_eq!(log_file_path("/var/logs", "Run.TXT", out), Path::new("/var/logs/Run.TXT"));
    }

    #[test]
    fn entries_accumulate() {
        let dir = TempDir::new().unwrap();
        let logs = dir.path().join("logs");
        let logs_str = logs.to_str().unwrap();

        write_log("first", logs_str, "session", dir.path());
        let content = write_log("second", logs_str, "session", dir.path());

        let lines: Vec<&str> = content.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] first"));
        assert!(lines[1].ends_with("] second"));
        assert!(content.ends_with("second\n\n"));
        assert_eq!(read_log(logs_str, "session.txt", dir.path()), content);
    }

    #[test]
    fn timestamp_shape() {
        let line = format_entry("x");
        // [YYYY-MM-DD HH:MM:SS]
        assert_eq!(line.find(']'), Some(20));
        assert_eq!(&line[5..6], "-");
        assert_eq!(&line[11..12], " ");
    }

    #[test]
    fn missing_log_reports_path() {
        let dir = TempDir::new().unwrap();
        let message = read_log("", "absent", dir.path());
        assert!(message.starts_with("⚠️ Log file not found: "));
        assert!(message.contains("absent.txt"));
    }
}
