//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "datagrid";
const APPLICATION: &str = "datagrid";

const LATEST_LOG: &str = "latest.log";

/// Maximum number of archived log files to keep.
const MAX_OLD_LOGS: usize = 25;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Directory for persistent data.
///
/// - Linux: `$XDG_DATA_HOME/datagrid` or `~/.local/share/datagrid`
/// - macOS: `~/Library/Application Support/dev.datagrid.datagrid`
/// - Windows: `C:\Users\<User>\AppData\Roaming\datagrid\datagrid\data`
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Directory for logs.
///
/// - Linux: `$XDG_CACHE_HOME/datagrid` or `~/.cache/datagrid`
/// - macOS: `~/Library/Caches/dev.datagrid.datagrid`
/// - Windows: `C:\Users\<User>\AppData\Local\datagrid\datagrid\cache`
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path of the table state database.
pub fn storage_db() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("storage.db"))
}

/// Path of the current log file.
pub fn log_file() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(LATEST_LOG))
}

/// Archives `latest.log` under a timestamped name and prunes old logs.
///
/// Call at startup before creating the new log file.
pub fn rotate_logs() {
    let Some(cache) = cache_dir() else { return };
    rotate_logs_in(&cache);
}

fn rotate_logs_in(dir: &Path) {
    let latest = dir.join(LATEST_LOG);
    if latest.exists() {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let _ = fs::rename(&latest, dir.join(format!("{}.log", timestamp)));
    }
    cleanup_old_logs(dir, MAX_OLD_LOGS);
}

/// Removes the oldest archived logs beyond `keep`.
fn cleanup_old_logs(dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(dir) else { return };

    let mut logs: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != LATEST_LOG
        })
        .collect();

    // Oldest first; timestamped names sort chronologically.
    logs.sort_by_key(|e| e.file_name());

    if logs.len() > keep {
        for entry in logs.iter().take(logs.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = std::env::temp_dir().join(format!("datagrid-logs-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for day in 1..=5 {
            fs::write(dir.join(format!("2025010{}_120000.log", day)), "").unwrap();
        }
        fs::write(dir.join(LATEST_LOG), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();

        cleanup_old_logs(&dir, 2);

        let mut names: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            ["20250104_120000.log", "20250105_120000.log", "latest.log", "notes.txt"]
        );
        fs::remove_dir_all(&dir).unwrap();
    }
}
