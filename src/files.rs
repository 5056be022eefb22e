use std::path::PathBuf;

use regex::Regex;
use tracing::info;

use crate::error::{Error, Result};
use crate::version::MinorVersion;

/// The directory formulas are written to. In dry-run mode nothing is touched:
/// formulas are printed to stdout and removals are only reported.
#[derive(Debug, Clone)]
pub struct FormulaDir {
    path: PathBuf,
    dry_run: bool,
}

impl FormulaDir {
    pub fn new(path: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            path: path.into(),
            dry_run,
        }
    }

    /// Create the directory (and parents) unless dry-running.
    pub fn ensure_exists(&self) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        std::fs::create_dir_all(&self.path).map_err(|e| Error::io(&self.path, e))
    }

    /// Write (or overwrite) `file_name` with `content`.
    pub fn write(&self, file_name: &str, content: &str, label: &str) -> Result<()> {
        if self.dry_run {
            println!("\n--- {file_name} ({label}) ---");
            print!("{content}");
            return Ok(());
        }

        let path = self.path.join(file_name);
        std::fs::write(&path, content).map_err(|e| Error::io(&path, e))?;
        info!(file = %file_name, "generated");
        Ok(())
    }

    /// Existing pinned formulas of `project_name` with the minor parsed from
    /// their file name (`tool@1.2.rb` -> `1.2`).
    pub fn pinned_formulas(&self, project_name: &str) -> Result<Vec<(PathBuf, MinorVersion)>> {
        let pattern = format!(r"^{}@(\d+\.\d+)\.rb$", regex::escape(project_name));
        let Ok(re) = Regex::new(&pattern) else {
            return Ok(Vec::new());
        };

        let entries = match std::fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(&self.path, e)),
        };

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&self.path, e))?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let minor = re
                .captures(file_name)
                .and_then(|caps| MinorVersion::parse(&caps[1]));
            if let Some(minor) = minor {
                found.push((entry.path(), minor));
            }
        }
        found.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(found)
    }

    /// Remove pinned formulas of `project_name` whose minor is not in `keep`.
    ///
    /// Returns the affected paths; in dry-run mode they are reported, not removed.
    pub fn cleanup(&self, project_name: &str, keep: &[MinorVersion]) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();

        for (path, minor) in self.pinned_formulas(project_name)? {
            if keep.contains(&minor) {
                continue;
            }
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            if self.dry_run {
                println!("Would remove: {name}");
            } else {
                std::fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
                info!(file = %name, "removed");
            }
            removed.push(path);
        }

        Ok(removed)
    }
}
