use anyhow::Result;
use log::warn;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Manifest file extensions picked up by the scanner.
const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Scanner that discovers route manifest files.
///
/// The `ManifestScanner` accepts either a single manifest file or a directory. Directories
/// are walked recursively, skipping `target` and hidden directories (those starting with
/// `.`).
///
/// # Example
///
/// ```no_run
/// use swaggerify::scanner::ManifestScanner;
/// use std::path::PathBuf;
///
/// let scanner = ManifestScanner::new(PathBuf::from("./routes"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} manifests", result.manifest_files.len());
/// ```
pub struct ManifestScanner {
    root_path: PathBuf,
}

/// Result of a scan.
pub struct ScanResult {
    /// Manifest paths, sorted so that route registration order is stable between runs
    pub manifest_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl ManifestScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Collects manifest files under the root path.
    ///
    /// A root that is itself a file is returned as-is, whatever its extension.
    /// Inaccessible entries are logged and reported as warnings; scanning continues.
    pub fn scan(&self) -> Result<ScanResult> {
        if self.root_path.is_file() {
            return Ok(ScanResult {
                manifest_files: vec![self.root_path.clone()],
                warnings: Vec::new(),
            });
        }

        let mut manifest_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    let is_manifest = path
                        .extension()
                        .and_then(|s| s.to_str())
                        .is_some_and(|ext| MANIFEST_EXTENSIONS.contains(&ext));

                    if path.is_file() && is_manifest {
                        manifest_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        manifest_files.sort();

        Ok(ScanResult {
            manifest_files,
            warnings,
        })
    }
}
