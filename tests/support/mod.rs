use devscout::{DetectionService, DetectorConfig};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Writes `(relative path, content)` pairs below a fresh temporary directory
#[allow(dead_code)]
pub fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    write_files(dir.path(), files);
    dir
}

#[allow(dead_code)]
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

/// Service over the real filesystem with the built-in defaults
#[allow(dead_code)]
pub fn service() -> DetectionService {
    DetectionService::new(DetectorConfig::builtin()).unwrap()
}

#[allow(dead_code)]
pub fn service_with(config: DetectorConfig) -> DetectionService {
    DetectionService::new(config).unwrap()
}
