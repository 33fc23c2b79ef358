use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Points contributed by one ordinary source file
pub const SOURCE_FILE_WEIGHT: u64 = 100;
/// Points contributed by a file below a static asset directory
pub const STATIC_FILE_WEIGHT: u64 = 10;

const STATIC_DIRS: &[&str] = &["static", "templates", "template", "assets"];

/// Accumulated weight per extension, in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionWeights {
    entries: Vec<(String, u64)>,
}

impl ExtensionWeights {
    pub fn get(&self, extension: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(ext, _)| ext == extension)
            .map(|(_, weight)| *weight)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(ext, w)| (ext.as_str(), *w))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Extension of a path including the leading dot, compared case-sensitively
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}

fn is_static(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .parent()
        .map(|dir| {
            dir.components()
                .any(|c| STATIC_DIRS.contains(&c.as_os_str().to_string_lossy().as_ref()))
        })
        .unwrap_or(false)
}

/// Groups `paths` by extension. Files without an extension are ignored.
pub fn group_by_extension(root: &Path, paths: &[PathBuf]) -> ExtensionWeights {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut weights = ExtensionWeights::default();

    for path in paths {
        let Some(extension) = extension_of(path) else {
            continue;
        };
        let points = if is_static(root, path) {
            STATIC_FILE_WEIGHT
        } else {
            SOURCE_FILE_WEIGHT
        };

        match positions.get(&extension) {
            Some(&i) => weights.entries[i].1 += points,
            None => {
                positions.insert(extension.clone(), weights.entries.len());
                weights.entries.push((extension, points));
            }
        }
    }

    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(|p| PathBuf::from("/repo").join(p)).collect()
    }

    #[test]
    fn test_normal_and_static_weights() {
        let weights = group_by_extension(
            Path::new("/repo"),
            &paths(&["app.js", "src/util.js", "static/vendor.js", "assets/img/x.png"]),
        );

        assert_eq!(weights.get(".js"), Some(210));
        assert_eq!(weights.get(".png"), Some(10));
    }

    #[test]
    fn test_files_without_extension_ignored() {
        let weights = group_by_extension(Path::new("/repo"), &paths(&["Makefile", "Dockerfile"]));
        assert!(weights.is_empty());
    }

    #[test]
    fn test_extension_is_case_sensitive() {
        let weights = group_by_extension(Path::new("/repo"), &paths(&["a.py", "b.PY"]));
        assert_eq!(weights.get(".py"), Some(100));
        assert_eq!(weights.get(".PY"), Some(100));
        assert_eq!(weights.len(), 2);
    }

    #[test]
    fn test_first_seen_order() {
        let weights = group_by_extension(Path::new("/repo"), &paths(&["a.go", "b.rs", "c.go"]));
        let order: Vec<&str> = weights.iter().map(|(e, _)| e).collect();
        assert_eq!(order, vec![".go", ".rs"]);
    }

    #[test]
    fn test_static_match_uses_relative_path() {
        let weights = group_by_extension(
            Path::new("/srv/static/project"),
            &[PathBuf::from("/srv/static/project/main.go")],
        );
        assert_eq!(weights.get(".go"), Some(100));
    }
}
