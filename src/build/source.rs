//! Content discovery.
//!
//! Walks the source tree once and classifies every file: markdown files
//! become documents, dotfiles are ignored, everything else is a static
//! file copied into each format's output tree.

use std::path::{Path, PathBuf};

use log::info;

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("source directory not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error while reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A content item discovered in the source tree.
///
/// Paths are relative to the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    /// A markdown document rendered once per output format
    Document(PathBuf),
    /// Any other file, copied verbatim into every format tree
    Static(PathBuf),
}

impl ContentItem {
    pub fn relative_path(&self) -> &Path {
        match self {
            ContentItem::Document(path) | ContentItem::Static(path) => path,
        }
    }
}

/// Recursively discover content under `source_dir`.
///
/// Dot-named files and directories are skipped (and logged), matching the
/// original site layout where drafts live in dot-directories.
pub fn discover_content(source_dir: &Path) -> Result<Vec<ContentItem>, SourceError> {
    if !source_dir.is_dir() {
        return Err(SourceError::NotFound(source_dir.to_path_buf()));
    }

    let mut items = Vec::new();
    walk(source_dir, Path::new(""), &mut items)?;
    // Deterministic build order regardless of directory iteration order
    items.sort_by(|a, b| a.relative_path().cmp(b.relative_path()));
    Ok(items)
}

fn walk(root: &Path, relative: &Path, items: &mut Vec<ContentItem>) -> Result<(), SourceError> {
    let dir = root.join(relative);
    let entries = std::fs::read_dir(&dir).map_err(|source| SourceError::Io {
        path: dir.clone(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| SourceError::Io {
            path: dir.clone(),
            source,
        })?;
        let name = entry.file_name();
        let relative = relative.join(&name);

        if name.to_string_lossy().starts_with('.') {
            info!("Ignoring(file: {})", relative.display());
            continue;
        }

        let file_type = entry.file_type().map_err(|source| SourceError::Io {
            path: entry.path(),
            source,
        })?;

        if file_type.is_dir() {
            walk(root, &relative, items)?;
        } else if relative.extension().is_some_and(|ext| ext == "md") {
            items.push(ContentItem::Document(relative));
        } else {
            items.push(ContentItem::Static(relative));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_discover_classifies_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("index.md"));
        touch(&dir.path().join("posts/one.md"));
        touch(&dir.path().join("img/cat.png"));
        touch(&dir.path().join(".hidden"));
        touch(&dir.path().join(".git/config"));

        let items = discover_content(dir.path()).unwrap();
        assert_eq!(
            items,
            vec![
                ContentItem::Static(PathBuf::from("img/cat.png")),
                ContentItem::Document(PathBuf::from("index.md")),
                ContentItem::Document(PathBuf::from("posts/one.md")),
            ]
        );
    }

    #[test]
    fn test_discover_missing_dir() {
        let err = discover_content(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }
}
