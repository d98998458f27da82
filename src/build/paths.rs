//! Path conversion utilities.
//!
//! This module owns the suffix-rewrite rule shared by the renderers, the
//! template stage and the feed generator: a path ending in `.md` gets the
//! output format's extension, anything else passes through unchanged.

use std::path::{Path, PathBuf};

use super::format::OutputFormat;

/// Rewrite a `.md` suffix to the given extension.
///
/// Idempotent for paths that do not end in `.md` (an href already ending
/// in `.html` or `.gmi` is returned unchanged).
pub fn rewrite_md_suffix(path: &str, ext: &str) -> String {
    match path.strip_suffix(".md") {
        Some(stem) => format!("{stem}{ext}"),
        None => path.to_string(),
    }
}

/// Where a source-relative path lands inside the output tree of a format.
///
/// Documents additionally get their extension rewritten with
/// [`rewrite_md_suffix`]; static files keep their path as-is.
pub fn output_path(destination: &Path, format: OutputFormat, relative: &Path) -> PathBuf {
    destination.join(format.tag()).join(relative)
}

/// Output path for a markdown document, extension rewritten.
pub fn document_output_path(
    destination: &Path,
    format: OutputFormat,
    relative: &Path,
) -> PathBuf {
    let rewritten = rewrite_md_suffix(&relative.to_string_lossy().replace('\\', "/"), format.extension());
    destination.join(format.tag()).join(rewritten)
}

/// Site-relative path (`/...`, forward slashes) for a source-relative path.
pub fn site_path(relative: &Path) -> String {
    format!("/{}", relative.to_string_lossy().replace('\\', "/"))
}
