use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::{Context, Tera, Value};

use super::document::PageMetadata;
use super::format::OutputFormat;
use super::paths::rewrite_md_suffix;
use super::renderer::slugify;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("template not found: {0}")]
    TemplateNotFound(PathBuf),
}

/// The page-shell renderer, wrapping Tera.
///
/// Loads one template per format from the `partials/` directory that sits
/// next to the source root (`partials/template.html`,
/// `partials/template.gmi`). Formatting helpers are registered on this
/// instance when it is built; nothing is registered globally.
#[derive(Debug)]
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Load templates for the given formats from `partials_dir`.
    pub fn new(partials_dir: &Path, formats: &[OutputFormat]) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        // `content` is the already-rendered fragment; never escape it again.
        tera.autoescape_on(vec![]);
        for format in formats {
            let path = partials_dir.join(template_name(*format));
            if !path.is_file() {
                return Err(RenderError::TemplateNotFound(path));
            }
            tera.add_template_file(&path, Some(template_name(*format)))?;
        }
        register_helpers(&mut tera);
        Ok(Self { tera })
    }

    /// Build a renderer from in-memory templates, `(format, source)` pairs.
    #[cfg(test)]
    pub fn from_sources(templates: &[(OutputFormat, &str)]) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        for (format, source) in templates {
            tera.add_raw_template(template_name(*format), source)?;
        }
        register_helpers(&mut tera);
        Ok(Self { tera })
    }

    /// Wrap a rendered body fragment in the format's page shell.
    ///
    /// `relative_path` is the document's source-relative path; the `path`
    /// template value carries it with `.md` rewritten to the format's
    /// extension.
    pub fn render_page(
        &self,
        body: &str,
        format: OutputFormat,
        relative_path: &str,
        metadata: &PageMetadata,
    ) -> Result<String, RenderError> {
        let mut context = Context::new();
        context.insert("content", body.trim());
        context.insert(
            "path",
            &rewrite_md_suffix(relative_path, format.extension()),
        );
        context.insert("format", format.tag());
        context.insert("is_article", &metadata.is_article());
        context.insert("is_website", &!metadata.is_article());
        context.insert("meta", metadata);

        Ok(self.tera.render(template_name(format), &context)?)
    }
}

fn template_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Html => "template.html",
        OutputFormat::Gemini => "template.gmi",
    }
}

fn register_helpers(tera: &mut Tera) {
    tera.register_filter("slug", slug_filter);
    tera.register_filter("format_date", format_date_filter);
}

/// `{{ value | slug }}` — anchor-safe slug of a string.
fn slug_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("slug filter expects a string"))?;
    Ok(Value::String(slugify(text)))
}

/// `{{ value | format_date }}` — normalize a date to `YYYY-MM-DD`.
fn format_date_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("format_date filter expects a string"))?;
    // Dates serialize as YYYY-MM-DD; accept a full timestamp too
    let date = text.get(..10).unwrap_or(text);
    Ok(Value::String(date.to_string()))
}
