//! Custom Askama template filters.

use std::fmt::Display;

use comrak::{Options, markdown_to_html};

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Render Markdown to HTML with GitHub Flavored Markdown support.
///
/// Raw HTML in the input is escaped: assistant replies are model output.
#[must_use]
pub fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.render.hardbreaks = true;

    markdown_to_html(content, &options)
}
