//! Preview the chat markup transform.

use std::io::{self, Read, Write};

use freshking_storefront::chat::markup;
use freshking_storefront::filters::render_markdown;

/// Read a raw reply from stdin and print it as the widget would show it.
///
/// # Errors
///
/// Returns an error if stdin is not UTF-8 or stdout is closed.
pub fn run(html: bool) -> io::Result<()> {
    let mut raw = String::new();
    io::stdin().read_to_string(&mut raw)?;

    let formatted = markup::transform(&raw);
    let output = if html {
        render_markdown(&formatted)
    } else {
        formatted
    };

    let mut out = io::stdout().lock();
    out.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}
