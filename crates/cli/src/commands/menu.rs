//! Print the catalog.

use std::io::{self, Write};

use freshking_core::{MenuCategory, catalog};
use thiserror::Error;

/// Errors from the menu command.
#[derive(Debug, Error)]
pub enum MenuError {
    #[error("Unknown category: {0}. Valid categories: {1}")]
    UnknownCategory(String, String),

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Match a category by its label, ignoring case.
fn parse_category(name: &str) -> Result<MenuCategory, MenuError> {
    let wanted = name.trim().replace(['-', '_'], " ");
    MenuCategory::ALL
        .into_iter()
        .find(|c| c.label().eq_ignore_ascii_case(&wanted))
        .ok_or_else(|| {
            let valid: Vec<_> = MenuCategory::ALL.iter().map(|c| c.label()).collect();
            MenuError::UnknownCategory(name.to_string(), valid.join(", "))
        })
}

/// Write the menu, grouped by category.
pub fn write_menu(out: &mut impl Write, only: Option<MenuCategory>) -> io::Result<()> {
    for category in MenuCategory::ALL {
        if only.is_some_and(|c| c != category) {
            continue;
        }

        writeln!(out, "## {}", category.label())?;
        for item in catalog::in_category(category) {
            let dietary = item.dietary_label();
            write!(out, "  {:<28} {:>8}  [{}]", item.name, item.price().display(), item.id)?;
            if !dietary.is_empty() {
                write!(out, "  {dietary}")?;
            }
            writeln!(out)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Print the menu to stdout.
///
/// # Errors
///
/// Returns an error for an unknown category or if stdout is closed.
pub fn print(category: Option<&str>) -> Result<(), MenuError> {
    let only = category.map(parse_category).transpose()?;
    write_menu(&mut io::stdout().lock(), only)?;
    Ok(())
}
