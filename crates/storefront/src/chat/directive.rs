//! Inline directives embedded in assistant replies.
//!
//! The assistant can ask the site to act by writing `[NAVIGATE:<route>]` or
//! `[ADD_TO_CART:<item-id>]` anywhere in its reply. Every occurrence is
//! stripped from the displayed text; only the first of each kind is acted on.

use std::sync::LazyLock;

use regex::Regex;

use freshking_core::{MenuItem, catalog};

static NAVIGATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[NAVIGATE:(.*?)\]").expect("Invalid regex"));

static ADD_TO_CART_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[ADD_TO_CART:(.*?)\]").expect("Invalid regex"));

static ANY_DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[NAVIGATE:.*?\]|\[ADD_TO_CART:.*?\]").expect("Invalid regex")
});

/// Directives found in a reply, plus the reply with all of them removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directives {
    /// Validated route from the first `NAVIGATE` directive.
    pub navigate: Option<String>,
    /// Catalog item from the first `ADD_TO_CART` directive.
    pub add_to_cart: Option<&'static MenuItem>,
    /// Reply text with every directive removed.
    pub text: String,
}

/// Strip directives from `raw` and resolve the first of each kind.
#[must_use]
pub fn extract(raw: &str) -> Directives {
    let navigate = NAVIGATE_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|body| {
            let route = body.as_str().trim();
            if is_safe_route(route) {
                Some(route.to_string())
            } else {
                tracing::debug!(route, "Ignoring NAVIGATE directive with unusable route");
                None
            }
        });

    let add_to_cart = ADD_TO_CART_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|body| {
            let id = body.as_str().trim();
            let item = catalog::find(id);
            if item.is_none() {
                tracing::debug!(item_id = id, "Ignoring ADD_TO_CART directive for unknown item");
            }
            item
        });

    let text = ANY_DIRECTIVE_RE.replace_all(raw, "").trim().to_string();

    Directives {
        navigate,
        add_to_cart,
        text,
    }
}

/// Site-relative path: one leading `/`, no scheme-relative `//`, no whitespace.
fn is_safe_route(route: &str) -> bool {
    route.starts_with('/')
        && !route.starts_with("//")
        && !route.contains('\\')
        && !route.chars().any(char::is_whitespace)
}
