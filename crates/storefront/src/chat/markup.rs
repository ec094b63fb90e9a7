//! Cosmetic markup for assistant replies.
//!
//! [`transform`] runs an ordered list of named, line-anchored rules over the
//! reply text. Rules only add decoration (bold, emoji, dividers); they never
//! change the words themselves. The transform is pure and is applied exactly
//! once per completion.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Width of the divider line that replaces Markdown rules.
const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━━━━━";

/// A named rewrite rule.
pub struct Rule {
    pub name: &'static str,
    pattern: Regex,
    replace: fn(&Captures<'_>) -> String,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, replace: fn(&Captures<'_>) -> String) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("Invalid regex"),
            replace,
        }
    }

    /// Apply this rule to every match in `text`.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures<'_>| (self.replace)(caps))
            .into_owned()
    }
}

/// All rules in application order.
pub static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new("heading", r"(?m)^[ \t]*#{1,6}[ \t]+(.+?)[ \t]*$", heading),
        Rule::new("section", r"(?m)^[ \t]*Section:[ \t]*(.+?)[ \t]*$", |caps| {
            format!("\n▌ **{}**\n", &caps[1])
        }),
        Rule::new(
            "labelled_bullet",
            r"(?mi)^[ \t]*[-*•][ \t]+(benefits|features|price|nutrition|notes?):[ \t]*",
            labelled_bullet,
        ),
        Rule::new("topic_bullet", r"(?m)^([ \t]*)[-*•][ \t]+(.+)$", |caps| {
            format!("{}{} {}", &caps[1], topic_emoji(&caps[2]), &caps[2])
        }),
        Rule::new(
            "line_markers",
            r"(?m)^[ \t]*(CTA|Tip|Recommendation|Metric|Email|Phone):[ \t]*(.+?)[ \t]*$",
            line_marker,
        ),
        Rule::new(
            "emphasis",
            r"(\*\*.+?\*\*)|(`)?([$€£]\d(?:[\d,]*\d)?(?:\.\d+)?(?:[KMB]\b)?|\b\d+(?:\.\d+)?%)(`)?",
            emphasis,
        ),
        Rule::new(
            "divider",
            r"(?m)^[ \t]*(?:-{3,}|\*{3,}|_{3,})[ \t]*$",
            |_| DIVIDER.to_string(),
        ),
    ]
});

static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("Invalid regex"));

/// Apply every rule in order.
#[must_use]
pub fn transform(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    let decorated = RULES
        .iter()
        .fold(normalized, |acc, rule| rule.apply(&acc));
    BLANK_RUN_RE
        .replace_all(&decorated, "\n\n")
        .trim()
        .to_string()
}

// =============================================================================
// Rule bodies
// =============================================================================

fn heading(caps: &Captures<'_>) -> String {
    let title = caps[1].trim_end_matches('#').trim().trim_matches('*').trim();
    format!("**{title}**")
}

fn labelled_bullet(caps: &Captures<'_>) -> String {
    let (emoji, label) = match caps[1].to_ascii_lowercase().as_str() {
        "benefits" => ("✨", "Benefits"),
        "features" => ("🌟", "Features"),
        "price" => ("💰", "Price"),
        "nutrition" => ("🥗", "Nutrition"),
        _ => ("📝", "Note"),
    };
    format!("{emoji} **{label}:** ")
}

fn line_marker(caps: &Captures<'_>) -> String {
    let rest = &caps[2];
    match &caps[1] {
        "CTA" => format!("👉 **{rest}**"),
        "Tip" => format!("💡 **Tip:** {rest}"),
        "Recommendation" => format!("👨‍🍳 **Recommendation:** {rest}"),
        "Metric" => match rest.split_once(':') {
            Some((key, value)) => format!("📊 **{}:** {}", key.trim(), value.trim()),
            None => format!("📊 **Metric:** {rest}"),
        },
        "Email" => format!("📧 **Email:** {rest}"),
        _ => format!("📞 **Phone:** {rest}"),
    }
}

fn emphasis(caps: &Captures<'_>) -> String {
    // Bold spans are matched whole so amounts inside them stay as they are
    if caps.get(1).is_some() {
        return caps[0].to_string();
    }
    let before = caps.get(2).map_or("", |m| m.as_str());
    let amount = &caps[3];
    let after = caps.get(4).map_or("", |m| m.as_str());

    match (before, after) {
        // `$12.99` code spans become bold
        ("`", "`") => format!("**{amount}**"),
        _ => format!("{before}**{amount}**{after}"),
    }
}

// =============================================================================
// Topic bullets
// =============================================================================

/// Keyword categories in priority order. The first category with a matching
/// word decides the bullet.
const TOPICS: &[(&str, &[&str])] = &[
    (
        "🌱",
        &[
            "sustainab", "eco", "organic", "local", "renewable", "environment", "waste",
            "compost", "biodegradable", "planet",
        ],
    ),
    (
        "💪",
        &[
            "health", "nutrition", "nutrient", "protein", "vitamin", "fitness", "wellness",
            "energy", "calorie", "fiber",
        ],
    ),
    (
        "📈",
        &[
            "invest", "growth", "revenue", "funding", "equity", "valuation", "margin", "roi",
            "expansion", "retention",
        ],
    ),
    (
        "🤖",
        &[
            "tech", "technology", "app", "ai", "digital", "online", "pos", "automation", "data",
        ],
    ),
    (
        "🍽️",
        &[
            "menu", "dish", "bowl", "salad", "smoothie", "meal", "sandwich", "soup", "snack",
            "recipe", "ingredient", "vegan",
        ],
    ),
    (
        "🚚",
        &["deliver", "delivery", "pickup", "takeout", "catering", "shipping"],
    ),
    (
        "💰",
        &["price", "cost", "discount", "deal", "afford", "value", "save", "savings", "reward"],
    ),
    (
        "⭐",
        &["quality", "premium", "fresh", "best", "award", "rated", "chef", "signature"],
    ),
    (
        "⏰",
        &["hour", "hours", "open", "time", "minute", "schedule", "daily", "weekend", "today"],
    ),
];

const DEFAULT_BULLET: &str = "•";

/// Pick the bullet emoji for a line of text.
///
/// Keywords of four or more letters also match as word prefixes
/// ("sustainab" matches "sustainability"); shorter ones must match a whole
/// word so "ai" doesn't fire on "aim".
#[must_use]
pub fn topic_emoji(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    TOPICS
        .iter()
        .find(|(_, keywords)| {
            keywords.iter().any(|kw| {
                words
                    .iter()
                    .any(|w| *w == *kw || (kw.len() >= 4 && w.starts_with(kw)))
            })
        })
        .map_or(DEFAULT_BULLET, |(emoji, _)| *emoji)
}
