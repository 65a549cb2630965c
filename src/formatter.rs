//! Plain text to semantic markup
//!
//! Lines become `<ul>/<li>`, `<h4>` or `<p>` blocks. Paragraph and list text goes
//! through four emphasis passes, each over the output of the previous one:
//! quoted terms, text after connector phrases, text after definition verbs, and
//! whole-word lexicon terms. A later pass may wrap text an earlier pass already
//! wrapped; the nested spans are kept as produced.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Emphasis classes shared by the formatter and the quiz synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Primary,
    Secondary,
    Tertiary,
}

impl Emphasis {
    pub const ALL: [Self; 3] = [Self::Primary, Self::Secondary, Self::Tertiary];

    pub const fn class(self) -> &'static str {
        match self {
            Self::Primary => "hl",
            Self::Secondary => "hlg",
            Self::Tertiary => "hlo",
        }
    }

    pub fn wrap(self, text: &str) -> String {
        format!(r#"<span class="{}">{}</span>"#, self.class(), text)
    }
}

static BULLET_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-•*]\s+").expect("valid bullet regex"));
static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)\s]+").expect("valid numbered item regex"));
static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("valid quote regex"));
static GUILLEMETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"«\s*([^»]+?)\s*»").expect("valid guillemet regex"));

static BUILTIN: LazyLock<Formatter> = LazyLock::new(|| {
    Formatter::new(&HighlightRules::default()).expect("built-in highlight rules compile")
});

/// Word lists driving the emphasis passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightRules {
    /// Phrases after which the rest of the clause is secondary emphasis.
    pub connectors: Vec<String>,
    /// Verbs after which the rest of the clause is a definition.
    pub definition_verbs: Vec<String>,
    /// Domain terms emphasized wherever they occur as whole words.
    pub lexicon: Vec<String>,
}

impl Default for HighlightRules {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| (*w).to_string()).collect()
        }

        Self {
            connectors: owned(&[
                "c'est-à-dire",
                "notamment",
                "tels que",
                "tel que",
                "par exemple",
                "comme",
                "that is",
                "notably",
                "such as",
                "for example",
                "like",
            ]),
            definition_verbs: owned(&[
                "est défini comme",
                "est définie comme",
                "est",
                "désigne",
                "signifie",
                "correspond à",
                "is defined as",
                "is",
                "denotes",
                "means",
                "corresponds to",
            ]),
            lexicon: owned(&[
                "droit",
                "créancier",
                "débiteur",
                "obligation",
                "contrat",
                "convention",
                "responsabilité",
                "dommage",
                "préjudice",
                "faute",
                "causalité",
                "synallagmatique",
                "unilatéral",
                "résultat",
                "moyen",
                "creditor",
                "debtor",
                "contract",
                "liability",
                "damage",
                "tort",
                "causation",
            ]),
        }
    }
}

/// Formats raw text blocks with a fixed set of highlight rules.
#[derive(Debug, Clone)]
pub struct Formatter {
    connector: Option<Regex>,
    definition: Option<Regex>,
    lexicon: Option<Regex>,
}

impl Formatter {
    pub fn new(rules: &HighlightRules) -> Result<Self, regex::Error> {
        Ok(Self {
            connector: phrase_regex(&rules.connectors, r"(?i)\b({})\s+([^,.;:]+)")?,
            definition: phrase_regex(&rules.definition_verbs, r"(?i)\b({})\s+([^,.;:]+)")?,
            lexicon: phrase_regex(&rules.lexicon, r"(?i)\b({})\b")?,
        })
    }

    /// Formatter with the built-in French/English rules.
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Turn a block of plain-text lines into markup.
    pub fn format(&self, raw_block: &str) -> String {
        let mut html: Vec<String> = Vec::new();
        let mut in_list = false;

        for line in raw_block.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if in_list {
                    html.push("</ul>".to_string());
                    in_list = false;
                }
                continue;
            }

            let item = BULLET_ITEM
                .find(trimmed)
                .or_else(|| NUMBERED_ITEM.find(trimmed))
                .map(|marker| &trimmed[marker.end()..]);
            if let Some(item) = item {
                if !in_list {
                    html.push("<ul>".to_string());
                    in_list = true;
                }
                html.push(format!("<li>{}</li>", self.apply_highlight(item)));
                continue;
            }

            if in_list {
                html.push("</ul>".to_string());
                in_list = false;
            }

            if trimmed.chars().count() < 60 && !ends_with_sentence_punctuation(trimmed) {
                html.push(format!("<h4>{trimmed}</h4>"));
            } else {
                html.push(format!("<p>{}</p>", self.apply_highlight(trimmed)));
            }
        }

        if in_list {
            html.push("</ul>".to_string());
        }

        html.join("\n")
    }

    /// Apply the four emphasis passes in order.
    pub fn apply_highlight(&self, text: &str) -> String {
        let primary = Emphasis::Primary.class();

        let text = QUOTED.replace_all(text, format!(r#"<span class="{primary}">${{1}}</span>"#));
        let mut text = GUILLEMETS
            .replace_all(&text, format!(r#"<span class="{primary}">${{1}}</span>"#))
            .into_owned();

        if let Some(connector) = &self.connector {
            let secondary = Emphasis::Secondary.class();
            text = connector
                .replace_all(&text, format!(r#"${{1}} <span class="{secondary}">${{2}}</span>"#))
                .into_owned();
        }

        if let Some(definition) = &self.definition {
            text = definition
                .replace_all(&text, |caps: &Captures<'_>| {
                    format!("{} {}", &caps[1], Emphasis::Primary.wrap(caps[2].trim()))
                })
                .into_owned();
        }

        if let Some(lexicon) = &self.lexicon {
            text = lexicon
                .replace_all(&text, format!(r#"<span class="{primary}">${{1}}</span>"#))
                .into_owned();
        }

        text
    }
}

impl Default for Formatter {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

/// Format with the built-in rules.
pub fn format_content(raw_block: &str) -> String {
    Formatter::builtin().format(raw_block)
}

pub(crate) fn ends_with_sentence_punctuation(line: &str) -> bool {
    line.ends_with(['.', ',', ':', ';'])
}

/// Alternation of escaped phrases, longest first, spliced into `template`.
fn phrase_regex(phrases: &[String], template: &str) -> Result<Option<Regex>, regex::Error> {
    let mut phrases: Vec<&str> = phrases
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if phrases.is_empty() {
        return Ok(None);
    }
    phrases.sort_by_key(|p| std::cmp::Reverse(p.chars().count()));

    let alternation = phrases
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&template.replace("{}", &alternation)).map(Some)
}
