//! Text-only classification of uncategorized elements.
//!
//! When neither the layout model nor the embedded text layer can name an
//! element's category, the text itself often can: a bullet prefix marks a
//! list item, a lone e-mail address is an EmailAddress, a short capitalised
//! line without terminal punctuation is a heading.

use lazy_static::lazy_static;
use regex::Regex;

use crate::elements::ElementType;

/// Longest line (in characters) still considered a title.
const MAX_TITLE_CHARS: usize = 120;

/// Most words a title may have.
const MAX_TITLE_WORDS: usize = 12;

/// Fewest words of a narrative sentence.
const MIN_NARRATIVE_WORDS: usize = 3;

lazy_static! {
    /// Bullet glyph or enumerator followed by whitespace
    static ref RE_BULLET: Regex =
        Regex::new(r"^\s*(?:[•●○◦▪▫■□‣⁃∙·*\-–]|\(?\d{1,3}[.)]|\(?[a-z][.)])\s+(\S.*)$").unwrap();

    /// A single e-mail address
    static ref RE_EMAIL: Regex =
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$").unwrap();

    /// US-style street address line
    static ref RE_ADDRESS: Regex = Regex::new(
        r"(?i)^\d{1,6}\s+(?:[A-Za-z0-9.'\-]+\s+){1,5}(?:street|st|avenue|ave|road|rd|boulevard|blvd|lane|ln|drive|dr|court|ct|way|place|pl|parkway|pkwy|highway|hwy|square|sq)\.?(?:\s+(?:n|s|e|w|ne|nw|se|sw)\.?)?(?:,?\s+(?:suite|ste|apt|unit|#)\s*[\w\-]+)?(?:,\s*[A-Za-z .'\-]+)*(?:,?\s+[A-Z]{2}\s+\d{5}(?:-\d{4})?)?$"
    )
    .unwrap();

    /// Sentence-final punctuation, optionally followed by closing quotes or brackets
    static ref RE_TERMINAL: Regex = Regex::new(r#"[.!?…]["'”’)\]]*$"#).unwrap();
}

/// Category inferred from text, with the text to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextClassification {
    /// Inferred category
    pub category: ElementType,
    /// Text with list markers removed
    pub text: String,
}

/// Infer a category from text alone.
///
/// Returns UncategorizedText when no rule applies.
///
/// # Examples
///
/// ```
/// use element_oxide::elements::ElementType;
/// use element_oxide::layout::classify_text;
///
/// let item = classify_text("• Preheat the oven");
/// assert_eq!(item.category, ElementType::ListItem);
/// assert_eq!(item.text, "Preheat the oven");
///
/// assert_eq!(classify_text("INTRODUCTION").category, ElementType::Title);
/// assert_eq!(classify_text("jane.doe@example.com").category, ElementType::EmailAddress);
/// ```
pub fn classify_text(text: &str) -> TextClassification {
    let trimmed = text.trim();
    let keep = |category| TextClassification {
        category,
        text: text.to_string(),
    };

    if trimmed.is_empty() {
        return keep(ElementType::UncategorizedText);
    }

    if let Some(caps) = RE_BULLET.captures(trimmed) {
        if let Some(body) = caps.get(1) {
            return TextClassification {
                category: ElementType::ListItem,
                text: body.as_str().trim().to_string(),
            };
        }
    }

    if RE_EMAIL.is_match(trimmed) {
        return keep(ElementType::EmailAddress);
    }

    if RE_ADDRESS.is_match(trimmed) {
        return keep(ElementType::Address);
    }

    if is_possible_title(trimmed) {
        return keep(ElementType::Title);
    }

    if is_possible_narrative(trimmed) {
        return keep(ElementType::NarrativeText);
    }

    keep(ElementType::UncategorizedText)
}

/// Short single line, starting with an uppercase letter, without
/// sentence-final punctuation.
fn is_possible_title(text: &str) -> bool {
    if text.contains('\n') || text.chars().count() > MAX_TITLE_CHARS {
        return false;
    }
    if text.split_whitespace().count() > MAX_TITLE_WORDS {
        return false;
    }
    if RE_TERMINAL.is_match(text) || text.ends_with(&[',', ';', ':'][..]) {
        return false;
    }

    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    match letters.peek() {
        Some(first) if first.is_uppercase() => {},
        _ => return false,
    }

    // mostly digits ("2023", "1.2.3") is a number, not a heading
    let alphabetic = text.chars().filter(|c| c.is_alphabetic()).count();
    let numeric = text.chars().filter(|c| c.is_numeric()).count();
    alphabetic > numeric
}

/// Several words ending in sentence punctuation.
fn is_possible_narrative(text: &str) -> bool {
    text.split_whitespace().count() >= MIN_NARRATIVE_WORDS && RE_TERMINAL.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullets_and_enumerators() {
        for (input, body) in [
            ("• First point", "First point"),
            ("- dash item", "dash item"),
            ("1. numbered", "numbered"),
            ("(a) lettered", "lettered"),
            ("12) paren", "paren"),
        ] {
            let result = classify_text(input);
            assert_eq!(result.category, ElementType::ListItem, "{}", input);
            assert_eq!(result.text, body);
        }
    }

    #[test]
    fn test_email_and_address() {
        assert_eq!(classify_text("  ops@example.co.uk ").category, ElementType::EmailAddress);
        assert_eq!(classify_text("not an @ email").category, ElementType::UncategorizedText);
        assert_eq!(
            classify_text("1600 Pennsylvania Avenue NW, Washington, DC 20500").category,
            ElementType::Address
        );
        assert_eq!(classify_text("221 Baker Street").category, ElementType::Address);
    }

    #[test]
    fn test_titles() {
        assert_eq!(classify_text("Results and Discussion").category, ElementType::Title);
        assert_eq!(classify_text("CHAPTER ONE").category, ElementType::Title);
        assert_eq!(classify_text("lowercase start").category, ElementType::UncategorizedText);
        assert_eq!(classify_text("2023").category, ElementType::UncategorizedText);
        assert_eq!(classify_text("Ends with a colon:").category, ElementType::UncategorizedText);
    }

    #[test]
    fn test_narrative() {
        let result = classify_text("The quick brown fox jumps over the lazy dog.");
        assert_eq!(result.category, ElementType::NarrativeText);
        assert_eq!(classify_text("He said \"stop.\"").category, ElementType::NarrativeText);
    }

    #[test]
    fn test_empty_stays_uncategorized() {
        let result = classify_text("   ");
        assert_eq!(result.category, ElementType::UncategorizedText);
        assert_eq!(result.text, "   ");
    }
}
