//! Language metadata.
//!
//! Languages are recorded as ISO 639-3 codes, most probable first. They come
//! from the extractor, from an explicit document-level list, or from a
//! script-based detector run per element.

use indexmap::IndexMap;

use crate::elements::Element;
use crate::pipeline::config::LanguageConfig;

/// Least share of a text's letters a script needs to be reported.
const MIN_SCRIPT_SHARE: f32 = 0.1;

/// ISO 639-3 code for a language code or name.
///
/// Accepts ISO 639-1 and 639-3 codes and English language names, in any
/// case. Unknown three-letter codes are passed through.
///
/// # Examples
///
/// ```
/// use element_oxide::languages::normalize_language;
///
/// assert_eq!(normalize_language("en").as_deref(), Some("eng"));
/// assert_eq!(normalize_language("German").as_deref(), Some("deu"));
/// assert_eq!(normalize_language("xx"), None);
/// ```
pub fn normalize_language(code: &str) -> Option<String> {
    let key = code.trim().to_lowercase();
    let iso3 = match key.as_str() {
        "en" | "eng" | "english" => "eng",
        "de" | "deu" | "ger" | "german" => "deu",
        "fr" | "fra" | "fre" | "french" => "fra",
        "es" | "spa" | "spanish" => "spa",
        "it" | "ita" | "italian" => "ita",
        "pt" | "por" | "portuguese" => "por",
        "nl" | "nld" | "dut" | "dutch" => "nld",
        "sv" | "swe" | "swedish" => "swe",
        "pl" | "pol" | "polish" => "pol",
        "ru" | "rus" | "russian" => "rus",
        "uk" | "ukr" | "ukrainian" => "ukr",
        "el" | "ell" | "gre" | "greek" => "ell",
        "ar" | "ara" | "arabic" => "ara",
        "he" | "heb" | "hebrew" => "heb",
        "hi" | "hin" | "hindi" => "hin",
        "th" | "tha" | "thai" => "tha",
        "zh" | "zho" | "chi" | "chinese" => "zho",
        "ja" | "jpn" | "japanese" => "jpn",
        "ko" | "kor" | "korean" => "kor",
        "tr" | "tur" | "turkish" => "tur",
        _ if key.len() == 3 && key.chars().all(|c| c.is_ascii_lowercase()) => return Some(key),
        _ => return None,
    };
    Some(iso3.to_string())
}

/// Writing systems the detector distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Script {
    Latin,
    Han,
    Kana,
    Hangul,
    Arabic,
    Hebrew,
    Cyrillic,
    Greek,
    Devanagari,
    Thai,
}

impl Script {
    fn of(c: char) -> Option<Script> {
        let script = match c as u32 {
            0x0041..=0x005A | 0x0061..=0x007A | 0x00C0..=0x024F => Script::Latin,
            0x0370..=0x03FF => Script::Greek,
            0x0400..=0x04FF => Script::Cyrillic,
            0x0590..=0x05FF => Script::Hebrew,
            0x0600..=0x06FF | 0x0750..=0x077F => Script::Arabic,
            0x0900..=0x097F => Script::Devanagari,
            0x0E00..=0x0E7F => Script::Thai,
            0x1100..=0x11FF | 0xAC00..=0xD7AF => Script::Hangul,
            0x3040..=0x30FF => Script::Kana,
            0x4E00..=0x9FFF | 0x3400..=0x4DBF => Script::Han,
            _ => return None,
        };
        Some(script)
    }

    fn language(&self) -> &'static str {
        match self {
            Script::Latin => "eng",
            Script::Han => "zho",
            Script::Kana => "jpn",
            Script::Hangul => "kor",
            Script::Arabic => "ara",
            Script::Hebrew => "heb",
            Script::Cyrillic => "rus",
            Script::Greek => "ell",
            Script::Devanagari => "hin",
            Script::Thai => "tha",
        }
    }
}

/// Languages of `text` by share of its letters, largest share first.
///
/// Detection is by script only: Latin text is reported as English, Han
/// characters count as Japanese when kana are present.
///
/// # Examples
///
/// ```
/// use element_oxide::languages::detect_languages;
///
/// assert_eq!(detect_languages("Hello world"), vec!["eng"]);
/// assert_eq!(detect_languages("東京は日本の首都です"), vec!["jpn"]);
/// assert!(detect_languages("1234").is_empty());
/// ```
pub fn detect_languages(text: &str) -> Vec<String> {
    let mut counts: IndexMap<Script, usize> = IndexMap::new();
    for script in text.chars().filter_map(Script::of) {
        *counts.entry(script).or_insert(0) += 1;
    }

    if counts.contains_key(&Script::Kana) {
        if let Some(han) = counts.swap_remove(&Script::Han) {
            *counts.entry(Script::Kana).or_insert(0) += han;
        }
    }

    let total: usize = counts.values().sum();
    if total == 0 {
        return Vec::new();
    }

    // stable: equal shares keep first-seen order
    counts.sort_by(|_, a, _, b| b.cmp(a));
    counts
        .into_iter()
        .filter(|(_, n)| *n as f32 / total as f32 >= MIN_SCRIPT_SHARE)
        .map(|(script, _)| script.language().to_string())
        .collect()
}

/// Fill in `languages` on elements that have none.
///
/// With per-element detection, each element's text is examined and the
/// document list is the fallback for text without letters. Otherwise every
/// element gets the document list. Languages supplied by the extractor are
/// kept.
pub fn apply_languages(elements: &mut [Element], config: &LanguageConfig) {
    let document: Option<Vec<String>> = config.languages.as_ref().map(|languages| {
        languages
            .iter()
            .filter_map(|code| {
                let normalized = normalize_language(code);
                if normalized.is_none() {
                    log::warn!("ignoring unrecognised language code {:?}", code);
                }
                normalized
            })
            .collect()
    });
    let document = document.filter(|l| !l.is_empty());

    if !config.detect_per_element && document.is_none() {
        return;
    }

    for element in elements.iter_mut().filter(|e| e.metadata.languages.is_none()) {
        let detected = if config.detect_per_element {
            Some(detect_languages(&element.text)).filter(|l| !l.is_empty())
        } else {
            None
        };
        element.metadata.languages = detected.or_else(|| document.clone());
    }
}
