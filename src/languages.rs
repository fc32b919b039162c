//! Language entries: the languages a run produces packs for.
//!
//! A run is configured with an ordered list of [`LanguageEntry`] values. Entries
//! can be spelled out as `Name:code` pairs or, for the languages in
//! [`SOUTH_AFRICAN_LANGUAGES`], by culture code alone.

use anyhow::{bail, Context, Result};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Language list used when `LANGUAGES` is not set.
pub const DEFAULT_LANGUAGES: &str = "English:en-ZA,Afrikaans:af-ZA";

/// Keyword in a language list that expands to every registry entry.
const SOUTH_AFRICA_KEYWORD: &str = "south-africa";

/// A target language: display name plus culture code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageEntry {
    /// Display name (e.g., "Afrikaans")
    pub name: String,

    /// Culture code (e.g., "af-ZA")
    pub culture_code: String,
}

/// The eleven official languages of South Africa.
pub const SOUTH_AFRICAN_LANGUAGES: &[(&str, &str)] = &[
    ("Afrikaans", "af-ZA"),
    ("English", "en-ZA"),
    ("isiNdebele", "nr-ZA"),
    ("isiXhosa", "xh-ZA"),
    ("isiZulu", "zu-ZA"),
    ("Sepedi", "nso-ZA"),
    ("Sesotho", "st-ZA"),
    ("Setswana", "tn-ZA"),
    ("SiSwati", "ss-ZA"),
    ("Tshivenda", "ve-ZA"),
    ("Xitsonga", "ts-ZA"),
];

fn culture_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})*$").expect("culture code regex is valid")
    })
}

impl LanguageEntry {
    /// Create a validated language entry.
    pub fn new(name: &str, culture_code: &str) -> Result<Self> {
        let name = name.trim();
        let culture_code = culture_code.trim();

        if name.is_empty() {
            bail!("Language name for '{}' is empty", culture_code);
        }
        if !culture_code_pattern().is_match(culture_code) {
            bail!("Invalid culture code: '{}'", culture_code);
        }

        Ok(Self {
            name: name.to_string(),
            culture_code: culture_code.to_string(),
        })
    }

    /// Look up a registry language by culture code (case-insensitive).
    pub fn from_registry(culture_code: &str) -> Option<Self> {
        SOUTH_AFRICAN_LANGUAGES
            .iter()
            .find(|(_, code)| code.eq_ignore_ascii_case(culture_code.trim()))
            .map(|(name, code)| Self {
                name: (*name).to_string(),
                culture_code: (*code).to_string(),
            })
    }

    /// Language code sent to the translation service: the primary subtag
    /// of the culture code ("af-ZA" -> "af").
    pub fn target_language(&self) -> &str {
        self.culture_code
            .split('-')
            .next()
            .unwrap_or(&self.culture_code)
    }

    /// Whether this entry is the language the resources are written in.
    pub fn is_source(&self, source_language: &str) -> bool {
        self.target_language().eq_ignore_ascii_case(source_language)
    }
}

/// Parse a comma-separated language list.
///
/// Each item is either `Name:code` or a bare culture code known to the
/// registry. The keyword `south-africa` expands to the full registry.
/// Duplicate culture codes are rejected.
pub fn parse_language_list(list: &str) -> Result<Vec<LanguageEntry>> {
    let mut entries = Vec::new();

    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if item.eq_ignore_ascii_case(SOUTH_AFRICA_KEYWORD) {
            for (name, code) in SOUTH_AFRICAN_LANGUAGES {
                entries.push(LanguageEntry::new(name, code)?);
            }
            continue;
        }

        let entry = match item.split_once(':') {
            Some((name, code)) => LanguageEntry::new(name, code)
                .with_context(|| format!("Invalid language entry '{}'", item))?,
            None => LanguageEntry::from_registry(item).with_context(|| {
                format!(
                    "Unknown culture code '{}' (use 'Name:{}' to add it)",
                    item, item
                )
            })?,
        };
        entries.push(entry);
    }

    if entries.is_empty() {
        bail!("Language list is empty");
    }

    let mut seen = HashSet::new();
    for entry in &entries {
        if !seen.insert(entry.culture_code.to_ascii_lowercase()) {
            bail!("Duplicate culture code '{}'", entry.culture_code);
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_language_is_primary_subtag() {
        let afrikaans = LanguageEntry::new("Afrikaans", "af-ZA").unwrap();
        assert_eq!(afrikaans.target_language(), "af");

        let sepedi = LanguageEntry::new("Sepedi", "nso-ZA").unwrap();
        assert_eq!(sepedi.target_language(), "nso");
    }

    #[test]
    fn test_target_language_without_region() {
        let german = LanguageEntry::new("German", "de").unwrap();
        assert_eq!(german.target_language(), "de");
    }

    #[test]
    fn test_is_source() {
        let english = LanguageEntry::new("English", "en-ZA").unwrap();
        let afrikaans = LanguageEntry::new("Afrikaans", "af-ZA").unwrap();

        assert!(english.is_source("en"));
        assert!(english.is_source("EN"));
        assert!(!afrikaans.is_source("en"));
    }

    #[test]
    fn test_new_rejects_invalid_codes() {
        assert!(LanguageEntry::new("Bad", "").is_err());
        assert!(LanguageEntry::new("Bad", "a").is_err());
        assert!(LanguageEntry::new("Bad", "af_ZA").is_err());
        assert!(LanguageEntry::new("Bad", "af-").is_err());
        assert!(LanguageEntry::new("", "af-ZA").is_err());
    }

    #[test]
    fn test_new_trims_whitespace() {
        let entry = LanguageEntry::new("  Afrikaans ", " af-ZA ").unwrap();
        assert_eq!(entry.name, "Afrikaans");
        assert_eq!(entry.culture_code, "af-ZA");
    }

    #[test]
    fn test_registry_has_eleven_languages() {
        assert_eq!(SOUTH_AFRICAN_LANGUAGES.len(), 11);
        for (name, code) in SOUTH_AFRICAN_LANGUAGES {
            assert!(LanguageEntry::new(name, code).is_ok(), "{} should be valid", code);
        }
    }

    #[test]
    fn test_from_registry() {
        let zulu = LanguageEntry::from_registry("zu-za").expect("isiZulu is registered");
        assert_eq!(zulu.name, "isiZulu");
        assert_eq!(zulu.culture_code, "zu-ZA");

        assert!(LanguageEntry::from_registry("fr-FR").is_none());
    }

    #[test]
    fn test_parse_default_list() {
        let entries = parse_language_list(DEFAULT_LANGUAGES).unwrap();
        assert_eq!(
            entries,
            vec![
                LanguageEntry::new("English", "en-ZA").unwrap(),
                LanguageEntry::new("Afrikaans", "af-ZA").unwrap(),
            ]
        );
    }

    #[test]
    fn test_parse_mixed_list_keeps_order() {
        let entries = parse_language_list("zu-ZA, German:de-DE ,xh-ZA").unwrap();
        let codes: Vec<_> = entries.iter().map(|e| e.culture_code.as_str()).collect();
        assert_eq!(codes, vec!["zu-ZA", "de-DE", "xh-ZA"]);
        assert_eq!(entries[1].name, "German");
    }

    #[test]
    fn test_parse_south_africa_keyword() {
        let entries = parse_language_list("south-africa").unwrap();
        assert_eq!(entries.len(), 11);
        assert_eq!(entries[0].culture_code, "af-ZA");
    }

    #[test]
    fn test_parse_unknown_bare_code() {
        let err = parse_language_list("fr-FR").unwrap_err();
        assert!(format!("{:#}", err).contains("Unknown culture code"));
    }

    #[test]
    fn test_parse_rejects_duplicates() {
        let err = parse_language_list("af-ZA,Afrikaans:AF-za").unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(parse_language_list("").is_err());
        assert!(parse_language_list(" , ,").is_err());
    }
}
