use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Languages supported by the XTTS v2 model.
///
/// The wire codes (used by the `tts` CLI's `--language_idx` argument) are
/// lowercase ISO 639-1, except Mandarin which the model names `zh-cn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    En,
    #[serde(rename = "es")]
    Es,
    #[serde(rename = "fr")]
    Fr,
    #[serde(rename = "de")]
    De,
    #[serde(rename = "it")]
    It,
    #[serde(rename = "pt")]
    Pt,
    #[serde(rename = "pl")]
    Pl,
    #[serde(rename = "tr")]
    Tr,
    #[serde(rename = "ru")]
    Ru,
    #[serde(rename = "nl")]
    Nl,
    #[serde(rename = "cs")]
    Cs,
    #[serde(rename = "ar")]
    Ar,
    #[serde(rename = "zh-cn")]
    ZhCn,
    #[serde(rename = "hu")]
    Hu,
    #[serde(rename = "ko")]
    Ko,
    #[serde(rename = "ja")]
    Ja,
    #[serde(rename = "hi")]
    Hi,
}

/// Error returned when a language code is not in the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "unsupported language code '{0}'. Supported codes: \
     en, es, fr, de, it, pt, pl, tr, ru, nl, cs, ar, zh-cn, hu, ko, ja, hi"
)]
pub struct UnsupportedLanguage(pub String);

impl Language {
    /// Every supported language, in the order the model documents them.
    pub const ALL: [Language; 17] = [
        Language::En,
        Language::Es,
        Language::Fr,
        Language::De,
        Language::It,
        Language::Pt,
        Language::Pl,
        Language::Tr,
        Language::Ru,
        Language::Nl,
        Language::Cs,
        Language::Ar,
        Language::ZhCn,
        Language::Hu,
        Language::Ko,
        Language::Ja,
        Language::Hi,
    ];

    /// The wire code passed to the model.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::It => "it",
            Language::Pt => "pt",
            Language::Pl => "pl",
            Language::Tr => "tr",
            Language::Ru => "ru",
            Language::Nl => "nl",
            Language::Cs => "cs",
            Language::Ar => "ar",
            Language::ZhCn => "zh-cn",
            Language::Hu => "hu",
            Language::Ko => "ko",
            Language::Ja => "ja",
            Language::Hi => "hi",
        }
    }

    /// Map an arbitrary language tag to the closest supported language.
    ///
    /// Supported codes map to themselves. Ukrainian is not in the model's
    /// set and maps to Russian as the nearest match; everything else falls
    /// back to English. Use [`Language::from_str`] instead when an
    /// unsupported code should be an error.
    pub fn nearest_supported(code: &str) -> Language {
        if let Ok(lang) = code.parse() {
            return lang;
        }
        match code.to_ascii_lowercase().as_str() {
            "uk" => Language::Ru,
            _ => Language::En,
        }
    }

    /// Guess the language of a text from its script.
    ///
    /// Cyrillic text synthesizes best as Russian (the model has no
    /// Ukrainian); everything else defaults to English.
    pub fn detect(text: &str) -> Language {
        let cyrillic = text
            .chars()
            .any(|c| matches!(c, '\u{0400}'..='\u{04FF}'));
        if cyrillic {
            Language::Ru
        } else {
            Language::En
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.as_str() == code)
            .ok_or_else(|| UnsupportedLanguage(s.to_string()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_round_trips_through_from_str() {
        for lang in Language::ALL {
            let parsed: Language = lang.as_str().parse().unwrap();
            assert_eq!(parsed, lang);
        }
    }

    #[test]
    fn parse_is_case_and_whitespace_tolerant() {
        assert_eq!(" EN ".parse::<Language>().unwrap(), Language::En);
        assert_eq!("Zh-CN".parse::<Language>().unwrap(), Language::ZhCn);
    }

    #[test]
    fn unknown_code_is_an_error_naming_the_code() {
        let err = "uk".parse::<Language>().unwrap_err();
        assert_eq!(err, UnsupportedLanguage("uk".to_string()));
        assert!(err.to_string().contains("'uk'"));
        assert!(err.to_string().contains("zh-cn"));
    }

    #[test]
    fn nearest_supported_maps_ukrainian_to_russian() {
        assert_eq!(Language::nearest_supported("uk"), Language::Ru);
        assert_eq!(Language::nearest_supported("ja"), Language::Ja);
        assert_eq!(Language::nearest_supported("xx"), Language::En);
    }

    #[test]
    fn detect_picks_russian_for_cyrillic_text() {
        assert_eq!(Language::detect("Привіт, світе!"), Language::Ru);
        assert_eq!(Language::detect("Это тест."), Language::Ru);
        assert_eq!(Language::detect("Hello, world!"), Language::En);
        assert_eq!(Language::detect(""), Language::En);
    }

    #[test]
    fn serde_uses_wire_codes() {
        let json = serde_json::to_string(&Language::ZhCn).unwrap();
        assert_eq!(json, "\"zh-cn\"");
        let back: Language = serde_json::from_str("\"ru\"").unwrap();
        assert_eq!(back, Language::Ru);
    }
}
