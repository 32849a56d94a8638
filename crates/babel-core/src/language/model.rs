//! Language value type.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use super::registry::LANGUAGES;

/// A supported language.
///
/// Identity is the code: two `Language` values are equal exactly when their
/// codes are equal. Serialized as the bare code (`"en"`), and deserialized by
/// looking that code up in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    code: &'static str,
    name: &'static str,
    locale: Option<&'static str>,
}

impl Language {
    pub(super) const fn new(
        code: &'static str,
        name: &'static str,
        locale: Option<&'static str>,
    ) -> Self {
        Self { code, name, locale }
    }

    /// ISO 639-1 code (e.g. `"en"`).
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// English display name (e.g. `"English"`).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// BCP-47 tag of the platform default speech locale, if there is one.
    ///
    /// Only languages with a dedicated default speech voice carry a locale;
    /// callers fall back to their own default otherwise.
    pub fn locale(&self) -> Option<&'static str> {
        self.locale
    }

    /// Every language in the registry, in display order.
    pub fn all() -> &'static [Language] {
        LANGUAGES
    }

    /// Looks up a language by code, ignoring ASCII case.
    pub fn from_code(code: &str) -> Option<Language> {
        let code = code.trim();
        LANGUAGES
            .iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(code))
            .copied()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

impl Serialize for Language {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.code)
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CodeVisitor;

        impl Visitor<'_> for CodeVisitor {
            type Value = Language;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a supported language code")
            }

            fn visit_str<E>(self, value: &str) -> Result<Language, E>
            where
                E: de::Error,
            {
                Language::from_code(value)
                    .ok_or_else(|| E::custom(format!("unsupported language code '{value}'")))
            }
        }

        deserializer.deserialize_str(CodeVisitor)
    }
}

/// Which side of a translation a language picker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageSide {
    From,
    To,
}

impl LanguageSide {
    pub fn other(self) -> Self {
        match self {
            LanguageSide::From => LanguageSide::To,
            LanguageSide::To => LanguageSide::From,
        }
    }
}
