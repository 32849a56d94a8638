//! The static language table.

use super::model::Language;

impl Language {
    pub const ARABIC: Language = Language::new("ar", "Arabic", None);
    pub const AZERBAIJANI: Language = Language::new("az", "Azerbaijani", None);
    pub const CHINESE: Language = Language::new("zh", "Chinese", Some("zh-CN"));
    pub const CZECH: Language = Language::new("cs", "Czech", None);
    pub const DANISH: Language = Language::new("da", "Danish", None);
    pub const DUTCH: Language = Language::new("nl", "Dutch", None);
    pub const ENGLISH: Language = Language::new("en", "English", Some("en-US"));
    pub const FINNISH: Language = Language::new("fi", "Finnish", None);
    pub const FRENCH: Language = Language::new("fr", "French", Some("fr-FR"));
    pub const GERMAN: Language = Language::new("de", "German", Some("de-DE"));
    pub const GREEK: Language = Language::new("el", "Greek", None);
    pub const HEBREW: Language = Language::new("he", "Hebrew", None);
    pub const HINDI: Language = Language::new("hi", "Hindi", None);
    pub const HUNGARIAN: Language = Language::new("hu", "Hungarian", None);
    pub const INDONESIAN: Language = Language::new("id", "Indonesian", None);
    pub const IRISH: Language = Language::new("ga", "Irish", None);
    pub const ITALIAN: Language = Language::new("it", "Italian", Some("it-IT"));
    pub const JAPANESE: Language = Language::new("ja", "Japanese", Some("ja-JP"));
    pub const KOREAN: Language = Language::new("ko", "Korean", Some("ko-KR"));
    pub const PERSIAN: Language = Language::new("fa", "Persian", None);
    pub const POLISH: Language = Language::new("pl", "Polish", None);
    pub const PORTUGUESE: Language = Language::new("pt", "Portuguese", None);
    pub const RUSSIAN: Language = Language::new("ru", "Russian", None);
    pub const SLOVAK: Language = Language::new("sk", "Slovak", None);
    pub const SPANISH: Language = Language::new("es", "Spanish", None);
    pub const SWEDISH: Language = Language::new("sv", "Swedish", None);
    pub const TURKISH: Language = Language::new("tr", "Turkish", None);
    pub const UKRAINIAN: Language = Language::new("uk", "Ukrainian", None);
}

pub(super) const LANGUAGES: &[Language] = &[
    Language::ARABIC,
    Language::AZERBAIJANI,
    Language::CHINESE,
    Language::CZECH,
    Language::DANISH,
    Language::DUTCH,
    Language::ENGLISH,
    Language::FINNISH,
    Language::FRENCH,
    Language::GERMAN,
    Language::GREEK,
    Language::HEBREW,
    Language::HINDI,
    Language::HUNGARIAN,
    Language::INDONESIAN,
    Language::IRISH,
    Language::ITALIAN,
    Language::JAPANESE,
    Language::KOREAN,
    Language::PERSIAN,
    Language::POLISH,
    Language::PORTUGUESE,
    Language::RUSSIAN,
    Language::SLOVAK,
    Language::SPANISH,
    Language::SWEDISH,
    Language::TURKISH,
    Language::UKRAINIAN,
];
