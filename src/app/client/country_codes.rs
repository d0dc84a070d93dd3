//! Country name to ISO 3166-1 alpha-2 lookup used as a geocoding hint

/// Lowercase alpha-2 codes keyed by English country name
const COUNTRY_CODES: &[(&str, &str)] = &[
    ("Argentina", "ar"),
    ("Australia", "au"),
    ("Austria", "at"),
    ("Belgium", "be"),
    ("Brazil", "br"),
    ("Bulgaria", "bg"),
    ("Canada", "ca"),
    ("Chile", "cl"),
    ("China", "cn"),
    ("Colombia", "co"),
    ("Croatia", "hr"),
    ("Czech Republic", "cz"),
    ("Czechia", "cz"),
    ("Denmark", "dk"),
    ("Egypt", "eg"),
    ("Estonia", "ee"),
    ("Finland", "fi"),
    ("France", "fr"),
    ("Germany", "de"),
    ("Greece", "gr"),
    ("Hong Kong", "hk"),
    ("Hungary", "hu"),
    ("Iceland", "is"),
    ("India", "in"),
    ("Indonesia", "id"),
    ("Ireland", "ie"),
    ("Israel", "il"),
    ("Italy", "it"),
    ("Japan", "jp"),
    ("Kenya", "ke"),
    ("Latvia", "lv"),
    ("Lithuania", "lt"),
    ("Luxembourg", "lu"),
    ("Malaysia", "my"),
    ("Mexico", "mx"),
    ("Moldova", "md"),
    ("Netherlands", "nl"),
    ("New Zealand", "nz"),
    ("Nigeria", "ng"),
    ("Norway", "no"),
    ("Peru", "pe"),
    ("Philippines", "ph"),
    ("Poland", "pl"),
    ("Portugal", "pt"),
    ("Romania", "ro"),
    ("Russia", "ru"),
    ("Saudi Arabia", "sa"),
    ("Serbia", "rs"),
    ("Singapore", "sg"),
    ("Slovakia", "sk"),
    ("Slovenia", "si"),
    ("South Africa", "za"),
    ("South Korea", "kr"),
    ("Spain", "es"),
    ("Sweden", "se"),
    ("Switzerland", "ch"),
    ("Taiwan", "tw"),
    ("Thailand", "th"),
    ("Turkey", "tr"),
    ("Ukraine", "ua"),
    ("United Arab Emirates", "ae"),
    ("United Kingdom", "gb"),
    ("United States", "us"),
    ("USA", "us"),
    ("Vietnam", "vn"),
];

/// Alpha-2 code for a normalized country name, matched case-insensitively
///
/// Unknown countries return `None`; callers simply omit the hint.
pub fn country_code(country: &str) -> Option<&'static str> {
    let country = country.trim();
    COUNTRY_CODES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(country))
        .map(|(_, code)| *code)
}
