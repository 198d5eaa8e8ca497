//! Canonicalise free-text country identifiers to ISO 3166-1 alpha-3 codes.

use std::collections::HashMap;
use std::fmt;

use log::debug;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::config::Config;
use crate::registry::{is_known_code, REGISTRY};

/// Placeholders that always mean "no country".
pub const SENTINELS: &[&str] = &["", "NAN", "NONE", "-1", "NA", "N/A", "NULL", "...", ".."];

/// Territories whose code is fixed and never left to fuzzy matching.
pub const TERRITORIES: &[(&str, &str)] = &[
    ("HONG KONG", "HKG"),
    ("HONG KONG SAR", "HKG"),
    ("HONG KONG SAR, CHINA", "HKG"),
    ("HONG KONG, CHINA", "HKG"),
    ("CHINA, HONG KONG SAR", "HKG"),
    ("MACAU", "MAC"),
    ("MACAO", "MAC"),
    ("MACAO SAR, CHINA", "MAC"),
    ("CHINA, MACAO SAR", "MAC"),
    ("TAIWAN", "TWN"),
    ("CHINESE TAIPEI", "TWN"),
    ("TAIWAN, CHINA", "TWN"),
    ("KOSOVO", "XKX"),
    ("KSV", "XKX"),
    ("XKX", "XKX"),
    ("PALESTINE", "PSE"),
    ("STATE OF PALESTINE", "PSE"),
    ("WEST BANK AND GAZA", "PSE"),
    ("OCCUPIED PALESTINIAN TERRITORY", "PSE"),
];

/// Codes that a fuzzy match may never produce.
const SENSITIVE_CODES: &[&str] = &["HKG", "MAC", "TWN", "XKX", "PSE"];

/// Default alias table: alternate spellings, colloquial names and retired codes.
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("BOLIVIA", "BOL"),
    ("BOLIVIA (PLURINATIONAL STATE OF)", "BOL"),
    ("VENEZUELA", "VEN"),
    ("VENEZUELA, RB", "VEN"),
    ("VENEZUELA (BOLIVARIAN REPUBLIC OF)", "VEN"),
    ("IRAN", "IRN"),
    ("IRAN, ISLAMIC REP.", "IRN"),
    ("IRAN (ISLAMIC REPUBLIC OF)", "IRN"),
    ("TANZANIA", "TZA"),
    ("UNITED REPUBLIC OF TANZANIA", "TZA"),
    ("RUSSIA", "RUS"),
    ("RUSSIAN FEDERATION", "RUS"),
    ("SOUTH KOREA", "KOR"),
    ("KOREA", "KOR"),
    ("KOREA, REP.", "KOR"),
    ("KOREA, SOUTH", "KOR"),
    ("KOREA (REPUBLIC OF)", "KOR"),
    ("REPUBLIC OF KOREA", "KOR"),
    ("NORTH KOREA", "PRK"),
    ("KOREA, NORTH", "PRK"),
    ("KOREA, DEM. PEOPLE'S REP.", "PRK"),
    ("KOREA, DEMOCRATIC PEOPLE'S REPUBLIC OF", "PRK"),
    ("DEMOCRATIC PEOPLE'S REPUBLIC OF KOREA", "PRK"),
    ("COTE D'IVOIRE", "CIV"),
    ("COTE DIVOIRE", "CIV"),
    ("IVORY COAST", "CIV"),
    ("DEMOCRATIC REPUBLIC OF THE CONGO", "COD"),
    ("DEMOCRATIC REPUBLIC OF CONGO", "COD"),
    ("DR CONGO", "COD"),
    ("DRC", "COD"),
    ("CONGO, DEM. REP.", "COD"),
    ("ZAIRE", "COD"),
    ("ZAR", "COD"),
    ("CONGO (KINSHASA)", "COD"),
    ("CONGO, REP.", "COG"),
    ("REPUBLIC OF THE CONGO", "COG"),
    ("REPUBLIC OF CONGO", "COG"),
    ("CONGO (BRAZZAVILLE)", "COG"),
    ("UNITED STATES", "USA"),
    ("UNITED STATES OF AMERICA", "USA"),
    ("UNITED STATES VIRGIN ISLANDS", "VIR"),
    ("US VIRGIN ISLANDS", "VIR"),
    ("VIRGIN ISLANDS, U.S.", "VIR"),
    ("BRITISH VIRGIN ISLANDS", "VGB"),
    ("US", "USA"),
    ("U.S.", "USA"),
    ("UNITED KINGDOM", "GBR"),
    ("UK", "GBR"),
    ("GREAT BRITAIN", "GBR"),
    ("VIETNAM", "VNM"),
    ("LAO PDR", "LAO"),
    ("LAOS", "LAO"),
    ("SYRIA", "SYR"),
    ("CZECH REPUBLIC", "CZE"),
    ("SLOVAK REPUBLIC", "SVK"),
    ("MOLDOVA", "MDA"),
    ("REPUBLIC OF MOLDOVA", "MDA"),
    ("SWAZILAND", "SWZ"),
    ("BURMA", "MMR"),
    ("CAPE VERDE", "CPV"),
    ("TURKEY", "TUR"),
    ("MICRONESIA", "FSM"),
    ("MICRONESIA, FED. STS.", "FSM"),
    ("MICRONESIA (COUNTRY)", "FSM"),
    ("FEDERATED STATES OF MICRONESIA", "FSM"),
    ("EGYPT, ARAB REP.", "EGY"),
    ("YEMEN, REP.", "YEM"),
    ("GAMBIA, THE", "GMB"),
    ("THE GAMBIA", "GMB"),
    ("BAHAMAS, THE", "BHS"),
    ("KYRGYZ REPUBLIC", "KGZ"),
    ("BRUNEI", "BRN"),
    ("EAST TIMOR", "TLS"),
    ("MACEDONIA", "MKD"),
    ("FYR MACEDONIA", "MKD"),
    ("ST. LUCIA", "LCA"),
    ("ST. KITTS AND NEVIS", "KNA"),
    ("ST. VINCENT AND THE GRENADINES", "VCT"),
    ("SAO TOME", "STP"),
    ("ROM", "ROU"),
    ("TMP", "TLS"),
];

/// Dissolved or renamed entities with no single present-day code. Never resolved.
pub const RETIRED_ENTITIES: &[&str] = &[
    "NETHERLANDS ANTILLES",
    "ANT",
    "SERBIA AND MONTENEGRO",
    "SCG",
    "YUGOSLAVIA",
    "YUG",
    "CZECHOSLOVAKIA",
    "CSK",
    "USSR",
    "SOVIET UNION",
    "SUN",
];

/// How an identifier was resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Via {
    Alias,
    Territory,
    Code,
    Name,
    Fuzzy(f64),
}

impl fmt::Display for Via {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Via::Alias => write!(f, "alias"),
            Via::Territory => write!(f, "territory"),
            Via::Code => write!(f, "code"),
            Via::Name => write!(f, "name"),
            Via::Fuzzy(score) => write!(f, "fuzzy ({score:.3})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub code: String,
    pub via: Via,
}

/// Uppercase, trim and collapse internal whitespace.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// `normalize` followed by removal of diacritics and apostrophe variants.
pub fn fold(raw: &str) -> String {
    normalize(raw)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            '\u{2019}' | '\u{2018}' | '`' => '\'',
            other => other,
        })
        .collect()
}

pub fn is_sentinel(raw: &str) -> bool {
    SENTINELS.contains(&normalize(raw).as_str())
}

/// Alphanumeric words of a folded name.
fn tokens(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| token.len() >= 4)
}

/// Every significant word of `folded` must be close to some word of `candidate`,
/// so a shared prefix alone cannot carry a match.
fn words_agree(folded: &str, candidate: &str, threshold: f64) -> bool {
    tokens(folded).all(|word| {
        tokens(candidate).any(|other| strsim::jaro_winkler(word, other) >= threshold)
    })
}

fn is_code_shaped(value: &str) -> bool {
    !value.is_empty() && value.len() <= 3 && value.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Resolver shared by every source normalizer.
#[derive(Debug, Clone)]
pub struct CountryResolver {
    aliases: HashMap<String, String>,
    territories: HashMap<&'static str, &'static str>,
    names: Vec<(&'static str, &'static str)>,
    fuzzy_threshold: f64,
}

impl CountryResolver {
    pub fn new(config: &Config) -> Self {
        CountryResolver {
            aliases: config
                .alias_table
                .iter()
                .map(|(name, code)| (fold(name), normalize(code)))
                .collect(),
            territories: TERRITORIES.iter().copied().collect(),
            names: REGISTRY.to_vec(),
            fuzzy_threshold: config.fuzzy_threshold,
        }
    }

    /// Resolve to a code, or `None` if the identifier is a placeholder or unknown.
    pub fn code(&self, raw: &str) -> Option<String> {
        self.resolve(raw).map(|resolution| resolution.code)
    }

    pub fn resolve(&self, raw: &str) -> Option<Resolution> {
        if is_sentinel(raw) {
            return None;
        }
        let folded = fold(raw);
        if RETIRED_ENTITIES.contains(&folded.as_str()) {
            debug!("{folded:?} is a retired entity");
            return None;
        }
        if let Some(code) = self.aliases.get(&folded) {
            return is_known_code(code).then(|| Resolution {
                code: code.clone(),
                via: Via::Alias,
            });
        }
        if let Some(code) = self.territories.get(folded.as_str()) {
            return Some(Resolution {
                code: code.to_string(),
                via: Via::Territory,
            });
        }
        if folded.len() == 3 && folded.chars().all(|c| c.is_ascii_uppercase()) && is_known_code(&folded)
        {
            return Some(Resolution {
                code: folded,
                via: Via::Code,
            });
        }
        if let Some((code, _)) = self.names.iter().find(|(_, name)| *name == folded) {
            return Some(Resolution {
                code: code.to_string(),
                via: Via::Name,
            });
        }
        if is_code_shaped(&folded) {
            return None;
        }
        self.fuzzy(&folded)
    }

    fn fuzzy(&self, folded: &str) -> Option<Resolution> {
        let mut best: Option<(&str, &str, f64)> = None;
        for &(code, name) in &self.names {
            let score = strsim::jaro_winkler(folded, name);
            if best.map_or(true, |(_, _, top)| score > top) {
                best = Some((code, name, score));
            }
        }
        let (code, name, score) = best?;
        if score < self.fuzzy_threshold {
            debug!("No fuzzy match for {folded:?} (best {code} at {score:.3})");
            return None;
        }
        if !words_agree(folded, name, self.fuzzy_threshold) {
            debug!("Rejected fuzzy match {folded:?} -> {code} ({name} shares no wording)");
            return None;
        }
        if SENSITIVE_CODES.contains(&code) {
            debug!("Rejected fuzzy match {folded:?} -> {code}");
            return None;
        }
        Some(Resolution {
            code: code.to_string(),
            via: Via::Fuzzy(score),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> CountryResolver {
        CountryResolver::new(&Config::default())
    }

    #[test]
    fn resolves_common_names() {
        let resolver = resolver();
        assert_eq!(resolver.code("UNITED STATES").as_deref(), Some("USA"));
        assert_eq!(resolver.code("  united   states ").as_deref(), Some("USA"));
        assert_eq!(resolver.code("CÔTE D'IVOIRE").as_deref(), Some("CIV"));
        assert_eq!(resolver.code("Côte d’Ivoire").as_deref(), Some("CIV"));
        assert_eq!(resolver.code("Germany").as_deref(), Some("DEU"));
    }

    #[test]
    fn sentinels_are_null() {
        let resolver = resolver();
        for raw in ["", "   ", "N/A", "n/a", "NA", "NaN", "None", "-1", "NULL", "..."] {
            assert_eq!(resolver.code(raw), None, "{raw:?} should be null");
        }
    }

    #[test]
    fn codes_pass_through_only_when_registered() {
        let resolver = resolver();
        let resolution = resolver.resolve("bra").unwrap();
        assert_eq!(resolution.code, "BRA");
        assert_eq!(resolution.via, Via::Code);
        assert_eq!(resolver.code("QQQ"), None);
        assert_eq!(resolver.code("WLD"), None);
    }

    #[test]
    fn territories_use_fixed_codes() {
        let resolver = resolver();
        assert_eq!(resolver.code("Hong Kong SAR").as_deref(), Some("HKG"));
        assert_eq!(resolver.code("Macau").as_deref(), Some("MAC"));
        assert_eq!(resolver.code("Chinese Taipei").as_deref(), Some("TWN"));
        assert_eq!(resolver.code("KSV").as_deref(), Some("XKX"));
        assert_eq!(resolver.code("West Bank and Gaza").as_deref(), Some("PSE"));
    }

    #[test]
    fn fuzzy_matches_are_reported_and_bounded() {
        let resolver = resolver();
        let resolution = resolver.resolve("Argentinaa").unwrap();
        assert_eq!(resolution.code, "ARG");
        assert!(matches!(resolution.via, Via::Fuzzy(score) if score >= 0.88));
        assert_eq!(resolver.code("Zzyzx Qwvq"), None);
        // Short unknown codes are never fuzzy matched.
        assert_eq!(resolver.code("AR2"), None);
    }

    #[test]
    fn fuzzy_never_picks_sensitive_territories() {
        let resolver = resolver();
        assert_eq!(resolver.code("Hong Kongg"), None);
    }

    #[test]
    fn long_form_and_reordered_names_resolve() {
        let resolver = resolver();
        for (raw, code) in [
            ("United Republic of Tanzania", "TZA"),
            ("Republic of Moldova", "MDA"),
            ("Democratic People's Republic of Korea", "PRK"),
            ("Korea, North", "PRK"),
            ("Korea, South", "KOR"),
            ("Congo (Kinshasa)", "COD"),
            ("Congo (Brazzaville)", "COG"),
            ("Micronesia (country)", "FSM"),
            ("United States Virgin Islands", "VIR"),
        ] {
            assert_eq!(resolver.code(raw).as_deref(), Some(code), "{raw:?}");
        }
    }

    #[test]
    fn retired_entities_and_partial_names_stay_unresolved() {
        let resolver = resolver();
        assert_eq!(resolver.code("Netherlands Antilles"), None);
        assert_eq!(resolver.code("Serbia and Montenegro"), None);
        assert_eq!(resolver.code("ANT"), None);
        // Shares a long prefix with the minor outlying islands but not the wording.
        assert_eq!(resolver.code("United States Pacific Atolls"), None);
        assert!(!words_agree(
            "UNITED STATES VIRGIN ISLANDS",
            "UNITED STATES MINOR OUTLYING ISLANDS",
            0.88
        ));
        assert!(words_agree("ARGENTINAA", "ARGENTINA", 0.88));
    }

    #[test]
    fn aliases_from_config_are_folded() {
        let mut config = Config::default();
        config
            .alias_table
            .insert("Republique Démocratique".into(), "cod".into());
        let resolver = CountryResolver::new(&config);
        assert_eq!(resolver.code("REPUBLIQUE DEMOCRATIQUE").as_deref(), Some("COD"));
    }
}
