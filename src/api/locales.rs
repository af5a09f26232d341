//! Product Advertising API marketplaces and their endpoint hosts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported marketplaces, each served by its own endpoint host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Us,
    Uk,
    De,
    Fr,
    Jp,
    Ca,
    It,
    Es,
    Cn,
    In,
    Br,
    Mx,
}

impl Locale {
    /// Returns the API endpoint host for this locale.
    pub fn host(&self) -> &'static str {
        match self {
            Locale::Us => "webservices.amazon.com",
            Locale::Uk => "webservices.amazon.co.uk",
            Locale::De => "webservices.amazon.de",
            Locale::Fr => "webservices.amazon.fr",
            Locale::Jp => "webservices.amazon.co.jp",
            Locale::Ca => "webservices.amazon.ca",
            Locale::It => "webservices.amazon.it",
            Locale::Es => "webservices.amazon.es",
            Locale::Cn => "webservices.amazon.cn",
            Locale::In => "webservices.amazon.in",
            Locale::Br => "webservices.amazon.com.br",
            Locale::Mx => "webservices.amazon.com.mx",
        }
    }

    /// Returns the HTTPS base URL for this locale.
    pub fn base_url(&self) -> String {
        format!("https://{}", self.host())
    }

    /// Returns all supported locales.
    pub fn all() -> &'static [Locale] {
        &[
            Locale::Us,
            Locale::Uk,
            Locale::De,
            Locale::Fr,
            Locale::Jp,
            Locale::Ca,
            Locale::It,
            Locale::Es,
            Locale::Cn,
            Locale::In,
            Locale::Br,
            Locale::Mx,
        ]
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Locale::Us => "us",
            Locale::Uk => "uk",
            Locale::De => "de",
            Locale::Fr => "fr",
            Locale::Jp => "jp",
            Locale::Ca => "ca",
            Locale::It => "it",
            Locale::Es => "es",
            Locale::Cn => "cn",
            Locale::In => "in",
            Locale::Br => "br",
            Locale::Mx => "mx",
        };
        write!(f, "{}", code)
    }
}

impl FromStr for Locale {
    type Err = crate::error::ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "us" | "usa" | "united states" => Ok(Locale::Us),
            "uk" | "gb" | "united kingdom" => Ok(Locale::Uk),
            "de" | "germany" => Ok(Locale::De),
            "fr" | "france" => Ok(Locale::Fr),
            "jp" | "japan" => Ok(Locale::Jp),
            "ca" | "canada" => Ok(Locale::Ca),
            "it" | "italy" => Ok(Locale::It),
            "es" | "spain" => Ok(Locale::Es),
            "cn" | "china" => Ok(Locale::Cn),
            "in" | "india" => Ok(Locale::In),
            "br" | "brazil" => Ok(Locale::Br),
            "mx" | "mexico" => Ok(Locale::Mx),
            _ => Err(crate::error::ApiError::UnknownLocale(Some(s.to_string()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_locale_parsing() {
        assert_eq!(Locale::from_str("us").unwrap(), Locale::Us);
        assert_eq!(Locale::from_str("united states").unwrap(), Locale::Us);
        assert_eq!(Locale::from_str("gb").unwrap(), Locale::Uk);
        assert_eq!(Locale::from_str("de").unwrap(), Locale::De);
        assert_eq!(Locale::from_str("japan").unwrap(), Locale::Jp);
        assert_eq!(Locale::from_str("cn").unwrap(), Locale::Cn);
        assert_eq!(Locale::from_str("mexico").unwrap(), Locale::Mx);

        // Case and whitespace insensitive
        assert_eq!(Locale::from_str("DE").unwrap(), Locale::De);
        assert_eq!(Locale::from_str(" fr ").unwrap(), Locale::Fr);
    }

    #[test]
    fn test_unknown_locales_rejected() {
        for code in ["XX", "", "de-DE", "pl", "germanyy"] {
            match Locale::from_str(code) {
                Err(ApiError::UnknownLocale(Some(given))) => assert_eq!(given, code),
                other => panic!("expected UnknownLocale for {:?}, got {:?}", code, other),
            }
        }
    }

    #[test]
    fn test_locale_hosts() {
        assert_eq!(Locale::Us.host(), "webservices.amazon.com");
        assert_eq!(Locale::Uk.host(), "webservices.amazon.co.uk");
        assert_eq!(Locale::Jp.host(), "webservices.amazon.co.jp");
        assert_eq!(Locale::Br.host(), "webservices.amazon.com.br");
        assert_eq!(Locale::De.base_url(), "https://webservices.amazon.de");
    }

    #[test]
    fn test_display_roundtrips_through_from_str() {
        for locale in Locale::all() {
            assert_eq!(Locale::from_str(&locale.to_string()).unwrap(), *locale);
        }
        assert_eq!(Locale::all().len(), 12);
    }

    #[test]
    fn test_locale_serde() {
        let json = serde_json::to_string(&Locale::Uk).unwrap();
        assert_eq!(json, "\"uk\"");

        let parsed: Locale = serde_json::from_str("\"jp\"").unwrap();
        assert_eq!(parsed, Locale::Jp);
    }
}
