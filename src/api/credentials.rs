//! Credential and locale resolution over an ordered chain of sources.

use crate::api::locales::Locale;
use crate::config::{
    ConfigSource, ACCESS_KEY, ASSOCIATE_TAG_KEY, CREDENTIALS_SECTION, LOCALE_KEY, SECRET_KEY,
};
use crate::error::{ApiError, Result};
use std::fmt;
use tracing::debug;

/// Access credentials for signing requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
    associate_tag: Option<String>,
}

impl Credentials {
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        associate_tag: Option<String>,
    ) -> Self {
        Self { access_key: access_key.into(), secret_key: secret_key.into(), associate_tag }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub(crate) fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn associate_tag(&self) -> Option<&str> {
        self.associate_tag.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("associate_tag", &self.associate_tag)
            .finish()
    }
}

/// Values passed directly by the caller; these win over every config source.
#[derive(Debug, Clone, Default)]
pub struct ExplicitSettings {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub locale: Option<String>,
    pub associate_tag: Option<String>,
}

/// Credentials and locale after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub credentials: Credentials,
    pub locale: Locale,
}

/// Resolves credentials and locale: explicit values first, then each source
/// in order. The locale is checked first so a missing or unsupported locale
/// always fails with [`ApiError::UnknownLocale`].
pub fn resolve(
    explicit: &ExplicitSettings,
    sources: &[&dyn ConfigSource],
) -> Result<ResolvedSettings> {
    let lookup = |given: &Option<String>, key: &str| -> Option<String> {
        given.clone().or_else(|| {
            sources.iter().find_map(|source| source.get(CREDENTIALS_SECTION, key))
        })
    };

    let locale = match lookup(&explicit.locale, LOCALE_KEY) {
        Some(code) => code.parse::<Locale>()?,
        None => return Err(ApiError::UnknownLocale(None)),
    };

    let access_key =
        lookup(&explicit.access_key, ACCESS_KEY).ok_or(ApiError::MissingCredentials(ACCESS_KEY))?;
    let secret_key =
        lookup(&explicit.secret_key, SECRET_KEY).ok_or(ApiError::MissingCredentials(SECRET_KEY))?;
    let associate_tag = lookup(&explicit.associate_tag, ASSOCIATE_TAG_KEY);

    debug!("Resolved locale {} (associate tag: {})", locale, associate_tag.is_some());

    Ok(ResolvedSettings {
        credentials: Credentials::new(access_key, secret_key, associate_tag),
        locale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;

    fn explicit(access: &str, secret: &str, locale: &str) -> ExplicitSettings {
        ExplicitSettings {
            access_key: Some(access.to_string()),
            secret_key: Some(secret.to_string()),
            locale: Some(locale.to_string()),
            associate_tag: None,
        }
    }

    fn file(content: &str) -> ConfigFile {
        ConfigFile::parse(content).unwrap()
    }

    #[test]
    fn test_explicit_values_only() {
        let resolved = resolve(&explicit("ACCESS_KEY", "SECRET_KEY", "de"), &[]).unwrap();
        assert_eq!(resolved.locale, Locale::De);
        assert_eq!(resolved.credentials.access_key(), "ACCESS_KEY");
        assert_eq!(resolved.credentials.secret_key(), "SECRET_KEY");
        assert_eq!(resolved.credentials.associate_tag(), None);
    }

    #[test]
    fn test_invalid_locale_fails() {
        let err = resolve(&explicit("", "", "XX"), &[]).unwrap_err();
        assert!(matches!(err, ApiError::UnknownLocale(Some(ref l)) if l == "XX"));
    }

    #[test]
    fn test_config_file_only() {
        let config = file(
            r#"
            [Credentials]
            aws_access_key_id = "ABCDEFGH12345"
            aws_secret_access_key = "abcdegf43"
            aws_product_locale = "de"
            "#,
        );
        let resolved = resolve(&ExplicitSettings::default(), &[&config]).unwrap();
        assert_eq!(resolved.locale, Locale::De);
        assert_eq!(resolved.credentials.access_key(), "ABCDEFGH12345");
    }

    #[test]
    fn test_config_file_and_explicit_locale() {
        let config = file(
            r#"
            [Credentials]
            aws_access_key_id = "ABCDEFGH12345"
            aws_secret_access_key = "abcdegf43"
            "#,
        );
        let settings = ExplicitSettings { locale: Some("de".to_string()), ..Default::default() };
        let resolved = resolve(&settings, &[&config]).unwrap();
        assert_eq!(resolved.locale, Locale::De);
        assert_eq!(resolved.credentials.secret_key(), "abcdegf43");
    }

    #[test]
    fn test_incomplete_config_file_fails_with_unknown_locale() {
        let config = file(
            r#"
            [Credentials]
            aws_access_key_id = "ABCDEFGH12345"
            aws_secret_access_key = "abcdegf43"
            "#,
        );
        let err = resolve(&ExplicitSettings::default(), &[&config]).unwrap_err();
        assert!(matches!(err, ApiError::UnknownLocale(None)));
    }

    #[test]
    fn test_explicit_overrides_config() {
        let config = file(
            r#"
            [Credentials]
            aws_access_key_id = "FILE_KEY"
            aws_secret_access_key = "file-secret"
            aws_product_locale = "uk"
            aws_associate_tag = "file-tag"
            "#,
        );
        let mut settings = explicit("ARG_KEY", "arg-secret", "jp");
        settings.associate_tag = Some("arg-tag".to_string());

        let resolved = resolve(&settings, &[&config]).unwrap();
        assert_eq!(resolved.locale, Locale::Jp);
        assert_eq!(resolved.credentials.access_key(), "ARG_KEY");
        assert_eq!(resolved.credentials.associate_tag(), Some("arg-tag"));
    }

    #[test]
    fn test_sources_consulted_in_order() {
        let first = file("[Credentials]\naws_product_locale = \"fr\"\n");
        let second = file(
            r#"
            [Credentials]
            aws_access_key_id = "SECOND"
            aws_secret_access_key = "second-secret"
            aws_product_locale = "us"
            "#,
        );
        let resolved = resolve(&ExplicitSettings::default(), &[&first, &second]).unwrap();
        assert_eq!(resolved.locale, Locale::Fr);
        assert_eq!(resolved.credentials.access_key(), "SECOND");
    }

    #[test]
    fn test_missing_secret_key() {
        let settings = ExplicitSettings {
            access_key: Some("KEY".to_string()),
            locale: Some("us".to_string()),
            ..Default::default()
        };
        let err = resolve(&settings, &[]).unwrap_err();
        assert!(matches!(err, ApiError::MissingCredentials(SECRET_KEY)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = Credentials::new("AKIDEXAMPLE", "very-secret", None);
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("AKIDEXAMPLE"));
        assert!(!debug.contains("very-secret"));
    }
}
