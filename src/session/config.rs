use std::fmt;
use std::str::FromStr;

use crate::ConfigError;

/// One day, in seconds.
pub const DEFAULT_MAX_AGE: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    /// The attribute value as written in a `Set-Cookie` header.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SameSite {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            _ => Err(ConfigError::InvalidSameSite(s.to_owned())),
        }
    }
}

/// How the session cookie is written.
///
/// `max_age` doubles as the browser cookie lifetime and as the freshness
/// window applied when a token is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    pub name: String,
    pub max_age: u64,
    pub same_site: SameSite,
    pub domain: Option<String>,
    pub path: String,
    pub http_only: bool,
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "session".to_owned(),
            max_age: DEFAULT_MAX_AGE,
            same_site: SameSite::Lax,
            domain: None,
            path: "/".to_owned(),
            http_only: true,
            secure: false,
        }
    }
}

impl CookieConfig {
    /// Checks that the configuration renders to a header browsers accept.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: an unusable cookie name, or a path
    /// or domain that would break out of its attribute.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() || !self.name.bytes().all(is_token_byte) {
            return Err(ConfigError::InvalidCookieName(self.name.clone()));
        }

        if !is_attribute_value(&self.path) {
            return Err(ConfigError::InvalidCookieAttribute {
                attribute: "path",
                value: self.path.clone(),
            });
        }

        if let Some(ref domain) = self.domain {
            if domain.is_empty() || !is_attribute_value(domain) {
                return Err(ConfigError::InvalidCookieAttribute {
                    attribute: "domain",
                    value: domain.clone(),
                });
            }
        }

        Ok(())
    }
}

/// RFC 6265 cookie-name characters: visible ASCII minus separators.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_graphic()
        && !matches!(
            b,
            b'(' | b')'
                | b'<'
                | b'>'
                | b'@'
                | b','
                | b';'
                | b':'
                | b'\\'
                | b'"'
                | b'/'
                | b'['
                | b']'
                | b'?'
                | b'='
                | b'{'
                | b'}'
        )
}

fn is_attribute_value(value: &str) -> bool {
    value.bytes().all(|b| !b.is_ascii_control() && b != b';')
}
