//! Cookie header helpers for session tokens.
//!
//! Renders `Set-Cookie` values and looks up cookies in `Cookie` request
//! headers. Everything here is plain string work, independent of any web
//! framework's own cookie types.

use super::config::CookieConfig;

/// Renders a `Set-Cookie` header value.
///
/// The layout is
/// `<name>=<value>; Max-Age=<n>; Path=<path>[; Domain=<d>][; Secure][; HttpOnly]; SameSite=<..>`.
/// The value is written as-is, so it must already be cookie-safe (session
/// tokens are unpadded url-safe base64).
#[must_use]
pub fn serialize_set_cookie(name: &str, value: &str, config: &CookieConfig) -> String {
    let mut header = format!(
        "{name}={value}; Max-Age={}; Path={}",
        config.max_age, config.path
    );

    if let Some(ref domain) = config.domain {
        header.push_str("; Domain=");
        header.push_str(domain);
    }
    if config.secure {
        header.push_str("; Secure");
    }
    if config.http_only {
        header.push_str("; HttpOnly");
    }
    header.push_str("; SameSite=");
    header.push_str(config.same_site.as_str());

    header
}

/// Finds the value of cookie `name` in a `Cookie` request header.
///
/// Returns `None` when the cookie is absent. The first occurrence wins and a
/// value wrapped in double quotes is unwrapped.
#[must_use]
pub fn parse_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| unquote(value.trim()))
}

/// Same as [`parse_cookie`], across several `Cookie` headers.
pub fn parse_cookie_headers<'a, I>(headers: I, name: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    headers
        .into_iter()
        .find_map(|header| parse_cookie(header, name))
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
