use axum::http::{HeaderMap, HeaderValue, header};

/// Name of the cookie carrying the administrator's bearer credential.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Session lifetime: 7 days.
pub const SESSION_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 7;

/// Returns the value of the named cookie from the `Cookie` request headers.
///
/// An empty value is treated the same as an absent cookie, which is what a
/// browser sends back after the cookie was cleared.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// The `accessToken` cookie from the request, if any.
pub fn access_token(headers: &HeaderMap) -> Option<&str> {
    read_cookie(headers, ACCESS_TOKEN_COOKIE)
}

/// Builds the `Set-Cookie` value that stores a freshly issued credential.
///
/// Returns `None` when the token contains characters that cannot appear in a
/// header value.
pub fn session_cookie(token: &str, secure: bool) -> Option<HeaderValue> {
    HeaderValue::from_str(&render(token, SESSION_MAX_AGE_SECS, secure)).ok()
}

/// Builds the `Set-Cookie` value that removes the credential from the browser.
pub fn clear_session_cookie(secure: bool) -> HeaderValue {
    // Only ASCII literals go into this value.
    HeaderValue::from_str(&render("", 0, secure))
        .unwrap_or_else(|_| HeaderValue::from_static("accessToken=; Max-Age=0; Path=/"))
}

fn render(value: &str, max_age: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{ACCESS_TOKEN_COOKIE}={value}; Max-Age={max_age}; Path=/; HttpOnly; SameSite=Strict"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(cookie: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static(cookie));
        headers
    }

    #[test]
    fn reads_token_among_other_cookies() {
        let headers = headers_with("theme=dark; accessToken=abc.def.ghi; lang=en");
        assert_eq!(access_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn empty_or_missing_cookie_is_absent() {
        assert_eq!(access_token(&headers_with("accessToken=")), None);
        assert_eq!(access_token(&headers_with("accessTokenX=1")), None);
        assert_eq!(access_token(&HeaderMap::new()), None);
    }

    #[test]
    fn session_cookie_carries_all_attributes() {
        let value = session_cookie("tok", true).unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "accessToken=tok; Max-Age=604800; Path=/; HttpOnly; SameSite=Strict; Secure"
        );
    }

    #[test]
    fn clearing_cookie_zeroes_max_age_and_omits_secure_locally() {
        let value = clear_session_cookie(false);
        assert_eq!(
            value.to_str().unwrap(),
            "accessToken=; Max-Age=0; Path=/; HttpOnly; SameSite=Strict"
        );
    }

    #[test]
    fn rejects_tokens_that_are_not_header_safe() {
        assert!(session_cookie("bad\ntoken", false).is_none());
    }
}
