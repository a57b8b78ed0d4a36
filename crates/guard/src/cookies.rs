//! Request cookie lookup

use axum::http::header::COOKIE;
use axum::http::HeaderMap;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Join every `Cookie` header of a request into one `; `-separated string
pub fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join("; "))
    }
}

/// Value of the named cookie, percent-decoded. Empty values count as absent.
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
        .map(|value| {
            urlencoding::decode(value)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_find_cookie() {
        let header = "theme=dark; access_token=abc.def.ghi; refresh_token=r-1";
        assert_eq!(find_cookie(header, "access_token").as_deref(), Some("abc.def.ghi"));
        assert_eq!(find_cookie(header, "refresh_token").as_deref(), Some("r-1"));
        assert_eq!(find_cookie(header, "missing"), None);
    }

    #[test]
    fn test_name_must_match_exactly() {
        assert_eq!(find_cookie("xaccess_token=1", "access_token"), None);
    }

    #[test]
    fn test_empty_and_quoted_values() {
        assert_eq!(find_cookie("access_token=", "access_token"), None);
        assert_eq!(find_cookie("access_token=\"t\"", "access_token").as_deref(), Some("t"));
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(find_cookie("next=%2Fdashboard", "next").as_deref(), Some("/dashboard"));
    }

    #[test]
    fn test_cookie_header_joins_multiple_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(cookie_header(&headers), None);

        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("access_token=t"));
        let joined = cookie_header(&headers).unwrap();
        assert_eq!(find_cookie(&joined, "access_token").as_deref(), Some("t"));
    }
}
