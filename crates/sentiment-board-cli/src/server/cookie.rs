// Session cookie parsing and formatting.

use axum::http::{header, HeaderMap, HeaderValue};
use sentiment_board::SessionId;

pub const SESSION_COOKIE: &str = "sentiment_board_session";

/// Session id from the request's `Cookie` headers, if present and well-formed.
pub fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.parse().ok())
}

/// `Set-Cookie` value binding the browser to `id` for the browser session.
pub fn session_cookie(id: SessionId) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax"
    ))
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_cookie_among_others() {
        let id = SessionId::generate();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}; lang=en")).unwrap(),
        );
        assert_eq!(session_from_headers(&headers), Some(id));
    }

    #[test]
    fn malformed_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("sentiment_board_session=garbage"),
        );
        assert_eq!(session_from_headers(&headers), None);
        assert_eq!(session_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn cookie_attributes() {
        let id = SessionId::generate();
        let value = session_cookie(id).unwrap();
        let text = value.to_str().unwrap();
        assert!(text.starts_with(&format!("{SESSION_COOKIE}={id};")));
        assert!(text.contains("HttpOnly"));
        assert!(text.contains("SameSite=Lax"));
    }
}
