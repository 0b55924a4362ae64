//! Session cookie codec
//!
//! The session rides in a single cookie whose value concatenates three
//! segments: the base64-encoded login, the base64-encoded display name,
//! and the plain security token.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};

use crate::session::SecurityToken;

/// Name of the session cookie.
pub const COOKIE_NAME: &str = "SocialOpenData";

fn http_date(when: DateTime<Utc>) -> String {
    when.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Render the Set-Cookie value for a fresh session.
///
/// # Examples
///
/// ```
/// use users_auth::{session_cookie, SecurityToken};
/// use chrono::Duration;
///
/// let token = SecurityToken::from_client("tok");
/// let cookie = session_cookie("alice", "Alice", &token, Duration::days(30));
/// assert!(cookie.starts_with("SocialOpenData=login="));
/// assert!(cookie.contains("securitytoken=tok"));
/// assert!(cookie.contains("Expires="));
/// ```
pub fn session_cookie(
    login: &str,
    username: &str,
    token: &SecurityToken,
    lifetime: Duration,
) -> String {
    format!(
        "{COOKIE_NAME}=login={}:username={}:securitytoken={}; Expires={}; Path=/",
        BASE64.encode(login),
        BASE64.encode(username),
        token.as_str(),
        http_date(Utc::now() + lifetime),
    )
}

/// Render the Set-Cookie value that deletes the session cookie.
pub fn expired_session_cookie() -> String {
    format!("{COOKIE_NAME}=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/")
}

/// Recover (login, username, token) from a Cookie request header.
///
/// Returns `None` when the header carries no session cookie or the value
/// does not decode.
pub fn parse_session_cookie(header: &str) -> Option<(String, String, SecurityToken)> {
    let value = header.split(';').find_map(|pair| {
        let pair = pair.trim();
        pair.strip_prefix(COOKIE_NAME)
            .and_then(|rest| rest.strip_prefix('='))
    })?;

    let mut login = None;
    let mut username = None;
    let mut token = None;
    for segment in value.split(':') {
        if let Some(encoded) = segment.strip_prefix("login=") {
            login = decode_segment(encoded);
        } else if let Some(encoded) = segment.strip_prefix("username=") {
            username = decode_segment(encoded);
        } else if let Some(plain) = segment.strip_prefix("securitytoken=") {
            token = Some(SecurityToken::from_client(plain));
        }
    }

    Some((login?, username?, token?))
}

fn decode_segment(encoded: &str) -> Option<String> {
    let bytes = BASE64.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_round_trip() {
        let token = SecurityToken::random();
        let cookie = session_cookie("alice", "Alice Example", &token, Duration::days(30));

        // A Cookie request header carries only name=value pairs.
        let value_part = cookie.split(';').next().unwrap();
        let (login, username, parsed) = parse_session_cookie(value_part).unwrap();

        assert_eq!(login, "alice");
        assert_eq!(username, "Alice Example");
        assert_eq!(parsed, token);
    }

    #[test]
    fn test_cookie_has_three_segments_and_expiry() {
        let token = SecurityToken::from_client("tok123");
        let cookie = session_cookie("alice", "Alice", &token, Duration::days(30));

        let value = cookie
            .strip_prefix("SocialOpenData=")
            .unwrap()
            .split(';')
            .next()
            .unwrap();
        let segments: Vec<&str> = value.split(':').collect();
        assert_eq!(segments.len(), 3);
        assert!(segments[0].starts_with("login="));
        assert!(segments[1].starts_with("username="));
        assert_eq!(segments[2], "securitytoken=tok123");
        assert!(cookie.contains("Expires="));
    }

    #[test]
    fn test_parse_ignores_other_cookies() {
        let token = SecurityToken::from_client("tok");
        let session = session_cookie("alice", "Alice", &token, Duration::days(1));
        let value_part = session.split(';').next().unwrap();
        let header = format!("theme=dark; {value_part}; lang=en");

        let (login, _, parsed) = parse_session_cookie(&header).unwrap();
        assert_eq!(login, "alice");
        assert_eq!(parsed, token);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_session_cookie("theme=dark").is_none());
        assert!(parse_session_cookie("SocialOpenData=login=!!!:username=:securitytoken=t").is_none());
    }

    #[test]
    fn test_expired_cookie_is_in_the_past() {
        let cookie = expired_session_cookie();
        assert!(cookie.contains("1970"));
        assert!(cookie.starts_with("SocialOpenData=;"));
    }
}
