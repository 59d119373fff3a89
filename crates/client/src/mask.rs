//! Masking for diagnostic output.
//!
//! Applied to request/response bodies before they reach the logs; never to
//! the data actually sent or returned to callers.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static BEARER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Bearer\s+[\w.\-]+").expect("bearer pattern compiles"));

static JWT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"eyJ[A-Za-z0-9._\-]+").expect("jwt pattern compiles"));

static SENSITIVE_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#""(password|secret|token|apiKey|api_key|accessToken|access_token|refreshToken|refresh_token|privateKey|private_key|authorization)"\s*:\s*"[^"]*""#,
    )
    .expect("sensitive field pattern compiles")
});

static KEY_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9]{20,}").expect("key pattern compiles"));

/// Mask credentials and secret-bearing fields in `input`.
///
/// Bearer values and JWTs collapse entirely; sensitive JSON fields keep
/// their name but lose their value; long alphanumeric runs are treated as
/// key material and keep only their first and last four characters.
pub fn mask_sensitive(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let masked = BEARER.replace_all(input, "Bearer ****");
    let masked = JWT.replace_all(&masked, "eyJ****");
    let masked = SENSITIVE_FIELD
        .replace_all(&masked, |caps: &Captures<'_>| format!(r#""{}": "****""#, &caps[1]));
    KEY_LIKE.replace_all(&masked, |caps: &Captures<'_>| mask_token(&caps[0])).into_owned()
}

/// Mask a single token, keeping only the first and last four characters.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 8))
}
