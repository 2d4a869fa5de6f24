use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::Display;

lazy_static! {
    static ref EMAIL_SHAPE: Regex =
        Regex::new(r"\S+@\S+\.\S+").expect("Failed to compile email shape pattern");
}

/// Trim surrounding whitespace and lower-case an email, so that two spellings
/// of the same address compare equal.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Shape check used by the signup form before anything is sent:
/// something that looks like `local@domain.tld`.
///
/// This is stricter than [`WaitlistEmail::parse`], which only looks for an `@`
/// and a `.` anywhere in the normalized value.
pub fn looks_like_email(raw: &str) -> bool {
    EMAIL_SHAPE.is_match(raw)
}

/// A normalized email accepted onto the waitlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitlistEmail(String);

impl WaitlistEmail {
    /// Normalizes the input and checks that it contains both an `@` and a `.`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let normalized = normalize(raw);
        if normalized.contains('@') && normalized.contains('.') {
            Ok(Self(normalized))
        } else {
            Err(format!("{raw:?} is not a valid waitlist email."))
        }
    }
}

impl Display for WaitlistEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for WaitlistEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
