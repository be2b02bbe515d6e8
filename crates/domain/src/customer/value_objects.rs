//! Value objects for the customer domain.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ValidationError;

// RFC 5322 mailbox: an addr-spec, or an optional display name followed by an
// addr-spec in angle brackets, with optional whitespace and comments around
// either form. Comments do not nest. Non-ASCII is accepted inside atoms.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let atext = r"(?:[A-Za-z0-9!#$%&'*+/=?^_`{|}~\-]|[^\x00-\x7F])";
    let dot_atom = format!(r"{atext}+(?:\.{atext}+)*");
    let quoted = r#""(?:[^"\\\r\n]|\\[^\r\n])*""#;
    let literal = r"\[[^\[\]\\\s]*\]";
    let cfws = r"(?:[ \t]|\((?:[^()\\\r\n]|\\[^\r\n])*\))*";
    let addr_spec = format!(r"(?:{dot_atom}|{quoted})@(?:{dot_atom}|{literal})");
    // obs-phrase: display-name words may contain dots
    let word = format!(r"(?:(?:{atext}|\.)+|{quoted})");
    let name_addr = format!(r"(?:{word}(?:{cfws}{word})*)?{cfws}<{cfws}{addr_spec}{cfws}>");
    let pattern = format!(r"^{cfws}(?:{addr_spec}|{name_addr}){cfws}$");
    Regex::new(&pattern).unwrap_or_else(|err| panic!("email pattern must compile: {err}"))
});

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9+\-() \t\n\r\x0C]{7,20}$")
        .unwrap_or_else(|err| panic!("phone pattern must compile: {err}"))
});

/// A syntactically valid email address.
///
/// Stored exactly as supplied; no case folding or trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validates `raw` as a mailbox (`john@example.com`, `John <john@example.com>`).
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if EMAIL_PATTERN.is_match(&raw) {
            Ok(Self(raw))
        } else {
            Err(ValidationError::InvalidEmail)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A phone number: 7 to 20 digits, `+`, `-`, parentheses or spaces.
///
/// Surrounding whitespace is trimmed before validation and not stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = raw.as_ref().trim();
        if PHONE_PATTERN.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(ValidationError::InvalidPhone)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
