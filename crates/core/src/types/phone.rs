//! Phone number type.
//!
//! Phone numbers double as login handles, so they get the same light
//! structural validation the rest of the domain types do.

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The number has too few or too many digits.
    #[error("phone number must have between {min} and {max} digits")]
    BadLength {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
    },
    /// The input contains a character that is not a digit, space, dash,
    /// or a leading `+`.
    #[error("phone number contains invalid character: {0:?}")]
    InvalidCharacter(char),
}

/// A phone number in loosely E.164-compatible form.
///
/// ## Constraints
///
/// - 7 to 15 digits (ITU-T E.164 limit)
/// - Optional leading `+`
/// - Spaces and dashes are accepted as separators and stripped
///
/// ## Examples
///
/// ```
/// use khaja_core::Phone;
///
/// assert!(Phone::parse("+977 9801234567").is_ok());
/// assert!(Phone::parse("98-0123-4567").is_ok());
/// assert!(Phone::parse("").is_err());
/// assert!(Phone::parse("call-me-maybe").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 7;
    /// Maximum number of digits (E.164).
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `Phone` from a string, stripping separator characters.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters other
    /// than digits/separators/a leading `+`, or has a digit count outside
    /// the 7-15 range.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }

        let mut normalized = String::with_capacity(trimmed.len());
        for (i, c) in trimmed.chars().enumerate() {
            match c {
                '0'..='9' => normalized.push(c),
                '+' if i == 0 => normalized.push(c),
                ' ' | '-' => {}
                other => return Err(PhoneError::InvalidCharacter(other)),
            }
        }

        let digits = normalized.chars().filter(char::is_ascii_digit).count();
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits) {
            return Err(PhoneError::BadLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Phone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_separators() {
        let phone = Phone::parse("+977 980-123-4567").expect("valid");
        assert_eq!(phone.as_str(), "+9779801234567");
    }

    #[test]
    fn test_parse_plain_digits() {
        assert!(Phone::parse("9801234567").is_ok());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(Phone::parse("   "), Err(PhoneError::Empty)));
    }

    #[test]
    fn test_parse_rejects_letters() {
        assert!(matches!(
            Phone::parse("98x1234567"),
            Err(PhoneError::InvalidCharacter('x'))
        ));
    }

    #[test]
    fn test_parse_rejects_interior_plus() {
        assert!(Phone::parse("98+1234567").is_err());
    }

    #[test]
    fn test_parse_enforces_length() {
        assert!(matches!(
            Phone::parse("123456"),
            Err(PhoneError::BadLength { .. })
        ));
        assert!(Phone::parse("1234567890123456").is_err());
    }
}
