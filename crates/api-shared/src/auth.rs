//! Session token checks.
//!
//! Every session-scoped request carries the token the session was started with, as
//! `Authorization: Bearer <token>`.

use subtle::ConstantTimeEq;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("session has no active token")]
    NoActiveToken,
    #[error("invalid session token")]
    InvalidToken,
}

/// Extracts the token from an `Authorization` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Validates the provided token against the session's stored token.
///
/// Returns `Ok(())` if they match, or an error if either is missing or they differ. The
/// comparison runs in constant time for tokens of equal length.
pub fn validate_session_token(
    provided: Option<&str>,
    expected: Option<&str>,
) -> Result<(), AuthError> {
    let provided = provided.ok_or(AuthError::MissingToken)?;
    let expected = expected.ok_or(AuthError::NoActiveToken)?;

    if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bearer_header() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer   abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[test]
    fn validates_token() {
        assert_eq!(validate_session_token(Some("t"), Some("t")), Ok(()));
        assert_eq!(
            validate_session_token(Some("t"), Some("u")),
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            validate_session_token(None, Some("u")),
            Err(AuthError::MissingToken)
        );
        assert_eq!(
            validate_session_token(Some("t"), None),
            Err(AuthError::NoActiveToken)
        );
    }

    #[test]
    fn token_prefix_or_extension_is_rejected() {
        assert_eq!(
            validate_session_token(Some("secret"), Some("secret-token")),
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            validate_session_token(Some("secret-token-2"), Some("secret-token")),
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            validate_session_token(Some("secret-tokeN"), Some("secret-token")),
            Err(AuthError::InvalidToken)
        );
    }
}
