//! Transport-level error types.

use thiserror::Error;

use crate::jwt::JwtError;

/// Failures raised before a request reaches the commission workflow.
///
/// Domain failures have their own taxonomy in `itinera-core`; this type covers
/// authentication, role parsing and malformed query parameters.
#[derive(Debug, Error)]
pub enum AppError {
    /// No bearer token on a protected route.
    #[error("Authorization header with Bearer token is required")]
    MissingToken,

    /// The bearer token has expired.
    #[error("Token has expired")]
    TokenExpired,

    /// The bearer token could not be decoded or verified.
    #[error("Invalid or malformed token")]
    InvalidToken,

    /// A handler ran without validated claims.
    #[error("Authentication required")]
    Unauthorized,

    /// The token is valid but its role is not recognised.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Malformed query parameter or body field.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MissingToken | Self::TokenExpired | Self::InvalidToken | Self::Unauthorized => {
                401
            }
            Self::Forbidden(_) => 403,
            Self::Validation(_) => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::TokenExpired,
            JwtError::EncodingError(_) | JwtError::DecodingError(_) => Self::InvalidToken,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::MissingToken.status_code(), 401);
        assert_eq!(AppError::TokenExpired.status_code(), 401);
        assert_eq!(AppError::InvalidToken.status_code(), 401);
        assert_eq!(AppError::Unauthorized.status_code(), 401);
        assert_eq!(AppError::Forbidden(String::new()).status_code(), 403);
        assert_eq!(AppError::Validation(String::new()).status_code(), 400);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::MissingToken.error_code(), "MISSING_TOKEN");
        assert_eq!(AppError::TokenExpired.error_code(), "TOKEN_EXPIRED");
        assert_eq!(AppError::InvalidToken.error_code(), "INVALID_TOKEN");
        assert_eq!(AppError::Unauthorized.error_code(), "UNAUTHORIZED");
        assert_eq!(AppError::Forbidden(String::new()).error_code(), "FORBIDDEN");
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(AppError::TokenExpired.to_string(), "Token has expired");
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
    }

    #[test]
    fn test_from_jwt_error() {
        assert!(matches!(
            AppError::from(JwtError::Expired),
            AppError::TokenExpired
        ));
        assert!(matches!(
            AppError::from(JwtError::DecodingError("bad signature".into())),
            AppError::InvalidToken
        ));
    }
}
