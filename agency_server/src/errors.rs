use actix_web::{
    error::ResponseError,
    http::{
        header::{ContentType, LOCATION},
        StatusCode,
    },
    HttpResponse,
};
use agency_engine::{ContactApiError, CredentialApiError};
use thiserror::Error;

use crate::auth::LOGIN_PATH;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    /// Backend failures carry only the short, user-facing message. Details are logged where they occur.
    #[error("{0}")]
    BackendError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The deletion request is invalid or has expired. Please try again.")]
    InvalidDeletionTicket,
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::InvalidDeletionTicket => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::AuthenticationError(e) => match e {
                AuthError::NoSession => StatusCode::FOUND,
                AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
                AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
                AuthError::SessionRevoked => StatusCode::UNAUTHORIZED,
                AuthError::StateMismatch => StatusCode::BAD_REQUEST,
                AuthError::NotAnAdmin(_) => StatusCode::FORBIDDEN,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
                AuthError::IdentityProviderNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                AuthError::CouldNotIssueToken(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if matches!(self, Self::AuthenticationError(AuthError::NoSession)) {
            response.insert_header((LOCATION, LOGIN_PATH));
        }
        response.insert_header(ContentType::json()).body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("You are not logged in.")]
    NoSession,
    #[error("The token is invalid. {0}")]
    InvalidToken(String),
    #[error("The token has expired.")]
    TokenExpired,
    #[error("This session has ended. Please log in again.")]
    SessionRevoked,
    #[error("The login request could not be verified. Please try again.")]
    StateMismatch,
    #[error("{0} is not allowed to access the admin panel.")]
    NotAnAdmin(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("The identity provider has not been configured.")]
    IdentityProviderNotConfigured,
    #[error("Could not issue a session token. {0}")]
    CouldNotIssueToken(String),
}

impl From<CredentialApiError> for ServerError {
    fn from(e: CredentialApiError) -> Self {
        match e {
            CredentialApiError::ValidationError(msg) => Self::ValidationError(msg),
            CredentialApiError::CredentialNotFound(_) => Self::NoRecordFound(e.to_string()),
            CredentialApiError::LoadFailed |
            CredentialApiError::SaveFailed |
            CredentialApiError::ToggleFailed |
            CredentialApiError::DeleteFailed => Self::BackendError(e.to_string()),
        }
    }
}

impl From<ContactApiError> for ServerError {
    fn from(e: ContactApiError) -> Self {
        match e {
            ContactApiError::ValidationError(msg) => Self::ValidationError(msg),
            ContactApiError::ContactNotFound(_) => Self::NoRecordFound(e.to_string()),
            ContactApiError::SubmitFailed | ContactApiError::LoadFailed | ContactApiError::UpdateFailed => {
                Self::BackendError(e.to_string())
            },
        }
    }
}
