use thiserror::Error;

/// Failure codes surfaced by an identity provider.
///
/// Providers report failures as `auth/...` code strings on the wire; the
/// variants here cover the codes the client reacts to, and anything else is
/// carried through as [`AuthError::Provider`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid email address")]
    InvalidEmail,

    #[error("account disabled")]
    UserDisabled,

    #[error("no account for email")]
    UserNotFound,

    #[error("incorrect password")]
    WrongPassword,

    #[error("invalid credentials")]
    InvalidCredential,

    #[error("email already registered")]
    EmailInUse,

    #[error("email/password accounts not enabled")]
    OperationNotAllowed,

    #[error("password too weak")]
    WeakPassword,

    #[error("provider error: {0}")]
    Provider(String),
}

impl AuthError {
    /// The provider wire code for this error.
    pub fn code(&self) -> &str {
        match self {
            AuthError::InvalidEmail => "auth/invalid-email",
            AuthError::UserDisabled => "auth/user-disabled",
            AuthError::UserNotFound => "auth/user-not-found",
            AuthError::WrongPassword => "auth/wrong-password",
            AuthError::InvalidCredential => "auth/invalid-credential",
            AuthError::EmailInUse => "auth/email-already-in-use",
            AuthError::OperationNotAllowed => "auth/operation-not-allowed",
            AuthError::WeakPassword => "auth/weak-password",
            AuthError::Provider(code) => code,
        }
    }

    /// Maps a provider wire code back to a variant. Unrecognized codes are
    /// preserved verbatim in [`AuthError::Provider`].
    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/invalid-email" => AuthError::InvalidEmail,
            "auth/user-disabled" => AuthError::UserDisabled,
            "auth/user-not-found" => AuthError::UserNotFound,
            "auth/wrong-password" => AuthError::WrongPassword,
            "auth/invalid-credential" => AuthError::InvalidCredential,
            "auth/email-already-in-use" => AuthError::EmailInUse,
            "auth/operation-not-allowed" => AuthError::OperationNotAllowed,
            "auth/weak-password" => AuthError::WeakPassword,
            _ => AuthError::Provider(code.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Identity error: {0}")]
    Identity(#[from] AuthError),

    #[error("Backend error: {0}")]
    Backend(#[from] eyre::Report),
}

pub type AppResult<T> = Result<T, AppError>;
