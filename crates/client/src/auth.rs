//! # Authentication Flows
//!
//! Registration, login, logout and password reset, built on the store's
//! identity provider. Each flow validates its input locally, performs the
//! provider calls, and keeps the profile document in the `users` collection
//! in step with the account.
//!
//! The `*_error_message` functions translate an [`AppError`] into the
//! user-facing message for the corresponding flow, keyed off the provider
//! error codes.

use chrono::Utc;
use rollcall_backend::collections;
use rollcall_backend::document::fields_of;
use rollcall_core::errors::{AppError, AppResult, AuthError};
use rollcall_core::models::user::{LoginRequest, RegisterRequest, User, UserProfile};

use crate::store::AppStore;

/// Creates an account and its profile document, signing the user in.
///
/// # Arguments
///
/// * `app` - The connected application store
/// * `request` - Registration form data
///
/// # Returns
///
/// * `AppResult<User>` - The registered user, or a validation, identity or
///   backend error
pub async fn register(app: &AppStore, request: &RegisterRequest) -> AppResult<User> {
    request.validate()?;
    let role = request
        .role
        .ok_or_else(|| AppError::Validation("Please select a role".to_string()))?;

    let result: AppResult<User> = async {
        // Create the account; the provider signs it in immediately.
        let session = app
            .identity()
            .sign_up(request.email.trim(), &request.password)
            .await?;

        // Create the user profile document keyed by the new uid.
        let profile = UserProfile {
            id: session.uid.clone(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            role,
            created_at: Utc::now(),
        };
        app.remote()
            .set(collections::USERS, &session.uid, fields_of(&profile)?)
            .await?;

        Ok(User {
            id: session.uid,
            name: profile.name,
            role: profile.role,
        })
    }
    .await;

    result.map_err(|err| {
        tracing::error!("Registration error: {}", err);
        err
    })
}

/// Signs an existing user in and resolves their profile document.
///
/// An account with no profile document is signed back out and reported as
/// not found.
pub async fn login(app: &AppStore, request: &LoginRequest) -> AppResult<User> {
    request.validate()?;

    let result: AppResult<User> = async {
        let session = app
            .identity()
            .sign_in(request.email.trim(), &request.password)
            .await?;

        match app.remote().get(collections::USERS, &session.uid).await? {
            Some(doc) => {
                let profile: UserProfile = doc.data()?;
                Ok(User {
                    id: profile.id,
                    name: profile.name,
                    role: profile.role,
                })
            }
            None => {
                app.identity().sign_out().await?;
                Err(AppError::NotFound(
                    "User profile not found. Please contact support.".to_string(),
                ))
            }
        }
    }
    .await;

    result.map_err(|err| {
        tracing::error!("Login error: {}", err);
        err
    })
}

pub async fn logout(app: &AppStore) -> AppResult<()> {
    app.identity().sign_out().await.map_err(|err| {
        tracing::error!("Logout error: {}", err);
        AppError::from(err)
    })
}

pub async fn reset_password(app: &AppStore, email: &str) -> AppResult<()> {
    if email.trim().is_empty() {
        return Err(AppError::Validation(
            "Please enter your email address".to_string(),
        ));
    }

    app.identity()
        .send_password_reset(email.trim())
        .await
        .map_err(|err| {
            tracing::error!("Password reset error: {}", err);
            AppError::from(err)
        })
}

/// User-facing message for a failed login.
pub fn login_error_message(error: &AppError) -> &'static str {
    match error {
        AppError::Identity(AuthError::InvalidEmail) => "Invalid email address.",
        AppError::Identity(AuthError::UserDisabled) => "This account has been disabled.",
        AppError::Identity(AuthError::UserNotFound) => "No account found with this email.",
        AppError::Identity(AuthError::WrongPassword) => "Incorrect password.",
        AppError::Identity(AuthError::InvalidCredential) => {
            "Invalid credentials. Please check your email and password."
        }
        _ => "Failed to login. Please try again.",
    }
}

/// User-facing message for a failed registration.
pub fn register_error_message(error: &AppError) -> &'static str {
    match error {
        AppError::Identity(AuthError::EmailInUse) => {
            "This email is already registered. Please login instead."
        }
        AppError::Identity(AuthError::InvalidEmail) => "Invalid email address.",
        AppError::Identity(AuthError::OperationNotAllowed) => {
            "Email/password accounts are not enabled. Please contact support."
        }
        AppError::Identity(AuthError::WeakPassword) => {
            "Password is too weak. Please use a stronger password."
        }
        _ => "Failed to create account. Please try again.",
    }
}

/// User-facing message for a failed password reset request.
pub fn reset_error_message(error: &AppError) -> &'static str {
    match error {
        AppError::Identity(AuthError::InvalidEmail) => "Invalid email address.",
        AppError::Identity(AuthError::UserNotFound) => "No account found with this email.",
        _ => "Failed to send reset email. Please try again.",
    }
}
