use crate::{
    db::{repository::DUPLICATE_EMAIL_MESSAGE, RatingsRepository, SessionStore, SessionToken},
    error::{AppError, AppResult},
    models::{NewUser, User},
};

/// Registers a new user unless the email is already taken
pub async fn register(repo: &dyn RatingsRepository, user: NewUser) -> AppResult<User> {
    let email = user.email.trim().to_string();

    if email.is_empty() || user.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Email and password are required".to_string(),
        ));
    }

    if repo.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(DUPLICATE_EMAIL_MESSAGE.to_string()));
    }

    let created = repo.create_user(NewUser { email, ..user }).await?;
    tracing::info!(user_id = created.user_id, "User registered");

    Ok(created)
}

/// Checks credentials and opens a session for the matching user
pub async fn log_in(
    repo: &dyn RatingsRepository,
    sessions: &dyn SessionStore,
    email: &str,
    password: &str,
) -> AppResult<(User, SessionToken)> {
    let user = repo
        .find_user_by_email(email.trim())
        .await?
        .filter(|user| user.password == password)
        .ok_or_else(|| {
            AppError::Unauthorized(
                "Email and/or password does not match. Please try again.".to_string(),
            )
        })?;

    let token = sessions.create(user.user_id).await?;
    tracing::info!(user_id = user.user_id, "User logged in");

    Ok((user, token))
}

/// Ends a session
pub async fn log_out(sessions: &dyn SessionStore, token: &SessionToken) -> AppResult<()> {
    sessions.revoke(token).await?;
    tracing::info!("User logged out");
    Ok(())
}
