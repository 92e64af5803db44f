use crate::db::PgPool;
use crate::db_models::User;
use crate::errors::custom::{map_diesel_error, AuthError, CustomError, DbError};
use crate::schema::users::dsl as user_dsl;
use actix_web::web;
use argon2::{self, Argon2, PasswordHash, PasswordVerifier};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::instrument;

#[instrument(name = "Get stored credentials", skip(pool), fields(email = %user_email))]
async fn get_stored_user(user_email: &str, pool: &PgPool) -> Result<Option<User>, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    user_dsl::users
        .filter(user_dsl::email.eq(user_email))
        .first::<User>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)
}

#[instrument(name = "Verify password", skip(expected_hash, candidate))]
fn verify_password(expected_hash: &str, candidate: &str) -> Result<bool, CustomError> {
    let argon2 = Argon2::default();
    let password_hashed = PasswordHash::new(expected_hash)
        .map_err(|err| CustomError::HashingError(err.to_string()))?;

    Ok(argon2
        .verify_password(candidate.as_bytes(), &password_hashed)
        .is_ok())
}

#[instrument(name = "Validate credentials", skip(pool, password), fields(email = %email))]
pub async fn validate_credentials(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> Result<User, CustomError> {
    let user = get_stored_user(email, pool).await?.ok_or_else(|| {
        CustomError::AuthenticationError(AuthError::InvalidCredentials(
            "Invalid email or password".to_string(),
        ))
    })?;

    if !user.is_active {
        return Err(CustomError::AuthenticationError(
            AuthError::AccountDisabled("This account is disabled".to_string()),
        ));
    }

    let expected_hash = user.password_hash.clone();
    let candidate = password.to_string();
    let is_valid = web::block(move || verify_password(&expected_hash, &candidate))
        .await
        .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    if is_valid {
        Ok(user)
    } else {
        Err(CustomError::AuthenticationError(
            AuthError::InvalidCredentials("Invalid email or password".to_string()),
        ))
    }
}
