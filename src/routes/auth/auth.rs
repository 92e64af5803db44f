use super::validate_user::validate_credentials;
use crate::auth_jwt::auth::{create_jwt, Claims};
use crate::db::PgPool;
use crate::db_models::{NewUser, User, UserRole};
use crate::errors::custom::{map_diesel_error, AuthError, CustomError, DbError};
use crate::schema::users::dsl as user_dsl;
use crate::validations::coerce;
use crate::validations::name_email::{PersonName, UserEmail};
use actix_web::{web, HttpResponse};
use argon2::{self, password_hash::SaltString, Argon2, PasswordHasher};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

#[derive(Deserialize)]
pub struct RegisterUserBody {
    email: Option<String>,
    password: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    role: Option<UserRole>,
    #[serde(default, deserialize_with = "coerce::flexible_bool")]
    newsletter: Option<bool>,
}

#[derive(Deserialize)]
pub struct LoginUserBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

fn generate_random_salt() -> SaltString {
    let mut rng = rand::thread_rng();
    SaltString::generate(&mut rng)
}

async fn load_user(pool: &PgPool, user_id: i32) -> Result<User, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;
    let user = user_dsl::users
        .find(user_id)
        .first::<User>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| CustomError::NotFoundError("User no longer exists".to_string()))?;
    if !user.is_active {
        return Err(CustomError::AuthenticationError(
            AuthError::AccountDisabled("This account is disabled".to_string()),
        ));
    }
    Ok(user)
}

/******************************************/
// Registering User Route
/******************************************/
/**
 * @route   POST /api/auth/register
 * @access  Public
 */
#[instrument(name = "Register a new user", skip(req_user, pool))]
pub async fn register_user(
    pool: web::Data<PgPool>,
    req_user: web::Json<RegisterUserBody>,
) -> Result<HttpResponse, CustomError> {
    let data = req_user.into_inner();

    let (email, password, first_name, last_name) =
        match (data.email, data.password, data.first_name, data.last_name) {
            (Some(e), Some(p), Some(f), Some(l)) => (e, p, f, l),
            _ => {
                return Err(CustomError::ValidationError(
                    "email, password, first_name and last_name are required".to_string(),
                ));
            }
        };

    let validated_email = UserEmail::parse(email)
        .map_err(|err| CustomError::ValidationError(err.to_string()))?;
    let validated_first = PersonName::parse(first_name)
        .map_err(|err| CustomError::ValidationError(err.to_string()))?;
    let validated_last = PersonName::parse(last_name)
        .map_err(|err| CustomError::ValidationError(err.to_string()))?;

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let existing = user_dsl::users
        .filter(user_dsl::email.eq(validated_email.as_ref()))
        .select(user_dsl::id)
        .first::<i32>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
    if existing.is_some() {
        return Err(CustomError::ConflictError(
            "Email is already registered".to_string(),
        ));
    }

    // Argon2 is CPU-bound, keep it off the async workers.
    let password_hashed = web::block(move || {
        let argon2 = Argon2::default();
        let salt = generate_random_salt();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| CustomError::HashingError(err.to_string()))
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    let new_user = NewUser {
        email: validated_email.as_ref().to_string(),
        password_hash: password_hashed,
        first_name: validated_first.as_ref().to_string(),
        last_name: validated_last.as_ref().to_string(),
        phone: data.phone,
        role: data.role.unwrap_or(UserRole::Client),
        newsletter: data.newsletter.unwrap_or(false),
        is_active: true,
    };

    // The unique index backstops the lookup above if two registrations race.
    let user: User = diesel::insert_into(user_dsl::users)
        .values(&new_user)
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;

    let token = create_jwt(&user).map_err(|err| {
        CustomError::AuthenticationError(AuthError::InvalidToken(err.to_string()))
    })?;

    Ok(HttpResponse::Created().json(json!({ "user": user, "token": token })))
}

/******************************************/
// Login Route
/******************************************/
/**
 * @route   POST /api/auth/login
 * @access  Public
 */
#[instrument(name = "Login a user", skip(req_login, pool))]
pub async fn login_user(
    pool: web::Data<PgPool>,
    req_login: web::Json<LoginUserBody>,
) -> Result<HttpResponse, CustomError> {
    let data = req_login.into_inner();
    let (email, password) = match (data.email, data.password) {
        (Some(e), Some(p)) => (e, p),
        _ => {
            return Err(CustomError::ValidationError(
                "email and password are required".to_string(),
            ));
        }
    };

    let user = validate_credentials(&pool, &email, &password).await?;
    let token = create_jwt(&user).map_err(|err| {
        CustomError::AuthenticationError(AuthError::InvalidToken(err.to_string()))
    })?;

    Ok(HttpResponse::Ok().json(json!({ "user": user, "token": token })))
}

/******************************************/
// Profile Route
/******************************************/
/**
 * @route   GET /api/auth/profile
 * @access  JWT Protected
 */
#[instrument(name = "Get profile", skip(pool, claims), fields(user_id = %claims.sub))]
pub async fn get_profile(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, CustomError> {
    let user = load_user(&pool, claims.sub).await?;
    Ok(HttpResponse::Ok().json(user))
}

/******************************************/
// Token Verification Route
/******************************************/
/**
 * @route   GET /api/auth/verify-token
 * @access  JWT Protected
 */
#[instrument(name = "Verify token", skip(pool, claims), fields(user_id = %claims.sub))]
pub async fn verify_token(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, CustomError> {
    let user = load_user(&pool, claims.sub).await?;
    Ok(HttpResponse::Ok().json(json!({ "valid": true, "user": user })))
}

/******************************************/
// Logout Route
/******************************************/
/**
 * @route   POST /api/auth/logout
 * @access  JWT Protected
 */
// Tokens are stateless, there is nothing to revoke server-side.
#[instrument(name = "Logout a user", skip(_claims))]
pub async fn logout_user(_claims: web::ReqData<Claims>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Logout successful, discard the token" }))
}
