use crate::db_models::{User, UserRole};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    pub sub: i32,
    pub email: String,
    pub role: UserRole,
    pub exp: usize,
}

pub fn create_jwt(user: &User) -> Result<String, String> {
    let expiration_time = (Utc::now() + Duration::hours(24)).timestamp() as usize;

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        exp: expiration_time,
    };

    let secret = env::var("JWT_SECRET").map_err(|_| "Jwt secret not found".to_string())?;
    let encoding_key = EncodingKey::from_secret(secret.as_ref());
    encode(&Header::default(), &claims, &encoding_key).map_err(|err| err.to_string())
}

pub fn verify_jwt(token: &str) -> Result<Claims, String> {
    let secret = env::var("JWT_SECRET").map_err(|_| "Jwt secret not found".to_string())?;
    let decoding_key = DecodingKey::from_secret(secret.as_ref());
    let validation = Validation::default();
    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|err| err.to_string())?;

    Ok(token_data.claims)
}
