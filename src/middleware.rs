use crate::auth_jwt::auth::verify_jwt;
use crate::errors::custom::{AuthError, CustomError};
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::Next;
use actix_web::HttpMessage;

/******************************************/
// Bearer token check for protected routes
/******************************************/
// Missing token -> 401, bad signature or expired -> 403. Decoded claims are
// stored in the request extensions for the downstream handlers.
pub async fn jwt_auth_middleware(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.to_string());

    let token = match token {
        Some(token) => token,
        None => {
            return Err(CustomError::AuthenticationError(AuthError::MissingToken(
                "No bearer token provided".to_string(),
            ))
            .into());
        }
    };

    let claims = verify_jwt(&token).map_err(|err| {
        actix_web::Error::from(CustomError::AuthenticationError(AuthError::InvalidToken(
            err,
        )))
    })?;

    req.extensions_mut().insert(claims);
    next.call(req).await
}
