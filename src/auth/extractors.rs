use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::token::Claims;
use crate::error::AppError;

/// The id of the user behind the request's bearer token.
///
/// Only available on routes behind `AuthMiddleware`, which verifies the token
/// and stores its `Claims` in the request extensions. Missing claims or a
/// subject that is not a UUID are rejected with 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user_id = req.extensions().get::<Claims>().map(Claims::user_id);
        let result = match user_id {
            Some(Some(id)) => Ok(AuthenticatedUser(id)),
            Some(None) => Err(AppError::Unauthorized("Invalid token".into())),
            None => Err(AppError::Unauthorized("Unauthorized - no token provided".into())),
        };
        ready(result.map_err(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    fn claims(sub: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            iss: "todo-api".to_string(),
            iat: 0,
            exp: 0,
        }
    }

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_success() {
        let id = Uuid::new_v4();
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(claims(&id.to_string()));

        let extracted = AuthenticatedUser::from_request(&req, &mut Payload::None).await;
        assert_eq!(extracted.unwrap(), AuthenticatedUser(id));
    }

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_without_claims() {
        let req = test::TestRequest::default().to_http_request();

        let err = AuthenticatedUser::from_request(&req, &mut Payload::None)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_rejects_non_uuid_subject() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(claims("42"));

        let result = AuthenticatedUser::from_request(&req, &mut Payload::None).await;
        assert!(result.is_err());
    }
}
