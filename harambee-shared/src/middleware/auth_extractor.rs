use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::errors::{AppError, ErrorCode};
use crate::types::auth::{AuthUser, Claims};

/// Router state that knows the token verification secret.
pub trait AuthState {
    fn jwt_secret(&self) -> &str;
}

impl<T: AuthState> AuthState for Arc<T> {
    fn jwt_secret(&self) -> &str {
        (**self).jwt_secret()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: AuthState + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let claims = decode_claims(token, state.jwt_secret())?;

        if claims.is_expired() {
            return Err(AppError::new(ErrorCode::TokenExpired, "token has expired"));
        }

        Ok(AuthUser::from(claims))
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::unauthorized("missing authorization header"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("invalid authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthorized("authorization header must use Bearer scheme"))
}

/// Validates an HS256 token issued by the identity provider.
pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::new(ErrorCode::TokenExpired, "token has expired")
        }
        _ => AppError::new(ErrorCode::TokenInvalid, format!("invalid token: {e}")),
    })?;

    Ok(token_data.claims)
}

/// Caller with the admin role.
pub struct AdminUser(pub AuthUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: AuthState + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::forbidden("admin access required"));
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum::http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    use crate::types::auth::UserRole;

    struct Keys(&'static str);

    impl AuthState for Keys {
        fn jwt_secret(&self) -> &str {
            self.0
        }
    }

    fn parts_with(token: &str) -> Parts {
        let (parts, _) = Request::builder()
            .header("Authorization", format!("Bearer {token}"))
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    fn token_for(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn decodes_valid_token() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, UserRole::Admin, 3600);
        let decoded = decode_claims(&token_for(&claims, "s3cret"), "s3cret").unwrap();

        assert_eq!(decoded.sub, user_id);
        assert_eq!(decoded.role, UserRole::Admin);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let claims = Claims::new(Uuid::new_v4(), UserRole::User, 3600);
        let err = decode_claims(&token_for(&claims, "one"), "two").unwrap_err();

        assert!(matches!(err, AppError::Known { code: ErrorCode::TokenInvalid, .. }));
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims::new(Uuid::new_v4(), UserRole::User, -3600);
        let err = decode_claims(&token_for(&claims, "s3cret"), "s3cret").unwrap_err();

        assert!(matches!(err, AppError::Known { code: ErrorCode::TokenExpired, .. }));
    }

    #[test]
    fn bearer_scheme_required() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert("Authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert("Authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def");
    }

    #[tokio::test]
    async fn extractor_verifies_with_the_state_secret() {
        let user_id = Uuid::new_v4();
        let token = token_for(&Claims::new(user_id, UserRole::User, 3600), "configured");

        let state = Arc::new(Keys("configured"));
        let user = AuthUser::from_request_parts(&mut parts_with(&token), &state).await.unwrap();
        assert_eq!(user.id, user_id);

        let err = AuthUser::from_request_parts(&mut parts_with(&token), &Keys("other")).await.unwrap_err();
        assert!(matches!(err, AppError::Known { code: ErrorCode::TokenInvalid, .. }));
    }

    #[tokio::test]
    async fn admin_extractor_rejects_members() {
        let state = Keys("k");
        let member = token_for(&Claims::new(Uuid::new_v4(), UserRole::User, 3600), "k");
        assert!(AdminUser::from_request_parts(&mut parts_with(&member), &state).await.is_err());

        let admin = token_for(&Claims::new(Uuid::new_v4(), UserRole::Admin, 3600), "k");
        let AdminUser(user) = AdminUser::from_request_parts(&mut parts_with(&admin), &state).await.unwrap();
        assert!(user.is_admin());
    }
}
