use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;

/// Header set by the identity gateway after it has verified the session.
/// This service never sees raw credentials; it trusts the gateway's subject.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Primary email of the authenticated identity, when the gateway knows it.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Extractor for the authenticated identity.
///
/// Use this in any handler that requires authentication:
/// ```ignore
/// async fn my_handler(user: AuthUser) -> Result<Json<T>, AppError> {
///     // user.id is the identity-provider subject
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(AppError::Unauthorized)?
            .to_string();

        let email = parts
            .headers
            .get(USER_EMAIL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(AuthUser { id, email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> Result<AuthUser, AppError> {
        let (mut parts, _) = req.into_parts();
        AuthUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_id_and_email() {
        let req = Request::builder()
            .header(USER_ID_HEADER, "user_2abc")
            .header(USER_EMAIL_HEADER, "casey@example.com")
            .body(())
            .unwrap();
        let user = extract(req).await.unwrap();
        assert_eq!(user.id, "user_2abc");
        assert_eq!(user.email.as_deref(), Some("casey@example.com"));
    }

    #[tokio::test]
    async fn test_missing_id_header_is_unauthorized() {
        let req = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(req).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_blank_id_header_is_unauthorized() {
        let req = Request::builder()
            .header(USER_ID_HEADER, "   ")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(req).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_email_is_optional() {
        let req = Request::builder()
            .header(USER_ID_HEADER, "user_2abc")
            .body(())
            .unwrap();
        let user = extract(req).await.unwrap();
        assert_eq!(user.email, None);
    }
}
