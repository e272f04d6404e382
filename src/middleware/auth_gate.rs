/// Access Token Gate
///
/// Pulls an access token from the `accessToken` cookie or, failing that,
/// from an `Authorization: Bearer` header; verifies it; resolves the user
/// and stores a `CurrentUser` in the request extensions. Any failure ends
/// the request with a 401 and no identity attached.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::TokenCodec;
use crate::error::{AppError, AuthError, DatabaseError};
use crate::store::{UserProfile, UserStore};

/// Identity attached to a request that passed the gate
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserProfile);

/// Find the candidate access token; cookie wins over header
pub fn extract_access_token(req: &ServiceRequest, cookie_name: &str) -> Option<String> {
    let from_cookie = req
        .cookie(cookie_name)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty());

    from_cookie.or_else(|| {
        req.headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

/// Verify a token and load the user it names
///
/// A missing user is reported exactly like a bad token.
pub async fn authenticate(
    codec: &TokenCodec,
    users: &dyn UserStore,
    token: &str,
) -> Result<UserProfile, AppError> {
    let user_id = codec.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Access token rejected");
        AppError::from(AuthError::InvalidAccessToken)
    })?;

    match users.find_by_id(user_id).await {
        Ok(user) => Ok(user.profile()),
        Err(DatabaseError::NotFound(_)) => {
            tracing::warn!(user_id = %user_id, "Access token for unknown user");
            Err(AuthError::InvalidAccessToken.into())
        }
        Err(other) => Err(other.into()),
    }
}

/// Middleware guarding routes that need an authenticated user
#[derive(Clone)]
pub struct AuthGate {
    codec: TokenCodec,
    users: Arc<dyn UserStore>,
    cookie_name: String,
}

impl AuthGate {
    pub fn new(codec: TokenCodec, users: Arc<dyn UserStore>, cookie_name: impl Into<String>) -> Self {
        Self {
            codec,
            users,
            cookie_name: cookie_name.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthGateService {
            service: Rc::new(service),
            gate: Rc::new(self.clone()),
        }))
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
    gate: Rc<AuthGate>,
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let gate = self.gate.clone();

        Box::pin(async move {
            let token = match extract_access_token(&req, &gate.cookie_name) {
                Some(token) => token,
                None => {
                    tracing::debug!(path = %req.path(), "No access token presented");
                    return Err(AppError::from(AuthError::MissingToken).into());
                }
            };

            let profile = authenticate(&gate.codec, gate.users.as_ref(), &token).await?;

            tracing::debug!(user_id = %profile.id, "Access token validated");
            req.extensions_mut().insert(CurrentUser(profile));

            service.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;

    #[test]
    fn test_cookie_preferred_over_header() {
        let req = TestRequest::default()
            .cookie(Cookie::new("accessToken", "from-cookie"))
            .insert_header(("Authorization", "Bearer from-header"))
            .to_srv_request();

        assert_eq!(extract_access_token(&req, "accessToken"), Some("from-cookie".to_string()));
    }

    #[test]
    fn test_bearer_header_used_without_cookie() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer from-header"))
            .to_srv_request();

        assert_eq!(extract_access_token(&req, "accessToken"), Some("from-header".to_string()));
    }

    #[test]
    fn test_malformed_headers_yield_nothing() {
        for header in ["Bearer", "Bearer ", "Basic dXNlcjpwYXNz", "BearerToken", ""] {
            let req = TestRequest::default()
                .insert_header(("Authorization", header))
                .to_srv_request();

            assert_eq!(extract_access_token(&req, "accessToken"), None, "header {:?}", header);
        }
    }

    #[test]
    fn test_empty_cookie_falls_back_to_header() {
        let req = TestRequest::default()
            .cookie(Cookie::new("accessToken", ""))
            .insert_header(("Authorization", "Bearer from-header"))
            .to_srv_request();

        assert_eq!(extract_access_token(&req, "accessToken"), Some("from-header".to_string()));
    }

    mod pipeline {
        use super::super::*;
        use crate::auth::{MockClock, TokenKind};
        use crate::store::{InMemoryUserStore, User};
        use actix_web::http::StatusCode;
        use actix_web::{test, web, App, HttpResponse};
        use uuid::Uuid;

        async fn whoami(current: web::ReqData<CurrentUser>) -> HttpResponse {
            HttpResponse::Ok().body(current.0.username.clone())
        }

        fn fixture() -> (AuthGate, TokenCodec, InMemoryUserStore, Uuid) {
            let store = InMemoryUserStore::new();
            let id = store
                .insert(User::new("peggy", "peggy@example.com", "Peggy", "hash".to_string()))
                .unwrap();
            let codec = TokenCodec::new(
                TokenKind::Access,
                "gate-test-secret",
                "gate-test",
                Arc::new(MockClock::new(1_700_000_000)),
            );
            let gate = AuthGate::new(codec.clone(), Arc::new(store.clone()), "accessToken");
            (gate, codec, store, id)
        }

        #[actix_web::test]
        async fn test_valid_token_reaches_handler() {
            let (gate, codec, _, id) = fixture();
            let app = test::init_service(
                App::new().service(web::resource("/me").wrap(gate).route(web::get().to(whoami))),
            )
            .await;

            let token = codec.issue(id, 60).unwrap();
            let req = test::TestRequest::get()
                .uri("/me")
                .insert_header(("Authorization", format!("Bearer {}", token)))
                .to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(test::read_body(resp).await, "peggy");
        }

        #[actix_web::test]
        async fn test_rejections_are_401() {
            let (gate, codec, store, id) = fixture();
            let app = test::init_service(
                App::new().service(web::resource("/me").wrap(gate).route(web::get().to(whoami))),
            )
            .await;

            let token = codec.issue(id, 60).unwrap();
            store.remove(id).unwrap();

            let cases = vec![
                test::TestRequest::get().uri("/me").to_request(),
                test::TestRequest::get()
                    .uri("/me")
                    .insert_header(("Authorization", "Bearer garbage"))
                    .to_request(),
                test::TestRequest::get()
                    .uri("/me")
                    .insert_header(("Authorization", format!("Bearer {}", token)))
                    .to_request(),
            ];

            for req in cases {
                let status = match test::try_call_service(&app, req).await {
                    Ok(resp) => resp.status(),
                    Err(err) => err.as_response_error().status_code(),
                };
                assert_eq!(status, StatusCode::UNAUTHORIZED);
            }
        }
    }
}
