//! Shared setup for integration tests
//!
//! Spawns the real server on a random port backed by an in-memory user
//! store and a manually driven clock.

use std::net::TcpListener;
use std::sync::Arc;

use uuid::Uuid;

use session_auth::auth::{hash_password_with_cost, AuthService, MockClock};
use session_auth::configuration::{AuthSettings, CookieSettings};
use session_auth::startup::run;
use session_auth::store::{InMemoryUserStore, User};

pub const ACCESS_TTL: i64 = 900;
pub const REFRESH_TTL: i64 = 864_000;
pub const PASSWORD: &str = "CorrectHorse42";

pub struct TestApp {
    pub address: String,
    pub store: InMemoryUserStore,
    pub clock: Arc<MockClock>,
    pub client: reqwest::Client,
}

pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

pub fn test_settings() -> AuthSettings {
    AuthSettings {
        access_token_secret: "integration-access-secret-0123456789".to_string(),
        access_token_expiry: ACCESS_TTL,
        refresh_token_secret: "integration-refresh-secret-0123456789".to_string(),
        refresh_token_expiry: REFRESH_TTL,
        issuer: "session_auth-tests".to_string(),
        cookie: CookieSettings::default(),
    }
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store = InMemoryUserStore::new();
    let clock = Arc::new(MockClock::new(1_700_000_000));
    let settings = test_settings();
    let auth = AuthService::from_settings(&settings, Arc::new(store.clone()), clock.clone());

    let server = run(listener, auth, settings).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store,
        clock,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }

    /// Insert a user whose password is `PASSWORD`
    pub fn seed_user(&self, username: &str) -> TestUser {
        let email = format!("{}@example.com", username);
        let hash = hash_password_with_cost(PASSWORD, 4).expect("Failed to hash password");
        let user = User::new(username, &email, "Test User", hash);
        let id = self.store.insert(user).expect("Failed to seed user");

        TestUser {
            id,
            username: username.to_string(),
            email,
        }
    }

    pub async fn post_login(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url("/users/login"))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_refresh_cookie(&self, refresh_token: &str) -> reqwest::Response {
        self.client
            .post(self.url("/users/refresh-token"))
            .header("Cookie", format!("refreshToken={}", refresh_token))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Log in and return (access_token, refresh_token)
    pub async fn login(&self, user: &TestUser) -> (String, String) {
        let response = self
            .post_login(&serde_json::json!({
                "username": user.username,
                "password": PASSWORD
            }))
            .await;
        assert_eq!(200, response.status().as_u16());

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        (
            body["data"]["access_token"].as_str().unwrap().to_string(),
            body["data"]["refresh_token"].as_str().unwrap().to_string(),
        )
    }
}

/// Collect (name, value, raw header) for every Set-Cookie header
pub fn set_cookies(response: &reqwest::Response) -> Vec<(String, String, String)> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|raw| {
            let first = raw.split(';').next()?;
            let (name, value) = first.split_once('=')?;
            Some((name.trim().to_string(), value.trim().to_string(), raw.to_string()))
        })
        .collect()
}
