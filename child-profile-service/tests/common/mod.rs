//! Test helper module for child-profile-service integration tests.
//!
//! Spawns the application on a random port with a wiremock server standing
//! in for the downstream db-interact service.

#![allow(dead_code)]

use child_profile_service::config::{DbInteractConfig, Environment, JwtConfig, ProfileConfig};
use child_profile_service::services::jwt::{AccessTokenClaims, ACCESS_TOKEN_TYPE};
use child_profile_service::services::JwtService;
use child_profile_service::startup::Application;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use service_core::config::Config as CoreConfig;
use wiremock::MockServer;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";
pub const TEST_PARENT_ID: &str = "parent-user-1";
pub const TEST_TEACHER_ID: &str = "teacher-user-1";

pub struct TestApp {
    pub address: String,
    pub db_interact: MockServer,
    pub jwt: JwtService,
}

impl TestApp {
    /// Spawn the app against a fresh mock db-interact server.
    pub async fn spawn() -> Self {
        let db_interact = MockServer::start().await;
        let config = test_config(db_interact.uri(), 2);
        let jwt = JwtService::new(&config.jwt);
        let address = spawn_app(config).await;

        TestApp {
            address,
            db_interact,
            jwt,
        }
    }

    pub fn parent_token(&self) -> String {
        mint_access_token(TEST_JWT_SECRET, TEST_PARENT_ID, "parent", 15)
    }

    pub fn teacher_token(&self) -> String {
        mint_access_token(TEST_JWT_SECRET, TEST_TEACHER_ID, "teacher", 15)
    }
}

/// Mint an access token the way the auth service would; the service under
/// test only ever validates these.
pub fn mint_access_token(secret: &str, user_id: &str, role: &str, ttl_minutes: i64) -> String {
    let now = Utc::now();
    let claims = AccessTokenClaims {
        sub: user_id.to_string(),
        role: role.to_string(),
        token_type: ACCESS_TOKEN_TYPE.to_string(),
        exp: (now + Duration::minutes(ttl_minutes)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to encode test token")
}

pub fn test_config(db_interact_url: String, timeout_seconds: u64) -> ProfileConfig {
    ProfileConfig {
        common: CoreConfig { port: 0 },
        environment: Environment::Dev,
        service_name: "child-profile-service".to_string(),
        log_level: "info".to_string(),
        db_interact: DbInteractConfig {
            url: db_interact_url,
            timeout_seconds,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            linking_code_expiry_hours: 24,
        },
    }
}

/// Build the application and run it in the background, returning its address.
pub async fn spawn_app(config: ProfileConfig) -> String {
    let app = Application::build(config)
        .await
        .expect("Failed to build test application");
    let port = app.port();

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    format!("http://127.0.0.1:{}", port)
}

/// A port nothing is listening on, for unreachable-downstream tests.
pub async fn closed_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let port = listener.local_addr().expect("Failed to read local addr").port();
    drop(listener);
    port
}
