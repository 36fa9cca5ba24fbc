#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use pwreset::auth::password;
use pwreset::config::Config;
use pwreset::email::{Mailer, PasswordResetMail};
use pwreset::models::{Token, User};
use pwreset::reset::{generate_token, hash_token};
use pwreset::state::SharedState;

/// In-memory mailer that records every reset mail instead of sending it.
/// Can be made slow or failing to mimic a misbehaving relay.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<PasswordResetMail>>,
    delay: Option<std::time::Duration>,
    fail: bool,
}

impl RecordingMailer {
    pub fn with_delay(delay: std::time::Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Records the attempt, then reports a delivery failure.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<PasswordResetMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Mail goes out in the background; wait until `count` sends were attempted.
    pub async fn wait_for(&self, count: usize) -> Vec<PasswordResetMail> {
        let deadline = Instant::now() + std::time::Duration::from_secs(10);
        loop {
            let sent = self.sent();
            if sent.len() >= count {
                return sent;
            }
            assert!(
                Instant::now() < deadline,
                "expected {count} mails, got {}",
                sent.len()
            );
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    /// Most recently sent mail, if any.
    pub fn pull_recent(&self) -> Option<PasswordResetMail> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_password_reset(&self, mail: &PasswordResetMail) -> Result<(), String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.sent.lock().unwrap().push(mail.clone());
        if self.fail {
            return Err("relay refused the message".to_string());
        }
        Ok(())
    }
}

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub mailer: Arc<RecordingMailer>,
    pub state: SharedState,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn forgot(&self, email: &str) -> StatusCode {
        self.client
            .post(self.url("/forgot"))
            .json(&json!({ "email": email }))
            .send()
            .await
            .expect("forgot request failed")
            .status()
    }

    pub async fn reset(&self, token: &str, password: &str, confirmation: &str) -> StatusCode {
        self.client
            .post(self.url("/reset"))
            .json(&json!({
                "token": token,
                "password": password,
                "password_confirmation": confirmation,
            }))
            .send()
            .await
            .expect("reset request failed")
            .status()
    }

    /// Insert a user directly, bypassing HTTP.
    pub async fn create_user(&self, email: &str, plain_password: &str) -> User {
        let pw_hash = password::hash(plain_password).expect("hash failed");
        pwreset::db::users::create(&self.pool, email, &pw_hash)
            .await
            .expect("create user failed")
    }

    /// Insert a token for `user_id` and return its raw value.
    pub async fn create_token(&self, user_id: Uuid, token_type: &str) -> String {
        let raw = generate_token();
        pwreset::db::tokens::create(&self.pool, user_id, &hash_token(&raw), token_type)
            .await
            .expect("create token failed");
        raw
    }

    /// Move a token's creation time into the past.
    pub async fn backdate_token(&self, raw: &str, by: Duration) {
        sqlx::query("UPDATE tokens SET created_at = $2 WHERE token_hash = $1")
            .bind(hash_token(raw))
            .bind(Utc::now() - by)
            .execute(&self.pool)
            .await
            .expect("backdate token failed");
    }

    pub async fn tokens_for(&self, user_id: Uuid) -> Vec<Token> {
        pwreset::db::tokens::list_for_user(&self.pool, user_id)
            .await
            .expect("list tokens failed")
    }

    pub async fn reload(&self, user: &User) -> User {
        pwreset::db::users::find_by_id(&self.pool, user.id)
            .await
            .expect("reload user failed")
            .expect("user vanished")
    }
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Like [`spawn_app`], letting the caller tweak the config first.
pub async fn spawn_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    spawn_app_with_mailer(RecordingMailer::default(), configure).await
}

/// Like [`spawn_app_with`], with a caller-built mailer.
pub async fn spawn_app_with_mailer(
    mailer: RecordingMailer,
    configure: impl FnOnce(&mut Config),
) -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let db_name = format!("pwreset_test_{}", Uuid::now_v7().to_string().replace('-', ""));

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let mut config = Config {
        database_url: test_url,
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        base_url: "http://localhost:0".to_string(),
        token_ttl_hours: 2,
        forgot_limit: 5,
        forgot_window_secs: 900,
        max_body_size: 16 * 1024,
        log_level: "warn".to_string(),
        smtp: None,
    };
    configure(&mut config);

    let mailer = Arc::new(mailer);
    let state = pwreset::build_state(pool.clone(), config, mailer.clone());
    let app = pwreset::build_app(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        pool,
        client: Client::new(),
        db_name,
        mailer,
        state,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
