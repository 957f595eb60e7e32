//! Shared harness: the real server on a random port with the in-memory store.
#![allow(dead_code)]

use std::net::TcpListener;

use chirpy::configuration::{
    ApplicationSettings, DatabaseSettings, JwtSettings, RevokePolicy, Settings, StorageBackend,
    WebhookSettings,
};
use chirpy::startup::run;
use chirpy::store::Storage;
use serde_json::{json, Value};

pub const POLKA_KEY: &str = "test-polka-key";
pub const PASSWORD: &str = "Secret123!";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

pub fn test_settings(platform: &str) -> Settings {
    Settings {
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            platform: platform.to_string(),
            static_dir: "./public".to_string(),
        },
        database: DatabaseSettings {
            backend: StorageBackend::Memory,
            username: String::new(),
            password: String::new(),
            port: 5432,
            host: String::new(),
            database_name: String::new(),
        },
        jwt: JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            issuer: "chirpy".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 5_184_000,
            revoke_policy: RevokePolicy::Strict,
        },
        webhooks: WebhookSettings {
            polka_key: POLKA_KEY.to_string(),
        },
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(test_settings("dev"))
}

pub fn spawn_app_with(settings: Settings) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = run(listener, Storage::in_memory(), settings).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/users"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn login_raw(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/login"))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Register (if needed) and log in, returning the login body
    pub async fn signup_and_login(&self, email: &str) -> Value {
        self.register(email, PASSWORD).await;
        let response = self
            .login_raw(json!({ "email": email, "password": PASSWORD }))
            .await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse login response")
    }

    pub async fn post_with_bearer(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn create_chirp(&self, token: &str, body: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/chirps"))
            .bearer_auth(token)
            .json(&json!({ "body": body }))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub async fn error_message(response: reqwest::Response) -> String {
    let body: Value = response.json().await.expect("Failed to parse error body");
    body["error"]
        .as_str()
        .expect("error field missing")
        .to_string()
}
