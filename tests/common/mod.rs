#![allow(dead_code)]

use secrecy::Secret;
use serde_json::{json, Value};
use std::net::TcpListener;
use storefront::configuration::{
    ApplicationSettings, DatabaseSettings, JwtSettings, Settings, StoreKind, StoreSettings,
};
use storefront::startup::run;
use storefront::store::Stores;

pub struct TestApp {
    pub address: String,
    pub stores: Stores,
    pub settings: Settings,
    pub client: reqwest::Client,
}

pub fn test_settings() -> Settings {
    Settings {
        database: DatabaseSettings {
            kind: StoreKind::Memory,
            username: String::new(),
            password: Secret::new(String::new()),
            port: 0,
            host: String::new(),
            database_name: String::new(),
            max_connections: 1,
        },
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            // Lowest bcrypt cost; keeps the suite fast.
            password_hash_cost: 4,
        },
        store: StoreSettings { timeout_seconds: 10 },
        jwt: JwtSettings {
            secret: Secret::new("integration-test-secret-at-least-32-chars".to_string()),
            access_token_expiry: 86400,
            refresh_token_expiry: 604800,
            issuer: "storefront-test".to_string(),
        },
    }
}

pub async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let settings = test_settings();
    let stores = Stores::in_memory();

    let server = run(listener, stores.clone(), &settings).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        stores,
        settings,
        client: reqwest::Client::new(),
    }
}

pub fn signup_body(email: &str, phone: &str) -> Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "password": "hunter22",
        "email": email,
        "phone": phone
    })
}

impl TestApp {
    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn signup(&self, email: &str, phone: &str) -> reqwest::Response {
        self.post_json("/users/signup", &signup_body(email, phone)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_json("/users/login", &json!({ "email": email, "password": password }))
            .await
    }

    /// Sign up and log in, returning the login response body
    pub async fn signed_in_user(&self, email: &str, phone: &str) -> Value {
        assert_eq!(201, self.signup(email, phone).await.status().as_u16());
        let response = self.login(email, "hunter22").await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }
}

pub async fn error_code(response: reqwest::Response) -> String {
    let body: Value = response.json().await.expect("Failed to parse error body");
    body["code"].as_str().unwrap_or_default().to_string()
}
