mod common;

use serde_json::{json, Value};

use common::{error_code, spawn_app, TestApp};

async fn add_product(app: &TestApp, token: &str, name: &str) -> reqwest::Response {
    app.client
        .post(&format!("{}/admin/addproduct", app.address))
        .header("token", token)
        .json(&json!({ "name": name, "price": 1200, "rating": 4, "image": "item.jpg" }))
        .send()
        .await
        .expect("Failed to execute request.")
}

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(&format!("{}/health_check", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn add_product_requires_token() {
    let app = spawn_app().await;

    let response = app
        .post_json("/admin/addproduct", &json!({ "name": "Laptop", "price": 1, "rating": 1, "image": "x" }))
        .await;

    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "MISSING_TOKEN");
}

#[tokio::test]
async fn added_products_are_listed_and_searchable() {
    let app = spawn_app().await;
    let profile = app.signed_in_user("a@x.com", "5550100").await;
    let token = profile["token"].as_str().unwrap();

    for name in ["Alienware x15", "iPhone 13", "Alienware m17"] {
        assert_eq!(201, add_product(&app, token, name).await.status().as_u16());
    }

    let listed: Vec<Value> = app
        .client
        .get(&format!("{}/users/productview", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 3);

    let found: Vec<Value> = app
        .client
        .get(&format!("{}/users/search?name=^Alien", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|p| p["name"].as_str().unwrap().starts_with("Alien")));
}

#[tokio::test]
async fn search_without_name_returns_400() {
    let app = spawn_app().await;

    for query in ["", "?name=", "?name=(unclosed"] {
        let response = app
            .client
            .get(&format!("{}/users/search{}", app.address, query))
            .send()
            .await
            .unwrap();

        assert_eq!(400, response.status().as_u16(), "query: {:?}", query);
        assert_eq!(error_code(response).await, "VALIDATION_ERROR");
    }
}
