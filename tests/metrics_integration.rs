//! File server and hit counter

mod common;

use common::{spawn_app, TestApp};

async fn metrics_page(app: &TestApp) -> String {
    let response = app
        .client
        .get(app.url("/admin/metrics"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    response.text().await.unwrap()
}

#[tokio::test]
async fn app_serves_the_static_site() {
    let app = spawn_app();

    let response = app
        .client
        .get(app.url("/app/"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    assert!(response.text().await.unwrap().contains("Welcome to Chirpy"));
}

#[tokio::test]
async fn file_server_hits_are_counted() {
    let app = spawn_app();
    assert!(metrics_page(&app).await.contains("visited 0 times"));

    for path in ["/app/", "/app/index.html", "/app/missing.png"] {
        app.client.get(app.url(path)).send().await.unwrap();
    }
    // API traffic is not counted
    app.client.get(app.url("/api/healthz")).send().await.unwrap();

    assert!(metrics_page(&app).await.contains("Chirpy has been visited 3 times!"));
}

#[tokio::test]
async fn api_reset_zeroes_the_counter() {
    let app = spawn_app();
    app.client.get(app.url("/app/")).send().await.unwrap();
    app.register("a@x.com", common::PASSWORD).await;

    let response = app
        .client
        .get(app.url("/api/reset"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    assert_eq!(response.text().await.unwrap(), "Hits: 0");
    assert!(metrics_page(&app).await.contains("visited 0 times"));

    // users survive a counter reset
    let login = app
        .login_raw(serde_json::json!({ "email": "a@x.com", "password": common::PASSWORD }))
        .await;
    assert_eq!(200, login.status().as_u16());
}
