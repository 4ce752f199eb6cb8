use serde_json::Value;

use crate::helpers::{spawn_app, PROFILE_PAGE};

#[tokio::test]
async fn created_key_is_returned_once_and_listed_without_secret() {
    let app = spawn_app().await;

    let created = app.create_api_key("Prod").await;
    let token = created["key"].as_str().unwrap();
    assert!(token.starts_with("sk_"));
    assert_eq!(token.len(), 46);
    assert_eq!(created["name"], "Prod");
    assert_eq!(created["is_active"], true);

    let keys: Value = app
        .client
        .get(app.url("/api-keys"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let keys = keys.as_array().unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0]["id"], created["id"]);
    assert!(keys[0].get("key").is_none());
    assert!(keys[0].get("token_hash").is_none());
    assert!(token.starts_with(keys[0]["key_prefix"].as_str().unwrap()));
}

#[tokio::test]
async fn blank_key_name_is_a_bad_request() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api-keys"))
        .json(&serde_json::json!({ "name": "   " }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn deactivation_is_idempotent_and_unknown_ids_are_404() {
    let app = spawn_app().await;
    let created = app.create_api_key("Staging").await;
    let id = created["id"].as_str().unwrap();

    for _ in 0..2 {
        let response = app
            .client
            .delete(app.url(&format!("/api-keys/{}", id)))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "API key deactivated");
        assert_eq!(body["api_key"]["is_active"], false);
    }

    let response = app
        .client
        .delete(app.url(&format!("/api-keys/{}", uuid::Uuid::new_v4())))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn protected_scrape_requires_an_active_key() {
    let app = spawn_app().await;
    let url = app.page("/startup/acme", PROFILE_PAGE).await;
    let created = app.create_api_key("Prod").await;
    let token = created["key"].as_str().unwrap();
    let body = serde_json::json!({ "url": url });

    let missing = app
        .client
        .post(app.url("/protected/scrape"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 401);
    assert_eq!(missing.headers()["www-authenticate"], "Bearer");

    let authorized = app
        .client
        .post(app.url("/protected/scrape"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(authorized.status().as_u16(), 200);
    let result: Value = authorized.json().await.unwrap();
    assert_eq!(result["status"], "success");
    assert_eq!(result["origin"], "api");

    app.client
        .delete(app.url(&format!("/api-keys/{}", created["id"].as_str().unwrap())))
        .send()
        .await
        .unwrap();

    let revoked = app
        .client
        .post(app.url("/protected/scrape"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(revoked.status().as_u16(), 401);
    let detail: Value = revoked.json().await.unwrap();
    assert_eq!(detail["detail"], "Invalid or inactive API key");
}

#[tokio::test]
async fn protected_bulk_scrape_tags_results_as_api() {
    let app = spawn_app().await;
    let url = app.page("/startup/acme", PROFILE_PAGE).await;
    let token = app.create_api_key("Prod").await["key"]
        .as_str()
        .unwrap()
        .to_string();

    let summary: Value = app
        .client
        .post(app.url("/protected/scrape/bulk"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "urls": [url, "ftp://files.example/x"] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(summary["total"], 2);
    assert_eq!(summary["success"], 1);
    assert_eq!(summary["results"][0]["origin"], "api");
    assert!(summary["results"][1]["error_message"]
        .as_str()
        .unwrap()
        .starts_with("InvalidUrl"));

    let keys: Value = app
        .client
        .get(app.url("/api-keys"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(keys[0]["last_used"].is_string());
}
