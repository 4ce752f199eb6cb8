use serde_json::Value;

use crate::helpers::{spawn_app, PROFILE_PAGE};

#[tokio::test]
async fn results_are_listed_most_recent_first_and_windowed() {
    let app = spawn_app().await;
    let url = app.page("/startup/acme", PROFILE_PAGE).await;
    app.post_scrape(&url).await;
    app.post_scrape("not a url").await;
    app.post_scrape(&url).await;

    let all: Value = app
        .client
        .get(app.url("/results"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[1]["source_url"], "not a url");

    let page: Value = app
        .client
        .get(app.url("/results?limit=1&skip=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page.as_array().unwrap().len(), 1);
    assert_eq!(page[0]["id"], all[1]["id"]);
}

#[tokio::test]
async fn stats_cover_the_whole_log() {
    let app = spawn_app().await;
    let url = app.page("/startup/acme", PROFILE_PAGE).await;
    for _ in 0..3 {
        app.post_scrape(&url).await;
    }
    app.post_scrape("not a url").await;

    let stats: Value = app
        .client
        .get(app.url("/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(stats["total"], 4);
    assert_eq!(stats["success"], 3);
    assert_eq!(stats["failed"], 1);
}

#[tokio::test]
async fn single_result_lookup() {
    let app = spawn_app().await;
    let created: Value = app.post_scrape("not a url").await.json().await.unwrap();
    let id = created["id"].as_str().unwrap();

    let found = app
        .client
        .get(app.url(&format!("/results/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(found.status().as_u16(), 200);
    let found: Value = found.json().await.unwrap();
    assert_eq!(found, created);

    let missing = app
        .client
        .get(app.url(&format!("/results/{}", uuid::Uuid::new_v4())))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn root_reports_name_and_version() {
    let app = spawn_app().await;

    let body: Value = app
        .client
        .get(app.url("/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["message"], "Data Scraping API");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
