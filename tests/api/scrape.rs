use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::helpers::{spawn_app, PROFILE_PAGE};

#[tokio::test]
async fn scrape_returns_extracted_fields() {
    let app = spawn_app().await;
    let url = app.page("/startup/acme", PROFILE_PAGE).await;

    let response = app.post_scrape(&url).await;

    assert_eq!(response.status().as_u16(), 200);
    let result: Value = response.json().await.unwrap();
    assert_eq!(result["status"], "success");
    assert_eq!(result["origin"], "single");
    assert_eq!(result["source_url"], url);
    assert_eq!(result["name"], "Acme Robotics");
    assert_eq!(result["domain"], "acme.example");
    assert_eq!(result["stage"], "Seed");
    assert_eq!(result["focus_industry"], "Robotics, Automation");
    assert_eq!(result["email"], "hello@acme.example");
    assert_eq!(result["error_message"], Value::Null);
}

#[tokio::test]
async fn failed_scrape_is_still_a_200_with_a_reason() {
    let app = spawn_app().await;
    let url = format!("{}/missing", app.pages.uri());

    let response = app.post_scrape(&url).await;

    assert_eq!(response.status().as_u16(), 200);
    let result: Value = response.json().await.unwrap();
    assert_eq!(result["status"], "failed");
    assert!(result["error_message"]
        .as_str()
        .unwrap()
        .starts_with("HttpError: status 404"));
}

#[tokio::test]
async fn scrape_rejects_malformed_json_with_detail() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/scrape"))
        .header("Content-Type", "application/json")
        .body(r#"{"link": "https://a.example"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn bulk_scrape_keeps_order_and_isolates_failures() {
    let app = spawn_app().await;
    let good = app.page("/a", PROFILE_PAGE).await;
    let slow = app.slow_page("/b").await;
    let urls = vec![good, "not a url".to_string(), slow];

    let response = app.post_bulk(&urls).await;

    assert_eq!(response.status().as_u16(), 200);
    let summary: Value = response.json().await.unwrap();
    assert_eq!(summary["total"], 3);
    assert_eq!(summary["success"], 1);
    assert_eq!(summary["failed"], 2);

    let results = summary["results"].as_array().unwrap();
    for (result, url) in results.iter().zip(urls.iter()) {
        assert_eq!(&result["source_url"], url);
        assert_eq!(result["origin"], "bulk");
    }
    assert!(results[1]["error_message"]
        .as_str()
        .unwrap()
        .starts_with("InvalidUrl"));
    assert!(results[2]["error_message"]
        .as_str()
        .unwrap()
        .starts_with("Timeout"));
}

#[tokio::test]
async fn empty_bulk_scrape_is_a_bad_request() {
    let app = spawn_app().await;

    let response = app.post_bulk(&[]).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "No URLs provided for batch processing");
}

#[tokio::test]
async fn csv_upload_scrapes_every_url_in_the_link_column() {
    let app = spawn_app().await;
    let first = app.page("/one", PROFILE_PAGE).await;
    let second = app.page("/two", "<h1>Beta Labs</h1>").await;
    let csv = format!("Company,Link\nAcme,{}\nNobody,\nBeta,{}\n", first, second);

    let form = Form::new().part(
        "file",
        Part::bytes(csv.into_bytes())
            .file_name("startups.csv")
            .mime_str("text/csv")
            .unwrap(),
    );
    let response = app
        .client
        .post(app.url("/scrape/upload-csv"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let summary: Value = response.json().await.unwrap();
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["success"], 2);
    assert_eq!(summary["results"][1]["name"], "Beta Labs");
}

#[tokio::test]
async fn csv_upload_rejects_other_files_and_missing_columns() {
    let app = spawn_app().await;

    for (file_name, content) in [
        ("startups.txt", "url\nhttps://a.example\n"),
        ("startups.csv", "name,website\nAcme,https://a.example\n"),
    ] {
        let form = Form::new().part(
            "file",
            Part::bytes(content.as_bytes().to_vec()).file_name(file_name),
        );
        let response = app
            .client
            .post(app.url("/scrape/upload-csv"))
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400, "{}", file_name);
        let body: Value = response.json().await.unwrap();
        assert!(body["detail"].is_string());
    }
}
