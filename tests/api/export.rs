use serde_json::Value;

use crate::helpers::spawn_app;

const TRICKY_PAGE: &str = r#"<html><body>
    <h1>Comma, Quote "and" Co</h1>
    <div class="about-company">First line,
    still about us</div>
</body></html>"#;

#[tokio::test]
async fn export_of_empty_log_is_404() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/export/csv")).send().await.unwrap();

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "No results found");
}

#[tokio::test]
async fn unknown_export_format_is_a_bad_request() {
    let app = spawn_app().await;
    app.post_scrape("not a url").await;

    let response = app.client.get(app.url("/export/xml")).send().await.unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn csv_export_is_a_download_that_reparses() {
    let app = spawn_app().await;
    let url = app.page("/tricky", TRICKY_PAGE).await;
    let scraped: Value = app.post_scrape(&url).await.json().await.unwrap();
    app.post_scrape("not a url").await;

    let response = app.client.get(app.url("/export/csv")).send().await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let disposition = response.headers()["content-disposition"].to_str().unwrap();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("scraped_data.csv"));

    let body = response.bytes().await.unwrap();
    let mut reader = csv::Reader::from_reader(body.as_ref());
    let header = reader.headers().unwrap().clone();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);

    let column = |name: &str| header.iter().position(|h| h == name).unwrap();
    let row = &rows[1];
    assert_eq!(&row[column("name")], scraped["name"].as_str().unwrap());
    assert_eq!(
        &row[column("about_company")],
        scraped["about_company"].as_str().unwrap()
    );
    assert_eq!(&rows[0][column("status")], "failed");
}

#[tokio::test]
async fn json_export_honours_limit() {
    let app = spawn_app().await;
    app.post_scrape("not a url").await;
    let latest: Value = app.post_scrape("also not a url").await.json().await.unwrap();

    let response = app
        .client
        .get(app.url("/export/JSON?limit=1"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let exported: Value = response.json().await.unwrap();
    assert_eq!(exported, Value::Array(vec![latest]));
}
