use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::rc::Rc;
use std::time::Duration;
use tokio::net::TcpListener;

use jobboard::categories::{CategoryId, CategorySource, HttpCategorySource, RefreshError};
use jobboard::document::{Element, MemoryDocument};
use jobboard::CategoryRefresher;

async fn spawn_api(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind random port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api/categories/")
}

fn source(url: &str) -> HttpCategorySource {
    HttpCategorySource::new(url, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn http_fetches_category_records() {
    let url = spawn_api(Router::new().route(
        "/api/categories/",
        get(|| async {
            (
                [("content-type", "application/json")],
                r#"[{"id": 1, "name": "Design", "job_count": 7}, {"id": "ops", "job_count": 0}]"#,
            )
        }),
    ))
    .await;

    let records = source(&url).fetch_categories().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, CategoryId::from(1));
    assert_eq!(records[0].job_count, 7);
    assert_eq!(records[1].id, CategoryId::Text("ops".to_string()));
}

#[tokio::test]
async fn http_server_error_is_a_status_error() {
    let url = spawn_api(Router::new().route(
        "/api/categories/",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    ))
    .await;

    match source(&url).fetch_categories().await {
        Err(RefreshError::Status(500)) => {}
        other => panic!("expected status 500, got {:?}", other),
    }
}

#[tokio::test]
async fn http_malformed_body_is_a_decode_error() {
    let url = spawn_api(Router::new().route(
        "/api/categories/",
        get(|| async { "<html>maintenance</html>" }),
    ))
    .await;

    match source(&url).fetch_categories().await {
        Err(RefreshError::Decode(_)) => {}
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[tokio::test]
async fn http_unreachable_server_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let url = format!("http://127.0.0.1:{port}/api/categories/");
    match source(&url).fetch_categories().await {
        Err(RefreshError::Network(_)) => {}
        other => panic!("expected network error, got {:?}", other),
    }
}

#[tokio::test]
async fn http_refresh_patches_the_page() {
    let url = spawn_api(Router::new().route(
        "/api/categories/",
        get(|| async { r#"[{"id": 4, "job_count": 31}]"# }),
    ))
    .await;

    let doc = MemoryDocument::new();
    let card = doc
        .element("div")
        .class("category-card-container")
        .attr("data-category-id", "4")
        .append_to(&doc.root());
    let label = doc
        .element("span")
        .class("category-job-count")
        .text_content("0 jobs available")
        .append_to(&card);

    let refresher = CategoryRefresher::new(doc.clone(), Rc::new(source(&url)), Duration::from_secs(30));
    let summary = refresher.refresh().await.unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(label.text(), "31 jobs available");
}
