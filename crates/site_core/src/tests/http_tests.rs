use super::*;
use axum::{
    extract::Path,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

async fn step_fragment(Path(step): Path<String>) -> (StatusCode, String) {
    match step.as_str() {
        "intro" => (StatusCode::OK, "<article>intro</article>".to_string()),
        "with space" => (StatusCode::OK, "<article>spaced</article>".to_string()),
        _ => (StatusCode::NOT_FOUND, "missing".to_string()),
    }
}

async fn sandbox_run(headers: HeaderMap, body: String) -> (StatusCode, String) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if content_type != SANDBOX_CONTENT_TYPE {
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("unexpected content type {content_type}"),
        );
    }
    if body.contains("panic") {
        return (StatusCode::INTERNAL_SERVER_ERROR, String::new());
    }
    (StatusCode::OK, format!("ran: {body}\n"))
}

fn site_routes() -> Router {
    Router::new()
        .route("/tutorial/steps/:step", get(step_fragment))
        .route("/sandbox/run", post(sandbox_run))
}

async fn spawn_site_server(app: Router) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

fn client(site_url: &str) -> SiteClient {
    SiteClient::new(site_url, Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn fetches_step_fragment() {
    let site = spawn_site_server(site_routes()).await.expect("server");
    let html = client(&site)
        .fetch_step(&StepId::from("intro"))
        .await
        .expect("fragment");
    assert_eq!(html, "<article>intro</article>");
}

#[tokio::test]
async fn missing_step_is_a_rejection_with_status() {
    let site = spawn_site_server(site_routes()).await.expect("server");
    let err = client(&site)
        .fetch_step(&StepId::from("nope"))
        .await
        .expect_err("404");
    assert_eq!(err, RemoteError::rejected(404, "missing"));
}

#[tokio::test]
async fn step_ids_are_sent_as_one_encoded_segment() {
    let site = spawn_site_server(site_routes()).await.expect("server");
    let html = client(&site)
        .fetch_step(&StepId::from("with space"))
        .await
        .expect("fragment");
    assert_eq!(html, "<article>spaced</article>");

    let err = client(&site)
        .fetch_step(&StepId::from("../sandbox/run"))
        .await
        .expect_err("not a step");
    assert!(matches!(err, RemoteError::Rejected { status: 404, .. }));
}

#[tokio::test]
async fn honours_site_path_prefix() {
    let site = spawn_site_server(Router::new().nest("/docs", site_routes()))
        .await
        .expect("server");
    for base in [format!("{site}/docs"), format!("{site}/docs/")] {
        let html = client(&base)
            .fetch_step(&StepId::from("intro"))
            .await
            .expect("fragment");
        assert_eq!(html, "<article>intro</article>");
    }
}

#[tokio::test]
async fn run_posts_plain_text_and_returns_output() {
    let site = spawn_site_server(site_routes()).await.expect("server");
    let response = client(&site).run("fn main() {}").await.expect("run");
    assert!(response.is_success());
    assert_eq!(response.body, "ran: fn main() {}\n");
}

#[tokio::test]
async fn run_failure_status_is_returned_not_raised() {
    let site = spawn_site_server(site_routes()).await.expect("server");
    let response = client(&site).run("panic(\"boom\")").await.expect("run");
    assert_eq!(response, RunResponse::new(500, ""));
}

#[tokio::test]
async fn unreachable_site_is_a_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = client(&format!("http://{addr}"));
    let err = client.run("fn main() {}").await.expect_err("refused");
    assert!(matches!(err, RemoteError::Transport(_)));
    let err = client
        .fetch_step(&StepId::from("intro"))
        .await
        .expect_err("refused");
    assert!(matches!(err, RemoteError::Transport(_)));
}

#[test]
fn rejects_unusable_site_urls() {
    assert!(SiteClient::new("not a url", Duration::from_secs(1)).is_err());
    assert!(SiteClient::new("mailto:docs@example.com", Duration::from_secs(1)).is_err());
    let client = client("http://localhost:8080/");
    assert_eq!(client.site_url().as_str(), "http://localhost:8080/");
}
