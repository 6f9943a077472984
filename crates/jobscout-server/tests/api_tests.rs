use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use jobscout_core::config::SearchConfig;
use jobscout_core::error::AppError;
use jobscout_core::models::Source;
use jobscout_core::pipeline::SearchService;
use jobscout_core::retry::RetryConfig;
use jobscout_core::testutil::{
    MockAdapter, MockDescriptionFetcher, MockOracle, jsearch_listing,
};
use jobscout_server::routes;
use jobscout_server::state::AppState;

fn test_config() -> SearchConfig {
    SearchConfig {
        retry: RetryConfig {
            max_attempts: 1,
            base_delay: Duration::from_millis(1),
        },
        ..SearchConfig::default()
    }
}

fn app(linkedin: MockAdapter, indeed: MockAdapter, google: MockAdapter) -> Router {
    let service = SearchService::new(
        linkedin,
        MockAdapter::empty(Source::LinkedinScrape),
        indeed,
        google,
        MockDescriptionFetcher::new("Python and Django in production."),
        MockOracle::new(0.7),
        test_config(),
    );
    routes::router(Arc::new(AppState::new(service)))
}

fn sample_app() -> Router {
    app(
        MockAdapter::new(
            Source::JsearchLinkedin,
            vec![
                jsearch_listing("Backend Developer", "ACME", "Python and Django"),
                jsearch_listing("Backend Engineer", "Globex", "Python services"),
                jsearch_listing("Frontend Developer", "Initech", "React"),
                jsearch_listing("Platform Engineer", "Umbrella", "Kubernetes"),
            ],
        ),
        MockAdapter::empty(Source::JsearchIndeed),
        MockAdapter::empty(Source::GoogleJobs),
    )
}

fn search_request(body: serde_json::Value, query: &str) -> Request<Body> {
    Request::post(format!("/v1/search{query}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn criteria_body() -> serde_json::Value {
    serde_json::json!({
        "position": "Backend Developer",
        "experience": "2 years",
        "salary": "",
        "jobNature": "remote",
        "location": "usa",
        "skills": ["Python", "Django"]
    })
}

#[tokio::test]
async fn health_returns_200() {
    let response = sample_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn search_returns_relevant_jobs() {
    let response = sample_app()
        .oneshot(search_request(criteria_body(), "?limit=3"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    let jobs = json["relevant_jobs"].as_array().unwrap();
    assert!(!jobs.is_empty());
    assert!(jobs.len() <= 3);

    let first = &jobs[0];
    assert_eq!(first["job_title"], "Backend Developer");
    assert_eq!(first["company"], "ACME");
    assert!(first["apply_link"].as_str().unwrap().starts_with("https://"));
    assert!(first.get("jobNature").is_some());
}

#[tokio::test]
async fn scores_are_never_serialized() {
    let response = sample_app()
        .oneshot(search_request(criteria_body(), ""))
        .await
        .unwrap();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(body.to_vec()).unwrap();

    assert!(!text.contains("final_score"));
    assert!(!text.contains("prefilter_score"));
    assert!(!text.contains("deep_score"));
    assert!(!text.contains("skills_match_ratio"));
}

#[tokio::test]
async fn empty_position_returns_400() {
    let mut body = criteria_body();
    body["position"] = serde_json::json!("");

    let response = sample_app()
        .oneshot(search_request(body, ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"], "invalid_criteria");
}

#[tokio::test]
async fn all_sources_failed_returns_502() {
    let failing = |source| MockAdapter::with_error(source, AppError::HttpError("HTTP 500".into()));
    let service = SearchService::new(
        failing(Source::JsearchLinkedin),
        failing(Source::LinkedinScrape),
        failing(Source::JsearchIndeed),
        failing(Source::GoogleJobs),
        MockDescriptionFetcher::new(""),
        MockOracle::new(0.5),
        test_config(),
    );
    let app = routes::router(Arc::new(AppState::new(service)));

    let response = app
        .oneshot(search_request(criteria_body(), ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"], "all_sources_failed");
}

#[tokio::test]
async fn oversized_limit_is_clamped() {
    let response = sample_app()
        .oneshot(search_request(criteria_body(), "?limit=99"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["relevant_jobs"].as_array().unwrap().len() <= 5);
}

#[tokio::test]
async fn empty_sources_give_empty_relevant_jobs() {
    let app = app(
        MockAdapter::empty(Source::JsearchLinkedin),
        MockAdapter::empty(Source::JsearchIndeed),
        MockAdapter::empty(Source::GoogleJobs),
    );

    let response = app
        .oneshot(search_request(criteria_body(), ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["relevant_jobs"].as_array().unwrap().len(), 0);
}
