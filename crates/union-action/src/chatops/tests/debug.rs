use axum::http::StatusCode;

use super::common::*;
use crate::chatops::message::MessageLimits;
use crate::config::AppEnvironment;

#[tokio::test]
async fn debug_report_is_served_in_development() {
    let base_url = closed_backend().await;
    let (router, _) = agent_in(
        base_url.clone(),
        MessageLimits::default(),
        AppEnvironment::Development,
    );

    let (_, _, bad) = send(router.clone(), webhook(r#"{"from": "1"}"#)).await;
    assert_eq!(bad["error_code"], "VALIDATION_ERROR");
    let (status, _, body) = send(router, get("/debug")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "debug");
    assert_eq!(body["service"]["environment"], "development");
    assert_eq!(body["config"]["union_action_url"], base_url.as_str());
    assert_eq!(body["config"]["log_level"], "debug");
    assert_eq!(body["errors"]["total"], 1);
    assert_eq!(body["errors"]["by_category"]["validation"], 1);
    assert_eq!(body["errors"]["recent"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["system"]["pid"], std::process::id());
    assert!(body["system"]["memory_mb"].is_number());
}

#[tokio::test]
async fn debug_report_is_forbidden_outside_development() {
    for environment in [AppEnvironment::Test, AppEnvironment::Production] {
        let (router, _) = agent_in(closed_backend().await, MessageLimits::default(), environment);

        let (status, correlation, body) = send(router, get("/debug")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "FORBIDDEN");
        assert!(correlation.is_some());
    }
}
