use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use union_action::chatops::UnionActionClient;
use union_action::config::SurveyConfig;
use union_action::intake::ComplaintContext;
use union_action::pipeline::{backend_router, UnionActionService};
use union_action::survey::deployer_from_config;

async fn spawn_backend(config: SurveyConfig) -> String {
    let deployer = deployer_from_config(&config).expect("deployer");
    let service = Arc::new(UnionActionService::new(deployer, config));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, backend_router(service)).await;
    });
    format!("http://{addr}")
}

fn client(base_url: String, context: ComplaintContext) -> UnionActionClient {
    UnionActionClient::new(base_url, Duration::from_secs(5), context).expect("client")
}

#[tokio::test]
async fn client_drives_both_steps_against_live_backend() {
    let base_url = spawn_backend(SurveyConfig::default()).await;
    let client = client(base_url, ComplaintContext::default());

    let report = client
        .escalate_to_ethics(
            "447700900123",
            "I was denied training despite requests",
            "Training can be denied when convenient",
        )
        .await
        .expect("escalation");
    assert_eq!(report["universalizability_test"]["verdict"], "FAILURE");
    assert_eq!(report["humanity_formula_test"]["verdict"], "VIOLATION");

    let deployment = client
        .generate_koers_survey("447700900123", report)
        .await
        .expect("survey");
    assert_eq!(deployment["module_list"][0], "core");
    assert_eq!(deployment["validation_status"], "passed");
    let modules = deployment["module_list"].as_array().map(Vec::len).unwrap_or(0);
    assert_eq!(deployment["item_count"], json!(7 + 5 * (modules - 1)));
}

#[tokio::test]
async fn configured_context_reaches_the_analysis() {
    let base_url = spawn_backend(SurveyConfig::default()).await;
    let context = ComplaintContext {
        pressures: "Cost reduction pressures".to_string(),
        duties: "Professional standards expected of all staff".to_string(),
        actor_role: "Porter".to_string(),
        experience: "Felt ignored".to_string(),
    };

    let report = client(base_url, context)
        .escalate_to_ethics("wf", "Rota changed", "Rotas are published weekly")
        .await
        .expect("escalation");

    assert_eq!(report["autonomy_test"]["verdict"], "VIOLATION");
    assert_eq!(report["case_input"]["actor_role"], "Porter");
}

#[tokio::test]
async fn backend_rejection_surfaces_as_status_error() {
    let base_url = spawn_backend(SurveyConfig::default()).await;

    let error = client(base_url, ComplaintContext::default())
        .generate_koers_survey("wf", json!({"summary": "no verdicts"}))
        .await
        .expect_err("rejected");

    match error {
        union_action::chatops::ClientError::Status { status, body } => {
            assert_eq!(status, 422);
            assert!(body.contains("TRANSFORMATION_FAILED"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn health_check_reads_backend_status() {
    let base_url = spawn_backend(SurveyConfig::default()).await;

    let health = client(base_url, ComplaintContext::default())
        .health_check()
        .await
        .expect("health");

    assert_eq!(health["status"], "healthy");
}
