//! Tests for the orchestration client against a local mock service.

#![cfg(test)]

use super::{Error, OrchestrationClient, TargetIntentResult};
use crate::config::OrchestrationConfig;
use crate::testing::{MockRoute, MockServer};
use std::time::Duration;

const PATH: &str = "/language/:analyze-conversations";

const QA_BODY: &str = r#"{
    "kind": "ConversationResult",
    "result": {
        "query": "How do I reset my password?",
        "prediction": {
            "topIntent": "SupportFAQ",
            "projectKind": "Orchestration",
            "intents": {
                "SupportFAQ": {
                    "targetProjectKind": "QuestionAnswering",
                    "confidenceScore": 0.93,
                    "result": {
                        "answers": [
                            {"answer": "Use the account page.", "confidenceScore": 0.9, "source": "faq.tsv"},
                            {"answer": "Contact support.", "confidenceScore": 0.4}
                        ]
                    }
                },
                "ClockProject": {
                    "targetProjectKind": "Conversation",
                    "confidenceScore": 0.02
                }
            }
        }
    }
}"#;

fn config(server: &MockServer) -> OrchestrationConfig {
    OrchestrationConfig {
        endpoint: Some(server.url().to_string()),
        key: Some("lang-key".into()),
        project: Some("Orchestrator".into()),
        deployment: Some("production".into()),
        ..OrchestrationConfig::default()
    }
}

#[test]
fn test_new_requires_settings() {
    let config = OrchestrationConfig {
        endpoint: Some("https://lang.example.com".into()),
        key: Some("k".into()),
        ..OrchestrationConfig::default()
    };
    let result = OrchestrationClient::new(&config, Duration::from_secs(5));
    assert!(matches!(result, Err(Error::MissingSetting("project"))));
}

#[tokio::test]
async fn test_analyze_request() {
    let server = MockServer::start(vec![MockRoute::new("POST", PATH, 200, QA_BODY)]);
    let client = OrchestrationClient::new(&config(&server), Duration::from_secs(5)).unwrap();

    client.analyze("How do I reset my password?").await.unwrap();

    let requests = server.requests_to("POST", PATH);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query.as_deref(), Some("api-version=2023-04-01"));
    assert_eq!(
        requests[0].header("Ocp-Apim-Subscription-Key"),
        Some("lang-key")
    );
    let body = requests[0].json();
    assert_eq!(
        body["analysisInput"]["conversationItem"]["text"],
        "How do I reset my password?"
    );
    assert_eq!(body["parameters"]["projectName"], "Orchestrator");
    assert_eq!(body["parameters"]["deploymentName"], "production");
}

#[tokio::test]
async fn test_analyze_decodes_question_answering() {
    let server = MockServer::start(vec![MockRoute::new("POST", PATH, 200, QA_BODY)]);
    let client = OrchestrationClient::new(&config(&server), Duration::from_secs(5)).unwrap();

    let result = client.analyze("How do I reset my password?").await.unwrap();
    assert_eq!(result.prediction.top_intent, "SupportFAQ");

    let Some(TargetIntentResult::QuestionAnswering {
        confidence,
        result: Some(result),
    }) = result.prediction.top_result()
    else {
        panic!("expected a question answering result");
    };
    assert!((confidence - 0.93).abs() < f64::EPSILON);
    assert_eq!(result.answers.len(), 2);
    assert_eq!(result.answers[0].source.as_deref(), Some("faq.tsv"));
    assert!(result.answers[1].source.is_none());
}

#[tokio::test]
async fn test_secondary_intents_have_no_result() {
    let server = MockServer::start(vec![MockRoute::new("POST", PATH, 200, QA_BODY)]);
    let client = OrchestrationClient::new(&config(&server), Duration::from_secs(5)).unwrap();

    let result = client.analyze("How do I reset my password?").await.unwrap();
    assert!(matches!(
        result.prediction.intents.get("ClockProject"),
        Some(TargetIntentResult::Conversation { result: None, .. })
    ));
}

#[tokio::test]
async fn test_analyze_api_error() {
    let server = MockServer::start(vec![MockRoute::new(
        "POST",
        PATH,
        401,
        r#"{"error":{"code":"401","message":"Access denied due to invalid subscription key."}}"#,
    )]);
    let client = OrchestrationClient::new(&config(&server), Duration::from_secs(5)).unwrap();

    let err = client.analyze("hi").await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 401, .. }));
    assert!(err.to_string().contains("invalid subscription key"));
}

#[tokio::test]
async fn test_analyze_unexpected_shape() {
    let server = MockServer::start(vec![MockRoute::new(
        "POST",
        PATH,
        200,
        r#"{"kind":"ConversationResult","result":{"query":"hi"}}"#,
    )]);
    let client = OrchestrationClient::new(&config(&server), Duration::from_secs(5)).unwrap();

    let err = client.analyze("hi").await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}
