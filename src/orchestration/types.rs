//! Conversation-analysis request and response records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of `POST /language/:analyze-conversations`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyzeRequest<'a> {
    pub kind: &'static str,
    pub analysis_input: AnalysisInput<'a>,
    pub parameters: AnalyzeParameters<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalysisInput<'a> {
    pub conversation_item: ConversationItem<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConversationItem<'a> {
    pub text: &'a str,
    pub id: &'static str,
    pub participant_id: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyzeParameters<'a> {
    pub project_name: &'a str,
    pub deployment_name: &'a str,
    pub string_index_type: &'static str,
}

impl<'a> AnalyzeRequest<'a> {
    pub(crate) fn new(text: &'a str, project_name: &'a str, deployment_name: &'a str) -> Self {
        Self {
            kind: "Conversation",
            analysis_input: AnalysisInput {
                conversation_item: ConversationItem {
                    text,
                    id: "1",
                    participant_id: "1",
                },
            },
            parameters: AnalyzeParameters {
                project_name,
                deployment_name,
                string_index_type: "Utf16CodeUnit",
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalyzeResponse {
    pub result: OrchestrationResult,
}

/// Result of routing one query through an orchestration project.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrchestrationResult {
    #[serde(default)]
    pub query: String,
    pub prediction: OrchestrationPrediction,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationPrediction {
    pub top_intent: String,
    #[serde(default)]
    pub intents: BTreeMap<String, TargetIntentResult>,
}

impl OrchestrationPrediction {
    /// Result of the connected project the top intent routed to.
    #[must_use]
    pub fn top_result(&self) -> Option<&TargetIntentResult> {
        self.intents.get(&self.top_intent)
    }
}

/// Per-intent result, keyed by the kind of project it routed to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "targetProjectKind")]
pub enum TargetIntentResult {
    Conversation {
        #[serde(rename = "confidenceScore", default)]
        confidence: f64,
        /// Only the top intent carries a result.
        #[serde(default)]
        result: Option<ConversationTargetResult>,
    },
    QuestionAnswering {
        #[serde(rename = "confidenceScore", default)]
        confidence: f64,
        #[serde(default)]
        result: Option<QuestionAnsweringResult>,
    },
    /// LUIS, non-linked and any future kinds.
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConversationTargetResult {
    pub prediction: ConversationPrediction,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPrediction {
    pub top_intent: String,
    #[serde(default)]
    pub intents: Vec<ConversationIntent>,
    #[serde(default)]
    pub entities: Vec<ConversationEntity>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationIntent {
    pub category: String,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEntity {
    pub category: String,
    pub text: String,
    pub offset: u32,
    pub length: u32,
    pub confidence_score: f64,
    #[serde(default)]
    pub resolutions: Vec<Resolution>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "resolutionKind")]
pub enum Resolution {
    DateTimeResolution {
        #[serde(rename = "dateTimeSubKind")]
        date_time_sub_kind: String,
        timex: String,
        value: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuestionAnsweringResult {
    #[serde(default)]
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub answer: String,
    pub confidence_score: f64,
    #[serde(default)]
    pub source: Option<String>,
}
