//! Console rendering of orchestration results.

use super::types::{
    ConversationPrediction, OrchestrationResult, QuestionAnsweringResult, Resolution,
    TargetIntentResult,
};
use std::fmt;

impl fmt::Display for OrchestrationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let top_intent = &self.prediction.top_intent;
        writeln!(f, "The top intent was {top_intent}\n")?;
        writeln!(f, "The result from the connected project is as follows:\n")?;

        match self.prediction.top_result() {
            Some(TargetIntentResult::Conversation {
                result: Some(result),
                ..
            }) => write_conversation(f, &result.prediction),
            Some(TargetIntentResult::QuestionAnswering {
                result: Some(result),
                ..
            }) => write_answers(f, result),
            Some(TargetIntentResult::Unsupported) => writeln!(
                f,
                "Warning: intent '{top_intent}' routed to an unsupported project kind"
            ),
            _ => writeln!(
                f,
                "Warning: no connected project result for intent '{top_intent}'"
            ),
        }
    }
}

fn write_conversation(f: &mut fmt::Formatter<'_>, prediction: &ConversationPrediction) -> fmt::Result {
    writeln!(f, "\tTop Intent: {}", prediction.top_intent)?;
    writeln!(f, "\tIntents:")?;
    for intent in &prediction.intents {
        writeln!(f, "\t\tCategory: {}", intent.category)?;
        writeln!(f, "\t\tConfidence: {}", intent.confidence_score)?;
        writeln!(f)?;
    }

    writeln!(f, "\tEntities:")?;
    for entity in &prediction.entities {
        writeln!(f, "\t\tCategory: {}", entity.category)?;
        writeln!(f, "\t\tText: {}", entity.text)?;
        writeln!(f, "\t\tOffset: {}", entity.offset)?;
        writeln!(f, "\t\tLength: {}", entity.length)?;
        writeln!(f, "\t\tConfidence: {}", entity.confidence_score)?;
        writeln!(f)?;

        for resolution in &entity.resolutions {
            if let Resolution::DateTimeResolution {
                date_time_sub_kind,
                timex,
                value,
            } = resolution
            {
                writeln!(f, "\t\t\tDatetime Sub Kind: {date_time_sub_kind}")?;
                writeln!(f, "\t\t\tTimex: {timex}")?;
                writeln!(f, "\t\t\tValue: {value}")?;
                writeln!(f)?;
            }
        }
    }
    Ok(())
}

fn write_answers(f: &mut fmt::Formatter<'_>, result: &QuestionAnsweringResult) -> fmt::Result {
    writeln!(f, "\tAnswers: \n")?;
    for answer in &result.answers {
        writeln!(f, "\t\t{}", answer.answer)?;
        writeln!(f, "\t\tConfidence: {}", answer.confidence_score)?;
        writeln!(f, "\t\tSource: {}", answer.source.as_deref().unwrap_or("unknown"))?;
        writeln!(f)?;
    }
    Ok(())
}
