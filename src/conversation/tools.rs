use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::interview::InterviewType;

/// Local question bank lookup; pure and synchronous
pub trait QuestionBank: Send + Sync {
    fn question_for(&self, interview_type: InterviewType, category: &str, difficulty: &str) -> String;
}

/// Arguments the agent passes to `getQuestion`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetQuestionArgs {
    #[serde(deserialize_with = "scalar_as_string")]
    pub category: String,
    #[serde(deserialize_with = "scalar_as_string")]
    pub difficulty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetQuestionResult {
    pub question: String,
}

/// Tools the remote agent may call back into
#[derive(Clone)]
pub struct ClientTools {
    interview_type: InterviewType,
    questions: Arc<dyn QuestionBank>,
}

impl ClientTools {
    pub const GET_QUESTION: &'static str = "getQuestion";

    pub fn new(interview_type: InterviewType, questions: Arc<dyn QuestionBank>) -> Self {
        Self {
            interview_type,
            questions,
        }
    }

    pub fn names(&self) -> &'static [&'static str] {
        &[Self::GET_QUESTION]
    }

    /// Delegates straight to the question bank; no caching
    pub fn get_question(&self, args: GetQuestionArgs) -> GetQuestionResult {
        let question =
            self.questions
                .question_for(self.interview_type, &args.category, &args.difficulty);
        info!("Retrieved question: {}", question);
        GetQuestionResult { question }
    }

    /// Dispatch a tool call by name with JSON arguments
    pub fn invoke(&self, name: &str, args: serde_json::Value) -> Result<serde_json::Value> {
        match name {
            Self::GET_QUESTION => {
                let args: GetQuestionArgs = serde_json::from_value(args)
                    .with_context(|| format!("Invalid arguments for {}", name))?;
                Ok(serde_json::to_value(self.get_question(args))?)
            }
            other => bail!("Unknown client tool: {}", other),
        }
    }
}

/// Agents send difficulty as either `"2"` or `2`; both pass through as text
fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected a scalar, got {}", other))),
    }
}
