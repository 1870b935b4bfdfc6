//! Boundary to the remote conversational-AI service
//!
//! The service itself (transport, codec, speech recognition) lives outside
//! this crate. It is consumed through `ConversationClient` and reports back
//! through a `SessionEvents` channel.

pub mod client;
pub mod tools;

pub use client::{
    ConversationClient, ConversationHandle, DynamicVariables, SessionEvent, SessionEvents,
    SessionParams,
};
pub use tools::{ClientTools, GetQuestionArgs, GetQuestionResult, QuestionBank};
