//! # agent-core
//!
//! Provider-agnostic LLM abstraction used by the portfolio agents.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Market Analyst / Manager                  │
//! │  ┌─────────────┐   ┌────────────────┐   ┌──────────────┐  │
//! │  │   Prompt    │──▶│    Message     │──▶│ LlmProvider  │  │
//! │  │  template   │   │  (system/user) │   │  (Strategy)  │  │
//! │  └─────────────┘   └────────────────┘   └──────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait lets the agents run against OpenAI, a local
//! OpenAI-compatible server, or a scripted test double without changes.

pub mod error;
pub mod message;
pub mod provider;

pub use error::{AgentError, Result};
pub use message::{Message, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider};
