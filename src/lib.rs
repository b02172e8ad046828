//! Calcterm - a terminal calculus reference with visual lessons and a local AI tutor.
//!
//! The screen is split into three independent panels:
//!
//! - a content browser over modules, topics, formulas and concepts
//! - a braille-canvas visualizer with derivative, limit, tangent, unit circle
//!   and wave lessons, pan/zoom and an animation clock
//! - a tutor chat that streams replies from a local Ollama server
//!
//! # Example
//!
//! ```no_run
//! use calcterm::config::ChatConfig;
//! use calcterm::chat::client::OllamaClient;
//! use calcterm::chat::message::ChatMessage;
//!
//! # async fn demo() -> calcterm::Result<()> {
//! let client = OllamaClient::new(ChatConfig::default())?;
//! let reply = client
//!     .send_chat("llama3.2", &[ChatMessage::user("What is a limit?")], None)
//!     .await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod app;
pub mod chat;
pub mod config;
pub mod content;
pub mod error;
pub mod ui;
pub mod util;
pub mod visualizer;

pub use error::{CalcError, Result};
