//! Tutor chat feature.
//!
//! `ChatState` is the panel model. It never touches the network: submitting
//! yields an [`Action`] that the application runs on the async runtime, and
//! results come back as [`ChatEvent`]s.

pub mod attachment;
pub mod client;
pub mod message;
pub mod stream;
pub mod ui;
pub mod vision;

use crate::config::ChatConfig;
use crate::ui::formatters::format_bytes;
use attachment::ImageAttachment;
use client::ModelInfo;
use message::{ChatMessage, Role};
use std::path::Path;

/// First message shown in the panel.
pub const GREETING: &str = "Hello! I'm your calculus tutor powered by Ollama. I'm here to help you \
understand limits, derivatives, integrals, and all the concepts in your modules. Ask me anything \
about calculus!";

/// Reachability of the inference server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// Not probed yet.
    #[default]
    Unknown,
    /// Probe in flight.
    Checking,
    /// Server answered.
    Connected,
    /// Server unreachable, with the reason.
    Disconnected(String),
}

impl ConnectionStatus {
    /// Short label for the panel title.
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Unknown => "unknown",
            ConnectionStatus::Checking => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected(_) => "disconnected",
        }
    }
}

/// Severity of a panel notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// Something was accepted with a caveat.
    Warning,
    /// Something was rejected.
    Error,
}

/// One-line message under the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text.
    pub text: String,
}

/// A displayed conversation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    /// Author. `System` entries are local information and never sent.
    pub role: Role,
    /// Text shown.
    pub text: String,
    /// Attached image file name.
    pub image: Option<String>,
    /// Reply still arriving.
    pub streaming: bool,
    /// Reply failed.
    pub failed: bool,
}

impl ChatEntry {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            image: None,
            streaming: false,
            failed: false,
        }
    }

    fn in_history(&self) -> bool {
        self.role != Role::System && !self.failed && !self.streaming
    }
}

/// A request ready to be sent.
#[derive(Debug, Clone)]
pub struct Outgoing {
    /// Id correlating the events of this request.
    pub request: u64,
    /// Target model.
    pub model: String,
    /// Full message list: system prompt, history window, new turn.
    pub messages: Vec<ChatMessage>,
}

/// Work the application must start on behalf of the panel.
#[derive(Debug, Clone)]
pub enum Action {
    /// Probe the server and list models.
    Refresh,
    /// Fetch a model card to refine vision detection.
    Probe(String),
    /// Stream a chat reply.
    Send(Outgoing),
}

/// Results delivered from background tasks.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// Outcome of a refresh: installed models, or why the server is unreachable.
    Connection(std::result::Result<Vec<ModelInfo>, String>),
    /// Outcome of a model card probe.
    Vision {
        /// Probed model.
        model: String,
        /// Whether the card reports image support.
        supported: bool,
    },
    /// A streamed fragment.
    Delta {
        /// Request id.
        request: u64,
        /// Text fragment.
        text: String,
    },
    /// Stream ended normally.
    Finished {
        /// Request id.
        request: u64,
        /// Concatenated reply.
        full: String,
    },
    /// Request failed.
    Failed {
        /// Request id.
        request: u64,
        /// Human-readable reason.
        message: String,
        /// The server was unreachable.
        connectivity: bool,
    },
}

/// State for the chat panel.
#[derive(Debug)]
pub struct ChatState {
    /// Conversation as displayed.
    pub entries: Vec<ChatEntry>,
    /// Input line.
    pub input: String,
    /// Image waiting to go out with the next message.
    pub pending_image: Option<ImageAttachment>,
    /// Server reachability.
    pub status: ConnectionStatus,
    /// Installed models from the last refresh.
    pub models: Vec<ModelInfo>,
    /// Model used for new requests.
    pub selected_model: Option<String>,
    /// Probe result for the selected model.
    pub vision: Option<bool>,
    /// Notice under the input.
    pub notice: Option<Notice>,
    /// Lines scrolled up from the bottom.
    pub scroll: usize,
    scroll_limit: usize,
    active_request: Option<u64>,
    next_request: u64,
    system_prompt: String,
    history_window: usize,
    max_image_bytes: u64,
    preferred_model: Option<String>,
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new(&ChatConfig::default())
    }
}

impl ChatState {
    /// Create a new chat state.
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            entries: vec![ChatEntry::new(Role::Assistant, GREETING)],
            input: String::new(),
            pending_image: None,
            status: ConnectionStatus::Unknown,
            models: Vec::new(),
            selected_model: None,
            vision: None,
            notice: None,
            scroll: 0,
            scroll_limit: usize::MAX,
            active_request: None,
            next_request: 1,
            system_prompt: config.system_prompt.clone(),
            history_window: config.history_window,
            max_image_bytes: config.max_image_bytes,
            preferred_model: config.preferred_model.clone(),
        }
    }

    /// A reply is streaming.
    pub fn is_busy(&self) -> bool {
        self.active_request.is_some()
    }

    /// Id of the request in flight.
    pub fn active_request(&self) -> Option<u64> {
        self.active_request
    }

    /// Whether the server is known to be reachable.
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// Append a character to the input line.
    pub fn input_char(&mut self, c: char) {
        self.input.push(c);
    }

    /// Delete the last input character.
    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Scroll the conversation up, no further than the oldest line.
    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_add(lines).min(self.scroll_limit);
    }

    /// Scroll the conversation down.
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    /// Record how far the rendered conversation can scroll.
    pub fn set_scroll_limit(&mut self, limit: usize) {
        self.scroll_limit = limit;
        self.scroll = self.scroll.min(limit);
    }

    /// Mark a refresh as started.
    pub fn begin_refresh(&mut self) -> Action {
        self.status = ConnectionStatus::Checking;
        Action::Refresh
    }

    /// Handle Enter: run a slash command or prepare a message.
    pub fn submit(&mut self) -> Option<Action> {
        let line = self.input.trim().to_string();
        if let Some(command) = line.strip_prefix('/') {
            self.input.clear();
            return self.run_command(command);
        }
        self.prepare_send()
    }

    fn run_command(&mut self, command: &str) -> Option<Action> {
        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };
        match name {
            "image" if !arg.is_empty() => {
                self.attach_image(Path::new(arg));
                None
            },
            "image" => {
                self.notify(NoticeLevel::Error, "Usage: /image PATH");
                None
            },
            "clear" => {
                if self.pending_image.take().is_some() {
                    self.notify(NoticeLevel::Info, "Image removed");
                }
                None
            },
            "models" => {
                self.push_model_list();
                None
            },
            "model" if !arg.is_empty() => self
                .select_model(arg)
                .then(|| Action::Probe(arg.to_string())),
            "model" => {
                self.notify(NoticeLevel::Error, "Usage: /model NAME");
                None
            },
            "refresh" => Some(self.begin_refresh()),
            _ => {
                self.notify(
                    NoticeLevel::Error,
                    format!("Unknown command /{name}. Try /models, /model, /image, /clear, /refresh"),
                );
                None
            },
        }
    }

    /// Validate and attach an image for the next message.
    pub fn attach_image(&mut self, path: &Path) {
        match ImageAttachment::from_path(path, self.max_image_bytes) {
            Ok(image) => {
                let text = format!(
                    "Attached {} ({}, {}x{}, {})",
                    image.file_name(),
                    image.mime_type(),
                    image.dimensions.0,
                    image.dimensions.1,
                    format_bytes(image.size)
                );
                self.pending_image = Some(image);
                self.notify(NoticeLevel::Info, text);
                self.warn_if_not_vision();
            },
            Err(e) => {
                tracing::warn!("Rejected attachment {}: {}", path.display(), e);
                self.notify(NoticeLevel::Error, e.to_string());
            },
        }
    }

    /// Select a listed model. Returns `false` if it is not installed.
    pub fn select_model(&mut self, name: &str) -> bool {
        if !self.models.iter().any(|m| m.name == name) {
            self.notify(NoticeLevel::Error, format!("Model {name} is not installed"));
            return false;
        }
        self.selected_model = Some(name.to_string());
        self.vision = None;
        self.notify(NoticeLevel::Info, format!("Using {name}"));
        true
    }

    /// Whether the selected model is believed to accept images.
    pub fn selected_supports_vision(&self) -> bool {
        match (self.vision, &self.selected_model) {
            (Some(known), _) => known,
            (None, Some(name)) => vision::name_suggests_vision(name),
            (None, None) => false,
        }
    }

    fn warn_if_not_vision(&mut self) {
        if self.pending_image.is_none() || self.selected_supports_vision() {
            return;
        }
        if let Some(model) = &self.selected_model {
            let text = format!("{model} may not support images; it will be sent anyway");
            self.notify(NoticeLevel::Warning, text);
        }
    }

    fn push_model_list(&mut self) {
        let text = if self.models.is_empty() {
            "No models listed. Run /refresh once Ollama is running.".to_string()
        } else {
            let mut text = String::from("Installed models:");
            for model in &self.models {
                let marker = if Some(&model.name) == self.selected_model.as_ref() {
                    '*'
                } else {
                    ' '
                };
                text.push_str(&format!(
                    "\n{} {} {} {}",
                    marker,
                    model.name,
                    model.details.parameter_size,
                    format_bytes(model.size)
                ));
            }
            text
        };
        self.entries.push(ChatEntry::new(Role::System, text));
        self.scroll = 0;
    }

    /// Build a request from the input line, or explain why not.
    fn prepare_send(&mut self) -> Option<Action> {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }
        if self.is_busy() {
            self.notify(NoticeLevel::Error, "Wait for the current reply or press Esc to cancel");
            return None;
        }
        if !self.is_connected() {
            let reason = match &self.status {
                ConnectionStatus::Disconnected(reason) => reason.clone(),
                ConnectionStatus::Checking => "Still connecting to Ollama".to_string(),
                _ => "Not connected to Ollama".to_string(),
            };
            self.notify(NoticeLevel::Error, format!("{reason}. Use /refresh to retry"));
            return None;
        }
        let Some(model) = self.selected_model.clone() else {
            self.notify(NoticeLevel::Error, "No model selected. Install one with `ollama pull`");
            return None;
        };

        let mut messages = Vec::with_capacity(self.history_window + 2);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        let history: Vec<&ChatEntry> = self.entries.iter().filter(|e| e.in_history()).collect();
        let skip = history.len().saturating_sub(self.history_window);
        messages.extend(history[skip..].iter().map(|entry| ChatMessage {
            role: entry.role,
            content: entry.text.clone(),
            images: None,
        }));

        let mut user = ChatMessage::user(text.clone());
        let mut entry = ChatEntry::new(Role::User, text);
        if let Some(image) = self.pending_image.take() {
            user = user.with_image(&image.base64);
            entry.image = Some(image.file_name());
        }
        messages.push(user);

        let request = self.next_request;
        self.next_request += 1;
        self.active_request = Some(request);
        self.entries.push(entry);
        self.entries.push(ChatEntry {
            streaming: true,
            ..ChatEntry::new(Role::Assistant, "")
        });
        self.input.clear();
        self.scroll = 0;
        self.notice = None;

        tracing::info!("Sending request {} to {}", request, model);
        Some(Action::Send(Outgoing {
            request,
            model,
            messages,
        }))
    }

    /// Stop waiting for the current reply. Returns its id so the task can be aborted.
    pub fn cancel(&mut self) -> Option<u64> {
        let request = self.active_request.take()?;
        if let Some(entry) = self.streaming_entry() {
            entry.streaming = false;
            if entry.text.is_empty() {
                entry.text = "(cancelled)".to_string();
                entry.failed = true;
            }
        }
        self.notify(NoticeLevel::Info, "Reply cancelled");
        Some(request)
    }

    /// Apply a background result. May ask for a follow-up action.
    pub fn apply_event(&mut self, event: ChatEvent) -> Option<Action> {
        match event {
            ChatEvent::Connection(Ok(models)) => {
                self.status = ConnectionStatus::Connected;
                self.models = models;
                self.pick_model()
            },
            ChatEvent::Connection(Err(reason)) => {
                self.status = ConnectionStatus::Disconnected(reason);
                None
            },
            ChatEvent::Vision { model, supported } => {
                if self.selected_model.as_deref() == Some(model.as_str()) {
                    self.vision = Some(supported);
                    self.warn_if_not_vision();
                }
                None
            },
            ChatEvent::Delta { request, text } => {
                if self.active_request == Some(request) {
                    if let Some(entry) = self.streaming_entry() {
                        entry.text.push_str(&text);
                    }
                }
                None
            },
            ChatEvent::Finished { request, full } => {
                if self.active_request == Some(request) {
                    self.active_request = None;
                    if let Some(entry) = self.streaming_entry() {
                        if entry.text.is_empty() {
                            entry.text = full;
                        }
                        entry.streaming = false;
                        if entry.text.trim().is_empty() {
                            entry.text = "(empty reply)".to_string();
                            entry.failed = true;
                        }
                    }
                }
                None
            },
            ChatEvent::Failed {
                request,
                message,
                connectivity,
            } => {
                if self.active_request == Some(request) {
                    self.active_request = None;
                    if let Some(entry) = self.streaming_entry() {
                        entry.text = format!("Error: {message}");
                        entry.streaming = false;
                        entry.failed = true;
                    }
                }
                if connectivity {
                    self.status = ConnectionStatus::Disconnected(message);
                }
                None
            },
        }
    }

    fn pick_model(&mut self) -> Option<Action> {
        let installed = |name: &str| self.models.iter().any(|m| m.name == name);
        let preferred = self.preferred_model.clone();
        let missing = preferred.as_deref().filter(|name| !installed(name));
        if !self.selected_model.as_deref().is_some_and(|name| installed(name)) {
            self.selected_model = preferred
                .as_deref()
                .filter(|name| installed(name))
                .map(str::to_string)
                .or_else(|| self.models.first().map(|m| m.name.clone()));
            self.vision = None;
        }
        if let Some(name) = missing {
            self.notify(NoticeLevel::Warning, format!("Model {name} is not installed"));
        }
        match &self.selected_model {
            Some(name) if self.vision.is_none() => Some(Action::Probe(name.clone())),
            Some(_) => None,
            None => {
                self.notify(NoticeLevel::Error, "No models installed. Try `ollama pull llama3.2`");
                None
            },
        }
    }

    fn streaming_entry(&mut self) -> Option<&mut ChatEntry> {
        self.entries
            .iter_mut()
            .rev()
            .find(|e| e.role == Role::Assistant && e.streaming)
    }

    fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notice = Some(Notice {
            level,
            text: text.into(),
        });
    }
}
