//! Application state and logic.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::chat::client::{DeltaSink, OllamaClient};
use crate::chat::{vision, Action, ChatEvent, ChatState, Outgoing};
use crate::config::Config;
use crate::content::model::Content;
use crate::content::search::SearchState;
use crate::content::BrowserState;
use crate::error::Result;
use crate::util;
use crate::visualizer::VisualizerState;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Application theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Gruvbox dark theme.
    GruvboxDark,
    /// Gruvbox light theme.
    GruvboxLight,
}

impl Theme {
    /// Get the next theme in the cycle.
    pub fn next(self) -> Self {
        match self {
            Theme::GruvboxDark => Theme::GruvboxLight,
            Theme::GruvboxLight => Theme::GruvboxDark,
        }
    }

    /// Get the theme name.
    pub fn name(self) -> &'static str {
        match self {
            Theme::GruvboxDark => "Gruvbox Dark",
            Theme::GruvboxLight => "Gruvbox Light",
        }
    }
}

/// The panel receiving key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    /// Content tree and details.
    #[default]
    Browser,
    /// Lesson canvas.
    Visualizer,
    /// Tutor chat.
    Chat,
}

impl Panel {
    /// Next panel in focus order.
    pub fn next(self) -> Self {
        match self {
            Panel::Browser => Panel::Visualizer,
            Panel::Visualizer => Panel::Chat,
            Panel::Chat => Panel::Browser,
        }
    }

    /// Previous panel in focus order.
    pub fn prev(self) -> Self {
        match self {
            Panel::Browser => Panel::Chat,
            Panel::Visualizer => Panel::Browser,
            Panel::Chat => Panel::Visualizer,
        }
    }

    /// Panel name.
    pub fn name(self) -> &'static str {
        match self {
            Panel::Browser => "Browser",
            Panel::Visualizer => "Visualizer",
            Panel::Chat => "Chat",
        }
    }
}

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Focused panel.
    pub focus: Panel,
    /// Current theme.
    pub theme: Theme,
    /// Status message.
    pub status: String,
    /// Content browser state.
    pub browser: BrowserState,
    /// Content search state.
    pub search: SearchState,
    /// Visualizer state.
    pub visualizer: VisualizerState,
    /// Chat panel state.
    pub chat: ChatState,
    client: OllamaClient,
    runtime: Handle,
    events_tx: Sender<ChatEvent>,
    events_rx: Receiver<ChatEvent>,
    request_task: Option<(u64, JoinHandle<()>)>,
    background: Vec<JoinHandle<()>>,
}

impl App {
    /// Create a new application instance.
    pub fn new(config: Config, content: Content, runtime: Handle) -> Result<Self> {
        let client = OllamaClient::new(config.chat.clone())?;
        let (events_tx, events_rx) = mpsc::channel();
        let theme = if config.light_theme {
            Theme::GruvboxLight
        } else {
            Theme::GruvboxDark
        };

        Ok(Self {
            focus: Panel::default(),
            theme,
            status: "Ready".to_string(),
            browser: BrowserState::new(content),
            search: SearchState::new(),
            visualizer: VisualizerState::new(config.visualizer.clone()),
            chat: ChatState::new(&config.chat),
            client,
            runtime,
            events_tx,
            events_rx,
            request_task: None,
            background: Vec::new(),
        })
    }

    /// Probe the server and list models in the background.
    pub fn refresh_connection(&mut self) {
        let action = self.chat.begin_refresh();
        self.run_action(action);
    }

    /// Start the background work a chat action asks for.
    pub fn run_action(&mut self, action: Action) {
        match action {
            Action::Refresh => self.spawn_refresh(),
            Action::Probe(model) => self.spawn_probe(model),
            Action::Send(outgoing) => self.spawn_send(outgoing),
        }
    }

    fn spawn_refresh(&mut self) {
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        self.status = format!("Connecting to {}...", client.config().base_url);
        let handle = self.runtime.spawn(async move {
            let result = if client.check_connection().await {
                client.list_models().await.map_err(|e| e.to_string())
            } else {
                Err(format!(
                    "Ollama is not running at {}. Please start Ollama and try again",
                    client.config().base_url
                ))
            };
            let _ = tx.send(ChatEvent::Connection(result));
        });
        self.track(handle);
    }

    fn spawn_probe(&mut self, model: String) {
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        let handle = self.runtime.spawn(async move {
            match client.show_model(&model).await {
                Ok(card) => {
                    let supported = vision::card_supports_vision(&card);
                    tracing::debug!("{} vision support: {}", model, supported);
                    let _ = tx.send(ChatEvent::Vision { model, supported });
                },
                Err(e) => tracing::debug!("Model probe for {} failed: {}", model, e),
            }
        });
        self.track(handle);
    }

    fn spawn_send(&mut self, outgoing: Outgoing) {
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        let Outgoing {
            request,
            model,
            messages,
        } = outgoing;

        let handle = self.runtime.spawn(async move {
            let delta_tx = tx.clone();
            let mut forward = move |text: &str| {
                let _ = delta_tx.send(ChatEvent::Delta {
                    request,
                    text: text.to_string(),
                });
            };
            let sink: DeltaSink<'_> = &mut forward;
            let event = match client.send_chat(&model, &messages, Some(sink)).await {
                Ok(full) => ChatEvent::Finished { request, full },
                Err(e) => {
                    tracing::error!("Chat request {} failed: {}", request, e);
                    ChatEvent::Failed {
                        request,
                        message: e.to_string(),
                        connectivity: e.is_connectivity(),
                    }
                },
            };
            let _ = tx.send(event);
        });
        self.request_task = Some((request, handle));
        self.status = "Waiting for reply...".to_string();
    }

    fn track(&mut self, handle: JoinHandle<()>) {
        self.background.retain(|h| !h.is_finished());
        self.background.push(handle);
    }

    /// Apply every pending background result. Returns `true` if anything arrived.
    pub fn drain_events(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.events_rx.try_recv() {
            changed = true;
            if let ChatEvent::Connection(result) = &event {
                self.status = match result {
                    Ok(models) => format!("Connected to Ollama, {} models", models.len()),
                    Err(_) => "Ollama disconnected".to_string(),
                };
            }
            if let Some(action) = self.chat.apply_event(event) {
                self.run_action(action);
            }
        }
        if changed && !self.chat.is_busy() {
            if let Some((request, _)) = self.request_task.take() {
                tracing::debug!("Request {} settled", request);
                if self.status.starts_with("Waiting") {
                    self.status = "Ready".to_string();
                }
            }
        }
        changed
    }

    /// Submit the chat input line.
    pub fn submit_chat(&mut self) {
        if let Some(action) = self.chat.submit() {
            self.run_action(action);
        }
    }

    /// Cancel the streaming reply, if any.
    pub fn cancel_chat(&mut self) {
        if let Some(request) = self.chat.cancel() {
            if let Some((_, handle)) = self.request_task.take() {
                handle.abort();
            }
            tracing::info!("Cancelled request {}", request);
            self.status = "Reply cancelled".to_string();
        }
    }

    /// Abort all background work.
    pub fn shutdown(&mut self) {
        if let Some((_, handle)) = self.request_task.take() {
            handle.abort();
        }
        for handle in self.background.drain(..) {
            handle.abort();
        }
    }

    /// Whether the next frame should come quickly.
    pub fn is_animating(&self) -> bool {
        self.visualizer.clock.is_running() || self.chat.is_busy()
    }

    /// Focus a panel.
    pub fn focus_panel(&mut self, panel: Panel) {
        self.focus = panel;
        self.status = format!("Focus: {}", panel.name());
    }

    /// Cycle to the next theme.
    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        self.status = format!("Theme: {}", self.theme.name());
    }

    /// Toggle the details pane.
    pub fn toggle_preview(&mut self) {
        self.browser.toggle_preview();
        self.status = if self.browser.show_preview {
            "Preview: ON".to_string()
        } else {
            "Preview: OFF".to_string()
        };
    }

    /// Run the submitted search and jump to the first match.
    pub fn run_search(&mut self) {
        self.search.submit();
        self.search.perform_search(self.browser.content());
        self.jump_to_match();
    }

    /// Move the cursor to the current search match.
    pub fn jump_to_match(&mut self) {
        match self.search.current_match() {
            Some(id) => self.browser.reveal(id),
            None if !self.search.query().is_empty() => {
                self.status = format!("No matches for '{}'", self.search.query());
            },
            None => {},
        }
    }

    /// Copy the topic under the cursor.
    pub fn copy_current(&mut self) {
        self.status = match self.browser.current_topic() {
            Some(topic) => match util::copy_topic(topic) {
                Ok(()) => format!("Copied {}!", topic.title),
                Err(e) => format!("Copy failed: {}", e),
            },
            None => "No topic selected".to_string(),
        };
    }

    /// Copy the content outline.
    pub fn copy_outline(&mut self) {
        self.status = match util::copy_outline(self.browser.content()) {
            Ok(()) => "Outline copied!".to_string(),
            Err(e) => format!("Copy failed: {}", e),
        };
    }

    /// Prefill the chat with a question about the topic under the cursor.
    pub fn ask_about_current(&mut self) {
        let Some(topic) = self.browser.current_topic() else {
            self.status = "No topic selected".to_string();
            return;
        };
        self.chat.input = format!("Can you explain {} with an example?", topic.title);
        self.focus_panel(Panel::Chat);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> (tokio::runtime::Runtime, App) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let app = App::new(
            Config::default(),
            Content::builtin().unwrap(),
            runtime.handle().clone(),
        )
        .unwrap();
        (runtime, app)
    }

    #[test]
    fn panels_cycle_both_ways() {
        assert_eq!(Panel::Browser.next().next().next(), Panel::Browser);
        assert_eq!(Panel::Browser.prev(), Panel::Chat);
    }

    #[test]
    fn search_reveals_match() {
        let (_rt, mut app) = app();
        app.search.start();
        for c in "squeeze".chars() {
            app.search.input(c);
        }
        app.run_search();
        assert!(app.search.match_count() > 0);
        assert_eq!(app.browser.current(), app.search.current_match());
    }

    #[test]
    fn ask_prefills_chat() {
        let (_rt, mut app) = app();
        app.browser.cursor_down();
        app.ask_about_current();
        assert_eq!(app.focus, Panel::Chat);
        assert!(app.chat.input.contains("The Limit of a Function"));
    }

    #[test]
    fn events_are_applied_from_channel() {
        let (_rt, mut app) = app();
        app.events_tx
            .send(ChatEvent::Connection(Err("down".into())))
            .unwrap();
        assert!(app.drain_events());
        assert!(!app.chat.is_connected());
        assert_eq!(app.status, "Ollama disconnected");
        assert!(!app.drain_events());
    }
}
