//! Calcterm - a terminal calculus reference with visual lessons and a local AI tutor.

use anyhow::Result;
use calcterm::app::{App, Panel};
use calcterm::config::{ChatConfig, Config, VisualizerConfig, DEFAULT_OLLAMA_URL};
use calcterm::content::model::Content;
use calcterm::visualizer::functions::{self, CATALOG};
use calcterm::visualizer::lesson::LessonKind;
use calcterm::{ui, util};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Frames replayed at most after a stall.
const MAX_CATCH_UP_FRAMES: u32 = 4;

#[derive(Parser, Debug)]
#[command(name = "calcterm", version)]
#[command(about = "A terminal calculus reference with visual lessons and a local AI tutor", long_about = None)]
struct Args {
    /// Base URL of the Ollama server
    #[arg(long, default_value = DEFAULT_OLLAMA_URL)]
    ollama_url: String,

    /// Model to select when the server lists it
    #[arg(long)]
    model: Option<String>,

    /// Number of prior turns sent with each message
    #[arg(long, default_value_t = 10)]
    history: usize,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.7)]
    temperature: f64,

    /// Largest image attachment in megabytes
    #[arg(long, default_value_t = 10)]
    max_image_mb: u64,

    /// Function shown when the visualizer opens (e.g. sine, quadratic)
    #[arg(long)]
    function: Option<String>,

    /// Start with the light theme
    #[arg(long)]
    light: bool,

    /// Enable logging to specified file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Print the content outline and exit
    #[arg(long)]
    outline: bool,
}

impl Args {
    fn config(&self) -> Config {
        let mut chat = ChatConfig::default().with_base_url(&self.ollama_url);
        chat.preferred_model = self.model.clone();
        chat.history_window = self.history;
        chat.options.temperature = self.temperature;
        chat.max_image_bytes = self.max_image_mb.saturating_mul(1024 * 1024);

        Config {
            chat,
            visualizer: VisualizerConfig::default(),
            light_theme: self.light,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging if --log option is provided
    if let Some(log_path) = &args.log {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_path)?;
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("calcterm=debug"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        tracing::info!("Starting Calcterm");
    }

    if let Some(name) = &args.function {
        if functions::by_name(name).is_none() {
            let names: Vec<&str> = CATALOG.iter().map(|entry| entry.name).collect();
            anyhow::bail!("Unknown function '{}'. Available: {}", name, names.join(", "));
        }
    }

    let content = Content::builtin()?;

    if args.outline {
        print!("{}", util::format_outline(&content));
        return Ok(());
    }

    let config = args.config();
    tracing::info!("Ollama endpoint: {}", config.chat.base_url);

    let runtime = tokio::runtime::Runtime::new()?;
    let mut app = App::new(config, content, runtime.handle().clone())?;
    if let Some(name) = &args.function {
        app.visualizer.select_function(name);
    }
    app.refresh_connection();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.shutdown();
    drop(app);
    runtime.shutdown_background();

    if let Err(err) = res {
        eprintln!("Error: {}", err);
    }

    tracing::info!("Calcterm exited");

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut pending_g = false; // For 'gg' vim binding
    let frame_interval = app.visualizer.config().frame_interval;
    let idle_poll = app.visualizer.config().idle_poll;
    let mut last_frame = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let timeout = if app.is_animating() {
            frame_interval
        } else {
            idle_poll
        };

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(app, key, &mut pending_g) {
                    return Ok(());
                }
            }
        }

        let elapsed = last_frame.elapsed();
        if elapsed >= frame_interval {
            let frames = (elapsed.as_secs_f64() / frame_interval.as_secs_f64()) as u32;
            for _ in 0..frames.min(MAX_CATCH_UP_FRAMES) {
                app.visualizer.on_frame();
            }
            last_frame = Instant::now();
        }

        app.drain_events();
    }
}

/// Dispatch one key press. Returns `true` to quit.
fn handle_key(app: &mut App, key: KeyEvent, pending_g: &mut bool) -> bool {
    // Search mode - handle separately
    if app.search.is_active() {
        match key.code {
            KeyCode::Enter => app.run_search(),
            KeyCode::Esc => app.search.cancel(),
            KeyCode::Backspace => app.search.backspace(),
            KeyCode::Char(c) => app.search.input(c),
            _ => {},
        }
        return false;
    }

    // Global keys
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => return true,
        (_, KeyCode::Tab) => {
            app.focus_panel(app.focus.next());
            return false;
        },
        (_, KeyCode::BackTab) => {
            app.focus_panel(app.focus.prev());
            return false;
        },
        (_, KeyCode::F(1)) => {
            app.focus_panel(Panel::Browser);
            return false;
        },
        (_, KeyCode::F(2)) => {
            app.focus_panel(Panel::Visualizer);
            return false;
        },
        (_, KeyCode::F(3)) => {
            app.focus_panel(Panel::Chat);
            return false;
        },
        _ => {},
    }

    match app.focus {
        Panel::Browser => handle_browser_key(app, key, pending_g),
        Panel::Visualizer => handle_visualizer_key(app, key),
        Panel::Chat => {
            handle_chat_key(app, key);
            false
        },
    }
}

fn handle_browser_key(app: &mut App, key: KeyEvent, pending_g: &mut bool) -> bool {
    match (key.modifiers, key.code) {
        // Quit
        (KeyModifiers::NONE, KeyCode::Char('q')) => return true,

        // Navigation
        (KeyModifiers::NONE, KeyCode::Up) | (KeyModifiers::NONE, KeyCode::Char('k')) => {
            app.browser.cursor_up();
        },
        (KeyModifiers::NONE, KeyCode::Down) | (KeyModifiers::NONE, KeyCode::Char('j')) => {
            app.browser.cursor_down();
        },
        (KeyModifiers::NONE, KeyCode::Left) | (KeyModifiers::NONE, KeyCode::Char('h')) => {
            app.browser.collapse_current();
        },
        (KeyModifiers::NONE, KeyCode::Right) | (KeyModifiers::NONE, KeyCode::Char('l')) => {
            app.browser.expand_current();
        },
        (KeyModifiers::NONE, KeyCode::Enter) | (KeyModifiers::NONE, KeyCode::Char(' ')) => {
            app.browser.toggle_current();
        },
        (KeyModifiers::NONE, KeyCode::Char('e')) => {
            app.browser.expand_all();
            app.status = "Expanded all modules".to_string();
        },
        (KeyModifiers::SHIFT, KeyCode::Char('E')) => {
            app.browser.collapse_all();
            app.status = "Collapsed all modules".to_string();
        },

        // Vim navigation
        (KeyModifiers::NONE, KeyCode::Char('g')) => {
            if *pending_g {
                app.browser.goto_first();
                *pending_g = false;
            } else {
                *pending_g = true;
            }
            return false;
        },
        (KeyModifiers::SHIFT, KeyCode::Char('G')) => {
            app.browser.goto_last();
        },
        (KeyModifiers::CONTROL, KeyCode::Char('f')) => {
            app.browser.page(true, 15);
        },
        (KeyModifiers::CONTROL, KeyCode::Char('b')) => {
            app.browser.page(false, 15);
        },

        // Search
        (KeyModifiers::NONE, KeyCode::Char('/')) => {
            app.search.start();
        },
        (KeyModifiers::NONE, KeyCode::Char('n')) => {
            app.search.next_match();
            app.jump_to_match();
        },
        (KeyModifiers::SHIFT, KeyCode::Char('N')) => {
            app.search.prev_match();
            app.jump_to_match();
        },

        // Features
        (KeyModifiers::NONE, KeyCode::Char('t')) => {
            app.toggle_preview();
        },
        (KeyModifiers::SHIFT, KeyCode::Char('T')) => {
            app.cycle_theme();
        },
        (KeyModifiers::NONE, KeyCode::Char('a')) => {
            app.ask_about_current();
        },
        (_, KeyCode::Char('?')) => {
            app.status = "Help: Tab=panel, q=quit, j/k=nav, /=search, t=details, a=ask tutor, y=copy topic, c=copy outline, T=theme".to_string();
        },

        // Clipboard
        (KeyModifiers::NONE, KeyCode::Char('y')) => {
            app.copy_current();
        },
        (KeyModifiers::NONE, KeyCode::Char('c')) => {
            app.copy_outline();
        },

        // Details scrolling
        (KeyModifiers::CONTROL, KeyCode::Char('d')) | (KeyModifiers::SHIFT, KeyCode::Char('J')) => {
            app.browser.scroll_down();
        },
        (KeyModifiers::CONTROL, KeyCode::Char('u')) | (KeyModifiers::SHIFT, KeyCode::Char('K')) => {
            app.browser.scroll_up();
        },

        // Escape - clear search highlights
        (KeyModifiers::NONE, KeyCode::Esc) => {
            app.search.cancel();
        },

        _ => {},
    }
    *pending_g = false;
    false
}

fn handle_visualizer_key(app: &mut App, key: KeyEvent) -> bool {
    let vis = &mut app.visualizer;
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Char('q')) => return true,

        // Lessons and functions
        (KeyModifiers::NONE, KeyCode::Char('m')) => {
            vis.cycle_lesson();
            app.status = format!("Lesson: {}", vis.kind().name());
        },
        (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='5')) => {
            let index = usize::from(c as u8 - b'1');
            vis.select_lesson(LessonKind::ALL[index]);
            app.status = format!("Lesson: {}", vis.kind().name());
        },
        (KeyModifiers::NONE, KeyCode::Char('f')) => {
            vis.cycle_function();
            app.status = format!("Function: {}", vis.function().formula);
        },

        // Parameters
        (KeyModifiers::NONE, KeyCode::Char('p')) => {
            vis.next_param();
            app.status = format!("Adjusting {}", vis.selected_param().name());
        },
        (_, KeyCode::Char(']')) => vis.adjust_param(1.0),
        (_, KeyCode::Char('[')) => vis.adjust_param(-1.0),
        (_, KeyCode::Char('}')) => vis.adjust_param(10.0),
        (_, KeyCode::Char('{')) => vis.adjust_param(-10.0),

        // Animation
        (KeyModifiers::NONE, KeyCode::Char(' ')) => {
            vis.toggle_animation();
            app.status = if vis.clock.is_running() {
                "Animation running".to_string()
            } else {
                "Animation stopped".to_string()
            };
        },
        (KeyModifiers::NONE, KeyCode::Char('r')) => {
            vis.reset();
            app.status = "Lesson reset".to_string();
        },

        // Pan and zoom
        (KeyModifiers::NONE, KeyCode::Left) | (KeyModifiers::NONE, KeyCode::Char('h')) => {
            vis.pan(-1.0, 0.0);
        },
        (KeyModifiers::NONE, KeyCode::Right) | (KeyModifiers::NONE, KeyCode::Char('l')) => {
            vis.pan(1.0, 0.0);
        },
        (KeyModifiers::NONE, KeyCode::Up) | (KeyModifiers::NONE, KeyCode::Char('k')) => {
            vis.pan(0.0, 1.0);
        },
        (KeyModifiers::NONE, KeyCode::Down) | (KeyModifiers::NONE, KeyCode::Char('j')) => {
            vis.pan(0.0, -1.0);
        },
        (_, KeyCode::Char('+')) | (_, KeyCode::Char('=')) => vis.zoom_in(),
        (_, KeyCode::Char('-')) | (_, KeyCode::Char('_')) => vis.zoom_out(),
        (KeyModifiers::NONE, KeyCode::Char('0')) => {
            vis.reset_view();
            app.status = "View recentered".to_string();
        },

        (KeyModifiers::SHIFT, KeyCode::Char('T')) => {
            app.cycle_theme();
        },

        _ => {},
    }
    false
}

fn handle_chat_key(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (_, KeyCode::Enter) => app.submit_chat(),
        (_, KeyCode::Esc) => {
            if app.chat.is_busy() {
                app.cancel_chat();
            } else {
                app.chat.notice = None;
            }
        },
        (_, KeyCode::Backspace) => app.chat.backspace(),
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => app.chat.input.clear(),
        (_, KeyCode::PageUp) => app.chat.scroll_up(5),
        (_, KeyCode::PageDown) => app.chat.scroll_down(5),
        (_, KeyCode::Up) => app.chat.scroll_up(1),
        (_, KeyCode::Down) => app.chat.scroll_down(1),
        (KeyModifiers::NONE, KeyCode::Char(c)) | (KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            app.chat.input_char(c);
        },
        _ => {},
    }
}
