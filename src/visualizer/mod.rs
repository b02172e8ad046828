//! Visualizer feature - interactive calculus lessons on a braille canvas.
//!
//! This module holds the visualizer state (lesson, selected function, view
//! window and animation clock). Rendering is split into a pure scene builder
//! and a thin ratatui layer.

pub mod clock;
pub mod functions;
pub mod lesson;
pub mod scene;
pub mod ui;
pub mod view;

use crate::config::VisualizerConfig;
use clock::AnimationClock;
use functions::{FunctionEntry, CATALOG};
use lesson::{Lesson, LessonKind, Param};
use scene::Scene;
use view::{ViewWindow, Viewport};

/// State for the visualizer panel.
#[derive(Debug, Clone)]
pub struct VisualizerState {
    /// Current lesson and its parameters.
    pub lesson: Lesson,
    /// Index into the function catalog.
    function_index: usize,
    /// Pan/zoom window.
    pub view: ViewWindow,
    /// Animation clock.
    pub clock: AnimationClock,
    /// Index of the parameter that `[`/`]` adjust.
    selected_param: usize,
    config: VisualizerConfig,
}

impl Default for VisualizerState {
    fn default() -> Self {
        Self::new(VisualizerConfig::default())
    }
}

impl VisualizerState {
    /// Create a new visualizer state.
    pub fn new(config: VisualizerConfig) -> Self {
        Self {
            lesson: Lesson::default(),
            function_index: 0,
            view: ViewWindow::default(),
            clock: AnimationClock::new(),
            selected_param: 0,
            config,
        }
    }

    /// Settings the visualizer was built with.
    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    /// The selected function.
    pub fn function(&self) -> &'static FunctionEntry {
        &CATALOG[self.function_index % CATALOG.len()]
    }

    /// Current lesson tag.
    pub fn kind(&self) -> LessonKind {
        self.lesson.kind()
    }

    /// Move to the next lesson, keeping shared parameters.
    pub fn cycle_lesson(&mut self) {
        self.lesson = self.lesson.switch_to(self.kind().next());
        self.selected_param = 0;
        tracing::debug!("Lesson: {}", self.kind().name());
    }

    /// Jump to a lesson, keeping shared parameters.
    pub fn select_lesson(&mut self, kind: LessonKind) {
        if kind != self.kind() {
            self.lesson = self.lesson.switch_to(kind);
            self.selected_param = 0;
        }
    }

    /// Select the next function from the catalog.
    pub fn cycle_function(&mut self) {
        self.function_index = (self.function_index + 1) % CATALOG.len();
        tracing::debug!("Function: {}", self.function().name);
    }

    /// Select a catalog function by name. Returns `false` if unknown.
    pub fn select_function(&mut self, name: &str) -> bool {
        let Some(entry) = functions::by_name(name) else {
            return false;
        };
        if let Some(index) = CATALOG.iter().position(|e| e.name == entry.name) {
            self.function_index = index;
        }
        tracing::debug!("Function: {}", entry.name);
        true
    }

    /// The parameter the adjust keys act on.
    pub fn selected_param(&self) -> Param {
        let params = self.lesson.params();
        params[self.selected_param % params.len()]
    }

    /// Cycle the adjusted parameter.
    pub fn next_param(&mut self) {
        let count = self.lesson.params().len();
        self.selected_param = (self.selected_param + 1) % count;
    }

    /// Nudge the selected parameter by whole slider steps.
    pub fn adjust_param(&mut self, steps: f64) {
        let param = self.selected_param();
        self.lesson.nudge(param, steps);
    }

    /// Pan by one step in the given direction (-1, 0 or 1 per axis).
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let step = self.config.pan_step;
        self.view.pan_by(dx * step, dy * step);
    }

    /// Zoom in one step.
    pub fn zoom_in(&mut self) {
        self.view.zoom_by(self.config.zoom_step);
    }

    /// Zoom out one step.
    pub fn zoom_out(&mut self) {
        self.view.zoom_by(1.0 / self.config.zoom_step);
    }

    /// Recenter at zoom 1.
    pub fn reset_view(&mut self) {
        self.view.reset();
    }

    /// Start or stop the animation. Parameters stay where they are.
    pub fn toggle_animation(&mut self) {
        self.clock.toggle();
    }

    /// Stop the clock, zero it and restore the lesson defaults.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.lesson = Lesson::defaults(self.kind());
    }

    /// Advance one display frame. Returns `true` if anything changed.
    pub fn on_frame(&mut self) -> bool {
        if self.clock.tick() {
            self.lesson.advance();
            true
        } else {
            false
        }
    }

    /// Render the current lesson at the given pixel size.
    pub fn scene(&self, width: f64, height: f64) -> Scene {
        let viewport = Viewport::new(&self.view, width, height);
        Scene::render(&self.lesson, self.function(), &viewport)
    }
}
