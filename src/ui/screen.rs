use ratatui::{buffer::Buffer, layout::Rect};

use crate::{
    app::App,
    session::Phase,
    ui::{render_quiz, render_results, render_start},
};

/// A UI screen boundary: one per session phase
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Title, rules and the key to begin
pub struct StartScreen;

impl Screen for StartScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_start(app, area, buf);
    }
}

/// The current card, countdown, score and feedback overlay
pub struct QuizScreen;

impl Screen for QuizScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_quiz(app, area, buf);
    }
}

/// Final score with the new game and retry keys
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_results(app, area, buf);
    }
}

/// Helper to construct the appropriate screen for the current phase
pub fn current_screen(phase: Phase) -> Box<dyn Screen> {
    match phase {
        Phase::NotStarted => Box::new(StartScreen),
        Phase::Running => Box::new(QuizScreen),
        Phase::Finished => Box::new(ResultsScreen),
    }
}
