use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::Catalog;
use crate::input::{DragSurface, InputSurface, KeyboardSurface, DEFAULT_SWIPE_THRESHOLD};
use crate::runtime::{Metronome, QuizEvent};
use crate::session::{Phase, Session, SessionConfig};

/// What the outer loop should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub session: SessionConfig,
    pub seed: Option<u64>,
    pub swipe_threshold: u16,
    pub in_order: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            seed: None,
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            in_order: false,
        }
    }
}

/// The game screen: one live session plus everything needed to replace it
pub struct App {
    pub session: Session,
    catalog: Arc<Catalog>,
    settings: AppSettings,
    rng: StdRng,
    surfaces: Vec<Box<dyn InputSurface>>,
    metronome: Metronome,
}

impl App {
    pub fn new(catalog: Arc<Catalog>, settings: AppSettings) -> Self {
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let session = build_session(&catalog, &settings, &mut rng);
        let surfaces: Vec<Box<dyn InputSurface>> = vec![
            Box::new(KeyboardSurface),
            Box::new(DragSurface::new(settings.swipe_threshold)),
        ];

        Self {
            session,
            catalog,
            settings,
            rng,
            surfaces,
            metronome: Metronome::default(),
        }
    }

    /// Replace the built-in keyboard and mouse surfaces.
    pub fn with_surfaces(mut self, surfaces: Vec<Box<dyn InputSurface>>) -> Self {
        self.surfaces = surfaces;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn handle_event(&mut self, event: &QuizEvent, now: Instant) -> Control {
        // Wall-clock time is settled before any input, so a busy input stream
        // cannot hold the countdown back.
        self.catch_up(now);

        match event {
            QuizEvent::Tick | QuizEvent::Resize => Control::Continue,
            QuizEvent::Closed => {
                tracing::warn!("event source closed");
                Control::Quit
            }
            QuizEvent::Key(key) if key.kind != KeyEventKind::Release => {
                let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c');
                if key.code == KeyCode::Esc || ctrl_c {
                    tracing::info!("quit requested");
                    return Control::Quit;
                }

                match (self.session.phase(), key.code) {
                    (Phase::NotStarted, KeyCode::Enter | KeyCode::Char(' ')) => self.start(now),
                    (Phase::Running, _) => self.dispatch_input(event, now),
                    (Phase::Finished, KeyCode::Char('n') | KeyCode::Enter) => {
                        self.new_session(now)
                    }
                    (Phase::Finished, KeyCode::Char('r')) => self.retry(now),
                    _ => {}
                }
                Control::Continue
            }
            QuizEvent::Mouse(_) => {
                if self.session.is_running() {
                    self.dispatch_input(event, now);
                }
                Control::Continue
            }
            QuizEvent::Key(_) => Control::Continue,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.session.start();
        self.sync_metronome(now);
    }

    /// A fresh draw from the catalog, started immediately.
    pub fn new_session(&mut self, now: Instant) {
        self.metronome.stop();
        self.session = build_session(&self.catalog, &self.settings, &mut self.rng);
        self.start(now);
    }

    /// Play the same queue again in the same order.
    pub fn retry(&mut self, now: Instant) {
        self.metronome.stop();
        let queue = self.session.queue().to_vec();
        self.session = Session::in_order(queue, self.settings.session.clone());
        self.start(now);
    }

    fn catch_up(&mut self, now: Instant) {
        self.session.expire_feedback(now);
        if !self.session.is_running() {
            return;
        }

        for _ in 0..self.metronome.due_beats(now) {
            self.session.tick();
        }
        self.sync_metronome(now);
    }

    fn dispatch_input(&mut self, event: &QuizEvent, now: Instant) {
        let direction = self
            .surfaces
            .iter_mut()
            .find_map(|surface| surface.on_event(event));

        if let Some(direction) = direction {
            self.session.answer_at(direction, now);
            self.sync_metronome(now);
        }
    }

    /// The countdown only beats while the session is running.
    fn sync_metronome(&mut self, now: Instant) {
        match (self.session.is_running(), self.metronome.is_running()) {
            (true, false) => self.metronome.start(now),
            (false, true) => self.metronome.stop(),
            _ => {}
        }
    }
}

fn build_session(catalog: &Arc<Catalog>, settings: &AppSettings, rng: &mut StdRng) -> Session {
    if settings.in_order {
        Session::in_order(catalog.items().to_vec(), settings.session.clone())
    } else {
        let seed: u64 = rng.gen();
        Session::with_rng(
            Arc::clone(catalog),
            settings.session.clone(),
            StdRng::seed_from_u64(seed),
        )
    }
}
