use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::catalog::{Catalog, Item};
use crate::deferred::Deferred;
use crate::verdict::{judge, Direction, Verdict};

pub const DEFAULT_TOTAL_SECS: u32 = 60;
pub const DEFAULT_QUEUE_LIMIT: usize = 100;
pub const DEFAULT_FEEDBACK_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub total_secs: u32,
    pub queue_limit: usize,
    pub feedback_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            total_secs: DEFAULT_TOTAL_SECS,
            queue_limit: DEFAULT_QUEUE_LIMIT,
            feedback_delay: Duration::from_millis(DEFAULT_FEEDBACK_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    NotStarted,
    Running,
    Finished,
}

/// Transient answer feedback, tagged with the deferred clear that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Feedback {
    verdict: Verdict,
    generation: u64,
}

/// Where `start()` takes its queue from
#[derive(Debug)]
enum QueueSource {
    Draw { catalog: Arc<Catalog>, rng: StdRng },
    Fixed(Vec<Item>),
}

/// Read-only view handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub current: Option<Item>,
    pub cursor: usize,
    pub total: usize,
    pub score: usize,
    pub remaining_secs: u32,
    pub feedback: Option<Verdict>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOutcome {
    pub score: usize,
    pub answered: usize,
    pub total: usize,
    pub accuracy: f64,
    pub timed_out: bool,
}

/// One play-through: NotStarted -> Running -> Finished
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    source: QueueSource,
    queue: Vec<Item>,
    cursor: usize,
    score: usize,
    remaining_secs: u32,
    phase: Phase,
    feedback: Option<Feedback>,
    feedback_clear: Deferred,
    timed_out: bool,
}

impl Session {
    pub fn new(catalog: Arc<Catalog>, config: SessionConfig) -> Self {
        Self::with_rng(catalog, config, StdRng::from_entropy())
    }

    pub fn with_rng(catalog: Arc<Catalog>, config: SessionConfig, rng: StdRng) -> Self {
        Self::from_source(QueueSource::Draw { catalog, rng }, config)
    }

    /// A session that plays `items` in the given order (still capped by
    /// `queue_limit`) instead of drawing a random permutation.
    pub fn in_order(items: Vec<Item>, config: SessionConfig) -> Self {
        Self::from_source(QueueSource::Fixed(items), config)
    }

    fn from_source(source: QueueSource, config: SessionConfig) -> Self {
        Self {
            remaining_secs: config.total_secs,
            config,
            source,
            queue: Vec::new(),
            cursor: 0,
            score: 0,
            phase: Phase::NotStarted,
            feedback: None,
            feedback_clear: Deferred::new(),
            timed_out: false,
        }
    }

    pub fn start(&mut self) {
        if self.phase != Phase::NotStarted {
            return;
        }

        let limit = self.config.queue_limit;
        self.queue = match &mut self.source {
            QueueSource::Draw { catalog, rng } => catalog.draw(limit, rng),
            QueueSource::Fixed(items) => items
                .iter()
                .take(limit)
                .cloned()
                .enumerate()
                .map(|(id, item)| Item { id, ..item })
                .collect(),
        };
        self.cursor = 0;
        self.score = 0;
        self.remaining_secs = self.config.total_secs;
        self.feedback = None;
        self.feedback_clear.cancel();
        self.timed_out = false;
        self.phase = Phase::Running;

        tracing::info!(
            items = self.queue.len(),
            secs = self.remaining_secs,
            "session started"
        );

        self.check_finished();
    }

    /// One elapsed second of the countdown.
    pub fn tick(&mut self) {
        if self.phase != Phase::Running {
            return;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.check_finished();
    }

    pub fn answer(&mut self, direction: Direction) -> Option<Verdict> {
        self.answer_at(direction, Instant::now())
    }

    /// Judge the current item. Out-of-phase or exhausted calls are ignored.
    pub fn answer_at(&mut self, direction: Direction, now: Instant) -> Option<Verdict> {
        if self.phase != Phase::Running {
            return None;
        }
        let item = self.queue.get(self.cursor)?;

        let verdict = judge(direction, item.label);
        tracing::debug!(
            id = item.id,
            %direction,
            truth = %verdict.truth,
            correct = verdict.is_correct(),
            "answer"
        );

        if verdict.is_correct() {
            self.score += 1;
        }
        self.cursor += 1;

        let generation = self.feedback_clear.schedule(now, self.config.feedback_delay);
        self.feedback = Some(Feedback {
            verdict,
            generation,
        });

        self.check_finished();
        Some(verdict)
    }

    /// Run the pending feedback clear if its delay has elapsed.
    pub fn expire_feedback(&mut self, now: Instant) {
        if let Some(generation) = self.feedback_clear.fire_if_due(now) {
            if self.feedback.map(|f| f.generation) == Some(generation) {
                self.feedback = None;
            }
        }
    }

    fn check_finished(&mut self) {
        if self.phase != Phase::Running {
            return;
        }

        let timed_out = self.remaining_secs == 0;
        if timed_out || self.cursor >= self.queue.len() {
            self.phase = Phase::Finished;
            self.timed_out = timed_out;
            self.feedback = None;
            self.feedback_clear.cancel();

            tracing::info!(
                score = self.score,
                total = self.queue.len(),
                timed_out,
                "session finished"
            );
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn has_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn queue(&self) -> &[Item] {
        &self.queue
    }

    pub fn current_item(&self) -> Option<&Item> {
        match self.phase {
            Phase::Running => self.queue.get(self.cursor),
            _ => None,
        }
    }

    pub fn feedback(&self) -> Option<Verdict> {
        self.feedback.map(|f| f.verdict)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            current: self.current_item().cloned(),
            cursor: self.cursor,
            total: self.queue.len(),
            score: self.score,
            remaining_secs: self.remaining_secs,
            feedback: self.feedback(),
        }
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        if self.phase != Phase::Finished {
            return None;
        }

        let accuracy = if self.cursor == 0 {
            0.0
        } else {
            ((self.score as f64 / self.cursor as f64) * 100.0).round()
        };

        Some(SessionOutcome {
            score: self.score,
            answered: self.cursor,
            total: self.queue.len(),
            accuracy,
            timed_out: self.timed_out,
        })
    }
}
