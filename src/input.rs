use crossterm::event::{KeyCode, KeyEventKind, MouseButton, MouseEventKind};

use crate::runtime::QuizEvent;
use crate::verdict::Direction;

/// Default horizontal drag, in terminal columns, that counts as a swipe.
pub const DEFAULT_SWIPE_THRESHOLD: u16 = 6;

/// Anything that can turn raw terminal events into left/right decisions
pub trait InputSurface {
    fn on_event(&mut self, event: &QuizEvent) -> Option<Direction>;
}

/// Arrow keys, plus vim-style h/l
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyboardSurface;

impl InputSurface for KeyboardSurface {
    fn on_event(&mut self, event: &QuizEvent) -> Option<Direction> {
        let QuizEvent::Key(key) = event else {
            return None;
        };
        if key.kind == KeyEventKind::Release {
            return None;
        }

        match key.code {
            KeyCode::Left | KeyCode::Char('h') => Some(Direction::Left),
            KeyCode::Right | KeyCode::Char('l') => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Mouse press, drag and release; emits on release once the horizontal
/// travel reaches the threshold. Mostly-vertical drags are ignored.
#[derive(Debug, Clone)]
pub struct DragSurface {
    threshold: u16,
    origin: Option<(u16, u16)>,
    column: Option<u16>,
}

impl DragSurface {
    pub fn new(threshold: u16) -> Self {
        Self {
            threshold: threshold.max(1),
            origin: None,
            column: None,
        }
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Signed horizontal travel of the drag in progress, if any.
    pub fn offset(&self) -> Option<i32> {
        match (self.origin, self.column) {
            (Some((x0, _)), Some(x)) => Some(x as i32 - x0 as i32),
            _ => None,
        }
    }
}

impl Default for DragSurface {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}

impl InputSurface for DragSurface {
    fn on_event(&mut self, event: &QuizEvent) -> Option<Direction> {
        let QuizEvent::Mouse(mouse) = event else {
            return None;
        };

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.origin = Some((mouse.column, mouse.row));
                self.column = Some(mouse.column);
                None
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.origin.is_some() {
                    self.column = Some(mouse.column);
                }
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let (x0, y0) = self.origin.take()?;
                self.column = None;

                let dx = mouse.column as i32 - x0 as i32;
                let dy = mouse.row as i32 - y0 as i32;
                if dx.abs() < self.threshold as i32 || dx.abs() <= dy.abs() {
                    return None;
                }

                Some(if dx > 0 {
                    Direction::Right
                } else {
                    Direction::Left
                })
            }
            _ => None,
        }
    }
}
