use crate::catalog::Label;

/// Direction of a swipe or arrow key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// The classification a player makes by moving in this direction.
    pub fn judgment(self) -> Label {
        match self {
            Direction::Right => Label::Real,
            Direction::Left => Label::Deepfake,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// Result of judging one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub outcome: Outcome,
    pub judgment: Label,
    pub truth: Label,
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        self.outcome == Outcome::Correct
    }
}

pub fn judge(direction: Direction, truth: Label) -> Verdict {
    let judgment = direction.judgment();
    let outcome = if judgment == truth {
        Outcome::Correct
    } else {
        Outcome::Incorrect
    };

    Verdict {
        outcome,
        judgment,
        truth,
    }
}
