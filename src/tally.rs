use anyhow::Result;
use thiserror::Error;

pub mod aggregate;
pub mod roster;
pub mod state;

pub use aggregate::{chart_series, score_table, ChartPoint, RowLabel, ScoreTable};
pub use roster::Roster;
pub use state::{GameState, Undo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TallyError {
    #[error("at least two players are needed to start a game")]
    NeedAtLeastTwoPlayers,
}

// Check the structural invariants of a value. Failing this means a bug in the
// state machine, not bad input.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}
