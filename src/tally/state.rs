use super::{Roster, TallyError, Validate};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

// A finalized round. Scores are indexed by roster position and there is
// exactly one per player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedRound {
    pub round_number: u32,
    pub scores: Vec<i64>,
}

// The round being played. Players submit strictly in roster order, so the
// present entries in `partial_scores` always form a prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InProgressRound {
    pub round_number: u32,
    pub current_player_index: usize,
    pub partial_scores: Vec<Option<i64>>,
}

impl InProgressRound {
    fn fresh(round_number: u32, n_players: usize) -> Self {
        Self {
            round_number,
            current_player_index: 0,
            partial_scores: vec![None; n_players],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.partial_scores.iter().all(Option::is_none)
    }

    // Index of the last player in roster order who has already submitted
    fn last_filled(&self) -> Option<usize> {
        self.partial_scores.iter().rposition(Option::is_some)
    }
}

// What a call to `GameState::undo` rolled back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Undo {
    Turn { player_idx: usize },
    Round { round_number: u32 },
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedGameState")]
pub struct GameState {
    roster: Roster,
    completed: Vec<CompletedRound>,
    in_progress: InProgressRound,
}

// Wire shape of `GameState`, only turned into one after it validates
#[derive(Deserialize)]
struct UncheckedGameState {
    roster: Roster,
    completed: Vec<CompletedRound>,
    in_progress: InProgressRound,
}

impl TryFrom<UncheckedGameState> for GameState {
    type Error = anyhow::Error;

    fn try_from(raw: UncheckedGameState) -> Result<Self> {
        let state = GameState {
            roster: raw.roster,
            completed: raw.completed,
            in_progress: raw.in_progress,
        };
        state.validate()?;
        Ok(state)
    }
}

impl GameState {
    pub fn start_game<I, S>(names: I) -> Result<Self, TallyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::with_roster(Roster::new(names)?))
    }

    pub fn with_roster(roster: Roster) -> Self {
        log::info!("Starting game with {} players: {:?}", roster.len(), roster.names());
        let in_progress = InProgressRound::fresh(1, roster.len());
        Self {
            roster,
            completed: Vec::new(),
            in_progress,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn completed_rounds(&self) -> &[CompletedRound] {
        &self.completed
    }

    pub fn in_progress(&self) -> &InProgressRound {
        &self.in_progress
    }

    pub fn round_number(&self) -> u32 {
        self.in_progress.round_number
    }

    pub fn current_player_index(&self) -> usize {
        self.in_progress.current_player_index
    }

    pub fn current_player(&self) -> &str {
        self.roster.name(self.in_progress.current_player_index)
    }

    // Record points for the active player. The last player of the round
    // closes it and play moves on to a fresh round.
    pub fn submit_turn(&mut self, points: i64) {
        let idx = self.in_progress.current_player_index;
        self.in_progress.partial_scores[idx] = Some(points);
        log::debug!(
            "Round {}: {} scored {}",
            self.in_progress.round_number,
            self.roster.name(idx),
            points
        );

        if idx == self.roster.last_index() {
            self.finalize_round();
        } else {
            self.in_progress.current_player_index += 1;
        }
    }

    fn finalize_round(&mut self) {
        let round_number = self.in_progress.round_number;
        // Absent entries cannot happen with in-order submission, zero is only
        // a fallback
        let scores: Vec<i64> = self
            .in_progress
            .partial_scores
            .iter()
            .map(|s| s.unwrap_or(0))
            .collect();

        log::info!("Round {} finished: {:?}", round_number, scores);

        self.completed.push(CompletedRound { round_number, scores });
        self.in_progress = InProgressRound::fresh(round_number + 1, self.roster.len());
    }

    // Roll back one step. An open round with entries loses its latest entry,
    // otherwise the last finished round is reopened without its final turn.
    pub fn undo(&mut self) -> Undo {
        if let Some(player_idx) = self.in_progress.last_filled() {
            self.in_progress.partial_scores[player_idx] = None;
            self.in_progress.current_player_index = player_idx;
            log::debug!("Undid turn of {}", self.roster.name(player_idx));
            return Undo::Turn { player_idx };
        }

        let Some(round) = self.completed.pop() else {
            log::debug!("Nothing to undo");
            return Undo::Nothing;
        };

        let last = self.roster.last_index();
        let mut partial_scores: Vec<Option<i64>> = round.scores.into_iter().map(Some).collect();
        partial_scores[last] = None;

        self.in_progress = InProgressRound {
            round_number: round.round_number,
            current_player_index: last,
            partial_scores,
        };
        log::debug!("Reopened round {}", round.round_number);

        Undo::Round { round_number: round.round_number }
    }
}

impl Validate for GameState {
    fn validate(&self) -> Result<()> {
        let n_players = self.roster.len();
        if n_players < 2 {
            return Err(anyhow!("Roster has {} players, need at least 2", n_players));
        }

        for (i, round) in self.completed.iter().enumerate() {
            if round.round_number as usize != i + 1 {
                return Err(anyhow!("Completed round at {} is numbered {}", i, round.round_number));
            }
            if round.scores.len() != n_players {
                return Err(anyhow!(
                    "Round {} has {} scores for {} players",
                    round.round_number,
                    round.scores.len(),
                    n_players
                ));
            }
        }

        let current = &self.in_progress;
        if current.round_number as usize != self.completed.len() + 1 {
            return Err(anyhow!(
                "Round {} in progress after {} completed rounds",
                current.round_number,
                self.completed.len()
            ));
        }
        if current.partial_scores.len() != n_players {
            return Err(anyhow!("Partial scores sized {} for {} players", current.partial_scores.len(), n_players));
        }
        if current.current_player_index >= n_players {
            return Err(anyhow!("Current player index {} out of range", current.current_player_index));
        }

        let filled = current.partial_scores.iter().take_while(|s| s.is_some()).count();
        if filled != current.current_player_index {
            return Err(anyhow!(
                "Player {} is up but {} players have submitted",
                current.current_player_index,
                filled
            ));
        }
        if current.partial_scores[filled..].iter().any(Option::is_some) {
            return Err(anyhow!("Partial scores are not a prefix of the roster"));
        }

        Ok(())
    }
}
