// Read-only views over a game, recomputed from the state on every call.

use super::GameState;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowLabel {
    Round(u32),
    Total,
}

// One table line. `cells` follows roster order; `None` is a blank cell, only
// found in the row of the round in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreRow {
    pub label: RowLabel,
    pub cells: Vec<Option<i64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreTable {
    pub players: Vec<String>,
    pub rows: Vec<ScoreRow>,
}

impl ScoreTable {
    pub fn totals(&self) -> Option<&ScoreRow> {
        self.rows.last().filter(|row| row.label == RowLabel::Total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub round_number: u32,
    pub player_idx: usize,
    pub player: String,
    pub cumulative: i64,
}

// Every round with its per-player cells, finished rounds first and the open
// round last
fn round_cells(state: &GameState) -> impl Iterator<Item = (u32, Vec<Option<i64>>)> + '_ {
    let completed = state
        .completed_rounds()
        .iter()
        .map(|round| (round.round_number, round.scores.iter().copied().map(Some).collect::<Vec<_>>()));
    let current = state.in_progress();

    completed.chain(std::iter::once((current.round_number, current.partial_scores.clone())))
}

/// Full score table: one row per finished round, a row for the round in
/// progress with blanks for players still to play, and a totals row where
/// blanks count as zero. Sums saturate at the `i64` bounds.
pub fn score_table(state: &GameState) -> ScoreTable {
    let n_players = state.roster().len();
    let mut totals = vec![0i64; n_players];
    let mut rows = Vec::with_capacity(state.completed_rounds().len() + 2);

    for (round_number, cells) in round_cells(state) {
        for (total, cell) in totals.iter_mut().zip(&cells) {
            *total = total.saturating_add(cell.unwrap_or(0));
        }
        rows.push(ScoreRow { label: RowLabel::Round(round_number), cells });
    }

    rows.push(ScoreRow {
        label: RowLabel::Total,
        cells: totals.into_iter().map(Some).collect(),
    });

    ScoreTable {
        players: state.roster().names().to_vec(),
        rows,
    }
}

/// Running total per player, ordered by player then round. A round only gets
/// a point for a player who has actually played it.
pub fn chart_series(state: &GameState) -> Vec<ChartPoint> {
    let rounds: Vec<(u32, Vec<Option<i64>>)> = round_cells(state).collect();
    let mut series = Vec::new();

    for (player_idx, player) in state.roster().iter().enumerate() {
        let mut cumulative: i64 = 0;
        for (round_number, cells) in &rounds {
            if let Some(points) = cells[player_idx] {
                cumulative = cumulative.saturating_add(points);
                series.push(ChartPoint {
                    round_number: *round_number,
                    player_idx,
                    player: player.to_string(),
                    cumulative,
                });
            }
        }
    }

    series
}
