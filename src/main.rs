use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event};
use lang::Lang;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tally::{chart_series, score_table, ChartPoint, GameState, ScoreTable, Undo, Validate};
use tui::{GameEvent, InteractiveApp, Step};

mod lang;
mod tally;
mod tui;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep score interactively in the terminal
    Play {
        /// Comma separated player names to pre-fill the setup prompt
        #[arg(short, long)]
        players: Option<String>,
        #[arg(long, value_enum, default_value_t = Lang::Suomi)]
        lang: Lang,
        /// Write every game event as a JSON line to this file
        #[arg(short)]
        log_file: Option<PathBuf>,
    },
    /// Apply a list of moves and print the resulting state, table and series
    /// as JSON. A move is either `u`/`undo` or the points for the player up.
    Script {
        #[arg(short, long)]
        players: String,
        /// Language of the `row_labels` in the output
        #[arg(long, value_enum, default_value_t = Lang::Suomi)]
        lang: Lang,
        #[arg(allow_hyphen_values = true)]
        moves: Vec<String>,
    },
}

// One event of a session, the state is the serialized snapshot right after
// the event was applied
#[derive(Debug, Clone, serde::Serialize)]
struct SessionLogEntry {
    event: String,
    round_id: u32,
    player: Option<String>,
    points: Option<i64>,
    state: String,
}

type SessionLog = Vec<SessionLogEntry>;

#[derive(serde::Serialize)]
struct ScriptOutput<'a> {
    state: &'a GameState,
    table: ScoreTable,
    row_labels: Vec<String>,
    series: Vec<ChartPoint>,
}

impl<'a> ScriptOutput<'a> {
    fn new(state: &'a GameState, lang: Lang) -> Self {
        let table = score_table(state);
        let row_labels = table.rows.iter().map(|row| lang.row_label(row.label)).collect();
        Self {
            state,
            table,
            row_labels,
            series: chart_series(state),
        }
    }
}

fn check(state: &GameState) {
    if let Err(err) = state.validate() {
        log::error!("Game state is inconsistent: {}", err);
    }
}

fn log_entry(state: &GameState, event: &GameEvent) -> Result<SessionLogEntry> {
    let (name, round_id, player, points) = match *event {
        GameEvent::Started => ("start", state.round_number(), None, None),
        GameEvent::Turn { round_number, player_idx, points } => {
            ("turn", round_number, Some(state.roster().name(player_idx).to_string()), Some(points))
        },
        GameEvent::Undone(Undo::Turn { player_idx }) => {
            ("undo-turn", state.round_number(), Some(state.roster().name(player_idx).to_string()), None)
        },
        GameEvent::Undone(Undo::Round { round_number }) => ("undo-round", round_number, None, None),
        GameEvent::Undone(Undo::Nothing) => ("undo-nothing", state.round_number(), None, None),
    };

    Ok(SessionLogEntry {
        event: name.to_string(),
        round_id,
        player,
        points,
        state: serde_json::to_string(state)?,
    })
}

fn write_session_log(session_log: &SessionLog, file: &Path) -> Result<()> {
    let file = File::create(file)?;
    let mut writer = BufWriter::new(file);
    for item in session_log {
        jsonl::write(&mut writer, item)?;
    }
    log::info!("Wrote {} session events", session_log.len());
    Ok(())
}

fn apply_move(state: &mut GameState, mv: &str) -> GameEvent {
    match mv.trim() {
        "u" | "undo" => GameEvent::Undone(state.undo()),
        points => tui::play_turn(state, tui::parse_points(points)),
    }
}

fn run_script(players: &str, lang: Lang, moves: &[String]) -> Result<()> {
    let mut state = GameState::start_game(players.split(','))?;

    for mv in moves {
        let event = apply_move(&mut state, mv);
        log::debug!("{:?}", event);
        check(&state);
    }

    let output = ScriptOutput::new(&state, lang);
    log::info!("Totals after {} moves: {:?}", moves.len(), output.table.totals());
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_interactive(players: Option<String>, lang: Lang, log_file: Option<&Path>) -> Result<()> {
    color_eyre::install().map_err(|err| anyhow!("{}", err))?;
    let mut terminal = ratatui::init();

    let mut app = InteractiveApp::new(lang, players.unwrap_or_default());
    let mut session_log: SessionLog = Vec::new();

    let result: Result<()> = loop {
        if let Err(err) = terminal.draw(|frame| {
            frame.render_widget(app.clone(), frame.area());
        }) {
            break Err(err.into());
        }

        let key_event = match event::read() {
            Ok(Event::Key(key_event)) => key_event,
            // Resizes, focus and mouse events only need a redraw
            Ok(_) => continue,
            Err(err) => break Err(err.into()),
        };

        match app.handle_key(key_event) {
            Step::Idle => {},
            Step::Quit => break Ok(()),
            Step::Played(game_event) => {
                if let Some(state) = app.state() {
                    check(state);
                    if log_file.is_some() {
                        match log_entry(state, &game_event) {
                            Ok(entry) => session_log.push(entry),
                            Err(err) => break Err(err),
                        }
                    }
                }
            },
        }
    };

    ratatui::restore();

    if let Some(file) = log_file {
        write_session_log(&session_log, file)?;
    }

    result
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.commands {
        Commands::Play { players, lang, log_file } => run_interactive(players, lang, log_file.as_deref()),
        Commands::Script { players, lang, moves } => run_script(&players, lang, &moves),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted(players: &str, moves: &[&str]) -> GameState {
        let mut state = GameState::start_game(players.split(',')).unwrap();
        for mv in moves {
            apply_move(&mut state, mv);
        }
        state
    }

    #[test]
    fn test_apply_moves() {
        let state = scripted("A,B", &["10", "5", "undo"]);
        assert!(state.completed_rounds().is_empty());
        assert_eq!(state.in_progress().partial_scores, vec![Some(10), None]);

        let state = scripted("A,B", &["-4", "seven", "u", "u", "u"]);
        assert_eq!(state, GameState::start_game(["A", "B"]).unwrap());
    }

    #[test]
    fn test_log_entry() {
        let mut state = GameState::start_game(["A", "B"]).unwrap();
        let event = apply_move(&mut state, "3");
        let entry = log_entry(&state, &event).unwrap();
        assert_eq!(entry.event, "turn");
        assert_eq!(entry.round_id, 1);
        assert_eq!(entry.player.as_deref(), Some("A"));
        assert_eq!(entry.points, Some(3));

        let restored: GameState = serde_json::from_str(&entry.state).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_script_output_shape() {
        let state = scripted("A,B", &["10", "5", "2"]);
        let output = ScriptOutput::new(&state, Lang::English);
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["table"]["rows"][0]["label"]["round"], 1);
        assert_eq!(json["table"]["rows"][2]["label"], "total");
        assert_eq!(json["table"]["rows"][2]["cells"][0], 12);
        assert!(json["table"]["rows"][1]["cells"][1].is_null());
        assert_eq!(json["series"].as_array().unwrap().len(), 3);
        assert_eq!(json["row_labels"], serde_json::json!(["1", "2", "Total"]));

        let output = ScriptOutput::new(&state, Lang::Suomi);
        assert_eq!(output.row_labels.last().map(String::as_str), Some("Yhteensä"));
    }
}
