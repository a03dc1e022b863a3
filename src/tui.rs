use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{self, Modifier, Style};
use ratatui::symbols::{self, border};
use ratatui::text::Span;
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, Row, Table};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Stylize,
    text::{Line, Text},
    widgets::{Block, Paragraph, Widget},
};

use crate::lang::Lang;
use crate::tally::{chart_series, score_table, GameState, Roster, RowLabel, Undo};

const PLAYER_COLORS: [style::Color; 6] = [
    style::Color::Cyan,
    style::Color::Yellow,
    style::Color::Magenta,
    style::Color::Green,
    style::Color::Red,
    style::Color::Blue,
];

fn player_color(idx: usize) -> style::Color {
    PLAYER_COLORS[idx % PLAYER_COLORS.len()]
}

// Something that changed the game, reported back to the caller for logging
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Started,
    Turn { round_number: u32, player_idx: usize, points: i64 },
    Undone(Undo),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Idle,
    Quit,
    Played(GameEvent),
}

#[derive(Clone, Debug)]
pub enum Screen {
    Setup { names: String, rejected: bool },
    Playing(GameState),
}

#[derive(Clone, Debug)]
pub struct InteractiveApp {
    pub lang: Lang,
    pub screen: Screen,
    pub points_input: String,
    pub last_event: Option<GameEvent>,
}

// Turn typed text into points. Anything that isn't an integer counts as 0.
pub fn parse_points(input: &str) -> i64 {
    let input = input.trim();
    match input.parse::<i64>() {
        Ok(points) => points,
        Err(_) => {
            if !input.is_empty() {
                log::warn!("Could not read {:?} as points, using 0", input);
            }
            0
        }
    }
}

// Submit the active player's points and describe what happened
pub fn play_turn(state: &mut GameState, points: i64) -> GameEvent {
    let event = GameEvent::Turn {
        round_number: state.round_number(),
        player_idx: state.current_player_index(),
        points,
    };
    state.submit_turn(points);
    event
}

impl InteractiveApp {
    pub fn new(lang: Lang, names: String) -> Self {
        Self {
            lang,
            screen: Screen::Setup { names, rejected: false },
            points_input: String::new(),
            last_event: None,
        }
    }

    pub fn state(&self) -> Option<&GameState> {
        match &self.screen {
            Screen::Playing(state) => Some(state),
            Screen::Setup { .. } => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Step {
        if key.kind != KeyEventKind::Press {
            return Step::Idle;
        }

        match key.code {
            KeyCode::Esc => return Step::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Step::Quit,
            KeyCode::F(2) => {
                self.lang = self.lang.toggled();
                return Step::Idle;
            },
            _ => {}
        }

        let step = match self.screen {
            Screen::Setup { .. } => self.handle_setup_key(key),
            Screen::Playing(_) => self.handle_game_key(key),
        };

        if let Step::Played(event) = &step {
            self.last_event = Some(event.clone());
        }
        step
    }

    fn handle_setup_key(&mut self, key: KeyEvent) -> Step {
        let Screen::Setup { names, rejected } = &mut self.screen else {
            return Step::Idle;
        };

        let typed = !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match key.code {
            KeyCode::Char(c) if typed => {
                names.push(c);
                *rejected = false;
            },
            KeyCode::Backspace => {
                names.pop();
                *rejected = false;
            },
            KeyCode::Enter => match Roster::parse(names) {
                Ok(roster) => {
                    self.screen = Screen::Playing(GameState::with_roster(roster));
                    self.points_input.clear();
                    return Step::Played(GameEvent::Started);
                },
                Err(err) => {
                    log::debug!("Rejected roster {:?}: {}", names, err);
                    *rejected = true;
                },
            },
            _ => {}
        }

        Step::Idle
    }

    fn handle_game_key(&mut self, key: KeyEvent) -> Step {
        let Screen::Playing(state) = &mut self.screen else {
            return Step::Idle;
        };

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('z') if ctrl => Step::Played(GameEvent::Undone(state.undo())),
            KeyCode::Char('u') => Step::Played(GameEvent::Undone(state.undo())),
            KeyCode::Char(c) if !ctrl && (c.is_ascii_digit() || (c == '-' && self.points_input.is_empty())) => {
                self.points_input.push(c);
                Step::Idle
            },
            KeyCode::Backspace => {
                self.points_input.pop();
                Step::Idle
            },
            KeyCode::Enter => {
                let points = parse_points(&self.points_input);
                self.points_input.clear();
                Step::Played(play_turn(state, points))
            },
            _ => Step::Idle,
        }
    }
}

fn render_setup(lang: Lang, names: &str, rejected: bool, area: Rect, buf: &mut Buffer) {
    let text = lang.text();

    let mut lines = vec![
        Line::from(""),
        Line::from(format!("  {}", text.add_players).bold()),
        Line::from(""),
        Line::from(format!("  {}:", text.name_prompt)),
        Line::from(vec![
            "  > ".blue().bold(),
            names.to_string().into(),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        Line::from(""),
    ];

    if rejected {
        lines.push(Line::from(Span::styled(format!("  {}", text.need_two), Style::default().fg(style::Color::Red))));
    }

    let block = Block::bordered()
        .border_set(border::THICK)
        .title(Line::from(format!(" {} ", text.title).bold()).centered())
        .title_bottom(Line::from(vec![
            format!(" {} ", text.start_game).into(),
            "<RET> ".blue().bold(),
            format!(" {} ", text.language).into(),
            "<F2> ".blue().bold(),
            format!(" {} ", text.quit).into(),
            "<ESC> ".blue().bold(),
        ]).right_aligned());

    Paragraph::new(Text::from(lines))
        .block(block)
        .render(area, buf);
}

fn render_table(lang: Lang, state: &GameState, area: Rect, buf: &mut Buffer) {
    let text = lang.text();
    let table = score_table(state);

    let header = Row::new(
        std::iter::once(text.round.to_string())
            .chain(table.players.iter().cloned())
            .collect::<Vec<_>>(),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = table.rows.iter().map(|row| {
        let cells = std::iter::once(lang.row_label(row.label))
            .chain(row.cells.iter().map(|c| c.map(|p| p.to_string()).unwrap_or_default()))
            .collect::<Vec<_>>();

        match row.label {
            RowLabel::Total => Row::new(cells).style(Style::default().add_modifier(Modifier::BOLD).fg(style::Color::Blue)),
            RowLabel::Round(n) if n == state.round_number() => Row::new(cells).style(Style::default().add_modifier(Modifier::ITALIC)),
            RowLabel::Round(_) => Row::new(cells),
        }
    }).collect();

    let mut widths = vec![Constraint::Length(12)];
    widths.extend(vec![Constraint::Min(6); table.players.len()]);

    let block = Block::bordered()
        .title(Line::from(format!(" {} ", text.scores).bold()));

    Widget::render(
        Table::new(rows, widths).header(header).column_spacing(1).block(block),
        area,
        buf,
    );
}

fn render_chart(lang: Lang, state: &GameState, area: Rect, buf: &mut Buffer) {
    let text = lang.text();
    let series = chart_series(state);

    let mut data: Vec<Vec<(f64, f64)>> = vec![Vec::new(); state.roster().len()];
    for point in &series {
        data[point.player_idx].push((point.round_number as f64, point.cumulative as f64));
    }

    // Whole-number rounds on x, y anchored at zero unless someone went negative
    let x_max = state.round_number().max(2);
    let y_min = series.iter().map(|p| p.cumulative).min().unwrap_or(0).min(0);
    let y_max = series.iter().map(|p| p.cumulative).max().unwrap_or(0).max(y_min + 1);

    let x_labels: Vec<String> = if x_max <= 12 {
        (1..=x_max).map(|r| r.to_string()).collect()
    } else {
        vec!["1".to_string(), x_max.to_string()]
    };

    let datasets: Vec<Dataset> = state.roster().iter().enumerate().map(|(i, name)| {
        Dataset::default()
            .name(name.to_string())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(player_color(i)))
            .data(&data[i])
    }).collect();

    let chart = Chart::new(datasets)
        .block(Block::bordered())
        .x_axis(Axis::default()
            .title(text.round)
            .bounds([1.0, x_max as f64])
            .labels(x_labels))
        .y_axis(Axis::default()
            .bounds([y_min as f64, y_max as f64])
            .labels(vec![y_min.to_string(), y_max.to_string()]));

    chart.render(area, buf);
}

fn event_line(lang: Lang, state: &GameState, event: &GameEvent) -> Line<'static> {
    let text = lang.text();
    let described = match event {
        GameEvent::Started => format!("{} 1", text.round),
        GameEvent::Turn { round_number, player_idx, points } => {
            format!("{} {}: {} {:+}", text.round, round_number, state.roster().name(*player_idx), points)
        },
        GameEvent::Undone(Undo::Turn { player_idx }) => {
            format!("{}: {}", text.undo, state.roster().name(*player_idx))
        },
        GameEvent::Undone(Undo::Round { round_number }) => {
            format!("{}: {} {}", text.undo, text.round, round_number)
        },
        GameEvent::Undone(Undo::Nothing) => format!("{}: -", text.undo),
    };

    Line::from(format!("  {}", described).italic())
}

impl Widget for InteractiveApp {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = match &self.screen {
            Screen::Setup { names, rejected } => {
                render_setup(self.lang, names, *rejected, area, buf);
                return;
            },
            Screen::Playing(state) => state,
        };
        let text = self.lang.text();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(12),
                Constraint::Length(1),
            ])
            .split(area);

        let current = state.current_player_index();
        let header_text = Text::from(vec![Line::from(vec![
            " ".into(),
            Span::styled(format!(" {} {} ", text.round, state.round_number()), Style::default().fg(style::Color::Blue)).bold().add_modifier(Modifier::REVERSED),
            " — ".into(),
            Span::styled(state.current_player().to_string(), Style::default().fg(player_color(current))).bold(),
            text.turn.into(),
        ])]);

        Paragraph::new(header_text)
            .block(Block::bordered().border_set(border::THICK).title(format!(" {} ", text.title)))
            .render(layout[0], buf);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(layout[1]);

        render_table(self.lang, state, body[0], buf);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(8)])
            .split(body[1]);

        let shown = if self.points_input.is_empty() { "0" } else { self.points_input.as_str() };
        let mut input_lines = vec![Line::from(vec![
            format!("  {} {}: ", text.points_for, state.current_player()).into(),
            shown.to_string().bold(),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ])];
        if let Some(event) = &self.last_event {
            input_lines.push(event_line(self.lang, state, event));
        }

        let input_block = Block::bordered()
            .title_bottom(Line::from(vec![
                format!(" {} ", text.end_turn).into(),
                "<RET> ".blue().bold(),
                format!(" {} ", text.undo).into(),
                "<u> ".blue().bold(),
                format!(" {} ", text.language).into(),
                "<F2> ".blue().bold(),
                format!(" {} ", text.quit).into(),
                "<ESC> ".blue().bold(),
            ]).right_aligned());

        Paragraph::new(input_lines)
            .block(input_block)
            .render(right[0], buf);

        render_chart(self.lang, state, right[1], buf);

        Paragraph::new(Line::from(vec![
            format!(" {}: ", text.next_up).into(),
            state.current_player().to_string().bold(),
            format!(" — {}", text.press_enter).into(),
        ]))
        .render(layout[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(app: &mut InteractiveApp, code: KeyCode) -> Step {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut InteractiveApp, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_parse_points() {
        assert_eq!(parse_points("12"), 12);
        assert_eq!(parse_points(" -3 "), -3);
        assert_eq!(parse_points(""), 0);
        assert_eq!(parse_points("abc"), 0);
        assert_eq!(parse_points("4.5"), 0);
    }

    #[test]
    fn test_setup_rejects_single_player() {
        let mut app = InteractiveApp::new(Lang::English, String::new());
        type_text(&mut app, "Aino, ");
        assert_eq!(press(&mut app, KeyCode::Enter), Step::Idle);
        assert!(matches!(app.screen, Screen::Setup { rejected: true, .. }));
        assert!(app.state().is_none());

        type_text(&mut app, "Eino");
        assert!(matches!(app.screen, Screen::Setup { rejected: false, .. }));
        assert_eq!(press(&mut app, KeyCode::Enter), Step::Played(GameEvent::Started));
        assert_eq!(app.state().unwrap().roster().names(), &["Aino".to_string(), "Eino".to_string()]);
    }

    #[test]
    fn test_turns_and_undo_through_keys() {
        let mut app = InteractiveApp::new(Lang::Suomi, "A,B".to_string());
        press(&mut app, KeyCode::Enter);

        type_text(&mut app, "10");
        assert_eq!(
            press(&mut app, KeyCode::Enter),
            Step::Played(GameEvent::Turn { round_number: 1, player_idx: 0, points: 10 })
        );
        type_text(&mut app, "5");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state().unwrap().completed_rounds().len(), 1);

        assert_eq!(
            press(&mut app, KeyCode::Char('u')),
            Step::Played(GameEvent::Undone(Undo::Round { round_number: 1 }))
        );
        let state = app.state().unwrap();
        assert!(state.completed_rounds().is_empty());
        assert_eq!(state.in_progress().partial_scores, vec![Some(10), None]);
        assert_eq!(state.current_player(), "B");
    }

    #[test]
    fn test_letters_ignored_in_points() {
        let mut app = InteractiveApp::new(Lang::English, "A,B".to_string());
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "x7");
        assert_eq!(app.points_input, "7");

        // Empty input submits zero
        app.points_input.clear();
        assert_eq!(
            press(&mut app, KeyCode::Enter),
            Step::Played(GameEvent::Turn { round_number: 1, player_idx: 0, points: 0 })
        );
    }

    #[test]
    fn test_minus_only_leads() {
        let mut app = InteractiveApp::new(Lang::English, "A,B".to_string());
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "5-");
        assert_eq!(app.points_input, "5");

        app.points_input.clear();
        type_text(&mut app, "--12");
        assert_eq!(app.points_input, "-12");
        assert_eq!(
            press(&mut app, KeyCode::Enter),
            Step::Played(GameEvent::Turn { round_number: 1, player_idx: 0, points: -12 })
        );
    }

    #[test]
    fn test_setup_ignores_control_chords() {
        let mut app = InteractiveApp::new(Lang::English, "A".to_string());
        app.handle_key(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL));
        app.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT));
        app.handle_key(KeyEvent::new(KeyCode::Char('B'), KeyModifiers::SHIFT));
        assert!(matches!(&app.screen, Screen::Setup { names, .. } if names == "AB"));
    }

    #[test]
    fn test_language_toggle_and_quit() {
        let mut app = InteractiveApp::new(Lang::Suomi, String::new());
        assert_eq!(press(&mut app, KeyCode::F(2)), Step::Idle);
        assert_eq!(app.lang, Lang::English);
        assert_eq!(press(&mut app, KeyCode::Esc), Step::Quit);
    }

    #[test]
    fn test_renders_game_screen() {
        let mut app = InteractiveApp::new(Lang::English, "Aino,Eino".to_string());
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "7");
        press(&mut app, KeyCode::Enter);

        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        app.clone().render(area, &mut buf);

        let rendered: String = buf.content().iter().map(|cell| cell.symbol()).collect();
        assert!(rendered.contains("Eino's turn"));
        assert!(rendered.contains("Total"));
    }
}
