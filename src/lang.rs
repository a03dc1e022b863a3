use crate::tally::RowLabel;
use clap::ValueEnum;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Lang {
    #[default]
    Suomi,
    English,
}

// Display labels, keyed by field. Core state never carries any of these.
#[derive(Clone, Copy, Debug)]
pub struct Text {
    pub title: &'static str,
    pub add_players: &'static str,
    pub name_prompt: &'static str,
    pub start_game: &'static str,
    pub round: &'static str,
    pub turn: &'static str,
    pub points_for: &'static str,
    pub end_turn: &'static str,
    pub undo: &'static str,
    pub scores: &'static str,
    pub next_up: &'static str,
    pub press_enter: &'static str,
    pub total: &'static str,
    pub need_two: &'static str,
    pub language: &'static str,
    pub quit: &'static str,
}

const ENGLISH: Text = Text {
    title: "Points Tracker",
    add_players: "Add Players (2 or more)",
    name_prompt: "Enter player names separated by commas",
    start_game: "Start Game",
    round: "Round",
    turn: "'s turn",
    points_for: "Points for",
    end_turn: "End Turn",
    undo: "Undo Last Turn",
    scores: "Scores by Round",
    next_up: "Next up",
    press_enter: "Press Enter to end turn",
    total: "Total",
    need_two: "Please enter at least two players.",
    language: "Language",
    quit: "Quit",
};

const SUOMI: Text = Text {
    title: "Pisteiden seuranta",
    add_players: "Lisää pelaajat (vähintään 2)",
    name_prompt: "Syötä pelaajien nimet pilkuilla erotettuna",
    start_game: "Aloita peli",
    round: "Kierros",
    turn: " vuoro",
    points_for: "Pisteet pelaajalle",
    end_turn: "Lopeta vuoro",
    undo: "Peruuta viimeisin vuoro",
    scores: "Pisteet kierroksittain",
    next_up: "Seuraavana",
    press_enter: "Paina Enter lopettaaksesi vuoron",
    total: "Yhteensä",
    need_two: "Syötä vähintään kaksi pelaajaa.",
    language: "Kieli",
    quit: "Lopeta",
};

impl Lang {
    pub fn text(self) -> &'static Text {
        match self {
            Lang::Suomi => &SUOMI,
            Lang::English => &ENGLISH,
        }
    }

    // First column of a score table row
    pub fn row_label(self, label: RowLabel) -> String {
        match label {
            RowLabel::Round(n) => n.to_string(),
            RowLabel::Total => self.text().total.to_string(),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Lang::Suomi => Lang::English,
            Lang::English => Lang::Suomi,
        }
    }
}
