use super::TallyError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// Ordered list of player names. Fixed for the lifetime of a game, a new game
// gets a new roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    /// Build a roster from raw names. Whitespace is trimmed and blank entries
    /// are dropped; fewer than two remaining names is an error.
    pub fn new<I, S>(names: I) -> Result<Self, TallyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();

        if names.len() < 2 {
            return Err(TallyError::NeedAtLeastTwoPlayers);
        }

        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                log::warn!("Player name {:?} appears more than once", name);
            }
        }

        Ok(Self { names })
    }

    // Split a single comma separated line, the way names are typed in the
    // setup prompt.
    pub fn parse(line: &str) -> Result<Self, TallyError> {
        Self::new(line.split(','))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn last_index(&self) -> usize {
        self.names.len() - 1
    }

    pub fn name(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for Roster {
    type Error = TallyError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<Roster> for Vec<String> {
    fn from(roster: Roster) -> Self {
        roster.names
    }
}
