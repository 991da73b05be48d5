use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// One aspect of what a torrent is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Stopped,
    /// Checking (or queued to check) local data.
    Verify,
    /// Waiting for a free slot in one of the daemon's queues.
    Queued,
    /// Private torrent with no working tracker; no way to find peers.
    Isolated,
    /// Still downloading metadata.
    Init,
    Download,
    Upload,
    Connected,
    Seed,
    Idle,
}
impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Verify => "verifying",
            Self::Queued => "queued",
            Self::Isolated => "isolated",
            Self::Init => "initializing",
            Self::Download => "downloading",
            Self::Upload => "uploading",
            Self::Connected => "connected",
            Self::Seed => "seeding",
            Self::Idle => "idle",
        }
    }
}
impl FromStr for State {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "stopped" | "paused" => Self::Stopped,
            "verify" | "verifying" => Self::Verify,
            "queued" => Self::Queued,
            "isolated" => Self::Isolated,
            "init" | "initializing" => Self::Init,
            "download" | "downloading" => Self::Download,
            "upload" | "uploading" => Self::Upload,
            "connected" => Self::Connected,
            "seed" | "seeding" => Self::Seed,
            "idle" => Self::Idle,
            _ => exn::bail!(ErrorKind::parse("status", s)),
        })
    }
}
impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered set of [`State`]s; insertion order is kept, duplicates are not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Status(Vec<State>);
impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `state` unless it is already present. Returns `true` if added.
    pub fn insert(&mut self, state: State) -> bool {
        if self.contains(state) {
            return false;
        }
        self.0.push(state);
        true
    }

    pub fn contains(&self, state: State) -> bool {
        self.0.contains(&state)
    }

    pub fn states(&self) -> &[State] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = State> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
impl FromIterator<State> for Status {
    fn from_iter<I: IntoIterator<Item = State>>(iter: I) -> Self {
        let mut status = Self::new();
        for state in iter {
            status.insert(state);
        }
        status
    }
}
impl<'a> IntoIterator for &'a Status {
    type Item = State;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, State>>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}
impl FromStr for Status {
    type Err = Error;
    /// Comma-separated list of states.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',').filter(|part| !part.trim().is_empty()).map(str::parse).collect()
    }
}
impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, state) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{state}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_without_duplicates() {
        let mut status = Status::new();
        assert!(status.insert(State::Download));
        assert!(status.insert(State::Connected));
        assert!(!status.insert(State::Download));
        assert_eq!(status.states(), &[State::Download, State::Connected]);
        assert_eq!(status.len(), 2);
    }

    #[test]
    fn test_parse_and_display() {
        let status: Status = "downloading, connected,seed".parse().unwrap();
        assert_eq!(status.states(), &[State::Download, State::Connected, State::Seed]);
        assert_eq!(status.to_string(), "downloading, connected, seeding");
        assert!("downloading, teleporting".parse::<Status>().is_err());
        assert!("".parse::<Status>().unwrap().is_empty());
    }
}
