//! The pope roster - an ordered rotation of user ids
//!
//! Position 0 is the current pope, everyone after is queued in rotation order.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::application::errors::RosterError;

/// Ordered, duplicate-free sequence of user ids.
///
/// Serializes as the persisted record `{ "popes": [ ... ] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    popes: Vec<String>,
}

/// Outcome of a rotation: who stepped down and who took over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    pub previous: String,
    pub current: String,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            popes: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.popes.first().map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.popes.iter().any(|p| p == id)
    }

    pub fn len(&self) -> usize {
        self.popes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.popes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.popes.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.popes
    }

    /// Append `id` at the back of the rotation.
    pub fn add(&mut self, id: &str) -> Result<(), RosterError> {
        if self.contains(id) {
            return Err(RosterError::AlreadyPresent(id.to_string()));
        }
        self.popes.push(id.to_string());
        Ok(())
    }

    /// Drop every occurrence of `id`. Whoever ends up at the front is the new pope.
    pub fn remove(&mut self, id: &str) -> Result<(), RosterError> {
        if !self.contains(id) {
            return Err(RosterError::NotPresent(id.to_string()));
        }
        self.popes.retain(|p| p != id);
        Ok(())
    }

    /// Send the current pope to the back of the queue.
    pub fn cycle(&mut self) -> Result<Rotation, RosterError> {
        if self.popes.len() < 2 {
            return Err(RosterError::InsufficientMembers {
                action: "cycle to the next one",
            });
        }
        self.popes.rotate_left(1);
        Ok(Rotation {
            previous: self.popes[self.popes.len() - 1].clone(),
            current: self.popes[0].clone(),
        })
    }

    /// Swap the current and next pope; nobody else moves.
    pub fn defer(&mut self) -> Result<Rotation, RosterError> {
        if self.popes.len() < 2 {
            return Err(RosterError::InsufficientMembers {
                action: "defer the current one for a week",
            });
        }
        self.popes.swap(0, 1);
        Ok(Rotation {
            previous: self.popes[1].clone(),
            current: self.popes[0].clone(),
        })
    }
}

/// Human readable rendering of a roster, one variant per listing shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterListing {
    Empty,
    Single(String),
    Pair { current: String, off_duty: String },
    Queue { current: String, upcoming: Vec<String>, last: String },
}

impl RosterListing {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        match names.len() {
            0 => RosterListing::Empty,
            1 => RosterListing::Single(names.remove(0)),
            2 => {
                let off_duty = names.remove(1);
                RosterListing::Pair {
                    current: names.remove(0),
                    off_duty,
                }
            }
            _ => {
                let current = names.remove(0);
                // len >= 2 here
                let last = names.pop().unwrap_or_default();
                RosterListing::Queue {
                    current,
                    upcoming: names,
                    last,
                }
            }
        }
    }
}

impl fmt::Display for RosterListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterListing::Empty => {
                write!(f, "There are no popes registered! Use `addPope user-name` to add one.")
            }
            RosterListing::Single(only) => write!(f, "The only registered pope is {}.", only),
            RosterListing::Pair { current, off_duty } => write!(
                f,
                "The current pope is {}.\nThe off-duty pope is {}",
                current, off_duty
            ),
            RosterListing::Queue { current, upcoming, last } => write!(
                f,
                "The current pope is {}.\nThe upcoming popes, in order, are {}{} and {}",
                current,
                upcoming.join(", "),
                if upcoming.len() > 1 { "," } else { "" },
                last
            ),
        }
    }
}
