use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::grid::{Candidates, PatternGrid};
use super::notes::{Direction, Hand, NotePosition};
use crate::error::{Error, Result};

const EMBEDDED_PATTERNS: &str = include_str!("../../assets/patterns.json");
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct PatternFile {
    format: u32,
    left_hand: HashMap<String, HashMap<String, Vec<String>>>,
}

/// Follow-up tables keyed by the previous note's direction and cell.
///
/// Only left-hand tables are stored; right-hand tables are the mirror image
/// of the left-hand table for the mirrored key.
#[derive(Clone, Debug)]
pub struct PatternLibrary {
    left: HashMap<(Direction, NotePosition), Candidates>,
}

impl PatternLibrary {
    /// The tables shipped with the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_PATTERNS)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!("cannot read pattern file {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    /// Parse and validate a pattern document. All 96 (direction, cell) keys
    /// must be present; an entry is either 8 grids or `[]` for "no follow-ups".
    pub fn from_json(text: &str) -> Result<Self> {
        let file: PatternFile = serde_json::from_str(text)
            .map_err(|e| Error::configuration(format!("malformed pattern tables: {}", e)))?;
        if file.format != FORMAT_VERSION {
            return Err(Error::configuration(format!(
                "unsupported pattern format {} (expected {})",
                file.format, FORMAT_VERSION
            )));
        }

        let mut left = HashMap::with_capacity(96);
        for direction in Direction::ALL {
            let by_position = file.left_hand.get(direction.key()).ok_or_else(|| {
                Error::configuration(format!("missing pattern tables for direction '{}'", direction.key()))
            })?;
            for position in NotePosition::all() {
                let key = position.key();
                let entry = by_position.get(&key).ok_or_else(|| {
                    Error::configuration(format!("missing pattern table {}/{}", direction.key(), key))
                })?;
                left.insert((direction, position), parse_candidates(entry, direction, &key)?);
            }
        }

        let authored = left.values().filter(|c| **c != Candidates::EMPTY).count();
        log::debug!("Loaded {} pattern tables ({} with follow-ups)", left.len(), authored);
        Ok(Self { left })
    }

    pub fn left(&self, direction: Direction, position: NotePosition) -> Candidates {
        self.left
            .get(&(direction, position))
            .copied()
            .unwrap_or(Candidates::EMPTY)
    }

    pub fn right(&self, direction: Direction, position: NotePosition) -> Candidates {
        self.left(direction.mirrored(), position.mirrored()).mirrored()
    }

    pub fn candidates(&self, hand: Hand, direction: Direction, position: NotePosition) -> Candidates {
        match hand {
            Hand::Left => self.left(direction, position),
            Hand::Right => self.right(direction, position),
        }
    }
}

fn parse_candidates(entry: &[String], direction: Direction, position: &str) -> Result<Candidates> {
    if entry.is_empty() {
        return Ok(Candidates::EMPTY);
    }
    if entry.len() != 8 {
        return Err(Error::configuration(format!(
            "pattern table {}/{} has {} entries, expected 8",
            direction.key(),
            position,
            entry.len()
        )));
    }
    let mut grids = [PatternGrid::EMPTY; 8];
    for (grid, text) in grids.iter_mut().zip(entry) {
        *grid = PatternGrid::parse(text)?;
    }
    Ok(Candidates::new(grids))
}
