use super::notes::{Direction, Hand, HorizontalPosition, Note, NotePosition, VerticalPosition};
use crate::error::{Error, Result};

/// Placement weights over the 4x3 note grid, rows stored top to bottom.
///
/// A weight of 0 never places a note; N places the cell N times in the
/// expanded candidate list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatternGrid {
    rows: [[u8; 4]; 3],
}

impl PatternGrid {
    pub const EMPTY: PatternGrid = PatternGrid { rows: [[0; 4]; 3] };

    pub fn from_rows(rows: [[u8; 4]; 3]) -> Self {
        Self { rows }
    }

    /// Parse `"TTTT/MMMM/BBBB"` (one digit per cell, left to right) or the
    /// `"-"` no-notes sentinel.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text == "-" {
            return Ok(Self::EMPTY);
        }
        let mut rows = [[0u8; 4]; 3];
        let mut count = 0;
        for (r, line) in text.split('/').enumerate() {
            let row = rows
                .get_mut(r)
                .ok_or_else(|| Error::configuration(format!("pattern '{}' has more than 3 rows", text)))?;
            let digits: Vec<char> = line.chars().collect();
            if digits.len() != 4 {
                return Err(Error::configuration(format!(
                    "pattern row '{}' must have exactly 4 digits",
                    line
                )));
            }
            for (cell, ch) in row.iter_mut().zip(digits) {
                *cell = ch.to_digit(10).ok_or_else(|| {
                    Error::configuration(format!("'{}' is not a weight digit in pattern '{}'", ch, text))
                })? as u8;
            }
            count += 1;
        }
        if count != 3 {
            return Err(Error::configuration(format!(
                "pattern '{}' must have exactly 3 rows",
                text
            )));
        }
        Ok(Self { rows })
    }

    pub fn weight(&self, position: NotePosition) -> u8 {
        self.rows[position.vertical.row()][position.horizontal.column()]
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(|&w| w == 0)
    }

    /// Left/right reflection: each row reversed.
    pub fn mirrored(&self) -> Self {
        let mut rows = self.rows;
        for row in rows.iter_mut() {
            row.reverse();
        }
        Self { rows }
    }
}

/// One weighted grid per follow-up direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Candidates {
    grids: [PatternGrid; 8],
}

impl Candidates {
    pub const EMPTY: Candidates = Candidates {
        grids: [PatternGrid::EMPTY; 8],
    };

    /// Grids listed in [`Direction::ALL`] order.
    pub fn new(grids: [PatternGrid; 8]) -> Self {
        Self { grids }
    }

    pub fn grid(&self, direction: Direction) -> &PatternGrid {
        &self.grids[direction.index()]
    }

    /// The same table seen from the other hand: every grid is reflected and
    /// re-keyed by the reflected direction.
    pub fn mirrored(&self) -> Self {
        let mut grids = [PatternGrid::EMPTY; 8];
        for d in Direction::ALL {
            grids[d.index()] = self.grid(d.mirrored()).mirrored();
        }
        Self { grids }
    }

    /// Replicate each cell by its weight into a flat candidate list.
    pub fn expand(&self, time: f32, hand: Hand) -> Vec<Note> {
        let mut notes = Vec::new();
        for d in Direction::ALL {
            let grid = self.grid(d);
            for horizontal in HorizontalPosition::ALL {
                for row in 0..3 {
                    let Some(vertical) = VerticalPosition::from_row(row) else {
                        continue;
                    };
                    let position = NotePosition::new(horizontal, vertical);
                    for _ in 0..grid.weight(position) {
                        notes.push(Note {
                            time,
                            hand,
                            cut_direction: d.cut(),
                            position,
                        });
                    }
                }
            }
        }
        notes
    }
}
