use rand::Rng;
use std::collections::HashSet;

use super::notes::{
    CutDirection, Direction, Hand, HorizontalPosition, Note, NotePosition, Obstacle,
    VerticalPosition,
};
use super::patterns::PatternLibrary;
use super::style::{BeatContext, Style, StyleKind};
use crate::analysis::Beat;

/// Walks the beats once, placing notes and walls under the active style.
pub struct Orchestrator<'a> {
    library: &'a PatternLibrary,
    bpm: f64,
    sample_rate: u32,
    lead_in_seconds: f64,
}

impl<'a> Orchestrator<'a> {
    pub fn new(library: &'a PatternLibrary, bpm: f64, sample_rate: u32, lead_in_seconds: f64) -> Self {
        Self {
            library,
            bpm,
            sample_rate,
            lead_in_seconds,
        }
    }

    fn beat_time(&self, beat: &Beat) -> f32 {
        (self.bpm * beat.sample_index as f64 / self.sample_rate as f64 / 60.0) as f32
    }

    /// Notes in time order plus the walls spawned along the way.
    pub fn run<R: Rng + ?Sized>(&self, beats: &[Beat], rng: &mut R) -> (Vec<Note>, Vec<Obstacle>) {
        let mut notes: Vec<Note> = Vec::new();
        let mut obstacles: Vec<Obstacle> = Vec::new();

        let mut style = Style::new(StyleKind::Regular, rng, self.bpm);
        let mut last_left = opening_note(Hand::Left);
        let mut last_right = opening_note(Hand::Right);
        let mut time_last = 0.0f32;
        let mut skipped = 0usize;

        for beat in beats {
            if (beat.sample_index as f64 / self.sample_rate as f64) < self.lead_in_seconds {
                continue;
            }
            let time_now = self.beat_time(beat);

            if rng.gen::<f64>() < style.change_probability() {
                style = Style::random(rng, self.bpm);
                log::debug!("Beat at {:.2}: switched to {} style", time_now, style.kind());
            }

            let left_direction = table_direction(last_left.cut_direction, rng);
            let right_direction = table_direction(last_right.cut_direction, rng);
            let mut left = self
                .library
                .left(left_direction, last_left.position)
                .expand(time_now, Hand::Left);
            let mut right = self
                .library
                .right(right_direction, last_right.position)
                .expand(time_now, Hand::Right);

            if style.uses_visibility_filter() {
                let restriction = (self.bpm * style.visibility_filter_seconds() / 60.0) as f32;
                let occupied = recent_positions(&notes, time_now, restriction);
                left.retain(|n| !occupied.contains(&n.position));
                right.retain(|n| !occupied.contains(&n.position));
            }

            let ctx = BeatContext {
                time: time_now,
                seconds_since_last_note: ((time_now - time_last) as f64 * 60.0 / self.bpm) as f32,
            };
            let (left, right) = style.filter(&ctx, left, right, &last_left, &last_right);
            let choice = style.choose(rng, &left, &right);

            if choice.left.is_none() && choice.right.is_none() {
                skipped += 1;
            }
            if let Some(note) = choice.left {
                notes.push(note);
                last_left = note;
                time_last = time_now;
            }
            if let Some(note) = choice.right {
                notes.push(note);
                last_right = note;
                time_last = time_now;
            }
            notes.extend(choice.extra_notes);
            obstacles.extend(choice.obstacles);
        }

        log::debug!(
            "Placed {} notes and {} walls ({} beats left empty)",
            notes.len(),
            obstacles.len(),
            skipped
        );
        (notes, obstacles)
    }
}

/// The notional previous note each hand starts from.
fn opening_note(hand: Hand) -> Note {
    let horizontal = match hand {
        Hand::Left => HorizontalPosition::CenterLeft,
        Hand::Right => HorizontalPosition::CenterRight,
    };
    Note {
        time: 0.0,
        hand,
        cut_direction: CutDirection::Down,
        position: NotePosition::new(horizontal, VerticalPosition::Middle),
    }
}

/// Pattern key for a previous cut; a free `Any` cut counts as a random
/// cardinal direction.
fn table_direction<R: Rng + ?Sized>(cut: CutDirection, rng: &mut R) -> Direction {
    match cut.direction() {
        Some(direction) => direction,
        None => Direction::CARDINAL[rng.gen_range(0..Direction::CARDINAL.len())],
    }
}

/// Cells used by any note less than `restriction` beats before `time_now`.
fn recent_positions(notes: &[Note], time_now: f32, restriction: f32) -> HashSet<NotePosition> {
    notes
        .iter()
        .rev()
        .take_while(|n| time_now - n.time < restriction)
        .map(|n| n.position)
        .collect()
}
