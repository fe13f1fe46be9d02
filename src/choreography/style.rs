//! Generation policies. Exactly one is active at a time; the orchestrator
//! replaces it wholesale when a switch roll succeeds.

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

use super::notes::{
    CutDirection, Hand, HorizontalPosition, Note, Obstacle, ObstacleType, VerticalPosition,
};

/// Beat-level facts a style needs besides the candidate lists.
#[derive(Clone, Copy, Debug)]
pub struct BeatContext {
    /// Current beat time, in beats.
    pub time: f32,
    pub seconds_since_last_note: f32,
}

/// What a style decided for one beat.
#[derive(Clone, Debug, Default)]
pub struct Choice {
    pub left: Option<Note>,
    pub right: Option<Note>,
    pub extra_notes: Vec<Note>,
    pub obstacles: Vec<Obstacle>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleKind {
    Regular,
    Chains,
    FeverTime,
    DoublesSame,
    SimpleObstacle,
}

impl StyleKind {
    pub const ALL: [StyleKind; 5] = [
        StyleKind::Regular,
        StyleKind::Chains,
        StyleKind::FeverTime,
        StyleKind::DoublesSame,
        StyleKind::SimpleObstacle,
    ];
}

impl fmt::Display for StyleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StyleKind::Regular => "regular",
            StyleKind::Chains => "chains",
            StyleKind::FeverTime => "fever-time",
            StyleKind::DoublesSame => "doubles-same",
            StyleKind::SimpleObstacle => "simple-obstacle",
        };
        f.write_str(name)
    }
}

/// The active style together with its run-local state.
#[derive(Clone, Debug)]
pub enum Style {
    Regular(Alternation),
    Chains(ChainState),
    FeverTime(Halving),
    DoublesSame(Halving),
    SimpleObstacle(WallState),
}

impl Style {
    pub fn new<R: Rng + ?Sized>(kind: StyleKind, rng: &mut R, bpm: f64) -> Self {
        match kind {
            StyleKind::Regular => Style::Regular(Alternation::default()),
            StyleKind::Chains => Style::Chains(ChainState::new(rng)),
            StyleKind::FeverTime => Style::FeverTime(Halving::default()),
            StyleKind::DoublesSame => Style::DoublesSame(Halving::default()),
            StyleKind::SimpleObstacle => {
                let layout = WallLayout::ALL[rng.gen_range(0..WallLayout::ALL.len())];
                Style::with_wall_layout(layout, rng, bpm)
            }
        }
    }

    /// A uniformly chosen style; the current one may be picked again.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, bpm: f64) -> Self {
        let kind = StyleKind::ALL[rng.gen_range(0..StyleKind::ALL.len())];
        Self::new(kind, rng, bpm)
    }

    /// SimpleObstacle with a fixed layout and a random 3-8 s wall.
    pub fn with_wall_layout<R: Rng + ?Sized>(layout: WallLayout, rng: &mut R, bpm: f64) -> Self {
        let seconds = 3.0 + rng.gen::<f64>() * 5.0;
        let duration = (seconds * bpm / 60.0) as f32;
        Style::SimpleObstacle(WallState::new(layout, duration))
    }

    pub fn kind(&self) -> StyleKind {
        match self {
            Style::Regular(_) => StyleKind::Regular,
            Style::Chains(_) => StyleKind::Chains,
            Style::FeverTime(_) => StyleKind::FeverTime,
            Style::DoublesSame(_) => StyleKind::DoublesSame,
            Style::SimpleObstacle(_) => StyleKind::SimpleObstacle,
        }
    }

    /// Chance, rolled every beat, that the orchestrator switches style.
    pub fn change_probability(&self) -> f64 {
        match self {
            Style::FeverTime(_) => 0.2,
            Style::SimpleObstacle(wall) => {
                if wall.end_reached {
                    1.0
                } else {
                    0.0
                }
            }
            _ => 0.1,
        }
    }

    pub fn uses_visibility_filter(&self) -> bool {
        true
    }

    pub fn visibility_filter_seconds(&self) -> f64 {
        match self {
            Style::SimpleObstacle(_) => 0.25,
            _ => 0.75,
        }
    }

    /// Narrow the expanded candidate lists to what this style may place now.
    pub fn filter(
        &mut self,
        ctx: &BeatContext,
        left: Vec<Note>,
        right: Vec<Note>,
        last_left: &Note,
        last_right: &Note,
    ) -> (Vec<Note>, Vec<Note>) {
        match self {
            Style::Regular(alt) => alt.filter(left, right, last_left, last_right),
            Style::Chains(chain) => chain.filter(ctx, left, right, last_left, last_right),
            Style::FeverTime(halving) | Style::DoublesSame(halving) => {
                if halving.skip(ctx.seconds_since_last_note) {
                    (Vec::new(), Vec::new())
                } else {
                    (left, right)
                }
            }
            Style::SimpleObstacle(wall) => wall.filter(ctx, left, right, last_left, last_right),
        }
    }

    pub fn choose<R: Rng + ?Sized>(&mut self, rng: &mut R, left: &[Note], right: &[Note]) -> Choice {
        match self {
            Style::Regular(alt) => alt.choose(rng, left, right),
            Style::Chains(_) => Choice {
                left: left.choose(rng).copied(),
                right: right.choose(rng).copied(),
                ..Choice::default()
            },
            Style::FeverTime(_) => choose_fever(rng, left, right),
            Style::DoublesSame(_) => choose_doubles(rng, left, right),
            Style::SimpleObstacle(wall) => {
                let mut choice = wall.regular.choose(rng, left, right);
                if wall.started && !wall.registered {
                    wall.registered = true;
                    choice.obstacles = wall.walls.clone();
                }
                choice
            }
        }
    }
}

fn hand_after(last_left: &Note, last_right: &Note) -> Hand {
    if last_left.time < last_right.time {
        Hand::Left
    } else {
        Hand::Right
    }
}

fn keep_hand(hand: Hand, left: Vec<Note>, right: Vec<Note>) -> (Vec<Note>, Vec<Note>) {
    match hand {
        Hand::Left => (left, Vec::new()),
        Hand::Right => (Vec::new(), right),
    }
}

/// Strict left/right alternation, seeded from whichever hand fired last.
#[derive(Clone, Debug, Default)]
pub struct Alternation {
    next: Option<Hand>,
}

impl Alternation {
    fn filter(
        &mut self,
        left: Vec<Note>,
        right: Vec<Note>,
        last_left: &Note,
        last_right: &Note,
    ) -> (Vec<Note>, Vec<Note>) {
        let hand = *self.next.get_or_insert_with(|| hand_after(last_left, last_right));
        keep_hand(hand, left, right)
    }

    // The turn passes only once a note is actually placed.
    fn choose<R: Rng + ?Sized>(&mut self, rng: &mut R, left: &[Note], right: &[Note]) -> Choice {
        let choice = Choice {
            left: left.choose(rng).copied(),
            right: right.choose(rng).copied(),
            ..Choice::default()
        };
        if let Some(placed) = choice.left.or(choice.right) {
            self.next = Some(placed.hand.other());
        }
        choice
    }
}

/// Drops every other beat while beats are less than a second apart.
#[derive(Clone, Debug)]
pub struct Halving {
    skip_next: bool,
}

impl Default for Halving {
    fn default() -> Self {
        Self { skip_next: true }
    }
}

impl Halving {
    fn skip(&mut self, seconds_since_last_note: f32) -> bool {
        if seconds_since_last_note > 1.0 {
            self.skip_next = false;
            return false;
        }
        let skip = self.skip_next;
        self.skip_next = !skip;
        skip
    }
}

/// One hand for a run of 3-5 placements, then the other.
#[derive(Clone, Debug)]
pub struct ChainState {
    target_length: i32,
    length: i32,
    hand: Hand,
    halving: Halving,
}

impl ChainState {
    fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            target_length: rng.gen_range(3..=5),
            length: -1,
            hand: Hand::Left,
            halving: Halving::default(),
        }
    }

    fn filter(
        &mut self,
        ctx: &BeatContext,
        left: Vec<Note>,
        right: Vec<Note>,
        last_left: &Note,
        last_right: &Note,
    ) -> (Vec<Note>, Vec<Note>) {
        if self.halving.skip(ctx.seconds_since_last_note) {
            return (Vec::new(), Vec::new());
        }
        if self.length < 0 {
            self.hand = hand_after(last_left, last_right);
        }
        self.length += 1;
        if self.length == self.target_length {
            self.length = 0;
            self.hand = self.hand.other();
        }
        keep_hand(self.hand, left, right)
    }
}

/// Both hands at once, direction left free, the second note one cell away
/// from the first so a single swing reaches both.
fn choose_fever<R: Rng + ?Sized>(rng: &mut R, left: &[Note], right: &[Note]) -> Choice {
    let Some(first) = left.choose(rng).copied() else {
        return Choice::default();
    };
    let reachable: Vec<&Note> = right
        .iter()
        .filter(|n| n.position.manhattan(first.position) == 1)
        .collect();
    let Some(second) = reachable.choose(rng).map(|n| **n) else {
        return Choice::default();
    };
    Choice {
        left: Some(Note {
            cut_direction: CutDirection::Any,
            ..first
        }),
        right: Some(Note {
            cut_direction: CutDirection::Any,
            ..second
        }),
        ..Choice::default()
    }
}

/// First pair (in random order) that shares a cut direction and sits side by
/// side across that direction.
fn choose_doubles<R: Rng + ?Sized>(rng: &mut R, left: &[Note], right: &[Note]) -> Choice {
    let mut left = left.to_vec();
    let mut right = right.to_vec();
    left.shuffle(rng);
    right.shuffle(rng);

    for a in &left {
        for b in &right {
            if is_double(a, b) {
                return Choice {
                    left: Some(*a),
                    right: Some(*b),
                    ..Choice::default()
                };
            }
        }
    }
    Choice::default()
}

fn is_double(a: &Note, b: &Note) -> bool {
    if a.cut_direction != b.cut_direction || a.position == b.position {
        return false;
    }
    let columns = a.position.horizontal.column().abs_diff(b.position.horizontal.column());
    let layers = a.position.vertical.layer().abs_diff(b.position.vertical.layer());
    if a.cut_direction.is_vertical() {
        layers == 0 && columns == 1
    } else if a.cut_direction.is_horizontal() {
        columns == 0 && layers == 1
    } else {
        false
    }
}

/// The six preset wall arrangements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WallLayout {
    LeftSingle,
    LeftDouble,
    RightSingle,
    RightDouble,
    HalfHeight,
    Dual,
}

impl WallLayout {
    pub const ALL: [WallLayout; 6] = [
        WallLayout::LeftSingle,
        WallLayout::LeftDouble,
        WallLayout::RightSingle,
        WallLayout::RightDouble,
        WallLayout::HalfHeight,
        WallLayout::Dual,
    ];

    fn walls(self, duration: f32) -> Vec<Obstacle> {
        use HorizontalPosition as H;
        let wall = |horizontal_position, width, obstacle_type| Obstacle {
            horizontal_position,
            width,
            obstacle_type,
            time: 0.0,
            duration,
        };
        match self {
            WallLayout::LeftSingle => vec![wall(H::Left, 1, ObstacleType::WallFullHeight)],
            WallLayout::LeftDouble => vec![wall(H::Left, 2, ObstacleType::WallFullHeight)],
            WallLayout::RightSingle => vec![wall(H::Right, 1, ObstacleType::WallFullHeight)],
            WallLayout::RightDouble => vec![wall(H::CenterRight, 2, ObstacleType::WallFullHeight)],
            WallLayout::HalfHeight => vec![wall(H::Left, 4, ObstacleType::WallHalfHeight)],
            WallLayout::Dual => vec![
                wall(H::Left, 1, ObstacleType::WallFullHeight),
                wall(H::Right, 1, ObstacleType::WallFullHeight),
            ],
        }
    }

    /// Whether `note` is unplayable while this layout's walls are up.
    pub fn blocks(self, note: &Note) -> bool {
        use HorizontalPosition as H;
        let h = note.position.horizontal;
        let straight = matches!(
            note.cut_direction,
            CutDirection::Up | CutDirection::Down | CutDirection::Any
        );
        match self {
            WallLayout::LeftSingle => h == H::Left || (h == H::CenterLeft && !straight),
            WallLayout::RightSingle => h == H::Right || (h == H::CenterRight && !straight),
            WallLayout::LeftDouble => {
                matches!(h, H::Left | H::CenterLeft)
                    || !straight
                    || (h == H::CenterRight && note.hand == Hand::Right)
                    || (h == H::Right && note.hand == Hand::Left)
            }
            WallLayout::RightDouble => {
                matches!(h, H::Right | H::CenterRight)
                    || !straight
                    || (h == H::Left && note.hand == Hand::Right)
                    || (h == H::CenterLeft && note.hand == Hand::Left)
            }
            WallLayout::HalfHeight => {
                note.position.vertical == VerticalPosition::Top
                    || !matches!(
                        note.cut_direction,
                        CutDirection::Left | CutDirection::Right | CutDirection::Any
                    )
            }
            WallLayout::Dual => {
                matches!(h, H::Left | H::Right)
                    || !straight
                    || (h == H::CenterLeft && note.hand == Hand::Right)
                    || (h == H::CenterRight && note.hand == Hand::Left)
            }
        }
    }
}

/// Regular play around a single wall placement.
#[derive(Clone, Debug)]
pub struct WallState {
    layout: WallLayout,
    walls: Vec<Obstacle>,
    regular: Alternation,
    started: bool,
    registered: bool,
    end_reached: bool,
}

impl WallState {
    fn new(layout: WallLayout, duration: f32) -> Self {
        Self {
            layout,
            walls: layout.walls(duration),
            regular: Alternation::default(),
            started: false,
            registered: false,
            end_reached: false,
        }
    }

    pub fn layout(&self) -> WallLayout {
        self.layout
    }

    fn filter(
        &mut self,
        ctx: &BeatContext,
        left: Vec<Note>,
        right: Vec<Note>,
        last_left: &Note,
        last_right: &Note,
    ) -> (Vec<Note>, Vec<Note>) {
        if !self.started {
            // leave a gap after the previous note before the wall appears
            if ctx.seconds_since_last_note < 0.5 {
                return (Vec::new(), Vec::new());
            }
            self.started = true;
            for wall in self.walls.iter_mut() {
                wall.time = ctx.time;
            }
        } else if let Some(wall) = self.walls.first() {
            if ctx.time > wall.time + wall.duration {
                self.end_reached = true;
            }
        }
        if self.end_reached {
            return (Vec::new(), Vec::new());
        }

        let (mut left, mut right) = self.regular.filter(left, right, last_left, last_right);
        let layout = self.layout;
        left.retain(|n| !layout.blocks(n));
        right.retain(|n| !layout.blocks(n));
        (left, right)
    }
}
