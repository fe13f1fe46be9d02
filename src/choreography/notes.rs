use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn other(self) -> Self {
        match self {
            Hand::Left => Hand::Right,
            Hand::Right => Hand::Left,
        }
    }
}

/// Swing direction of an emitted note. `Any` leaves the choice to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CutDirection {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    Any,
}

impl CutDirection {
    /// The pattern-table key for this cut, if it has one.
    pub fn direction(self) -> Option<Direction> {
        match self {
            CutDirection::Up => Some(Direction::Up),
            CutDirection::UpRight => Some(Direction::UpRight),
            CutDirection::Right => Some(Direction::Right),
            CutDirection::DownRight => Some(Direction::DownRight),
            CutDirection::Down => Some(Direction::Down),
            CutDirection::DownLeft => Some(Direction::DownLeft),
            CutDirection::Left => Some(Direction::Left),
            CutDirection::UpLeft => Some(Direction::UpLeft),
            CutDirection::Any => None,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, CutDirection::Up | CutDirection::Down)
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, CutDirection::Left | CutDirection::Right)
    }
}

/// The eight compass directions a pattern table is keyed by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

impl Direction {
    /// Authoring order of the eight entries in every pattern table.
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::UpRight,
        Direction::Right,
        Direction::DownRight,
        Direction::Down,
        Direction::DownLeft,
        Direction::Left,
        Direction::UpLeft,
    ];

    pub const CARDINAL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Left/right reflection; vertical directions are unchanged.
    pub fn mirrored(self) -> Self {
        match self {
            Direction::Up => Direction::Up,
            Direction::UpRight => Direction::UpLeft,
            Direction::Right => Direction::Left,
            Direction::DownRight => Direction::DownLeft,
            Direction::Down => Direction::Down,
            Direction::DownLeft => Direction::DownRight,
            Direction::Left => Direction::Right,
            Direction::UpLeft => Direction::UpRight,
        }
    }

    pub fn cut(self) -> CutDirection {
        match self {
            Direction::Up => CutDirection::Up,
            Direction::UpRight => CutDirection::UpRight,
            Direction::Right => CutDirection::Right,
            Direction::DownRight => CutDirection::DownRight,
            Direction::Down => CutDirection::Down,
            Direction::DownLeft => CutDirection::DownLeft,
            Direction::Left => CutDirection::Left,
            Direction::UpLeft => CutDirection::UpLeft,
        }
    }

    /// Key used in the pattern-table asset.
    pub fn key(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::UpRight => "up_right",
            Direction::Right => "right",
            Direction::DownRight => "down_right",
            Direction::Down => "down",
            Direction::DownLeft => "down_left",
            Direction::Left => "left",
            Direction::UpLeft => "up_left",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalPosition {
    Left,
    CenterLeft,
    CenterRight,
    Right,
}

impl HorizontalPosition {
    pub const ALL: [HorizontalPosition; 4] = [
        HorizontalPosition::Left,
        HorizontalPosition::CenterLeft,
        HorizontalPosition::CenterRight,
        HorizontalPosition::Right,
    ];

    pub fn column(self) -> usize {
        self as usize
    }

    pub fn mirrored(self) -> Self {
        Self::ALL[3 - self.column()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalPosition {
    Bottom,
    Middle,
    Top,
}

impl VerticalPosition {
    pub const ALL: [VerticalPosition; 3] = [
        VerticalPosition::Bottom,
        VerticalPosition::Middle,
        VerticalPosition::Top,
    ];

    pub fn layer(self) -> usize {
        self as usize
    }

    /// Grid row, counted from the top.
    pub fn row(self) -> usize {
        2 - self.layer()
    }

    pub fn from_row(row: usize) -> Option<Self> {
        match row {
            0 => Some(VerticalPosition::Top),
            1 => Some(VerticalPosition::Middle),
            2 => Some(VerticalPosition::Bottom),
            _ => None,
        }
    }
}

/// One of the twelve cells of the 4x3 note grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct NotePosition {
    pub horizontal: HorizontalPosition,
    pub vertical: VerticalPosition,
}

impl NotePosition {
    pub const fn new(horizontal: HorizontalPosition, vertical: VerticalPosition) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// All cells in row-major order from the top-left.
    pub fn all() -> impl Iterator<Item = NotePosition> {
        (0..3).flat_map(|row| {
            HorizontalPosition::ALL.into_iter().map(move |h| NotePosition {
                horizontal: h,
                vertical: VerticalPosition::ALL[2 - row],
            })
        })
    }

    pub fn mirrored(self) -> Self {
        Self {
            horizontal: self.horizontal.mirrored(),
            vertical: self.vertical,
        }
    }

    pub fn manhattan(self, other: NotePosition) -> usize {
        self.horizontal.column().abs_diff(other.horizontal.column())
            + self.vertical.layer().abs_diff(other.vertical.layer())
    }

    /// Key used in the pattern-table asset, e.g. `middle_center_left`.
    pub fn key(self) -> String {
        let row = match self.vertical {
            VerticalPosition::Top => "top",
            VerticalPosition::Middle => "middle",
            VerticalPosition::Bottom => "bottom",
        };
        let column = match self.horizontal {
            HorizontalPosition::Left => "left",
            HorizontalPosition::CenterLeft => "center_left",
            HorizontalPosition::CenterRight => "center_right",
            HorizontalPosition::Right => "right",
        };
        format!("{}_{}", row, column)
    }
}

/// A placed note. `time` is measured in beats.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Note {
    pub time: f32,
    pub hand: Hand,
    pub cut_direction: CutDirection,
    pub position: NotePosition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleType {
    WallFullHeight,
    WallHalfHeight,
}

/// A wall spanning `width` columns from `horizontal_position`; times in beats.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Obstacle {
    pub horizontal_position: HorizontalPosition,
    pub width: u8,
    pub obstacle_type: ObstacleType,
    pub time: f32,
    pub duration: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_distinct_cells() {
        let cells: Vec<NotePosition> = NotePosition::all().collect();
        assert_eq!(cells.len(), 12);
        assert_eq!(cells[0].key(), "top_left");
        assert_eq!(cells[11].key(), "bottom_right");
        for (i, a) in cells.iter().enumerate() {
            for b in &cells[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn mirror_is_an_involution() {
        for d in Direction::ALL {
            assert_eq!(d.mirrored().mirrored(), d);
        }
        for p in NotePosition::all() {
            assert_eq!(p.mirrored().mirrored(), p);
            assert_eq!(p.mirrored().vertical, p.vertical);
        }
        assert_eq!(Direction::UpRight.mirrored(), Direction::UpLeft);
        assert_eq!(
            HorizontalPosition::CenterLeft.mirrored(),
            HorizontalPosition::CenterRight
        );
    }

    #[test]
    fn manhattan_distance() {
        use HorizontalPosition as H;
        use VerticalPosition as V;
        let a = NotePosition::new(H::Left, V::Middle);
        assert_eq!(a.manhattan(NotePosition::new(H::CenterLeft, V::Middle)), 1);
        assert_eq!(a.manhattan(NotePosition::new(H::Left, V::Top)), 1);
        assert_eq!(a.manhattan(NotePosition::new(H::CenterLeft, V::Top)), 2);
        assert_eq!(a.manhattan(NotePosition::new(H::Right, V::Bottom)), 4);
    }

    #[test]
    fn rows_count_from_top() {
        assert_eq!(VerticalPosition::Top.row(), 0);
        assert_eq!(VerticalPosition::Bottom.row(), 2);
        for v in VerticalPosition::ALL {
            assert_eq!(VerticalPosition::from_row(v.row()), Some(v));
        }
        assert_eq!(VerticalPosition::from_row(3), None);
    }

    #[test]
    fn any_has_no_table_key() {
        assert_eq!(CutDirection::Any.direction(), None);
        for d in Direction::ALL {
            assert_eq!(d.cut().direction(), Some(d));
        }
    }
}
