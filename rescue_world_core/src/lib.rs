use serde::{Deserialize, Serialize};

pub mod agent;
pub mod config;
pub mod fire;
pub mod layout;
pub mod map;
pub mod outcome;
pub mod poi;
pub mod simulation;
pub mod snapshot;
pub mod world;

/// Unique identifier for rescue agents.
pub type EntityId = usize;

/// Represents a 2D coordinate.
///
/// Ordering is row-major (`y` first, then `x`), which fixes the iteration order
/// of every position set in the world and therefore every first-seen tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// Returns manhattan distance between two positions.
    pub fn manhattan(&self, other: &Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Moves one cell in `direction`, or `None` when that would underflow.
    /// The result is not bounds-checked against any grid.
    pub fn step(&self, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.delta();
        Some(Position {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }

    /// Orthogonal neighbours in up, left, down, right order.
    pub fn neighbors4(self) -> impl Iterator<Item = Position> {
        Direction::ALL.into_iter().filter_map(move |d| self.step(d))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

/// One of the four sides of a cell.
///
/// Used for wall sides and for the facing of a door. The discriminant matches
/// the digit position in a wall code (`up left down right`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up = 0,
    Left = 1,
    Down = 2,
    Right = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Down => (0, 1),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Left => Direction::Right,
            Direction::Down => Direction::Up,
            Direction::Right => Direction::Left,
        }
    }

    /// The side of `from` that faces `to`, if the two cells are orthogonally adjacent.
    pub fn between(from: Position, to: Position) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| from.step(*d) == Some(to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_order_row_major() {
        let mut positions = vec![
            Position::new(2, 0),
            Position::new(0, 1),
            Position::new(1, 0),
        ];
        positions.sort();
        assert_eq!(
            positions,
            vec![
                Position::new(1, 0),
                Position::new(2, 0),
                Position::new(0, 1)
            ]
        );
    }

    #[test]
    fn neighbors_skip_underflow() {
        let corner: Vec<_> = Position::new(0, 0).neighbors4().collect();
        assert_eq!(corner, vec![Position::new(0, 1), Position::new(1, 0)]);

        let inner: Vec<_> = Position::new(3, 3).neighbors4().collect();
        assert_eq!(
            inner,
            vec![
                Position::new(3, 2),
                Position::new(2, 3),
                Position::new(3, 4),
                Position::new(4, 3)
            ]
        );
    }

    #[test]
    fn direction_between_adjacent_cells() {
        let a = Position::new(2, 2);
        assert_eq!(Direction::between(a, Position::new(3, 2)), Some(Direction::Right));
        assert_eq!(Direction::between(a, Position::new(2, 1)), Some(Direction::Up));
        assert_eq!(Direction::between(a, Position::new(4, 2)), None);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
    }

    #[test]
    fn manhattan_is_symmetric() {
        let a = Position::new(1, 5);
        let b = Position::new(4, 2);
        assert_eq!(a.manhattan(&b), 6);
        assert_eq!(b.manhattan(&a), 6);
    }
}
