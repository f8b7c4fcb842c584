use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::Position;

/// Represents errors that can occur within the grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Coordinates ({x}, {y}) are out of bounds for grid size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// A fixed-size 2D grid.
///
/// Stores elements of type `T` in a flat vector using row-major order, so
/// iteration visits `(0, 0), (1, 0), ..., (0, 1), ...`, which matches the
/// ordering of [`Position`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a new grid with the specified dimensions, filled with default values.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Self
    where
        T: Default + Clone,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        Grid {
            width,
            height,
            cells: vec![T::default(); size],
        }
    }

    /// Creates a new grid whose cells are produced by `f`, called once per
    /// position in row-major order.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn from_generator<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(Position) -> T,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        let mut cells = Vec::with_capacity(size);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(Position { x, y }));
            }
        }
        Grid {
            width,
            height,
            cells,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index_of(&self, pos: Position) -> Option<usize> {
        self.contains(pos).then(|| pos.y * self.width + pos.x)
    }

    /// Checks if the given position lies within the grid boundaries.
    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Returns `None` if the position is out of bounds.
    pub fn get(&self, pos: Position) -> Option<&T> {
        self.index_of(pos).map(|index| &self.cells[index])
    }

    /// Returns `None` if the position is out of bounds.
    pub fn get_mut(&mut self, pos: Position) -> Option<&mut T> {
        let index = self.index_of(pos)?;
        self.cells.get_mut(index)
    }

    /// Sets the value of the cell at `pos`.
    pub fn set(&mut self, pos: Position, value: T) -> Result<(), GridError> {
        let index = self.index_of(pos).ok_or(GridError::OutOfBounds {
            x: pos.x,
            y: pos.y,
            width: self.width,
            height: self.height,
        })?;
        self.cells[index] = value;
        Ok(())
    }

    /// Every position of the grid in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<T> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Position { x, y }))
    }

    /// Returns an iterator that yields `(Position, &T)` for each cell.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            (
                Position {
                    x: index % width,
                    y: index / width,
                },
                cell,
            )
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }
}

impl<T> Index<Position> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, pos: Position) -> &Self::Output {
        match self.index_of(pos) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                pos.x, pos.y, self.width, self.height
            ),
        }
    }
}

impl<T> IndexMut<Position> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, pos: Position) -> &mut Self::Output {
        let (width, height) = (self.width, self.height);
        match self.index_of(pos) {
            Some(idx) => &mut self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                pos.x, pos.y, width, height
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_fills_row_major() {
        let grid = Grid::from_generator(3, 2, |pos| pos.y * 10 + pos.x);
        assert_eq!(grid.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 10, 11, 12]);
        assert_eq!(grid[Position::new(2, 1)], 12);
    }

    #[test]
    fn positions_match_enumerate() {
        let grid: Grid<u8> = Grid::new(4, 3);
        let from_positions: Vec<_> = grid.positions().collect();
        let from_enumerate: Vec<_> = grid.enumerate().map(|(pos, _)| pos).collect();
        assert_eq!(from_positions, from_enumerate);
        assert_eq!(from_positions.len(), 12);
    }

    #[test]
    fn out_of_bounds_access_is_reported() {
        let mut grid: Grid<bool> = Grid::new(2, 2);
        assert!(grid.get(Position::new(2, 0)).is_none());
        assert_eq!(
            grid.set(Position::new(0, 5), true),
            Err(GridError::OutOfBounds {
                x: 0,
                y: 5,
                width: 2,
                height: 2
            })
        );
        assert!(grid.set(Position::new(1, 1), true).is_ok());
        assert_eq!(grid.get(Position::new(1, 1)), Some(&true));
    }
}
