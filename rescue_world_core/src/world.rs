//! Spatial and hazard state of the building.
//!
//! [`GridWorld`] is plain state plus queries. It has no behaviour of its own:
//! agents, the POI manager and the fire engine mutate it through the narrow
//! operations below. Every query accepts any position; positions outside the
//! grid are simply "nothing there" and mutations on them are no-ops.

use std::collections::{BTreeMap, BTreeSet};

use bitflags::bitflags;

use crate::{Direction, Position, layout::Layout, map::Grid, poi::PoiKind};

bitflags! {
    /// Wall descriptor of a cell, one bit per side.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Walls: u8 {
        const UP = 0b0001;
        const LEFT = 0b0010;
        const DOWN = 0b0100;
        const RIGHT = 0b1000;
    }
}

impl Walls {
    pub fn side(direction: Direction) -> Walls {
        match direction {
            Direction::Up => Walls::UP,
            Direction::Left => Walls::LEFT,
            Direction::Down => Walls::DOWN,
            Direction::Right => Walls::RIGHT,
        }
    }

    /// Parses a four digit wall code such as `1001` (up, left, down, right).
    pub fn from_code(code: &str) -> Option<Walls> {
        if code.len() != 4 {
            return None;
        }
        let mut walls = Walls::empty();
        for (direction, digit) in Direction::ALL.into_iter().zip(code.chars()) {
            match digit {
                '1' => walls |= Walls::side(direction),
                '0' => {}
                _ => return None,
            }
        }
        Some(walls)
    }

    /// One flag per side in up, left, down, right order.
    pub fn sides(self) -> [u8; 4] {
        Direction::ALL.map(|d| u8::from(self.contains(Walls::side(d))))
    }

    /// A cell enclosed on all four sides is not floor.
    pub fn is_floor(self) -> bool {
        !self.is_all()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    pub walls: Walls,
    pub discovered: bool,
}

impl Cell {
    pub fn is_floor(&self) -> bool {
        self.walls.is_floor()
    }
}

/// Static and dynamic spatial state of one simulation instance.
#[derive(Debug, Clone)]
pub struct GridWorld {
    cells: Grid<Cell>,
    fire: BTreeSet<Position>,
    smoke: BTreeSet<Position>,
    pois: BTreeMap<Position, PoiKind>,
    found_victims: BTreeSet<Position>,
    closed_doors: BTreeMap<Position, Direction>,
    open_doors: BTreeMap<Position, Direction>,
    entrances: BTreeSet<Position>,
}

impl GridWorld {
    /// An open floor plan: no walls, nothing discovered, no hazards.
    pub fn new(width: usize, height: usize) -> Self {
        GridWorld {
            cells: Grid::new(width, height),
            fire: BTreeSet::new(),
            smoke: BTreeSet::new(),
            pois: BTreeMap::new(),
            found_victims: BTreeSet::new(),
            closed_doors: BTreeMap::new(),
            open_doors: BTreeMap::new(),
            entrances: BTreeSet::new(),
        }
    }

    /// Seeds walls, POIs, fire, doors and entrances from a parsed layout.
    pub fn from_layout(layout: &Layout) -> Self {
        let mut world = GridWorld {
            cells: Grid::from_generator(layout.width(), layout.height(), |pos| Cell {
                walls: layout.walls[pos],
                discovered: false,
            }),
            ..GridWorld::new(0, 0)
        };
        for (pos, kind) in &layout.pois {
            world.insert_poi(*pos, *kind);
        }
        for pos in &layout.fires {
            world.ignite(*pos);
        }
        for (pos, facing) in &layout.doors {
            world.add_closed_door(*pos, *facing);
        }
        for pos in &layout.entrances {
            world.add_entrance(*pos);
        }
        world
    }

    pub fn width(&self) -> usize {
        self.cells.width()
    }

    pub fn height(&self) -> usize {
        self.cells.height()
    }

    pub fn cells(&self) -> &Grid<Cell> {
        &self.cells
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.cells.get(pos)
    }

    pub fn set_walls(&mut self, pos: Position, walls: Walls) {
        if let Some(cell) = self.cells.get_mut(pos) {
            cell.walls = walls;
        }
    }

    // ----- spatial queries -----

    pub fn is_valid_position(&self, pos: Position) -> bool {
        self.cells.contains(pos)
    }

    pub fn is_floor(&self, pos: Position) -> bool {
        self.cells.get(pos).is_some_and(Cell::is_floor)
    }

    pub fn is_discovered(&self, pos: Position) -> bool {
        self.cells.get(pos).is_some_and(|cell| cell.discovered)
    }

    /// Valid orthogonal neighbours of `pos`.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        pos.neighbors4().filter(|n| self.is_valid_position(*n))
    }

    pub fn has_discovered_neighbor(&self, pos: Position) -> bool {
        self.neighbors(pos).any(|n| self.is_discovered(n))
    }

    pub fn discover_cell(&mut self, pos: Position) {
        if let Some(cell) = self.cells.get_mut(pos) {
            cell.discovered = true;
        }
    }

    pub fn discover_neighbors4(&mut self, pos: Position) {
        for neighbor in pos.neighbors4() {
            self.discover_cell(neighbor);
        }
    }

    /// Discovers `pos` and its orthogonal neighbours.
    pub fn discover_around(&mut self, pos: Position) {
        self.discover_cell(pos);
        self.discover_neighbors4(pos);
    }

    /// Cost of entering `pos`: 2 through fire or smoke, 1 otherwise.
    pub fn movement_cost(&self, pos: Position) -> u32 {
        if self.has_fire(pos) || self.has_smoke(pos) {
            2
        } else {
            1
        }
    }

    /// Discovered floor cells in row-major order.
    pub fn discovered_floor_cells(&self) -> Vec<Position> {
        self.cells
            .enumerate()
            .filter(|(_, cell)| cell.discovered && cell.is_floor())
            .map(|(pos, _)| pos)
            .collect()
    }

    // ----- hazards -----

    pub fn has_fire(&self, pos: Position) -> bool {
        self.fire.contains(&pos)
    }

    pub fn has_smoke(&self, pos: Position) -> bool {
        self.smoke.contains(&pos)
    }

    pub fn fire(&self) -> &BTreeSet<Position> {
        &self.fire
    }

    pub fn smoke(&self) -> &BTreeSet<Position> {
        &self.smoke
    }

    /// Sets `pos` on fire, replacing any smoke. Returns `false` if it already burned.
    pub fn ignite(&mut self, pos: Position) -> bool {
        if !self.is_valid_position(pos) {
            return false;
        }
        self.smoke.remove(&pos);
        self.fire.insert(pos)
    }

    /// Adds smoke unless the cell is on fire.
    pub fn add_smoke(&mut self, pos: Position) -> bool {
        if !self.is_valid_position(pos) || self.has_fire(pos) {
            return false;
        }
        self.smoke.insert(pos)
    }

    /// Turns fire at `pos` into smoke.
    pub fn extinguish(&mut self, pos: Position) -> bool {
        if self.fire.remove(&pos) {
            self.smoke.insert(pos);
            true
        } else {
            false
        }
    }

    // ----- points of interest and found victims -----

    pub fn has_poi(&self, pos: Position) -> bool {
        self.pois.contains_key(&pos)
    }

    pub fn pois(&self) -> &BTreeMap<Position, PoiKind> {
        &self.pois
    }

    pub fn insert_poi(&mut self, pos: Position, kind: PoiKind) {
        if self.is_valid_position(pos) {
            self.pois.insert(pos, kind);
        }
    }

    pub fn remove_poi(&mut self, pos: Position) -> Option<PoiKind> {
        self.pois.remove(&pos)
    }

    pub fn has_found_victim(&self, pos: Position) -> bool {
        self.found_victims.contains(&pos)
    }

    pub fn found_victims(&self) -> &BTreeSet<Position> {
        &self.found_victims
    }

    pub fn place_found_victim(&mut self, pos: Position) -> bool {
        self.is_valid_position(pos) && self.found_victims.insert(pos)
    }

    pub fn remove_found_victim(&mut self, pos: Position) -> bool {
        self.found_victims.remove(&pos)
    }

    // ----- doors and entrances -----

    pub fn has_closed_door(&self, pos: Position) -> bool {
        self.closed_doors.contains_key(&pos)
    }

    pub fn closed_doors(&self) -> &BTreeMap<Position, Direction> {
        &self.closed_doors
    }

    pub fn open_doors(&self) -> &BTreeMap<Position, Direction> {
        &self.open_doors
    }

    /// Facing of the door at `pos`, open or closed. Presentation only.
    pub fn door_facing(&self, pos: Position) -> Option<Direction> {
        self.closed_doors
            .get(&pos)
            .or_else(|| self.open_doors.get(&pos))
            .copied()
    }

    pub fn add_closed_door(&mut self, pos: Position, facing: Direction) {
        if self.is_valid_position(pos) {
            self.open_doors.remove(&pos);
            self.closed_doors.insert(pos, facing);
        }
    }

    pub fn open_door(&mut self, pos: Position) -> bool {
        match self.closed_doors.remove(&pos) {
            Some(facing) => {
                self.open_doors.insert(pos, facing);
                true
            }
            None => false,
        }
    }

    pub fn is_entrance(&self, pos: Position) -> bool {
        self.entrances.contains(&pos)
    }

    pub fn entrances(&self) -> &BTreeSet<Position> {
        &self.entrances
    }

    pub fn add_entrance(&mut self, pos: Position) {
        if self.is_valid_position(pos) {
            self.entrances.insert(pos);
        }
    }

    pub fn nearest_entrance(&self, from: Position) -> Option<Position> {
        nearest(from, self.entrances.iter().copied())
    }
}

/// Closest candidate by manhattan distance. Ties keep the first candidate seen.
pub fn nearest(from: Position, candidates: impl IntoIterator<Item = Position>) -> Option<Position> {
    let mut best: Option<(usize, Position)> = None;
    for candidate in candidates {
        let distance = from.manhattan(&candidate);
        if best.is_none_or(|(min, _)| distance < min) {
            best = Some((distance, candidate));
        }
    }
    best.map(|(_, pos)| pos)
}
