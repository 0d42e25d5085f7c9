//! Toroidal multi-occupancy grid used as the spatial index for entities.
//!
//! The grid holds no behavior and owns no entities: each cell is a list of
//! [`EntityId`]s. Canonical records live in [`crate::store::EntityStore`],
//! which is the only code that mutates a `Grid`.

use crate::entity::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer cell coordinate, always normalized to `0 <= x < width`, `0 <= y < height`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Shape of the neighborhood used for movement
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Neighborhood {
    /// 8 surrounding cells at radius 1 (Chebyshev distance)
    #[default]
    Moore,
    /// 4 orthogonal cells at radius 1 (Manhattan distance)
    VonNeumann,
}

/// Toroidal lattice of cells, each holding zero or more entity ids
#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    /// cells[y * width + x] contains ids of entities at that position
    cells: Vec<Vec<EntityId>>,
}

impl Grid {
    /// Create an empty grid. Both dimensions must be non-zero.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be non-zero");
        Self {
            width,
            height,
            cells: vec![Vec::new(); width * height],
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

    /// Total number of cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Wrap arbitrary signed coordinates onto the torus
    #[inline]
    pub fn wrap(&self, x: i64, y: i64) -> Position {
        Position {
            x: x.rem_euclid(self.width as i64) as usize,
            y: y.rem_euclid(self.height as i64) as usize,
        }
    }

    /// Normalize a position whose coordinates may exceed the grid extents
    #[inline]
    pub fn normalize(&self, pos: Position) -> Position {
        Position {
            x: pos.x % self.width,
            y: pos.y % self.height,
        }
    }

    /// Offset a position by `(dx, dy)` with wraparound
    #[inline]
    pub fn offset(&self, pos: Position, dx: i64, dy: i64) -> Position {
        self.wrap(pos.x as i64 + dx, pos.y as i64 + dy)
    }

    #[inline]
    fn index(&self, pos: Position) -> usize {
        let pos = self.normalize(pos);
        pos.y * self.width + pos.x
    }

    /// Insert an entity id into the occupant list of `pos`
    pub(crate) fn place(&mut self, id: EntityId, pos: Position) {
        let idx = self.index(pos);
        self.cells[idx].push(id);
    }

    /// Remove an entity id from the occupant list of `pos`.
    /// Returns false if the id was not there.
    pub(crate) fn remove(&mut self, id: EntityId, pos: Position) -> bool {
        let idx = self.index(pos);
        let cell = &mut self.cells[idx];
        match cell.iter().position(|&occupant| occupant == id) {
            Some(i) => {
                cell.swap_remove(i);
                true
            }
            None => false,
        }
    }

    /// Move an entity id from one cell to another
    pub(crate) fn move_to(&mut self, id: EntityId, from: Position, to: Position) -> bool {
        if !self.remove(id, from) {
            return false;
        }
        self.place(id, to);
        true
    }

    /// Ids of all entities at `pos`, in no particular order
    #[inline]
    pub fn occupants(&self, pos: Position) -> &[EntityId] {
        &self.cells[self.index(pos)]
    }

    /// Iterate over every position in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    /// Positions around `pos` within `radius`, wrapped toroidally.
    ///
    /// Scan order is row-major over the offset square (`dy` outer, `dx` inner).
    /// Radii larger than the grid are clamped to its extents, so every cell
    /// appears at most once.
    pub fn neighborhood(
        &self,
        pos: Position,
        kind: Neighborhood,
        radius: usize,
        include_center: bool,
    ) -> Vec<Position> {
        let pos = self.normalize(pos);
        let (x_min, x_max) = Self::offset_range(radius, self.width);
        let (y_min, y_max) = Self::offset_range(radius, self.height);
        let mut result = Vec::with_capacity(((x_max - x_min + 1) * (y_max - y_min + 1)) as usize);

        for dy in y_min..=y_max {
            for dx in x_min..=x_max {
                if kind == Neighborhood::VonNeumann && dx.abs() + dy.abs() > radius as i64 {
                    continue;
                }
                if !include_center && dx == 0 && dy == 0 {
                    continue;
                }
                result.push(self.offset(pos, dx, dy));
            }
        }

        result
    }

    /// Offsets along one axis of length `extent`. When the clamped span would
    /// wrap onto itself (`2r + 1 > extent`) the last offset is dropped, since
    /// `+r` and `-r` then land on the same cell.
    fn offset_range(radius: usize, extent: usize) -> (i64, i64) {
        let r = radius.min(extent / 2) as i64;
        if 2 * r + 1 > extent as i64 {
            (-r, r - 1)
        } else {
            (-r, r)
        }
    }

    /// Manhattan distance on the torus (shortest way around on each axis)
    pub fn manhattan(&self, a: Position, b: Position) -> usize {
        let dx = a.x.abs_diff(b.x);
        let dy = a.y.abs_diff(b.y);
        dx.min(self.width - dx) + dy.min(self.height - dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_and_remove() {
        let mut grid = Grid::new(10, 10);
        let pos = Position::new(3, 4);
        grid.place(1, pos);
        grid.place(2, pos);
        grid.place(3, Position::new(4, 4));

        assert_eq!(grid.occupants(pos).len(), 2);
        assert!(grid.remove(1, pos));
        assert!(!grid.remove(1, pos));
        assert_eq!(grid.occupants(pos), &[2]);
        assert_eq!(grid.occupants(Position::new(4, 4)), &[3]);
    }

    #[test]
    fn test_move_to() {
        let mut grid = Grid::new(5, 5);
        let from = Position::new(0, 0);
        let to = Position::new(4, 4);
        grid.place(7, from);

        assert!(grid.move_to(7, from, to));
        assert!(grid.occupants(from).is_empty());
        assert_eq!(grid.occupants(to), &[7]);

        // Not in the source cell anymore
        assert!(!grid.move_to(7, from, to));
    }

    #[test]
    fn test_wrap() {
        let grid = Grid::new(10, 8);
        assert_eq!(grid.wrap(-1, -1), Position::new(9, 7));
        assert_eq!(grid.wrap(10, 8), Position::new(0, 0));
        assert_eq!(grid.offset(Position::new(9, 0), 1, -1), Position::new(0, 7));
    }

    #[test]
    fn test_moore_neighborhood_wraps() {
        let grid = Grid::new(10, 10);
        let around = grid.neighborhood(Position::new(0, 0), Neighborhood::Moore, 1, false);

        assert_eq!(around.len(), 8);
        assert!(around.contains(&Position::new(9, 9)));
        assert!(around.contains(&Position::new(1, 1)));
        assert!(!around.contains(&Position::new(0, 0)));
    }

    #[test]
    fn test_von_neumann_neighborhood() {
        let grid = Grid::new(10, 10);
        let around = grid.neighborhood(Position::new(5, 5), Neighborhood::VonNeumann, 1, true);

        assert_eq!(around.len(), 5);
        assert!(around.contains(&Position::new(5, 5)));
        assert!(around.contains(&Position::new(4, 5)));
        assert!(!around.contains(&Position::new(4, 4)));
    }

    #[test]
    fn test_radius_clamped_to_extents() {
        let grid = Grid::new(3, 3);
        let around = grid.neighborhood(Position::new(1, 1), Neighborhood::Moore, 10, true);
        assert_eq!(around.len(), 9);

        let around = grid.neighborhood(Position::new(1, 1), Neighborhood::Moore, 10, false);
        assert_eq!(around.len(), 8);
    }

    #[test]
    fn test_neighborhood_on_even_width_has_no_duplicates() {
        let grid = Grid::new(4, 4);
        let around = grid.neighborhood(Position::new(0, 0), Neighborhood::Moore, 2, true);
        assert_eq!(around.len(), 16);
    }

    #[test]
    fn test_neighborhood_unique_on_every_small_grid() {
        for width in 1..=6 {
            for height in 1..=6 {
                let grid = Grid::new(width, height);
                for radius in 0..=4 {
                    let mut around =
                        grid.neighborhood(Position::new(0, 0), Neighborhood::Moore, radius, true);
                    let found = around.len();
                    around.sort();
                    around.dedup();
                    assert_eq!(around.len(), found, "{}x{} r={}", width, height, radius);

                    let span = |extent: usize| (2 * radius + 1).min(extent);
                    assert_eq!(found, span(width) * span(height));
                }
            }
        }
    }

    #[test]
    fn test_single_cell_grid_has_no_neighbors() {
        let grid = Grid::new(1, 1);
        assert!(grid
            .neighborhood(Position::new(0, 0), Neighborhood::Moore, 1, false)
            .is_empty());
    }

    #[test]
    fn test_toroidal_manhattan() {
        let grid = Grid::new(10, 10);
        assert_eq!(grid.manhattan(Position::new(0, 0), Position::new(9, 9)), 2);
        assert_eq!(grid.manhattan(Position::new(2, 3), Position::new(5, 3)), 3);
    }
}
