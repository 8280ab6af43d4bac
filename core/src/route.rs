//! Tile layer input and the ordered route enemies traverse.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{CellCoord, TileGrid};

/// Tile index that marks an empty cell.
pub const EMPTY_TILE: u32 = 0;

/// Role a waypoint plays within the route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaypointKind {
    /// Spawn point of the route.
    Start,
    /// Plain path tile.
    Path,
    /// Path tile authored as a corner.
    Turn,
    /// Base position at the end of the route.
    End,
}

/// Single point along the route.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    /// World-space centre of the tile that produced the waypoint.
    pub position: Vec2,
    /// Grid cell that produced the waypoint.
    pub cell: CellCoord,
    /// Role of the waypoint.
    pub kind: WaypointKind,
}

impl Waypoint {
    /// Creates a waypoint from its components.
    #[must_use]
    pub const fn new(position: Vec2, cell: CellCoord, kind: WaypointKind) -> Self {
        Self {
            position,
            cell,
            kind,
        }
    }
}

/// Mapping from tile indices to waypoint roles.
///
/// Index `0` is always empty; any other index not listed here is a plain path
/// tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tileset {
    /// Tile index marking the spawn point.
    pub start: u32,
    /// Tile index marking the base.
    pub end: u32,
    /// Tile indices authored as corners.
    pub turns: Vec<u32>,
}

impl Default for Tileset {
    fn default() -> Self {
        Self {
            start: 2,
            end: 3,
            turns: vec![4],
        }
    }
}

impl Tileset {
    /// Classifies a tile index, returning `None` for empty tiles.
    #[must_use]
    pub fn classify(&self, tile: u32) -> Option<WaypointKind> {
        if tile == EMPTY_TILE {
            None
        } else if tile == self.start {
            Some(WaypointKind::Start)
        } else if tile == self.end {
            Some(WaypointKind::End)
        } else if self.turns.contains(&tile) {
            Some(WaypointKind::Turn)
        } else {
            Some(WaypointKind::Path)
        }
    }
}

/// Grid of tile indices describing where the path runs.
#[derive(Clone, Debug, PartialEq)]
pub struct TileLayer {
    grid: TileGrid,
    tiles: Vec<u32>,
}

impl TileLayer {
    /// Creates a tile layer from row-major tile indices.
    ///
    /// Missing trailing tiles read as empty; surplus tiles are ignored.
    #[must_use]
    pub fn new(grid: TileGrid, tiles: Vec<u32>) -> Self {
        Self { grid, tiles }
    }

    /// Builds a tile layer from nested rows, each row listing its columns.
    #[must_use]
    pub fn from_rows(tile_length: f32, rows: &[Vec<u32>]) -> Self {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut tiles = Vec::with_capacity(columns * rows.len());
        for row in rows {
            tiles.extend(row.iter().copied());
            tiles.extend(std::iter::repeat(EMPTY_TILE).take(columns - row.len()));
        }
        let grid = TileGrid::new(columns as u32, rows.len() as u32, tile_length);
        Self { grid, tiles }
    }

    /// Dimensions of the layer.
    #[must_use]
    pub const fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Tile index stored at the provided cell.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> u32 {
        if !self.grid.contains_cell(cell) {
            return EMPTY_TILE;
        }
        let index = cell.row() as usize * self.grid.columns() as usize + cell.column() as usize;
        self.tiles.get(index).copied().unwrap_or(EMPTY_TILE)
    }

    /// Iterates over every cell in row-major order with its tile index.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, u32)> + '_ {
        let columns = self.grid.columns();
        (0..self.grid.rows()).flat_map(move |row| {
            (0..columns).map(move |column| {
                let cell = CellCoord::new(column, row);
                (cell, self.tile(cell))
            })
        })
    }
}

/// Ordered, deduplicated sequence of waypoints from spawn point to base.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Route {
    waypoints: Vec<Waypoint>,
    cumulative: Vec<f32>,
}

impl Route {
    /// Creates a route from already ordered waypoints.
    #[must_use]
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        let mut cumulative = Vec::with_capacity(waypoints.len());
        let mut travelled = 0.0;
        let mut previous: Option<Vec2> = None;
        for waypoint in &waypoints {
            if let Some(previous) = previous {
                travelled += previous.distance(waypoint.position);
            }
            cumulative.push(travelled);
            previous = Some(waypoint.position);
        }
        Self {
            waypoints,
            cumulative,
        }
    }

    /// Creates a route without waypoints.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reports whether the route has no waypoint.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Number of waypoints along the route.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Waypoints in traversal order.
    #[must_use]
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Position enemies spawn at.
    #[must_use]
    pub fn spawn_point(&self) -> Option<Vec2> {
        self.waypoints.first().map(|waypoint| waypoint.position)
    }

    /// Position of the base enemies try to reach.
    #[must_use]
    pub fn base_position(&self) -> Option<Vec2> {
        self.waypoints.last().map(|waypoint| waypoint.position)
    }

    /// Total length of the route in pixels.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Reports whether any waypoint was produced by the provided cell.
    #[must_use]
    pub fn contains_cell(&self, cell: CellCoord) -> bool {
        self.waypoints.iter().any(|waypoint| waypoint.cell == cell)
    }

    /// Position reached after travelling `progress` pixels along the route.
    ///
    /// Progress is clamped to `[0, length]`. Returns `None` for an empty route.
    #[must_use]
    pub fn point_at(&self, progress: f32) -> Option<Vec2> {
        let first = self.waypoints.first()?;
        let last = self.waypoints.last()?;

        if progress <= 0.0 {
            return Some(first.position);
        }
        if progress >= self.length() {
            return Some(last.position);
        }

        let upper = self
            .cumulative
            .partition_point(|travelled| *travelled <= progress);
        let lower = upper - 1;
        let span = self.cumulative[upper] - self.cumulative[lower];
        let t = (progress - self.cumulative[lower]) / span;
        let from = self.waypoints[lower].position;
        let to = self.waypoints[upper].position;
        Some(from.lerp(to, t))
    }
}
