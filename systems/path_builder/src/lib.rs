#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns a tile layer into the ordered route enemies follow.
//!
//! Ordering is a greedy nearest-neighbour walk from the start tile. It is not
//! a shortest path: it assumes level designers lay tiles out roughly in path
//! order, and a start tile placed mid-corridor makes the route double back.
//! Maps without a start tile fall back to a row-major sweep.

use outpost_defence_core::{PathError, Route, TileLayer, Tileset, Waypoint, WaypointKind};
use tracing::debug;

const DEFAULT_DEDUP_THRESHOLD: f32 = 16.0;
const DEFAULT_ROW_TOLERANCE: f32 = 32.0;

/// Configuration parameters required to construct the path builder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    dedup_threshold: f32,
    row_tolerance: f32,
}

impl Config {
    /// Creates a configuration from explicit thresholds, both in pixels.
    ///
    /// `dedup_threshold` drops any waypoint closer than the threshold on both
    /// axes to an already kept one. `row_tolerance` groups points into the same
    /// row during the row-major fallback.
    #[must_use]
    pub const fn new(dedup_threshold: f32, row_tolerance: f32) -> Self {
        Self {
            dedup_threshold,
            row_tolerance,
        }
    }

    /// Distance on both axes under which waypoints are merged.
    #[must_use]
    pub const fn dedup_threshold(&self) -> f32 {
        self.dedup_threshold
    }

    /// Vertical distance under which points share a row in the fallback sweep.
    #[must_use]
    pub const fn row_tolerance(&self) -> f32 {
        self.row_tolerance
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_THRESHOLD, DEFAULT_ROW_TOLERANCE)
    }
}

/// Path builder that reuses its scratch buffers between map loads.
#[derive(Debug, Default)]
pub struct PathBuilder {
    config: Config,
    candidates: Vec<Waypoint>,
    visited: Vec<bool>,
}

impl PathBuilder {
    /// Creates a path builder using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            candidates: Vec::new(),
            visited: Vec::new(),
        }
    }

    /// Builds the route described by the tile layer.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::Empty`] when the layer holds no path tile.
    pub fn build(&mut self, layer: &TileLayer, tileset: &Tileset) -> Result<Route, PathError> {
        self.collect_candidates(layer, tileset);
        if self.candidates.is_empty() {
            return Err(PathError::Empty);
        }

        let start = self
            .candidates
            .iter()
            .position(|candidate| candidate.kind == WaypointKind::Start);

        let ordered = match start {
            Some(start) => self.order_nearest_neighbour(start),
            None => {
                debug!("no start tile present, ordering path tiles row by row");
                order_row_major(&self.candidates, self.config.row_tolerance)
            }
        };

        let waypoints = deduplicate(ordered, self.config.dedup_threshold);
        debug!(
            candidates = self.candidates.len(),
            waypoints = waypoints.len(),
            "route built"
        );
        Ok(Route::new(waypoints))
    }

    fn collect_candidates(&mut self, layer: &TileLayer, tileset: &Tileset) {
        self.candidates.clear();
        let grid = layer.grid();
        for (cell, tile) in layer.iter() {
            if let Some(kind) = tileset.classify(tile) {
                self.candidates
                    .push(Waypoint::new(grid.cell_center(cell), cell, kind));
            }
        }
    }

    fn order_nearest_neighbour(&mut self, start: usize) -> Vec<Waypoint> {
        self.visited.clear();
        self.visited.resize(self.candidates.len(), false);

        let mut ordered = Vec::with_capacity(self.candidates.len());
        let mut current = start;
        self.visited[current] = true;
        ordered.push(self.candidates[current]);

        for _ in 1..self.candidates.len() {
            let origin = self.candidates[current].position;
            let mut best: Option<(usize, f32)> = None;

            for (index, candidate) in self.candidates.iter().enumerate() {
                if self.visited[index] {
                    continue;
                }
                let distance_sq = origin.distance_squared(candidate.position);
                match best {
                    Some((_, best_distance)) if distance_sq >= best_distance => {}
                    _ => best = Some((index, distance_sq)),
                }
            }

            let Some((next, _)) = best else {
                break;
            };
            self.visited[next] = true;
            ordered.push(self.candidates[next]);
            current = next;
        }

        ordered
    }
}

fn order_row_major(candidates: &[Waypoint], row_tolerance: f32) -> Vec<Waypoint> {
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| {
        a.position
            .y
            .total_cmp(&b.position.y)
            .then(a.position.x.total_cmp(&b.position.x))
    });

    let mut ordered = Vec::with_capacity(sorted.len());
    let mut row: Vec<Waypoint> = Vec::new();
    let mut row_anchor = f32::NEG_INFINITY;

    for waypoint in sorted {
        if !row.is_empty() && (waypoint.position.y - row_anchor).abs() >= row_tolerance {
            flush_row(&mut row, &mut ordered);
        }
        if row.is_empty() {
            row_anchor = waypoint.position.y;
        }
        row.push(waypoint);
    }
    flush_row(&mut row, &mut ordered);

    ordered
}

fn flush_row(row: &mut Vec<Waypoint>, ordered: &mut Vec<Waypoint>) {
    row.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
    ordered.append(row);
}

fn deduplicate(ordered: Vec<Waypoint>, threshold: f32) -> Vec<Waypoint> {
    let mut kept: Vec<Waypoint> = Vec::with_capacity(ordered.len());
    for waypoint in ordered {
        let crowded = kept.iter().any(|existing| {
            (existing.position.x - waypoint.position.x).abs() < threshold
                && (existing.position.y - waypoint.position.y).abs() < threshold
        });
        if !crowded {
            kept.push(waypoint);
        }
    }
    kept
}
