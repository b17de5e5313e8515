//! Uniform-grid spatial partitioning for broad-phase queries.
//!
//! Entities are inserted into every cell their padded extent touches, so a
//! query never misses a boundary-straddling entity. Queries return a
//! conservative superset of the entities within the radius; callers must
//! re-check exact distances.

use std::collections::HashMap;

use glam::DVec2;
use hecs::Entity;

use rampart_core::constants::GRID_CELL_SIZE;

/// Entry in a spatial cell.
#[derive(Debug, Clone, Copy)]
pub struct GridEntry {
    pub entity: Entity,
    pub pos: DVec2,
    pub radius: f64,
}

/// Grid-based spatial index rebuilt from scratch each tick.
#[derive(Debug)]
pub struct SpatialHashGrid {
    cell_size: f64,
    cells: HashMap<(i32, i32), Vec<GridEntry>>,
    /// Total entities inserted since the last clear.
    entry_count: usize,
    /// Scratch buffer for deduplicating multi-cell hits between queries.
    scratch: Vec<Entity>,
}

impl Default for SpatialHashGrid {
    fn default() -> Self {
        Self::new(GRID_CELL_SIZE)
    }
}

impl SpatialHashGrid {
    pub fn new(cell_size: f64) -> Self {
        assert!(cell_size > 0.0, "cell size must be positive");
        Self {
            cell_size,
            cells: HashMap::new(),
            entry_count: 0,
            scratch: Vec::new(),
        }
    }

    #[inline]
    fn cell_of(&self, coord: f64) -> i32 {
        (coord / self.cell_size).floor() as i32
    }

    /// Clear all entries. Cell vectors keep their capacity so the per-tick
    /// rebuild does not reallocate.
    pub fn clear(&mut self) {
        for entries in self.cells.values_mut() {
            entries.clear();
        }
        self.entry_count = 0;
    }

    /// Insert an entity into every cell its padded extent touches.
    pub fn insert(&mut self, entity: Entity, pos: DVec2, radius: f64) {
        let min_x = self.cell_of(pos.x - radius);
        let max_x = self.cell_of(pos.x + radius);
        let min_y = self.cell_of(pos.y - radius);
        let max_y = self.cell_of(pos.y + radius);

        let entry = GridEntry {
            entity,
            pos,
            radius,
        };
        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                self.cells.entry((cx, cy)).or_default().push(entry);
            }
        }
        self.entry_count += 1;
    }

    /// Number of entities inserted since the last clear.
    pub fn len(&self) -> usize {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Collect all entities whose covering cells intersect the query's
    /// bounding box into `out`. A conservative superset: no entity within
    /// `radius` of the query point is missed, but entities outside it may
    /// be returned and must be filtered by exact distance.
    pub fn query_radius(&mut self, pos: DVec2, radius: f64, out: &mut Vec<GridEntry>) {
        out.clear();
        self.scratch.clear();

        let min_x = self.cell_of(pos.x - radius);
        let max_x = self.cell_of(pos.x + radius);
        let min_y = self.cell_of(pos.y - radius);
        let max_y = self.cell_of(pos.y + radius);

        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                let Some(entries) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                for entry in entries {
                    // Padded entities span multiple cells; report each once.
                    if self.scratch.contains(&entry.entity) {
                        continue;
                    }
                    self.scratch.push(entry.entity);
                    out.push(*entry);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: u32) -> Entity {
        // hecs test helper: synthesize entities without a world.
        Entity::from_bits(((id as u64) << 32) | 1).unwrap()
    }

    #[test]
    fn test_insert_query() {
        let mut grid = SpatialHashGrid::new(10.0);
        grid.insert(entity(1), DVec2::new(5.0, 5.0), 0.0);
        grid.insert(entity(2), DVec2::new(15.0, 5.0), 0.0);
        grid.insert(entity(3), DVec2::new(100.0, 100.0), 0.0);

        let mut out = Vec::new();
        grid.query_radius(DVec2::new(5.0, 5.0), 15.0, &mut out);
        let hits: Vec<Entity> = out.iter().map(|e| e.entity).collect();
        assert!(hits.contains(&entity(1)));
        assert!(hits.contains(&entity(2)));
        assert!(!hits.contains(&entity(3)));
    }

    #[test]
    fn test_no_false_negatives_within_radius() {
        // Property from the collision design: any entity whose true
        // distance is <= r must appear in the query result.
        let mut grid = SpatialHashGrid::new(16.0);
        let mut positions = Vec::new();
        let mut id = 1u32;
        for gx in -8..8 {
            for gy in -8..8 {
                let pos = DVec2::new(gx as f64 * 13.7, gy as f64 * 9.3);
                grid.insert(entity(id), pos, 4.0);
                positions.push((entity(id), pos));
                id += 1;
            }
        }

        let mut out = Vec::new();
        for &(query, radius) in &[
            (DVec2::new(0.0, 0.0), 25.0),
            (DVec2::new(-31.0, 17.0), 40.0),
            (DVec2::new(55.5, -42.1), 12.0),
        ] {
            grid.query_radius(query, radius, &mut out);
            let hits: Vec<Entity> = out.iter().map(|e| e.entity).collect();
            for &(e, pos) in &positions {
                if pos.distance(query) <= radius {
                    assert!(
                        hits.contains(&e),
                        "entity at {pos:?} within {radius} of {query:?} was missed"
                    );
                }
            }
        }
    }

    #[test]
    fn test_boundary_straddling_entity_found_from_both_sides() {
        // Entity sits exactly on a cell boundary; its padded extent places
        // it in cells on both sides.
        let mut grid = SpatialHashGrid::new(10.0);
        grid.insert(entity(1), DVec2::new(10.0, 5.0), 3.0);

        let mut out = Vec::new();
        grid.query_radius(DVec2::new(8.0, 5.0), 1.0, &mut out);
        assert_eq!(out.len(), 1, "should be found from the left cell");

        grid.query_radius(DVec2::new(12.0, 5.0), 1.0, &mut out);
        assert_eq!(out.len(), 1, "should be found from the right cell");
    }

    #[test]
    fn test_multi_cell_entity_reported_once() {
        let mut grid = SpatialHashGrid::new(10.0);
        // Radius 15 covers many cells around the origin.
        grid.insert(entity(1), DVec2::new(0.0, 0.0), 15.0);

        let mut out = Vec::new();
        grid.query_radius(DVec2::new(0.0, 0.0), 30.0, &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_clear_retains_nothing() {
        let mut grid = SpatialHashGrid::new(10.0);
        grid.insert(entity(1), DVec2::new(0.0, 0.0), 2.0);
        assert_eq!(grid.len(), 1);

        grid.clear();
        assert!(grid.is_empty());

        let mut out = Vec::new();
        grid.query_radius(DVec2::new(0.0, 0.0), 50.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_negative_coordinates() {
        let mut grid = SpatialHashGrid::new(10.0);
        grid.insert(entity(1), DVec2::new(-25.0, -25.0), 0.0);

        let mut out = Vec::new();
        grid.query_radius(DVec2::new(-24.0, -24.0), 5.0, &mut out);
        assert_eq!(out.len(), 1);
    }
}
