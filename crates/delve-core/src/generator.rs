//! Full generation pipeline.
//!
//! One [`Generator`] owns the configuration, the random stream, the
//! board, the room registry, the spatial index, and the materializer.
//! `generate` runs the whole pass to completion on the calling thread:
//! tear down the previous level, place rooms, connect them, route edge
//! rooms, materialize corridors and markers, and rebuild the spatial
//! index. Every pass starts from scratch; nothing is diffed.

use std::time::Instant;

use crate::board::Board;
use crate::config::{ConfigError, GenConfig};
use crate::connect::{connect_all_rooms, connect_rooms_to_edges};
use crate::placer::place_rooms;
use crate::registry::RoomRegistry;
use crate::spatial::SpatialIndex;
use crate::spawn::{
    cell_to_world, room_transform, spawn_corridors, spawn_markers, Materializer, ObjectHandle,
    ObjectKind, Transform,
};
use crate::stats::GenerationStats;
use crate::{Cell, GenRng};

/// Level generator bound to one materializer.
pub struct Generator<M: Materializer> {
    cfg: GenConfig,
    rng: GenRng,
    board: Board,
    registry: RoomRegistry,
    spatial: SpatialIndex,
    corridor_handles: Vec<(ObjectHandle, Cell)>,
    markers: Vec<(ObjectHandle, Cell)>,
    stats: GenerationStats,
    materializer: M,
}

impl<M: Materializer> Generator<M> {
    /// Create a generator. The random stream starts at `cfg.seed`, or
    /// from entropy when the seed is 0.
    pub fn new(cfg: GenConfig, materializer: M) -> Self {
        let rng = if cfg.seed != 0 {
            GenRng::new(cfg.seed)
        } else {
            GenRng::from_entropy()
        };
        let board_size = cfg.board_size.max(1);
        let spatial_cell = if cfg.spatial_cell_size > 0.0 {
            cfg.spatial_cell_size
        } else {
            50.0
        };
        Self {
            cfg,
            rng,
            board: Board::new(board_size),
            registry: RoomRegistry::new(),
            spatial: SpatialIndex::new(spatial_cell),
            corridor_handles: Vec::new(),
            markers: Vec::new(),
            stats: GenerationStats::default(),
            materializer,
        }
    }

    /// Run one generation pass with an explicit seed. A seed of 0 keeps
    /// the current random stream instead of reseeding.
    ///
    /// Validation runs before any teardown: a bad configuration leaves
    /// the previous level untouched.
    pub fn generate(&mut self, seed: u64) -> Result<&GenerationStats, ConfigError> {
        self.cfg.validate()?;
        let started = Instant::now();

        self.teardown();
        if seed != 0 {
            self.rng = GenRng::new(seed);
        }
        log::info!("generating level with seed {}", self.rng.seed());

        let outcome = place_rooms(
            &self.cfg,
            &mut self.board,
            &mut self.registry,
            &mut self.rng,
            &mut self.materializer,
        );
        self.registry.rebuild_tile_cache();

        let relaxed = connect_all_rooms(
            &mut self.board,
            &mut self.registry,
            self.cfg.variation,
            &mut self.rng,
        );
        connect_rooms_to_edges(
            &mut self.board,
            &mut self.registry,
            self.cfg.variation,
            &mut self.rng,
        );

        self.corridor_handles = spawn_corridors(
            &self.board,
            &self.registry,
            self.cfg.tile_size,
            &mut self.materializer,
        );
        self.markers = spawn_markers(
            &self.board,
            self.cfg.marker_count,
            self.cfg.tile_size,
            &mut self.rng,
            &mut self.materializer,
        );

        self.rebuild_spatial_index();

        self.stats = GenerationStats {
            seed: self.rng.seed(),
            rooms_placed: self.registry.len(),
            guaranteed_rooms_placed: outcome.guaranteed_placed,
            corridor_tiles: self.corridor_handles.len(),
            markers_placed: self.markers.len(),
            relaxed_connections: relaxed,
            generation_time: started.elapsed(),
        };
        log::info!("{}", self.stats);
        Ok(&self.stats)
    }

    /// Run a pass with a fresh nonzero seed drawn from the current
    /// stream.
    pub fn generate_new(&mut self) -> Result<&GenerationStats, ConfigError> {
        let seed = (((self.rng.rn2(u32::MAX) as u64) << 32)
            | self.rng.rn2(u32::MAX) as u64)
            .max(1);
        self.generate(seed)
    }

    /// Destroy every object from the previous pass and reset all state.
    fn teardown(&mut self) {
        for room in self.registry.rooms() {
            if let Some(handle) = room.handle {
                self.materializer.destroy(handle);
            }
        }
        for &(handle, _) in &self.corridor_handles {
            self.materializer.destroy(handle);
        }
        for &(handle, _) in &self.markers {
            self.materializer.destroy(handle);
        }
        self.corridor_handles.clear();
        self.markers.clear();
        self.registry.clear();
        self.spatial.clear();
        self.board = Board::new(self.cfg.board_size);
    }

    /// Rebuild the spatial index from the current level.
    fn rebuild_spatial_index(&mut self) {
        self.spatial.clear();
        for room in self.registry.rooms() {
            if let Some(handle) = room.handle {
                let transform = room_transform(room.position, room.size, self.cfg.tile_size);
                self.spatial.insert_area(handle, ObjectKind::Room, &transform);
            }
        }
        for &(handle, cell) in &self.corridor_handles {
            let transform = Transform::at(cell_to_world(cell, self.cfg.tile_size));
            self.spatial
                .insert_point(handle, ObjectKind::CorridorTile, &transform);
        }
        for &(handle, cell) in &self.markers {
            let mut position = cell_to_world(cell, self.cfg.tile_size);
            position[1] = 0.5;
            self.spatial
                .insert_point(handle, ObjectKind::Marker, &Transform::at(position));
        }
    }

    /// Destroy every marker and purge it from the index. Idempotent.
    pub fn clear_markers(&mut self) {
        for &(handle, _) in &self.markers {
            self.materializer.destroy(handle);
            self.spatial.remove(handle);
        }
        self.markers.clear();
        self.stats.markers_placed = 0;
    }

    /// Destroy one marker by handle. Returns false if the handle is not
    /// a live marker of this level.
    pub fn collect_marker(&mut self, handle: ObjectHandle) -> bool {
        let Some(pos) = self.markers.iter().position(|&(h, _)| h == handle) else {
            return false;
        };
        self.markers.remove(pos);
        self.materializer.destroy(handle);
        self.spatial.remove(handle);
        self.stats.markers_placed = self.markers.len();
        true
    }

    /// Live markers within `radius` world units of a point.
    pub fn markers_near(&self, point: [f32; 3], radius: f32) -> Vec<ObjectHandle> {
        self.spatial
            .active_within(point, radius, |h| self.materializer.is_alive(h))
            .into_iter()
            .filter(|e| e.kind == ObjectKind::Marker)
            .map(|e| e.handle)
            .collect()
    }

    pub fn config(&self) -> &GenConfig {
        &self.cfg
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Stats of the most recent pass.
    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    pub fn markers(&self) -> &[(ObjectHandle, Cell)] {
        &self.markers
    }

    pub fn materializer(&self) -> &M {
        &self.materializer
    }

    /// ASCII rendering of the current level.
    pub fn render_map(&self) -> String {
        self.board.render_ascii(&self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RoomTemplate;
    use crate::spawn::RecordingMaterializer;

    fn test_config() -> GenConfig {
        GenConfig {
            catalog: vec![
                RoomTemplate::new("small", 3, 3),
                RoomTemplate::new("wide", 5, 3),
            ],
            board_size: 40,
            target_room_count: 6,
            marker_count: 10,
            ..GenConfig::default()
        }
    }

    fn generator() -> Generator<RecordingMaterializer> {
        Generator::new(test_config(), RecordingMaterializer::new())
    }

    #[test]
    fn test_full_pass_populates_everything() {
        let mut level = generator();
        let stats = level.generate(42).unwrap().clone();
        assert!(stats.rooms_placed > 0);
        assert!(stats.corridor_tiles > 0);
        assert_eq!(stats.markers_placed, 10);
        assert_eq!(stats.seed, 42);
        assert!(level.spatial().entry_count() > 0);
    }

    #[test]
    fn test_invalid_config_aborts_before_teardown() {
        let mut level = generator();
        level.generate(42).unwrap();
        let rooms_before = level.registry().len();

        level.cfg.catalog.clear();
        assert_eq!(level.generate(43), Err(ConfigError::EmptyCatalog));
        // Previous level still intact
        assert_eq!(level.registry().len(), rooms_before);
    }

    #[test]
    fn test_regenerate_destroys_previous_objects() {
        let mut level = generator();
        level.generate(1).unwrap();
        let total_first = level.materializer().live_count(ObjectKind::Room)
            + level.materializer().live_count(ObjectKind::CorridorTile)
            + level.materializer().live_count(ObjectKind::Marker);
        level.generate(2).unwrap();
        let stats = level.stats();
        let expected =
            stats.rooms_placed + stats.corridor_tiles + stats.markers_placed;
        let total_second = level.materializer().live_count(ObjectKind::Room)
            + level.materializer().live_count(ObjectKind::CorridorTile)
            + level.materializer().live_count(ObjectKind::Marker);
        assert!(total_first > 0);
        // Only the second level's objects survive
        assert_eq!(total_second, expected);
    }

    #[test]
    fn test_same_seed_same_level() {
        let mut a = generator();
        let mut b = generator();
        a.generate(777).unwrap();
        b.generate(777).unwrap();
        assert_eq!(a.board().carved_cells(), b.board().carved_cells());
        let positions = |g: &Generator<RecordingMaterializer>| {
            g.registry()
                .rooms()
                .iter()
                .map(|r| (r.position, r.size))
                .collect::<Vec<_>>()
        };
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn test_generate_new_changes_seed() {
        let mut level = generator();
        level.generate(5).unwrap();
        let first = level.stats().seed;
        level.generate_new().unwrap();
        assert_ne!(level.stats().seed, first);
        assert_ne!(level.stats().seed, 0);
    }

    #[test]
    fn test_clear_markers_is_idempotent() {
        let mut level = generator();
        level.generate(9).unwrap();
        assert!(level.materializer().live_count(ObjectKind::Marker) > 0);
        level.clear_markers();
        assert_eq!(level.materializer().live_count(ObjectKind::Marker), 0);
        assert!(level.markers().is_empty());
        assert_eq!(level.stats().markers_placed, 0);
        level.clear_markers();
        assert!(level.markers().is_empty());
        assert_eq!(level.stats().markers_placed, 0);
        // Index holds no marker entries either
        let hits = level
            .spatial()
            .active_within([0.0, 0.0, 0.0], 1.0e6, |_| true)
            .into_iter()
            .filter(|e| e.kind == ObjectKind::Marker)
            .count();
        assert_eq!(hits, 0);
    }

    #[test]
    fn test_collect_marker() {
        let mut level = generator();
        level.generate(13).unwrap();
        let before = level.stats().markers_placed;
        let (handle, _) = level.markers()[0];
        assert!(level.collect_marker(handle));
        assert!(!level.materializer().is_alive(handle));
        assert_eq!(level.stats().markers_placed, before - 1);
        // Second collect of the same handle is a miss
        assert!(!level.collect_marker(handle));
        assert_eq!(level.stats().markers_placed, before - 1);
    }

    #[test]
    fn test_markers_near_finds_scattered_markers() {
        let mut level = generator();
        level.generate(21).unwrap();
        let (_, cell) = level.markers()[0];
        let point = crate::spawn::cell_to_world(cell, level.config().tile_size);
        let near = level.markers_near(point, level.config().tile_size);
        assert!(!near.is_empty());
    }
}
