//! Coarse spatial index over materialized objects.
//!
//! World space is bucketed into square cells on the xz plane. Point
//! objects (corridor tiles, markers) land in one bucket; rooms are
//! inserted into every bucket their scaled footprint touches. Queries
//! scan the `(2r+1) x (2r+1)` bucket neighborhood around a point, so
//! the index trades precision for never touching the full object list.
//!
//! The index is rebuilt wholesale after each generation pass, not
//! diffed, so entries can outlive their objects; proximity queries take
//! a liveness probe and skip stale handles.

use hashbrown::HashMap;

use crate::spawn::{ObjectHandle, ObjectKind, Transform};

/// One indexed object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialEntry {
    pub handle: ObjectHandle,
    pub kind: ObjectKind,
    /// World position (object center).
    pub position: [f32; 3],
}

/// Bucketed index of materialized objects on the xz plane.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f32,
    buckets: HashMap<(i32, i32), Vec<SpatialEntry>>,
}

impl SpatialIndex {
    /// Create an empty index with square buckets of `cell_size` world
    /// units. `cell_size` must be positive.
    pub fn new(cell_size: f32) -> Self {
        debug_assert!(cell_size > 0.0);
        Self {
            cell_size,
            buckets: HashMap::new(),
        }
    }

    /// Bucket edge length in world units.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Bucket coordinate of a world point (xz plane).
    pub fn world_to_cell(&self, point: [f32; 3]) -> (i32, i32) {
        self.bucket_of(point[0], point[2])
    }

    /// Entries of one bucket, for external activation logic that walks
    /// the buckets itself.
    pub fn bucket(&self, cell: (i32, i32)) -> &[SpatialEntry] {
        self.buckets.get(&cell).map_or(&[], Vec::as_slice)
    }

    fn bucket_of(&self, x: f32, z: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (z / self.cell_size).floor() as i32,
        )
    }

    /// Index a point object at its transform position.
    pub fn insert_point(&mut self, handle: ObjectHandle, kind: ObjectKind, transform: &Transform) {
        let entry = SpatialEntry {
            handle,
            kind,
            position: transform.position,
        };
        let bucket = self.bucket_of(transform.position[0], transform.position[2]);
        self.buckets.entry(bucket).or_default().push(entry);
    }

    /// Index a room into every bucket its scaled footprint touches.
    /// The transform position is the footprint center; scale x/z give
    /// the world extent.
    pub fn insert_area(&mut self, handle: ObjectHandle, kind: ObjectKind, transform: &Transform) {
        let entry = SpatialEntry {
            handle,
            kind,
            position: transform.position,
        };
        let half_x = transform.scale[0] / 2.0;
        let half_z = transform.scale[2] / 2.0;
        let min = self.bucket_of(
            transform.position[0] - half_x,
            transform.position[2] - half_z,
        );
        let max = self.bucket_of(
            transform.position[0] + half_x,
            transform.position[2] + half_z,
        );
        for bx in min.0..=max.0 {
            for bz in min.1..=max.1 {
                self.buckets.entry((bx, bz)).or_default().push(entry);
            }
        }
    }

    /// Drop every entry for a handle (all buckets).
    pub fn remove(&mut self, handle: ObjectHandle) {
        for entries in self.buckets.values_mut() {
            entries.retain(|e| e.handle != handle);
        }
        self.buckets.retain(|_, entries| !entries.is_empty());
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Total entry count, area objects counted once per bucket.
    pub fn entry_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// All entries in the `(2r+1) x (2r+1)` bucket neighborhood around a
    /// world point. Entries are not distance-filtered.
    pub fn neighborhood(&self, point: [f32; 3], bucket_radius: i32) -> Vec<&SpatialEntry> {
        let center = self.bucket_of(point[0], point[2]);
        let mut out = Vec::new();
        for bx in center.0 - bucket_radius..=center.0 + bucket_radius {
            for bz in center.1 - bucket_radius..=center.1 + bucket_radius {
                if let Some(entries) = self.buckets.get(&(bx, bz)) {
                    out.extend(entries.iter());
                }
            }
        }
        out
    }

    /// Live entries within `radius` world units of a point (xz distance).
    ///
    /// `is_live` filters out handles whose objects are already gone; an
    /// area object that spans several buckets is reported once.
    pub fn active_within(
        &self,
        point: [f32; 3],
        radius: f32,
        is_live: impl Fn(ObjectHandle) -> bool,
    ) -> Vec<SpatialEntry> {
        let bucket_radius = (radius / self.cell_size).ceil() as i32;
        let radius_sq = radius * radius;
        let mut seen = Vec::new();
        let mut out = Vec::new();
        for entry in self.neighborhood(point, bucket_radius) {
            if seen.contains(&entry.handle) {
                continue;
            }
            let dx = entry.position[0] - point[0];
            let dz = entry.position[2] - point[2];
            if dx * dx + dz * dz > radius_sq {
                continue;
            }
            if !is_live(entry.handle) {
                continue;
            }
            seen.push(entry.handle);
            out.push(*entry);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::Transform;

    fn point_entry(index: &mut SpatialIndex, id: u64, pos: [f32; 3]) -> ObjectHandle {
        let handle = ObjectHandle(id);
        index.insert_point(handle, ObjectKind::Marker, &Transform::at(pos));
        handle
    }

    #[test]
    fn test_point_lands_in_one_bucket() {
        let mut index = SpatialIndex::new(50.0);
        point_entry(&mut index, 1, [10.0, 0.0, 10.0]);
        assert_eq!(index.entry_count(), 1);
        assert_eq!(index.neighborhood([10.0, 0.0, 10.0], 0).len(), 1);
        assert_eq!(index.neighborhood([200.0, 0.0, 200.0], 0).len(), 0);
    }

    #[test]
    fn test_negative_coordinates_floor() {
        let mut index = SpatialIndex::new(50.0);
        point_entry(&mut index, 1, [-10.0, 0.0, -10.0]);
        // (-10 / 50).floor() is bucket -1, not 0
        assert_eq!(index.neighborhood([-10.0, 0.0, -10.0], 0).len(), 1);
        assert_eq!(index.neighborhood([10.0, 0.0, 10.0], 0).len(), 0);
    }

    #[test]
    fn test_area_spans_buckets() {
        let mut index = SpatialIndex::new(50.0);
        let transform = Transform {
            position: [50.0, 0.0, 50.0],
            yaw_degrees: 0.0,
            scale: [120.0, 1.0, 120.0],
        };
        index.insert_area(ObjectHandle(1), ObjectKind::Room, &transform);
        // Footprint [-10, 110] on both axes covers buckets -1..=2
        assert_eq!(index.entry_count(), 16);
        assert_eq!(index.neighborhood([100.0, 0.0, 100.0], 0).len(), 1);
    }

    #[test]
    fn test_active_within_filters_by_distance() {
        let mut index = SpatialIndex::new(50.0);
        point_entry(&mut index, 1, [0.0, 0.0, 0.0]);
        point_entry(&mut index, 2, [30.0, 0.0, 0.0]);
        point_entry(&mut index, 3, [0.0, 0.0, 80.0]);
        let near = index.active_within([0.0, 0.0, 0.0], 40.0, |_| true);
        let ids: Vec<u64> = near.iter().map(|e| e.handle.0).collect();
        assert!(ids.contains(&1));
        assert!(ids.contains(&2));
        assert!(!ids.contains(&3));
    }

    #[test]
    fn test_active_within_skips_dead_handles() {
        let mut index = SpatialIndex::new(50.0);
        point_entry(&mut index, 1, [0.0, 0.0, 0.0]);
        point_entry(&mut index, 2, [5.0, 0.0, 5.0]);
        let live = index.active_within([0.0, 0.0, 0.0], 20.0, |h| h.0 == 2);
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].handle, ObjectHandle(2));
    }

    #[test]
    fn test_active_within_dedupes_area_entries() {
        let mut index = SpatialIndex::new(50.0);
        let transform = Transform {
            position: [50.0, 0.0, 50.0],
            yaw_degrees: 0.0,
            scale: [120.0, 1.0, 120.0],
        };
        index.insert_area(ObjectHandle(7), ObjectKind::Room, &transform);
        let hits = index.active_within([50.0, 0.0, 50.0], 200.0, |_| true);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_remove_purges_all_buckets() {
        let mut index = SpatialIndex::new(50.0);
        let transform = Transform {
            position: [50.0, 0.0, 50.0],
            yaw_degrees: 0.0,
            scale: [120.0, 1.0, 120.0],
        };
        index.insert_area(ObjectHandle(1), ObjectKind::Room, &transform);
        point_entry(&mut index, 2, [10.0, 0.0, 10.0]);
        index.remove(ObjectHandle(1));
        assert_eq!(index.entry_count(), 1);
        index.remove(ObjectHandle(2));
        assert_eq!(index.entry_count(), 0);
    }

    #[test]
    fn test_world_to_cell_and_bucket_access() {
        let mut index = SpatialIndex::new(50.0);
        let handle = point_entry(&mut index, 1, [75.0, 0.0, 25.0]);
        let cell = index.world_to_cell([75.0, 0.0, 25.0]);
        assert_eq!(cell, (1, 0));
        assert_eq!(index.bucket(cell).len(), 1);
        assert_eq!(index.bucket(cell)[0].handle, handle);
        assert!(index.bucket((9, 9)).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut index = SpatialIndex::new(50.0);
        point_entry(&mut index, 1, [0.0; 3]);
        index.clear();
        assert_eq!(index.entry_count(), 0);
    }
}
