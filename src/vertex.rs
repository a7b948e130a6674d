use crate::float_types::{EPSILON, Real};
use hashbrown::HashMap;
use nalgebra::Point3;

/// A corner of a polyhedron. Identity lives in its [`VertexId`](crate::mesh::VertexId);
/// the position never changes once created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub pos: Point3<Real>,
}

impl Vertex {
    pub const fn new(pos: Point3<Real>) -> Self {
        Vertex { pos }
    }

    /// True when every coordinate of `other` is within the coincidence tolerance.
    pub fn is_close_to(&self, other: &Point3<Real>) -> bool {
        (self.pos.x - other.x).abs() <= EPSILON
            && (self.pos.y - other.y).abs() <= EPSILON
            && (self.pos.z - other.z).abs() <= EPSILON
    }
}

type CellKey = (i64, i64, i64);

/// Grid spatial hash mapping quantized positions to handles.
///
/// The cell size is twice the coincidence tolerance, so any point within
/// tolerance of a query lives in the query's cell or one of its 26 neighbours.
#[derive(Debug, Clone)]
pub struct VertexPool<K> {
    cells: HashMap<CellKey, Vec<(Point3<Real>, K)>>,
    inv_cell: Real,
}

impl<K: Copy> Default for VertexPool<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy> VertexPool<K> {
    pub fn new() -> Self {
        VertexPool {
            cells: HashMap::new(),
            inv_cell: 1.0 / (2.0 * EPSILON),
        }
    }

    fn cell_of(&self, pos: &Point3<Real>) -> CellKey {
        (
            (pos.x * self.inv_cell).floor() as i64,
            (pos.y * self.inv_cell).floor() as i64,
            (pos.z * self.inv_cell).floor() as i64,
        )
    }

    /// Handle of a stored point coinciding with `pos`, if any.
    pub fn find(&self, pos: &Point3<Real>) -> Option<K> {
        let (cx, cy, cz) = self.cell_of(pos);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    let hit = bucket
                        .iter()
                        .find(|(stored, _)| Vertex::new(*stored).is_close_to(pos));
                    if let Some((_, key)) = hit {
                        return Some(*key);
                    }
                }
            }
        }
        None
    }

    pub fn insert(&mut self, pos: Point3<Real>, key: K) {
        let cell = self.cell_of(&pos);
        self.cells.entry(cell).or_default().push((pos, key));
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_points_within_tolerance() {
        let mut pool = VertexPool::new();
        pool.insert(Point3::new(1.0, 2.0, 3.0), 7usize);

        assert_eq!(pool.find(&Point3::new(1.0, 2.0, 3.0)), Some(7));
        assert_eq!(pool.find(&Point3::new(1.0 + EPSILON * 0.5, 2.0, 3.0)), Some(7));
        assert_eq!(pool.find(&Point3::new(1.0 + EPSILON * 10.0, 2.0, 3.0)), None);
    }

    #[test]
    fn finds_across_cell_boundary() {
        let mut pool = VertexPool::new();
        let cell = 2.0 * EPSILON;
        // just below a cell boundary, queried from just above it
        pool.insert(Point3::new(cell * 100.0 - EPSILON * 0.25, 0.0, 0.0), 1u32);

        let query = Point3::new(cell * 100.0 + EPSILON * 0.25, 0.0, 0.0);
        assert_eq!(pool.find(&query), Some(1));
        assert_eq!(pool.len(), 1);
    }
}
