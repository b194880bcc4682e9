//! Flat vertex storage
//!
//! One contiguous `Vec<f32>` holds every vertex of the current shape, each
//! occupying [`VERTEX_FIELD_COUNT`] consecutive floats. The field constants
//! below are the record layout surfaces can rely on.

pub const X: usize = 0;
pub const Y: usize = 1;
pub const Z: usize = 2;
/// Transformed (screen space) position
pub const TX: usize = 3;
pub const TY: usize = 4;
/// Fill color, normalized
pub const R: usize = 5;
pub const G: usize = 6;
pub const B: usize = 7;
pub const A: usize = 8;
/// Stroke color, normalized
pub const SR: usize = 9;
pub const SG: usize = 10;
pub const SB: usize = 11;
pub const SA: usize = 12;
/// Texture coordinates
pub const U: usize = 13;
pub const V: usize = 14;
pub const NX: usize = 15;
pub const NY: usize = 16;
pub const NZ: usize = 17;
pub const SW: usize = 18;

/// Floats per vertex record
pub const VERTEX_FIELD_COUNT: usize = 19;

/// Initial number of vertex records
pub const DEFAULT_VERTEX_CAPACITY: usize = 512;

/// Growable arena of fixed-width vertex records
#[derive(Debug, Clone)]
pub struct VertexBuffer {
    data: Vec<f32>,
    count: usize,
    capacity: usize,
}

impl Default for VertexBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_VERTEX_CAPACITY)
    }
}

impl VertexBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: vec![0.0; capacity * VERTEX_FIELD_COUNT],
            count: 0,
            capacity,
        }
    }

    /// Number of live vertices
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Allocated vertex records
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget all vertices; storage is kept
    #[inline]
    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Append a zeroed record and return it for filling in
    pub fn push(&mut self) -> &mut [f32] {
        if self.count == self.capacity {
            self.capacity *= 2;
            self.data.resize(self.capacity * VERTEX_FIELD_COUNT, 0.0);
            log::trace!("vertex buffer grown to {} records", self.capacity);
        }
        let start = self.count * VERTEX_FIELD_COUNT;
        self.count += 1;
        let record = &mut self.data[start..start + VERTEX_FIELD_COUNT];
        record.fill(0.0);
        record
    }

    /// Record `i`, if it is live
    #[inline]
    pub fn get(&self, i: usize) -> Option<&[f32]> {
        (i < self.count).then(|| &self.data[i * VERTEX_FIELD_COUNT..(i + 1) * VERTEX_FIELD_COUNT])
    }

    /// Screen-space position of vertex `i`, or the origin if it is not live
    #[inline]
    pub fn screen_point(&self, i: usize) -> (f32, f32) {
        self.get(i).map_or((0.0, 0.0), |v| (v[TX], v[TY]))
    }

    /// All live records as one slice, `len() * VERTEX_FIELD_COUNT` floats
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data[..self.count * VERTEX_FIELD_COUNT]
    }
}
