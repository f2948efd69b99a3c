/// Dense vertex identifier. Vertices of a graph occupy `0..num_vertices`.
pub type VertexId = u32;

/// Position of an edge in the graph's edge table.
pub type EdgeId = usize;

/// Inclusive id window processed as one unit of parallel work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub lo: VertexId,
    pub hi: VertexId,
}

impl Interval {
    pub fn new(lo: VertexId, hi: VertexId) -> Self {
        debug_assert!(lo <= hi, "interval bounds reversed: {lo} > {hi}");
        Self { lo, hi }
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.lo <= id && id <= self.hi
    }

    /// Number of ids in the window (never zero).
    pub fn width(&self) -> usize {
        (self.hi - self.lo) as usize + 1
    }

    pub fn ids(&self) -> impl Iterator<Item = VertexId> {
        self.lo..=self.hi
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}
