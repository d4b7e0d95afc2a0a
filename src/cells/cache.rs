//! Memoized barycentric index tables
//!
//! Triangular and tetrahedral cells decode their flat point order through
//! the barycentric bijection once per order and reuse the table across
//! queries. The table is rebuilt only when the order actually changes; a
//! generation counter makes that observable.

use crate::indexing::simplex;
use crate::types::Result;

struct Entry {
    order: usize,
    barycentric: Vec<[usize; 4]>,
}

/// A per-cell memo of the flat-index to barycentric-tuple decoding.
pub struct IndexCache {
    dim: usize,
    entry: Option<Entry>,
    generation: u64,
}

impl IndexCache {
    /// Create an empty cache for simplices of the given dimension.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            entry: None,
            generation: 0,
        }
    }

    /// The number of times the table has been rebuilt.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drop the memoized table.
    pub fn clear(&mut self) {
        self.entry = None;
    }

    /// The barycentric table for `order`, rebuilding it if the memoized
    /// one is for a different order.
    pub(crate) fn update(&mut self, order: usize) -> Result<&[[usize; 4]]> {
        let stale = self.entry.as_ref().map(|e| e.order != order).unwrap_or(true);
        if stale {
            let npoints = simplex::num_points(order, self.dim);
            let mut barycentric = Vec::with_capacity(npoints);
            for i in 0..npoints {
                barycentric.push(simplex::barycentric_index(i, order, self.dim)?);
            }
            self.entry = Some(Entry { order, barycentric });
            self.generation += 1;
        }
        match &self.entry {
            Some(e) => Ok(&e.barycentric),
            None => unreachable!(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rebuild_only_on_change() {
        let mut cache = IndexCache::new(2);
        assert_eq!(cache.generation(), 0);
        assert_eq!(cache.update(3).unwrap().len(), 10);
        assert_eq!(cache.generation(), 1);
        // Same order: no rebuild
        cache.update(3).unwrap();
        assert_eq!(cache.generation(), 1);
        // New order: one rebuild
        assert_eq!(cache.update(4).unwrap().len(), 15);
        assert_eq!(cache.generation(), 2);
    }

    #[test]
    fn test_clear_forces_rebuild() {
        let mut cache = IndexCache::new(3);
        cache.update(2).unwrap();
        cache.clear();
        cache.update(2).unwrap();
        assert_eq!(cache.generation(), 2);
    }

    #[test]
    fn test_table_matches_direct_decoding() {
        let mut cache = IndexCache::new(3);
        let table = cache.update(3).unwrap();
        for (i, b) in table.iter().enumerate() {
            assert_eq!(*b, simplex::barycentric_index(i, 3, 3).unwrap());
        }
    }
}
