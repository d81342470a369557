//! Chebyshev visibility windows.

use std::collections::BTreeSet;

use haven_shared::{ChunkCoord, ChunkKey};

/// Every chunk within Chebyshev distance `radius` of `center`.
///
/// A window of radius `R` holds `(2R + 1)²` chunks, fewer only where it
/// would run off the edge of the `i32` grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibilityWindow {
    /// Center chunk.
    pub center: ChunkCoord,
    /// Radius in chunks.
    pub radius: u32,
}

/// What changes between two windows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowDiff {
    /// In the new window only. Sorted.
    pub entering: Vec<ChunkCoord>,
    /// In the old window only. Sorted.
    pub leaving: Vec<ChunkCoord>,
}

impl WindowDiff {
    /// Whether the windows cover the same chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entering.is_empty() && self.leaving.is_empty()
    }
}

impl VisibilityWindow {
    /// Creates a window.
    #[must_use]
    pub const fn new(center: ChunkCoord, radius: u32) -> Self {
        Self { center, radius }
    }

    /// Whether `coord` lies inside.
    #[must_use]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.center.chebyshev(coord) <= self.radius
    }

    /// All coordinates, sorted.
    #[must_use]
    pub fn coords(&self) -> Vec<ChunkCoord> {
        let r = i64::from(self.radius);
        let axis = |c: i32| {
            (i64::from(c) - r..=i64::from(c) + r).filter_map(|v| i32::try_from(v).ok())
        };

        let mut coords = Vec::new();
        for x in axis(self.center.x) {
            for y in axis(self.center.y) {
                coords.push(ChunkCoord::new(x, y));
            }
        }
        coords
    }

    /// All keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<ChunkKey> {
        self.coords().into_iter().map(ChunkCoord::key).collect()
    }

    /// Coordinates entering and leaving when moving from `self` to `next`.
    #[must_use]
    pub fn diff(&self, next: &Self) -> WindowDiff {
        let old: BTreeSet<ChunkCoord> = self.coords().into_iter().collect();
        let new: BTreeSet<ChunkCoord> = next.coords().into_iter().collect();
        WindowDiff {
            entering: new.difference(&old).copied().collect(),
            leaving: old.difference(&new).copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_size_and_membership() {
        let window = VisibilityWindow::new(ChunkCoord::new(3, -2), 2);
        let coords = window.coords();
        assert_eq!(coords.len(), 25);
        assert!(coords.iter().all(|c| window.contains(*c)));
        assert!(!window.contains(ChunkCoord::new(6, -2)));
        assert!(window.contains(ChunkCoord::new(5, 0)));

        let mut sorted = coords.clone();
        sorted.sort();
        assert_eq!(coords, sorted);
    }

    #[test]
    fn test_radius_zero_is_center_only() {
        let window = VisibilityWindow::new(ChunkCoord::new(-7, 7), 0);
        assert_eq!(window.keys(), vec![ChunkKey::new(-7, 7)]);
    }

    #[test]
    fn test_one_step_diff_is_one_column() {
        let r = 2;
        let a = VisibilityWindow::new(ChunkCoord::new(0, 0), r);
        let b = VisibilityWindow::new(ChunkCoord::new(1, 0), r);
        let diff = a.diff(&b);

        assert_eq!(diff.entering.len(), 5);
        assert_eq!(diff.leaving.len(), 5);
        assert!(diff.entering.iter().all(|c| c.x == 3));
        assert!(diff.leaving.iter().all(|c| c.x == -2));
        assert!(a.diff(&a).is_empty());
    }

    #[test]
    fn test_diagonal_step_diff() {
        let a = VisibilityWindow::new(ChunkCoord::new(0, 0), 1);
        let b = VisibilityWindow::new(ChunkCoord::new(1, 1), 1);
        let diff = a.diff(&b);
        // 9 - 4 shared
        assert_eq!(diff.entering.len(), 5);
        assert_eq!(diff.leaving.len(), 5);
    }

    #[test]
    fn test_grid_edge_is_clipped() {
        let window = VisibilityWindow::new(ChunkCoord::new(i32::MAX, 0), 1);
        assert_eq!(window.coords().len(), 6);
    }
}
