//! Two-sided addressing for comparison data.
//!
//! Every per-vertex datum in the comparison graph exists once per compared
//! module: LEFT is the old kernel, RIGHT the new one. [`SidePair`] keeps the
//! two values together and indexable by [`Side`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// One of the two modules under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The old module.
    Left,
    /// The new module.
    Right,
}

impl Side {
    /// Both sides, left first.
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// The other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// A pair of values indexed by [`Side`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SidePair<T> {
    pub left: T,
    pub right: T,
}

impl<T> SidePair<T> {
    pub const fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    /// Build a pair by evaluating `f` once per side, left first.
    pub fn from_fn(mut f: impl FnMut(Side) -> T) -> Self {
        Self {
            left: f(Side::Left),
            right: f(Side::Right),
        }
    }

    /// Apply `f` to both values, preserving sides.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> SidePair<U> {
        SidePair {
            left: f(self.left),
            right: f(self.right),
        }
    }

    /// Borrowing view of the pair.
    pub const fn as_ref(&self) -> SidePair<&T> {
        SidePair {
            left: &self.left,
            right: &self.right,
        }
    }

    /// Iterate `(side, value)` tuples, left first.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        [(Side::Left, &self.left), (Side::Right, &self.right)].into_iter()
    }
}

impl<T> Index<Side> for SidePair<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

impl<T> IndexMut<Side> for SidePair<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }

    #[test]
    fn test_pair_indexing() {
        let mut pair = SidePair::new(1, 2);
        assert_eq!(pair[Side::Left], 1);
        assert_eq!(pair[Side::Right], 2);

        pair[Side::Right] = 7;
        assert_eq!(pair.right, 7);
    }

    #[test]
    fn test_from_fn_order() {
        let pair = SidePair::from_fn(|side| side.to_string());
        assert_eq!(pair.left, "left");
        assert_eq!(pair.right, "right");
    }

    #[test]
    fn test_map_preserves_sides() {
        let pair = SidePair::new("a", "bb").map(str::len);
        assert_eq!(pair, SidePair::new(1, 2));
    }

    #[test]
    fn test_iter_yields_left_first() {
        let pair = SidePair::new(10, 20);
        let collected: Vec<_> = pair.iter().collect();
        assert_eq!(collected, vec![(Side::Left, &10), (Side::Right, &20)]);
    }
}
