//! Circular navigation over the image collection.

/// Direction for navigation through images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Index reached by moving one step from `index` in a collection of `len`
/// images. Wraps past either end; there is no end-of-list stop.
///
/// `len` must be non-zero.
pub fn step(index: usize, len: usize, direction: Direction) -> usize {
    debug_assert!(len > 0, "navigation step on empty collection");
    match direction {
        Direction::Next => (index + 1) % len,
        Direction::Previous => {
            if index == 0 {
                len - 1
            } else {
                index - 1
            }
        }
    }
}
