//! Periodic ring arithmetic for logical axes
//!
//! Every logical axis is a ring: stepping past the last position lands on
//! position 0 and vice versa.

use crate::direction::Sense;

/// Wrap index with periodic boundary
#[inline]
pub fn wrap_index(idx: i64, size: usize) -> usize {
    let s = size as i64;
    ((idx % s + s) % s) as usize
}

/// Neighbour of `position` one step in `sense` on a ring of `len` positions
#[inline]
pub fn step(position: usize, len: usize, sense: Sense) -> usize {
    wrap_index(position as i64 + sense.sign(), len)
}

/// Whether the edge leaving `position` in `sense` is the ring's wrap edge
#[inline]
pub fn is_wrap_edge(position: usize, len: usize, sense: Sense) -> bool {
    match sense {
        Sense::Positive => position + 1 == len,
        Sense::Negative => position == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_index() {
        assert_eq!(wrap_index(-1, 8), 7);
        assert_eq!(wrap_index(8, 8), 0);
        assert_eq!(wrap_index(10, 8), 2);
    }

    #[test]
    fn test_step_wraps_both_ways() {
        assert_eq!(step(5, 6, Sense::Positive), 0);
        assert_eq!(step(0, 6, Sense::Negative), 5);
        assert_eq!(step(2, 6, Sense::Negative), 1);
        assert_eq!(step(0, 1, Sense::Positive), 0);
    }

    #[test]
    fn test_wrap_edge() {
        assert!(is_wrap_edge(7, 8, Sense::Positive));
        assert!(!is_wrap_edge(6, 8, Sense::Positive));
        assert!(is_wrap_edge(0, 8, Sense::Negative));
        assert!(!is_wrap_edge(7, 8, Sense::Negative));
    }
}
