//! Ring navigation over a section's items.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Bring a stored index back into range. `None` for an empty section.
pub fn wrap(index: usize, size: usize) -> Option<usize> {
    (size > 0).then(|| index % size)
}

/// Index after one step, wrapping at both ends. `None` for an empty section.
pub fn step(index: usize, size: usize, direction: Direction) -> Option<usize> {
    let index = wrap(index, size)?;
    Some(match direction {
        Direction::Forward => (index + 1) % size,
        Direction::Backward => (index + size - 1) % size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_then_back_is_identity() {
        for size in 1..8 {
            for index in 0..size {
                let forward = step(index, size, Direction::Forward).unwrap();
                assert_eq!(step(forward, size, Direction::Backward), Some(index));
                let backward = step(index, size, Direction::Backward).unwrap();
                assert_eq!(step(backward, size, Direction::Forward), Some(index));
            }
        }
    }

    #[test]
    fn wraps_at_the_ends() {
        assert_eq!(step(4, 5, Direction::Forward), Some(0));
        assert_eq!(step(0, 5, Direction::Backward), Some(4));
        assert_eq!(step(0, 1, Direction::Forward), Some(0));
    }

    #[test]
    fn empty_section_has_no_position() {
        assert_eq!(step(0, 0, Direction::Forward), None);
        assert_eq!(step(3, 0, Direction::Backward), None);
        assert_eq!(wrap(0, 0), None);
    }

    #[test]
    fn stale_index_is_wrapped() {
        assert_eq!(wrap(7, 5), Some(2));
        assert_eq!(step(7, 5, Direction::Forward), Some(3));
    }
}
