use crate::engine::Direction;

/// Direction keys released during one tick.
///
/// At most one direction is acted on per tick; when several keys come up in
/// the same tick the first in [`Released::PRIORITY`] wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Released {
    up: bool,
    left: bool,
    down: bool,
    right: bool,
}

impl Released {
    pub const PRIORITY: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    pub fn release(&mut self, dir: Direction) {
        *self.slot(dir) = true;
    }

    pub fn contains(&self, dir: Direction) -> bool {
        match dir {
            Direction::Up => self.up,
            Direction::Left => self.left,
            Direction::Down => self.down,
            Direction::Right => self.right,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.up || self.left || self.down || self.right)
    }

    /// The direction to act on this tick, if any.
    ///
    /// ```
    /// use console_2048::engine::Direction;
    /// use console_2048::input::Released;
    /// let keys: Released = [Direction::Right, Direction::Down].into_iter().collect();
    /// assert_eq!(keys.direction(), Some(Direction::Down));
    /// ```
    pub fn direction(&self) -> Option<Direction> {
        Self::PRIORITY.into_iter().find(|&d| self.contains(d))
    }

    fn slot(&mut self, dir: Direction) -> &mut bool {
        match dir {
            Direction::Up => &mut self.up,
            Direction::Left => &mut self.left,
            Direction::Down => &mut self.down,
            Direction::Right => &mut self.right,
        }
    }
}

impl FromIterator<Direction> for Released {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut released = Released::default();
        for dir in iter {
            released.release(dir);
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_released_means_no_input() {
        let keys = Released::default();
        assert!(keys.is_empty());
        assert_eq!(keys.direction(), None);
    }

    #[test]
    fn single_key_maps_to_its_direction() {
        for dir in Direction::ALL {
            let keys: Released = std::iter::once(dir).collect();
            assert_eq!(keys.direction(), Some(dir));
        }
    }

    #[test]
    fn priority_is_up_left_down_right() {
        let all: Released = Direction::ALL.into_iter().collect();
        assert_eq!(all.direction(), Some(Direction::Up));

        let keys: Released = [Direction::Right, Direction::Left, Direction::Down]
            .into_iter()
            .collect();
        assert_eq!(keys.direction(), Some(Direction::Left));

        let keys: Released = [Direction::Right, Direction::Down].into_iter().collect();
        assert_eq!(keys.direction(), Some(Direction::Down));
    }

    #[test]
    fn repeated_release_is_idempotent() {
        let mut keys = Released::default();
        keys.release(Direction::Right);
        keys.release(Direction::Right);
        assert!(keys.contains(Direction::Right));
        assert!(!keys.contains(Direction::Up));
        assert_eq!(keys.direction(), Some(Direction::Right));
    }
}
