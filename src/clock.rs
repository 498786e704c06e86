//! Creation-order timestamps for binder items.

use chrono::Utc;

/// Hands out millisecond timestamps that never repeat or go backwards within a
/// session, even when several items are created inside one millisecond or the
/// wall clock is adjusted.
#[derive(Debug, Default)]
pub struct LogicalClock {
    last: Option<i64>,
}

impl LogicalClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next timestamp: the wall clock, bumped past the previous tick if needed.
    pub fn tick(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let next = match self.last {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last = Some(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_strictly_increase() {
        let mut clock = LogicalClock::new();
        let ticks: Vec<i64> = (0..1000).map(|_| clock.tick()).collect();
        assert!(ticks.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
