//! Gesture stabilizer — majority vote over the last few raw labels.
//!
//! Raw classifications flicker at pose boundaries.  The stabilizer keeps a
//! fixed-size ring of recent labels and only adopts a new active gesture once
//! one label holds a strict majority of the *whole* window (more than half of
//! its capacity, not of however many labels happen to be buffered).  Until
//! then the previous active gesture sticks.  With a window of 6, a new pose
//! takes 4 frames to become active and any single-frame outlier is ignored.

use serde::Deserialize;
use tracing::debug;

use crate::classifier::Gesture;

// ════════════════════════════════════════════════════════════════════════════
// GestureBuffer — fixed-capacity ring
// ════════════════════════════════════════════════════════════════════════════

/// Ring buffer of the last `capacity` raw labels; the oldest is evicted on
/// overflow.
#[derive(Clone, Debug)]
pub struct GestureBuffer {
    slots:       Vec<Gesture>,
    /// Next slot to write.
    write_index: usize,
    len:         usize,
}

impl GestureBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        GestureBuffer {
            slots:       vec![Gesture::None; capacity],
            write_index: 0,
            len:         0,
        }
    }

    pub fn push(&mut self, gesture: Gesture) {
        self.slots[self.write_index] = gesture;
        self.write_index = (self.write_index + 1) % self.slots.len();
        self.len = (self.len + 1).min(self.slots.len());
    }

    pub fn capacity(&self) -> usize { self.slots.len() }
    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }

    pub fn clear(&mut self) {
        self.write_index = 0;
        self.len = 0;
    }

    /// Buffered labels, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = Gesture> + '_ {
        let cap = self.slots.len();
        let start = (self.write_index + cap - self.len) % cap;
        (0..self.len).map(move |i| self.slots[(start + i) % cap])
    }

    /// Most frequent buffered label and its count.  `None` when empty.
    pub fn majority(&self) -> Option<(Gesture, usize)> {
        let mut counts = [0usize; 6];
        for g in self.iter() {
            counts[g.ordinal()] += 1;
        }
        Gesture::ALL
            .iter()
            .map(|&g| (g, counts[g.ordinal()]))
            .filter(|&(_, n)| n > 0)
            .max_by_key(|&(_, n)| n)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureStabilizer
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Number of raw labels in the voting window.
    pub window: usize,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        StabilizerConfig { window: 6 }
    }
}

/// Debounced gesture state.
#[derive(Clone, Debug)]
pub struct GestureStabilizer {
    buffer: GestureBuffer,
    active: Gesture,
}

impl GestureStabilizer {
    pub fn new(config: &StabilizerConfig) -> Self {
        GestureStabilizer {
            buffer: GestureBuffer::new(config.window),
            active: Gesture::None,
        }
    }

    /// Record this frame's raw label and return the (possibly unchanged)
    /// active gesture.
    pub fn push(&mut self, raw: Gesture) -> Gesture {
        self.buffer.push(raw);
        if let Some((winner, count)) = self.buffer.majority() {
            if count * 2 > self.buffer.capacity() && winner != self.active {
                debug!("active gesture {:?} → {:?} ({}/{})",
                       self.active, winner, count, self.buffer.capacity());
                self.active = winner;
            }
        }
        self.active
    }

    pub fn active(&self) -> Gesture { self.active }

    /// Feeds the classifier's pinch hysteresis.
    pub fn pinch_active(&self) -> bool { self.active == Gesture::PinchDraw }

    pub fn buffer(&self) -> &GestureBuffer { &self.buffer }

    /// Forget buffered votes; the active gesture stays until a fresh
    /// majority forms.
    pub fn clear_history(&mut self) {
        self.buffer.clear();
    }

    /// Forget everything, including the active gesture.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.active = Gesture::None;
    }
}

impl Default for GestureStabilizer {
    fn default() -> Self {
        GestureStabilizer::new(&StabilizerConfig::default())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(s: &mut GestureStabilizer, g: Gesture, n: usize) -> Gesture {
        let mut last = s.active();
        for _ in 0..n { last = s.push(g); }
        last
    }

    #[test]
    fn ring_evicts_oldest() {
        let mut b = GestureBuffer::new(3);
        b.push(Gesture::OpenPalm);
        b.push(Gesture::Pointing);
        b.push(Gesture::PinchDraw);
        b.push(Gesture::PeaceClear);
        let v: Vec<_> = b.iter().collect();
        assert_eq!(v, vec![Gesture::Pointing, Gesture::PinchDraw, Gesture::PeaceClear]);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn majority_counts() {
        let mut b = GestureBuffer::new(6);
        assert!(b.majority().is_none());
        for g in [Gesture::Pointing, Gesture::Pointing, Gesture::None, Gesture::Pointing] {
            b.push(g);
        }
        assert_eq!(b.majority(), Some((Gesture::Pointing, 3)));
    }

    #[test]
    fn starts_none_until_majority_of_capacity() {
        let mut s = GestureStabilizer::default();
        assert_eq!(feed(&mut s, Gesture::Pointing, 3), Gesture::None);
        assert_eq!(s.push(Gesture::Pointing), Gesture::Pointing);
    }

    #[test]
    fn single_outlier_is_ignored() {
        let mut s = GestureStabilizer::default();
        feed(&mut s, Gesture::PeaceClear, 6);
        assert_eq!(s.push(Gesture::OpenPalm), Gesture::PeaceClear);
        assert_eq!(feed(&mut s, Gesture::PeaceClear, 3), Gesture::PeaceClear);
    }

    #[test]
    fn split_vote_keeps_previous() {
        let mut s = GestureStabilizer::default();
        feed(&mut s, Gesture::PinchDraw, 6);
        // 3 vs 3 is not a strict majority.
        for g in [Gesture::None, Gesture::Pointing, Gesture::None] {
            s.push(g);
        }
        assert_eq!(s.active(), Gesture::PinchDraw);
        assert!(s.pinch_active());
    }

    #[test]
    fn clear_history_keeps_active() {
        let mut s = GestureStabilizer::default();
        feed(&mut s, Gesture::OpenPalm, 6);
        s.clear_history();
        assert!(s.buffer().is_empty());
        assert_eq!(s.active(), Gesture::OpenPalm);
        s.reset();
        assert_eq!(s.active(), Gesture::None);
    }
}
