//! Shuffle cycles.
//!
//! A cycle is a permutation of every catalog index. "Next" walks the cycle,
//! so no track comes up twice before every other track was offered once.
//! When a cycle runs out a fresh one is drawn, avoiding an immediate repeat
//! of the track that just played.

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

pub(crate) struct ShuffleOrder {
    order: Vec<usize>,
    pos: usize,
    rng: StdRng,
}

impl ShuffleOrder {
    pub fn new(rng: StdRng) -> Self {
        Self {
            order: Vec::new(),
            pos: 0,
            rng,
        }
    }

    /// Forget the current cycle; the next call draws a new one.
    pub fn invalidate(&mut self) {
        self.order.clear();
        self.pos = 0;
    }

    /// Start a new cycle of `len` tracks with `current` in front.
    pub fn rebuild(&mut self, len: usize, current: usize) {
        self.order = (0..len).filter(|&i| i != current).collect();
        self.order.shuffle(&mut self.rng);
        if current < len {
            self.order.insert(0, current);
        }
        self.pos = 0;
    }

    /// Point the cursor at `index` after an explicit jump.
    pub fn sync(&mut self, index: usize) {
        if let Some(p) = self.order.iter().position(|&i| i == index) {
            self.pos = p;
        }
    }

    pub fn next(&mut self, len: usize, current: usize, wrap: bool) -> Option<usize> {
        self.ensure(len, current);
        if self.pos + 1 < self.order.len() {
            self.pos += 1;
            return Some(self.order[self.pos]);
        }
        if !wrap {
            return None;
        }

        self.order.shuffle(&mut self.rng);
        if self.order.len() > 1 && self.order[0] == current {
            let j = self.rng.random_range(1..self.order.len());
            self.order.swap(0, j);
        }
        self.pos = 0;
        self.order.first().copied()
    }

    pub fn prev(&mut self, len: usize, current: usize, wrap: bool) -> Option<usize> {
        self.ensure(len, current);
        if self.pos > 0 {
            self.pos -= 1;
            return Some(self.order[self.pos]);
        }
        if !wrap || self.order.is_empty() {
            return None;
        }
        self.pos = self.order.len() - 1;
        Some(self.order[self.pos])
    }

    fn ensure(&mut self, len: usize, current: usize) {
        if self.order.len() != len || self.order.get(self.pos) != Some(&current) {
            if self.order.len() == len && self.order.contains(&current) {
                self.sync(current);
            } else {
                self.rebuild(len, current);
            }
        }
    }

    #[cfg(test)]
    pub fn order(&self) -> &[usize] {
        &self.order
    }
}
