//! Bag module - 7-bag randomizer with a fixed-length preview
//!
//! Each bag holds one of every piece kind, shuffled. Pieces are handed out in
//! bag order and a fresh bag is shuffled once the last one is drawn, so every
//! aligned run of seven pulls contains all seven kinds.
//!
//! The upcoming pieces live in a small ring buffer: the head slot is the next
//! piece, and pulling refills that slot from the bag before advancing the head.
//! The preview is therefore always exactly the next pulls, including across bag
//! boundaries.

use rand::{seq::SliceRandom, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::types::{PieceKind, QUEUE_LEN};

/// 7-bag piece generator with a `QUEUE_LEN` preview ring
#[derive(Debug, Clone)]
pub struct RandomizationQueue {
    rng: Pcg32,
    bag: [PieceKind; PieceKind::COUNT],
    /// Next unread slot in `bag`; `COUNT` means exhausted
    cursor: usize,
    ring: [PieceKind; QUEUE_LEN],
    head: usize,
}

impl RandomizationQueue {
    /// Create a deterministic queue: equal seeds give equal sequences
    pub fn new(seed: u64) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed))
    }

    /// Create a queue seeded from the operating system
    pub fn from_os_rng() -> Self {
        Self::with_rng(Pcg32::from_os_rng())
    }

    fn with_rng(rng: Pcg32) -> Self {
        let mut queue = Self {
            rng,
            bag: PieceKind::ALL,
            cursor: PieceKind::COUNT,
            ring: [PieceKind::I; QUEUE_LEN],
            head: 0,
        };
        queue.fill_ring();
        queue
    }

    /// Draw the next kind from the bag, shuffling a new bag when empty
    fn draw_from_bag(&mut self) -> PieceKind {
        if self.cursor >= PieceKind::COUNT {
            self.bag = PieceKind::ALL;
            self.bag.shuffle(&mut self.rng);
            self.cursor = 0;
            log::trace!("new bag {:?}", self.bag);
        }
        let kind = self.bag[self.cursor];
        self.cursor += 1;
        kind
    }

    fn fill_ring(&mut self) {
        self.head = 0;
        for i in 0..QUEUE_LEN {
            self.ring[i] = self.draw_from_bag();
        }
    }

    /// Take the next piece and refill the preview
    pub fn pull_next(&mut self) -> PieceKind {
        let next = self.ring[self.head];
        self.ring[self.head] = self.draw_from_bag();
        self.head = (self.head + 1) % QUEUE_LEN;
        next
    }

    /// The next `QUEUE_LEN` pieces in pull order
    pub fn preview(&self) -> [PieceKind; QUEUE_LEN] {
        std::array::from_fn(|i| self.ring[(self.head + i) % QUEUE_LEN])
    }

    /// Discard the current bag and preview and start over.
    ///
    /// The generator keeps its state, so the new sequence differs from the
    /// first one even for a seeded queue.
    pub fn reset(&mut self) {
        self.cursor = PieceKind::COUNT;
        self.fill_ring();
    }
}

impl Default for RandomizationQueue {
    fn default() -> Self {
        Self::from_os_rng()
    }
}
