// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Randomness source for the cosmetic behaviors.

use rand::Rng;

/// Source of the coin flips and picks the router makes.
pub trait Dice: Send + Sync {
    /// Returns `true` with probability `p`.
    fn chance(&self, p: f64) -> bool;

    /// Uniform index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// Production dice backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngDice;

impl Dice for ThreadRngDice {
    fn chance(&self, p: f64) -> bool {
        rand::thread_rng().gen_bool(p.clamp(0.0, 1.0))
    }

    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}
