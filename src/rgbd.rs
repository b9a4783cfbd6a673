//! Position-indexed bias overlay ("RGBD").
//!
//! An experimental additive bonus on top of the context model: a fixed
//! 60x10x10 grid of `(visit count, last symbol)` cells walked by the
//! byte position modulo 60 and a Fibonacci pair modulo 10. The walk has
//! period 60, so a populated cell is a lag-60 memory of the stream.
//!
//! The grid lived in a process-wide global in earlier revisions; it is
//! now owned by each compress/decompress operation, which starts from a
//! zeroed grid. Only the on/off switch and the weight remain
//! process-scoped.

use std::sync::{Mutex, PoisonError};

use crate::model::ProbabilityProvider;

/// Grid extent along the position axis.
pub const GRID_T: usize = 60;
/// Grid extent along each Fibonacci axis.
pub const GRID_XY: usize = 10;

/// Default bias weight.
pub const DEFAULT_PHI_WEIGHT: f64 = 0.15;

/// Process-scoped bias options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RgbdOptions {
    /// Whether the bias is applied at all.
    pub enabled: bool,
    /// Upper bound on the additive bonus; the bonus saturates towards
    /// this value as a cell's visit count grows.
    pub phi_weight: f64,
}

impl Default for RgbdOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            phi_weight: DEFAULT_PHI_WEIGHT,
        }
    }
}

static OPTIONS: Mutex<RgbdOptions> = Mutex::new(RgbdOptions {
    enabled: false,
    phi_weight: DEFAULT_PHI_WEIGHT,
});

/// Update the process-scoped bias options.
///
/// A `weight` of zero or below leaves the current weight unchanged.
pub fn set_rgbd_options(use_rgbd: bool, weight: f64) {
    let mut options = OPTIONS.lock().unwrap_or_else(PoisonError::into_inner);
    options.enabled = use_rgbd;
    if weight > 0.0 {
        options.phi_weight = weight;
    }
}

/// Snapshot of the process-scoped bias options.
pub fn rgbd_options() -> RgbdOptions {
    *OPTIONS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reset the process-wide bias state.
///
/// Earlier revisions kept one grid per process and required a manual
/// reset between independent operations. Every operation now owns a
/// freshly zeroed grid, so there is nothing left to clear; the function
/// is kept so callers of the original binding surface keep working. Use
/// [`RgbdState::reset`] to clear a state you hold directly.
pub fn reset_rgbd_state() {}

/// The bias grid and walk state.
pub struct RgbdState {
    visits: Box<[[[u16; GRID_XY]; GRID_XY]; GRID_T]>,
    last_symbol: Box<[[[u8; GRID_XY]; GRID_XY]; GRID_T]>,
    fib_n: u8,
    fib_np1: u8,
    index: u64,
}

impl RgbdState {
    /// A zeroed grid with the walk seeded at `(0, 1)`.
    pub fn new() -> Self {
        Self {
            visits: Box::new([[[0; GRID_XY]; GRID_XY]; GRID_T]),
            last_symbol: Box::new([[[0; GRID_XY]; GRID_XY]; GRID_T]),
            fib_n: 0,
            fib_np1: 1,
            index: 0,
        }
    }

    /// Zero the grid and reseed the walk, in place.
    pub fn reset(&mut self) {
        for plane in self.visits.iter_mut() {
            for row in plane.iter_mut() {
                row.fill(0);
            }
        }
        for plane in self.last_symbol.iter_mut() {
            for row in plane.iter_mut() {
                row.fill(0);
            }
        }
        self.fib_n = 0;
        self.fib_np1 = 1;
        self.index = 0;
    }

    /// Number of symbols recorded since the last reset.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Cell addressed by the current walk position.
    fn coords(&self) -> (usize, usize, usize) {
        (
            (self.index % GRID_T as u64) as usize,
            self.fib_n as usize,
            self.fib_np1 as usize,
        )
    }

    /// Record a just-coded symbol at the current position, then advance
    /// the walk.
    pub fn update(&mut self, symbol: u8) {
        let (t, x, y) = self.coords();
        self.last_symbol[t][x][y] = symbol;
        self.visits[t][x][y] = self.visits[t][x][y].saturating_add(1);
        let next = (self.fib_n + self.fib_np1) % 10;
        self.fib_n = self.fib_np1;
        self.fib_np1 = next;
        self.index += 1;
    }

    /// Add the bonus for the cell the next symbol would write to, then
    /// renormalize. Does nothing before the first update or when the
    /// cell has never been visited.
    pub fn apply_bias(&self, probs: &mut [f64; 256], weight: f64) {
        if self.index == 0 {
            return;
        }
        let (t, x, y) = self.coords();
        let visits = self.visits[t][x][y];
        if visits == 0 {
            return;
        }
        let symbol = self.last_symbol[t][x][y] as usize;
        probs[symbol] += weight * visits as f64 / (visits as f64 + 10.0);
        let sum: f64 = probs.iter().sum();
        for p in probs.iter_mut() {
            *p /= sum;
        }
    }
}

impl Default for RgbdState {
    fn default() -> Self {
        Self::new()
    }
}

/// Chains the bias over any inner probability provider.
pub struct RgbdOverlay<P> {
    inner: P,
    state: RgbdState,
    weight: f64,
}

impl<P: ProbabilityProvider> RgbdOverlay<P> {
    /// Wrap `inner` with a fresh grid and the given weight.
    pub fn new(inner: P, weight: f64) -> Self {
        Self {
            inner,
            state: RgbdState::new(),
            weight,
        }
    }
}

impl<P: ProbabilityProvider> ProbabilityProvider for RgbdOverlay<P> {
    fn predict(&self) -> [f64; 256] {
        let mut probs = self.inner.predict();
        self.state.apply_bias(&mut probs, self.weight);
        probs
    }

    fn observe(&mut self, symbol: u8) {
        self.inner.observe(symbol);
        self.state.update(symbol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_follows_fibonacci_mod_10() {
        let mut state = RgbdState::new();
        let expected = [(0u8, 1u8), (1, 1), (1, 2), (2, 3), (3, 5), (5, 8), (8, 3), (3, 1)];
        for &(n, np1) in &expected {
            assert_eq!((state.fib_n, state.fib_np1), (n, np1));
            state.update(0);
        }
    }

    #[test]
    fn test_walk_has_period_60() {
        let mut state = RgbdState::new();
        for _ in 0..GRID_T {
            state.update(0);
        }
        assert_eq!((state.fib_n, state.fib_np1), (0, 1));
        assert_eq!(state.index % GRID_T as u64, 0);
    }

    #[test]
    fn test_bias_skips_untouched_cells() {
        let mut state = RgbdState::new();
        state.update(7);
        let mut probs = [1.0 / 256.0; 256];
        // Position 1 has never been visited.
        state.apply_bias(&mut probs, 0.15);
        assert_eq!(probs, [1.0 / 256.0; 256]);
    }

    #[test]
    fn test_bias_recalls_lag_60_symbol() {
        let mut state = RgbdState::new();
        state.update(b'Q');
        for _ in 1..GRID_T {
            state.update(0);
        }
        // The walk is back at the cell written first.
        let mut probs = [1.0 / 256.0; 256];
        state.apply_bias(&mut probs, 0.15);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(probs[b'Q' as usize] > 1.0 / 256.0);
        assert!(probs[0] < 1.0 / 256.0);
    }

    #[test]
    fn test_bonus_saturates_with_visits() {
        let mut state = RgbdState::new();
        for _ in 0..(GRID_T * 1000) {
            state.update(3);
        }
        let mut probs = [1.0 / 256.0; 256];
        state.apply_bias(&mut probs, 0.15);
        // v / (v + 10) -> 1, so the raw bonus approaches the weight.
        let expected = (1.0 / 256.0 + 0.15 * 1000.0 / 1010.0) / (1.0 + 0.15 * 1000.0 / 1010.0);
        assert!((probs[3] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut state = RgbdState::new();
        for i in 0..100u8 {
            state.update(i);
        }
        state.reset();
        assert_eq!(state.index(), 0);
        assert_eq!((state.fib_n, state.fib_np1), (0, 1));
        let mut probs = [1.0 / 256.0; 256];
        state.apply_bias(&mut probs, 0.5);
        assert_eq!(probs, [1.0 / 256.0; 256]);
    }

    #[test]
    fn test_visit_counts_saturate() {
        let mut state = RgbdState::new();
        for _ in 0..(GRID_T * 70_000) {
            state.update(0);
        }
        let (t, x, y) = state.coords();
        assert_eq!(state.visits[t][x][y], u16::MAX);
    }

    #[test]
    fn test_option_setter_keeps_weight_on_nonpositive() {
        set_rgbd_options(true, 0.3);
        assert_eq!(
            rgbd_options(),
            RgbdOptions {
                enabled: true,
                phi_weight: 0.3
            }
        );
        set_rgbd_options(false, 0.0);
        assert_eq!(
            rgbd_options(),
            RgbdOptions {
                enabled: false,
                phi_weight: 0.3
            }
        );
        set_rgbd_options(false, -1.0);
        assert_eq!(rgbd_options().phi_weight, 0.3);
        // Restore defaults for the rest of the suite.
        set_rgbd_options(false, DEFAULT_PHI_WEIGHT);
    }
}
