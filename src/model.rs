//! Fibonacci Context Model (FCM).
//!
//! A multi-order byte predictor: one frequency table per configured
//! context order, mixed with golden-ratio weights so that longer
//! contexts dominate exponentially. A residual escape mass keeps every
//! symbol strictly positive, which the arithmetic coder requires to be
//! able to encode any byte.

use std::collections::{HashMap, VecDeque};

use crate::error::{Error, Result};

/// The golden ratio, `(1 + sqrt(5)) / 2`.
pub const PHI: f64 = 1.618033988749895;

/// Default context orders (a Fibonacci prefix).
pub const DEFAULT_ORDERS: [usize; 5] = [2, 3, 5, 8, 13];

/// Per-context symbol counts.
type SymbolCounts = HashMap<u8, u32>;

/// A source of adaptive next-byte distributions.
///
/// The coder only ever talks to this trait, so overlays (such as the
/// RGBD bias) can be chained in front of the base model without the
/// coder knowing.
pub trait ProbabilityProvider {
    /// Predicted distribution for the next byte. Sums to 1 and every
    /// entry is strictly positive.
    fn predict(&self) -> [f64; 256];

    /// Feed the byte that was just coded back into the model.
    fn observe(&mut self, symbol: u8);
}

/// Adaptive multi-order context model with golden-ratio mixing.
pub struct FibonacciContextModel {
    orders: Vec<usize>,
    max_order: usize,
    tables: Vec<HashMap<Vec<u8>, SymbolCounts>>,
    history: VecDeque<u8>,
}

impl FibonacciContextModel {
    /// Create a model with the given context orders.
    ///
    /// Orders must be positive and strictly increasing; the default set
    /// is [`DEFAULT_ORDERS`].
    ///
    /// # Errors
    /// Returns [`Error::EmptyConfiguration`] if `orders` is empty.
    pub fn with_orders(orders: &[usize]) -> Result<Self> {
        if orders.is_empty() {
            return Err(Error::EmptyConfiguration);
        }
        Ok(Self {
            orders: orders.to_vec(),
            max_order: orders[orders.len() - 1],
            tables: vec![HashMap::new(); orders.len()],
            history: VecDeque::new(),
        })
    }

    /// Number of bytes of history currently retained.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// The last `order` bytes of history as an owned key.
    fn context_key(&self, order: usize) -> Vec<u8> {
        self.history
            .iter()
            .skip(self.history.len() - order)
            .copied()
            .collect()
    }

    /// Record `symbol` in every table whose order is already covered by
    /// the history, then append it to the history.
    ///
    /// Every table sees the pre-update history, so the update is
    /// independent of table iteration order.
    pub fn update(&mut self, symbol: u8) {
        for (i, &order) in self.orders.iter().enumerate() {
            if self.history.len() >= order {
                let key = self.context_key(order);
                *self.tables[i]
                    .entry(key)
                    .or_default()
                    .entry(symbol)
                    .or_insert(0) += 1;
            }
        }
        self.history.push_back(symbol);
        if self.history.len() > self.max_order {
            self.history.pop_front();
        }
    }

    /// Mix the per-order predictions into a single distribution.
    ///
    /// Iterates longest context first; each matched order contributes
    /// its conditional distribution scaled by `phi^i`. The escape mass
    /// `phi^(-n)` is spread uniformly (all of it, when no context
    /// matched at all).
    pub fn probabilities(&self) -> [f64; 256] {
        let mut probs = [0.0f64; 256];
        let mut total_weight = 0.0f64;

        for i in (0..self.orders.len()).rev() {
            let order = self.orders[i];
            if self.history.len() < order {
                continue;
            }
            let key = self.context_key(order);
            let Some(counts) = self.tables[i].get(key.as_slice()) else {
                continue;
            };
            let context_total: u32 = counts.values().sum();
            if context_total > 0 {
                let weight = PHI.powi(i as i32);
                for (&sym, &count) in counts {
                    probs[sym as usize] += weight * (count as f64 / context_total as f64);
                }
                total_weight += weight;
            }
        }

        let mut escape = PHI.powi(-(self.orders.len() as i32));
        if total_weight > 0.0 {
            for p in &mut probs {
                *p = (*p / total_weight) * (1.0 - escape);
            }
        } else {
            escape = 1.0;
        }
        for p in &mut probs {
            *p += escape / 256.0;
        }
        probs
    }
}

impl Default for FibonacciContextModel {
    fn default() -> Self {
        Self {
            orders: DEFAULT_ORDERS.to_vec(),
            max_order: DEFAULT_ORDERS[DEFAULT_ORDERS.len() - 1],
            tables: vec![HashMap::new(); DEFAULT_ORDERS.len()],
            history: VecDeque::new(),
        }
    }
}

impl ProbabilityProvider for FibonacciContextModel {
    fn predict(&self) -> [f64; 256] {
        self.probabilities()
    }

    fn observe(&mut self, symbol: u8) {
        self.update(symbol);
    }
}
