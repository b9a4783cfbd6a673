//! # PhiComp
//!
//! *Adaptive context-mixing compression with golden-ratio weighting.*
//!
//! ## Intuition First
//!
//! A text stream is predictable: after "compressio" the next byte is
//! almost certainly "n". An adaptive compressor keeps statistics about
//! which byte followed which recent contexts, predicts a distribution
//! for the next byte, and pays few bits when the prediction is sharp
//! and right. The arithmetic coder is the payment mechanism: it maps
//! the whole message to one point in a repeatedly subdivided interval,
//! spending close to `-log2(p)` bits per symbol.
//!
//! ## The Problem
//!
//! A single fixed context length is always wrong: short contexts adapt
//! instantly but predict vaguely, long contexts predict sharply but
//! rarely match. PhiComp keeps one frequency table per order in
//! `{2, 3, 5, 8, 13}` and mixes their predictions with weights `phi^i`,
//! so longer contexts dominate exponentially when they have data, while
//! an escape mass `phi^(-n)` keeps every byte encodable.
//!
//! ## Historical Context
//!
//! ```text
//! 1948  Shannon        Entropy as the fundamental limit
//! 1976  Rissanen       Arithmetic coding: optimal rate
//! 1984  Cleary/Witten  PPM: adaptive context modeling
//! 1987  Witten et al.  The E1/E2/E3 renormalization coder
//! 2002  Mahoney        Context mixing (PAQ family)
//! ```
//!
//! ## Mathematical Formulation
//!
//! For orders `o_0 < ... < o_{n-1}` with matched-context conditionals
//! `P_i`, the mixed prediction is
//!
//! ```text
//! P(s) = (1 - phi^-n) * (sum_i phi^i P_i(s)) / (sum_i phi^i) + phi^-n / 256
//! ```
//!
//! quantized deterministically to integer frequencies summing to 2^16.
//! Encoder and decoder rebuild identical tables at every step; the
//! compressed stream carries no side information beyond a 14-byte
//! header.
//!
//! ## Complexity Analysis
//!
//! - **Time**: O(n) table probes and a 256-entry quantization per byte.
//! - **Space**: context tables grow with the number of distinct
//!   contexts seen, in practice linear in the input.
//!
//! ## Failure Modes
//!
//! 1. **Desync**: any divergence between encoder- and decoder-side
//!    probability tables corrupts the rest of the stream. Quantization
//!    is therefore fully deterministic, including sort tie-breaks.
//! 2. **High entropy input**: random bytes cost slightly more than 8
//!    bits each; the container never hides that.
//!
//! ## Implementation Notes
//!
//! The coder talks to the model only through
//! [`ProbabilityProvider`], so the optional RGBD positional bias is an
//! overlay ([`RgbdOverlay`]) chained in front of the base model. RGBD
//! state is owned by each operation and starts zeroed; only the on/off
//! switch and weight are process-scoped ([`set_rgbd_options`]).
//! [`shannon_entropy`] and [`compression_efficiency`] report how far
//! the output lands from the context-free order-0 floor.
//!
//! ## References
//!
//! - Witten, I., Neal, R., Cleary, J. (1987). "Arithmetic coding for
//!   data compression."
//! - Cleary, J., Witten, I. (1984). "Data compression using adaptive
//!   coding and partial string matching."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coder;
pub mod container;
pub mod entropy;
pub mod error;
pub mod model;
pub mod quantize;
pub mod rgbd;

pub use container::{compress, compress_with, decompress, decompress_with};
pub use entropy::{compression_efficiency, shannon_entropy};
pub use error::Error;
pub use model::{FibonacciContextModel, ProbabilityProvider};
pub use quantize::FrequencyTable;
pub use rgbd::{reset_rgbd_state, set_rgbd_options, RgbdOptions, RgbdOverlay, RgbdState};
