//! Deterministic probability quantization.
//!
//! The coder works on integer cumulative frequencies, so the model's
//! floating-point distribution has to be mapped to 256 integer
//! frequencies that sum to exactly [`TOTAL_FREQ`]. Encoder and decoder
//! run this mapping on identical inputs and must produce identical
//! tables; the redistribution order is therefore fully specified,
//! including ties (stable sort, ascending symbol index).

/// Fixed total every frequency table sums to.
pub const TOTAL_FREQ: u32 = 1 << 16;

/// Integer frequencies and their cumulative prefix sums.
///
/// Every frequency is at least 1, so every byte value stays encodable
/// no matter how lopsided the model's prediction is.
pub struct FrequencyTable {
    freq: [u32; 256],
    cum: [u32; 257],
}

impl FrequencyTable {
    /// Quantize a non-negative distribution to integer frequencies.
    ///
    /// Entries at or below zero are floored to `1e-12` before
    /// normalization; a vector with no positive mass falls back to the
    /// uniform distribution.
    pub fn from_probabilities(probabilities: &[f64; 256]) -> Self {
        let mut probs = *probabilities;
        let mut sum = 0.0f64;
        for p in &mut probs {
            if *p <= 0.0 {
                *p = 1e-12;
            }
            sum += *p;
        }
        if sum <= 0.0 {
            probs = [1.0 / 256.0; 256];
        } else {
            for p in &mut probs {
                *p /= sum;
            }
        }

        let mut freq = [0u32; 256];
        let mut frac = [0.0f64; 256];
        let mut total: u64 = 0;
        for k in 0..256 {
            let raw = probs[k] * TOTAL_FREQ as f64;
            let base = (raw.floor() as u32).max(1);
            freq[k] = base;
            frac[k] = raw - raw.floor();
            total += base as u64;
        }

        let mut order: [usize; 256] = std::array::from_fn(|k| k);
        if total < TOTAL_FREQ as u64 {
            // Hand out the shortfall to the largest fractional parts,
            // ties to the lowest symbol, wrapping if need be.
            order.sort_by(|&a, &b| frac[b].total_cmp(&frac[a]));
            let mut missing = TOTAL_FREQ as u64 - total;
            let mut k = 0usize;
            while missing > 0 {
                freq[order[k % 256]] += 1;
                missing -= 1;
                k += 1;
            }
        } else if total > TOTAL_FREQ as u64 {
            // Claw back the excess from the smallest fractional parts,
            // never dropping a symbol below 1.
            order.sort_by(|&a, &b| frac[a].total_cmp(&frac[b]));
            let mut excess = total - TOTAL_FREQ as u64;
            let mut k = 0usize;
            while excess > 0 {
                let id = order[k % 256];
                if freq[id] > 1 {
                    freq[id] -= 1;
                    excess -= 1;
                }
                k += 1;
            }
        }

        let mut cum = [0u32; 257];
        for k in 0..256 {
            cum[k + 1] = cum[k] + freq[k];
        }
        Self { freq, cum }
    }

    /// Frequency assigned to `symbol`.
    pub fn freq(&self, symbol: u8) -> u32 {
        self.freq[symbol as usize]
    }

    /// Cumulative frequency below `symbol`.
    pub fn low(&self, symbol: u8) -> u32 {
        self.cum[symbol as usize]
    }

    /// Cumulative frequency through `symbol`.
    pub fn high(&self, symbol: u8) -> u32 {
        self.cum[symbol as usize + 1]
    }

    /// The symbol whose cumulative span contains `scaled`, i.e. the
    /// smallest `s` with `scaled < cum[s + 1]`.
    pub fn lookup(&self, scaled: u32) -> Option<u8> {
        if scaled >= TOTAL_FREQ {
            return None;
        }
        let s = self.cum[1..=256].partition_point(|&c| c <= scaled);
        u8::try_from(s).ok()
    }
}
