//! Entropy and compression-efficiency diagnostics.
//!
//! Order-0 Shannon entropy gives the theoretical floor for any coder
//! that ignores context; comparing the actual compressed size against
//! that floor shows how much the context model buys. On repetitive
//! input the codec routinely lands *below* the order-0 floor, so the
//! efficiency figure can exceed 100%.

/// Order-0 Shannon entropy of a byte stream, in bits per byte.
///
/// Returns 0.0 for empty input.
pub fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut byte_counts = [0u64; 256];
    for &byte in data {
        byte_counts[byte as usize] += 1;
    }

    let length = data.len() as f64;
    let mut entropy = 0.0f64;
    for &count in byte_counts.iter() {
        if count > 0 {
            let probability = count as f64 / length;
            entropy -= probability * probability.log2();
        }
    }
    entropy
}

/// Compression efficiency against the order-0 Shannon limit.
///
/// Returns `(efficiency_percent, theoretical_minimum_bytes,
/// actual_compressed_bytes)` where the theoretical minimum is
/// `entropy * len / 8`. Empty original data reports 100% against a
/// zero-byte floor; an empty compressed stream reports 0%.
pub fn compression_efficiency(original: &[u8], compressed: &[u8]) -> (f64, f64, usize) {
    if original.is_empty() {
        return (100.0, 0.0, compressed.len());
    }

    let entropy = shannon_entropy(original);
    let theoretical_minimum_bytes = entropy * original.len() as f64 / 8.0;
    let actual_compressed_bytes = compressed.len();

    if actual_compressed_bytes == 0 {
        return (0.0, theoretical_minimum_bytes, 0);
    }

    let efficiency = theoretical_minimum_bytes / actual_compressed_bytes as f64 * 100.0;
    (efficiency, theoretical_minimum_bytes, actual_compressed_bytes)
}
