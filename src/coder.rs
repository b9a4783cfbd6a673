//! 64-bit arithmetic coder.
//!
//! The classic low/high range coder with E1/E2/E3 renormalization and
//! pending-bit carry resolution. Narrowing runs through 128-bit
//! intermediates so `range * cum` can never overflow; encoder and
//! decoder share the exact same narrowing arithmetic, which is what
//! keeps the two sides in lockstep.

use crate::error::{Error, Result};
use crate::model::ProbabilityProvider;
use crate::quantize::{FrequencyTable, TOTAL_FREQ};

const HALF: u64 = 1 << 63;
const QUARTER: u64 = 1 << 62;
const THREE_QUARTERS: u64 = 3 << 62;

/// Bit sink packing MSB-first into bytes.
struct BitWriter {
    bytes: Vec<u8>,
    nbits: usize,
}

impl BitWriter {
    fn new() -> Self {
        Self {
            bytes: Vec::new(),
            nbits: 0,
        }
    }

    fn push(&mut self, bit: u8) {
        if self.nbits % 8 == 0 {
            self.bytes.push(0);
        }
        if bit != 0 {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 1 << (7 - (self.nbits % 8));
        }
        self.nbits += 1;
    }

    /// The packed bytes; a partial final byte is zero-padded on the
    /// right.
    fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Bit source reading MSB-first, yielding zeros past the end.
struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn next_bit(&mut self) -> u8 {
        let byte = self.pos / 8;
        if byte >= self.data.len() {
            return 0;
        }
        let bit = (self.data[byte] >> (7 - (self.pos % 8))) & 1;
        self.pos += 1;
        bit
    }
}

/// Narrow `(low, high)` to the span of `symbol` in `table`.
fn narrow(low: u64, high: u64, table: &FrequencyTable, symbol: u8) -> (u64, u64) {
    let range = (high as u128) - (low as u128) + 1;
    let low_off = (range * table.low(symbol) as u128 / TOTAL_FREQ as u128) as u64;
    let high_off = (range * table.high(symbol) as u128 / TOTAL_FREQ as u128) as u64;
    let new_low = low + low_off;
    (new_low, new_low + (high_off - low_off) - 1)
}

/// Arithmetic encoder.
pub struct Encoder {
    low: u64,
    high: u64,
    pending_bits: u64,
    bits: BitWriter,
}

impl Encoder {
    /// A fresh encoder spanning the full 64-bit interval.
    pub fn new() -> Self {
        Self {
            low: 0,
            high: u64::MAX,
            pending_bits: 0,
            bits: BitWriter::new(),
        }
    }

    fn emit(&mut self, bit: u8) {
        self.bits.push(bit);
        while self.pending_bits > 0 {
            self.bits.push(bit ^ 1);
            self.pending_bits -= 1;
        }
    }

    /// Encode one symbol against the given frequency table.
    pub fn encode(&mut self, table: &FrequencyTable, symbol: u8) {
        let (low, high) = narrow(self.low, self.high, table, symbol);
        self.low = low;
        self.high = high;
        loop {
            if self.high < HALF {
                self.emit(0);
            } else if self.low >= HALF {
                self.emit(1);
                self.low -= HALF;
                self.high -= HALF;
            } else if self.low >= QUARTER && self.high < THREE_QUARTERS {
                self.pending_bits += 1;
                self.low -= QUARTER;
                self.high -= QUARTER;
            } else {
                break;
            }
            self.low <<= 1;
            self.high = (self.high << 1) | 1;
        }
    }

    /// Flush the final disambiguating bits and return the packed body.
    pub fn finish(mut self) -> Vec<u8> {
        self.pending_bits += 1;
        let bit = u8::from(self.low >= QUARTER);
        self.bits.push(bit);
        for _ in 0..self.pending_bits - 1 {
            self.bits.push(bit ^ 1);
        }
        self.bits.into_bytes()
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Arithmetic decoder.
pub struct Decoder<'a> {
    low: u64,
    high: u64,
    code: u64,
    bits: BitReader<'a>,
}

impl<'a> Decoder<'a> {
    /// Seed the code value from the first 64 bits of `data`
    /// (zero-padded when the body is shorter).
    pub fn new(data: &'a [u8]) -> Self {
        let mut bits = BitReader::new(data);
        let mut code = 0u64;
        for _ in 0..64 {
            code = (code << 1) | bits.next_bit() as u64;
        }
        Self {
            low: 0,
            high: u64::MAX,
            code,
            bits,
        }
    }

    /// Decode one symbol against the given frequency table.
    ///
    /// # Errors
    /// Returns [`Error::InternalInvariant`] if the scaled code value
    /// cannot be located in the table.
    pub fn decode(&mut self, table: &FrequencyTable) -> Result<u8> {
        let range = (self.high as u128) - (self.low as u128) + 1;
        let scaled = ((self.code as u128 - self.low as u128 + 1) * TOTAL_FREQ as u128 - 1) / range;
        let scaled = (scaled as u32).min(TOTAL_FREQ - 1);
        let symbol = table.lookup(scaled).ok_or(Error::InternalInvariant)?;

        let (low, high) = narrow(self.low, self.high, table, symbol);
        self.low = low;
        self.high = high;
        loop {
            if self.high < HALF {
                // E1: no state adjustment, shift only.
            } else if self.low >= HALF {
                self.low -= HALF;
                self.high -= HALF;
                self.code -= HALF;
            } else if self.low >= QUARTER && self.high < THREE_QUARTERS {
                self.low -= QUARTER;
                self.high -= QUARTER;
                self.code -= QUARTER;
            } else {
                break;
            }
            self.low <<= 1;
            self.high = (self.high << 1) | 1;
            self.code = (self.code << 1) | self.bits.next_bit() as u64;
        }
        Ok(symbol)
    }
}

/// Encode a byte stream, querying and updating `provider` per symbol.
pub fn encode_stream<P: ProbabilityProvider>(provider: &mut P, data: &[u8]) -> Vec<u8> {
    let mut encoder = Encoder::new();
    for &byte in data {
        let table = FrequencyTable::from_probabilities(&provider.predict());
        encoder.encode(&table, byte);
        provider.observe(byte);
    }
    encoder.finish()
}

/// Decode `count` bytes, mirroring [`encode_stream`]'s model updates.
pub fn decode_stream<P: ProbabilityProvider>(
    provider: &mut P,
    body: &[u8],
    count: usize,
) -> Result<Vec<u8>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let mut decoder = Decoder::new(body);
    let mut output = Vec::with_capacity(count.min(1 << 20));
    for _ in 0..count {
        let table = FrequencyTable::from_probabilities(&provider.predict());
        let symbol = decoder.decode(&table)?;
        output.push(symbol);
        provider.observe(symbol);
    }
    Ok(output)
}
