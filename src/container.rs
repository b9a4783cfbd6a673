//! Container framing and the public compress/decompress operations.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! offset 0   4 bytes  magic "PHIC"
//! offset 4   1 byte   major version (0x01)
//! offset 5   1 byte   minor version (0x01)
//! offset 6   8 bytes  original size, u64 LE
//! offset 14  ...      arithmetic-coded body
//! ```

use crate::coder::{decode_stream, encode_stream};
use crate::error::{Error, Result};
use crate::model::FibonacciContextModel;
use crate::rgbd::{rgbd_options, RgbdOptions, RgbdOverlay};

/// Magic bytes every container starts with.
pub const MAGIC: [u8; 4] = *b"PHIC";
/// Container major version.
pub const VERSION_MAJOR: u8 = 0x01;
/// Container minor version.
pub const VERSION_MINOR: u8 = 0x01;
/// Fixed header length in bytes.
pub const HEADER_LEN: usize = 14;

fn frame(original_size: u64, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(&MAGIC);
    out.push(VERSION_MAJOR);
    out.push(VERSION_MINOR);
    out.extend_from_slice(&original_size.to_le_bytes());
    out.extend_from_slice(body);
    out
}

fn parse_header(data: &[u8]) -> Result<(u64, &[u8])> {
    if data.len() < HEADER_LEN {
        return Err(Error::InvalidContainer("header too short"));
    }
    if data[0..4] != MAGIC {
        return Err(Error::InvalidContainer("magic number mismatch"));
    }
    let mut size_bytes = [0u8; 8];
    size_bytes.copy_from_slice(&data[6..14]);
    Ok((u64::from_le_bytes(size_bytes), &data[HEADER_LEN..]))
}

/// Compress `data` using the process-scoped RGBD options.
///
/// The output starts with the 14-byte header; empty input produces the
/// bare header.
pub fn compress(data: &[u8]) -> Vec<u8> {
    compress_with(data, rgbd_options())
}

/// Compress `data` with explicit RGBD options.
///
/// This is the per-operation surface: nothing global is read, so
/// concurrent operations with different options cannot interfere.
pub fn compress_with(data: &[u8], options: RgbdOptions) -> Vec<u8> {
    let body = if data.is_empty() {
        Vec::new()
    } else if options.enabled {
        let mut provider = RgbdOverlay::new(FibonacciContextModel::default(), options.phi_weight);
        encode_stream(&mut provider, data)
    } else {
        let mut model = FibonacciContextModel::default();
        encode_stream(&mut model, data)
    };
    frame(data.len() as u64, &body)
}

/// Decompress a container produced by [`compress`], using the
/// process-scoped RGBD options.
///
/// # Errors
/// [`Error::InvalidContainer`] on a short header, wrong magic bytes, or
/// a decoded byte count that does not match the header.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    decompress_with(data, rgbd_options())
}

/// Decompress with explicit RGBD options.
///
/// The options must match the ones the stream was compressed with;
/// otherwise the model diverges and the output is garbage (the header
/// does not record them).
pub fn decompress_with(data: &[u8], options: RgbdOptions) -> Result<Vec<u8>> {
    let (original_size, body) = parse_header(data)?;
    let count =
        usize::try_from(original_size).map_err(|_| Error::InvalidContainer("size too large"))?;

    let output = if options.enabled {
        let mut provider = RgbdOverlay::new(FibonacciContextModel::default(), options.phi_weight);
        decode_stream(&mut provider, body, count)?
    } else {
        let mut model = FibonacciContextModel::default();
        decode_stream(&mut model, body, count)?
    };
    if output.len() != count {
        return Err(Error::InvalidContainer("decoded size mismatch"));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_bare_header() {
        let compressed = compress(b"");
        assert_eq!(
            compressed,
            [b'P', b'H', b'I', b'C', 0x01, 0x01, 0, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(decompress(&compressed).unwrap(), b"");
    }

    #[test]
    fn test_header_records_length() {
        let data = b"header integrity test".repeat(3);
        let compressed = compress(&data);
        assert_eq!(&compressed[0..4], b"PHIC");
        assert_eq!(compressed[4], 0x01);
        assert_eq!(compressed[5], 0x01);
        let mut size_bytes = [0u8; 8];
        size_bytes.copy_from_slice(&compressed[6..14]);
        assert_eq!(u64::from_le_bytes(size_bytes), data.len() as u64);
    }

    #[test]
    fn test_single_byte_roundtrip() {
        let compressed = compress_with(b"A", RgbdOptions::default());
        let mut size_bytes = [0u8; 8];
        size_bytes.copy_from_slice(&compressed[6..14]);
        assert_eq!(u64::from_le_bytes(size_bytes), 1);
        assert_eq!(decompress_with(&compressed, RgbdOptions::default()).unwrap(), b"A");
    }

    #[test]
    fn test_long_zero_run_compresses_hard() {
        let data = vec![0u8; 1000];
        let compressed = compress_with(&data, RgbdOptions::default());
        assert!(compressed.len() < 100, "got {} bytes", compressed.len());
        assert_eq!(decompress_with(&compressed, RgbdOptions::default()).unwrap(), data);
    }

    #[test]
    fn test_short_alternating_text_shrinks() {
        let data = b"ABABABABABA";
        let compressed = compress_with(data, RgbdOptions::default());
        assert!(compressed.len() - HEADER_LEN < data.len());
        assert_eq!(decompress_with(&compressed, RgbdOptions::default()).unwrap(), data);
    }

    #[test]
    fn test_corrupt_magic_rejected() {
        let mut compressed = compress(b"some payload");
        compressed[0] = b'X';
        assert!(matches!(
            decompress(&compressed),
            Err(Error::InvalidContainer(_))
        ));
    }

    #[test]
    fn test_truncated_header_rejected() {
        let compressed = compress(b"some payload");
        assert!(matches!(
            decompress(&compressed[..13]),
            Err(Error::InvalidContainer(_))
        ));
        assert!(matches!(decompress(b""), Err(Error::InvalidContainer(_))));
    }

    #[test]
    fn test_rgbd_roundtrip_with_explicit_options() {
        let options = RgbdOptions {
            enabled: true,
            phi_weight: 0.2,
        };
        let data = b"RGBD test payload".repeat(5);
        let compressed = compress_with(&data, options);
        assert_eq!(decompress_with(&compressed, options).unwrap(), data);
    }

    #[test]
    fn test_rgbd_changes_the_stream() {
        let data = b"the same input twice over".repeat(8);
        let plain = compress_with(&data, RgbdOptions::default());
        let biased = compress_with(
            &data,
            RgbdOptions {
                enabled: true,
                phi_weight: 0.2,
            },
        );
        assert_ne!(plain, biased);
    }
}
