#![no_main]
use libfuzzer_sys::fuzz_target;
use phicomp::decompress;

fuzz_target!(|data: &[u8]| {
    // Arbitrary input must never panic; cap the claimed size so a
    // forged header cannot make the decode loop run for minutes.
    if data.len() >= 14 {
        let mut size_bytes = [0u8; 8];
        size_bytes.copy_from_slice(&data[6..14]);
        if u64::from_le_bytes(size_bytes) > 1 << 16 {
            return;
        }
    }
    let _ = decompress(data);
});
