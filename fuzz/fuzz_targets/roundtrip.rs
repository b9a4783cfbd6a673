#![no_main]
use libfuzzer_sys::fuzz_target;
use phicomp::{compress_with, decompress_with, RgbdOptions};

fuzz_target!(|data: (Vec<u8>, bool)| {
    let (input, use_rgbd) = data;
    if input.len() > 4096 {
        return;
    }

    let options = RgbdOptions {
        enabled: use_rgbd,
        ..RgbdOptions::default()
    };
    let compressed = compress_with(&input, options);
    let output = decompress_with(&compressed, options).expect("own output must parse");
    assert_eq!(input, output);
});
