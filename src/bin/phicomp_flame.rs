use phicomp::{compress, decompress};

fn main() {
    let input: Vec<u8> = (0..10_000u32)
        .map(|i| b"abracadabra"[(i % 11) as usize])
        .collect();

    for _ in 0..100 {
        let compressed = compress(&input);
        let output = decompress(&compressed).expect("valid container");
        assert_eq!(input, output);
    }
}
