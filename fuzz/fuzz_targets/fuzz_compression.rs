#![no_main]

use libfuzzer_sys::fuzz_target;
use mesh_mapper::utils::compression::{compress, decompress, CompressionKind};
use mesh_mapper::utils::EncoderPool;

fuzz_target!(|data: &[u8]| {
    let pool = EncoderPool::new(1, 1);

    // Fuzz Zstd compression/decompression
    if let Ok(compressed) = compress(data, CompressionKind::Zstd, &pool) {
        let _ = decompress(&compressed, CompressionKind::Zstd);
    }

    // Fuzz raw decompression (test size limits with malformed data)
    let _ = decompress(data, CompressionKind::Zstd);
});
