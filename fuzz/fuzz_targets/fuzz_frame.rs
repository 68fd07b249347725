#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use mesh_mapper::core::frame::{decode_frame, MapFrameCodec};
use mesh_mapper::mapper::decode_map_response;
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    // Fuzz frame parsing - test for panics, crashes, infinite loops
    let _ = decode_frame(data);
    let _ = decode_map_response(data, None, None);

    let mut codec = MapFrameCodec::new();
    let mut buf = BytesMut::from(data);
    while let Ok(Some(_)) = codec.decode(&mut buf) {}
});
