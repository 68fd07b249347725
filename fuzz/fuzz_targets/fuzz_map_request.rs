#![no_main]

use libfuzzer_sys::fuzz_target;
use mesh_mapper::core::serialization::WireFormat;
use mesh_mapper::protocol::{MapRequest, MapResponse};

fuzz_target!(|data: &[u8]| {
    // Fuzz request parsing; anything that parses must serialize again
    if let Ok(request) = MapRequest::from_wire(data) {
        let _ = request.to_wire();
    }

    if let Ok(response) = MapResponse::from_wire(data) {
        if let Ok(encoded) = response.to_wire() {
            let _ = MapResponse::from_wire(&encoded);
        }
    }
});
