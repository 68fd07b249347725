use crate::error::Result;
use crate::model::Machine;
use crate::transport::ResponseEncoding;

/// Hands payloads through unchanged; the Noise tunnel protects them
#[derive(Debug, Clone, Copy, Default)]
pub struct NoiseEncoding;

impl ResponseEncoding for NoiseEncoding {
    fn seal(&self, payload: Vec<u8>, _machine: &Machine) -> Result<Vec<u8>> {
        Ok(payload)
    }

    fn name(&self) -> &'static str {
        "noise"
    }
}
