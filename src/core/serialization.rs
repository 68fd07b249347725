//! # Wire Serialization
//!
//! JSON encoding shared by both transport encodings.
//!
//! The client agent decodes map responses as JSON whether or not they were
//! compressed or sealed afterwards, so this is the only structured format the
//! crate produces.
//!
//! ## Usage
//! ```rust
//! use mesh_mapper::core::serialization::WireFormat;
//! use mesh_mapper::protocol::MapResponse;
//!
//! let bytes = MapResponse::keep_alive().to_wire()?;
//! assert_eq!(bytes, br#"{"KeepAlive":true}"#);
//!
//! let back = MapResponse::from_wire(&bytes)?;
//! assert!(back.keep_alive);
//! # Ok::<(), mesh_mapper::error::MapperError>(())
//! ```

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Trait for types that travel as JSON on the wire
pub trait WireFormat: Serialize + DeserializeOwned + Sized {
    /// Serialize to JSON bytes
    fn to_wire(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize from JSON bytes
    fn from_wire(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

impl<T> WireFormat for T where T: Serialize + DeserializeOwned {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapperError;
    use crate::protocol::{MapRequest, UserProfile};

    #[test]
    #[allow(clippy::expect_used)]
    fn test_profile_json_field_names() {
        let profile = UserProfile {
            id: 7,
            login_name: "alice".to_string(),
            display_name: "alice@example.com".to_string(),
            profile_pic_url: String::new(),
        };

        let bytes = profile.to_wire().expect("serialize");
        let text = std::str::from_utf8(&bytes).expect("utf8");
        assert_eq!(
            text,
            r#"{"ID":7,"LoginName":"alice","DisplayName":"alice@example.com"}"#
        );
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let result = MapRequest::from_wire(b"{not json");
        assert!(matches!(result, Err(MapperError::Serialization(_))));
    }
}
