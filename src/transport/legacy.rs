use crate::error::Result;
use crate::key::{ensure_machine_key_prefix, MachinePrivate, MachinePublic};
use crate::model::Machine;
use crate::transport::ResponseEncoding;
use tracing::error;

/// Seals each payload to the requesting machine's declared key
#[derive(Debug, Clone)]
pub struct LegacyEncoding {
    private_key: MachinePrivate,
}

impl LegacyEncoding {
    pub fn new(private_key: MachinePrivate) -> Self {
        Self { private_key }
    }

    /// Public half of the server key, as clients know it
    pub fn server_public(&self) -> MachinePublic {
        self.private_key.public()
    }
}

impl ResponseEncoding for LegacyEncoding {
    fn seal(&self, payload: Vec<u8>, machine: &Machine) -> Result<Vec<u8>> {
        let machine_key: MachinePublic = ensure_machine_key_prefix(&machine.machine_key)
            .parse()
            .map_err(|e| {
                error!(machine = %machine.hostname, error = %e, "Cannot parse client key");
                e
            })?;

        self.private_key.seal_to(&machine_key, &payload)
    }

    fn name(&self) -> &'static str {
        "legacy"
    }

    fn encrypts(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapperError;
    use crate::model::User;

    fn machine_with_key(key: String) -> Machine {
        Machine {
            id: 1,
            machine_key: key,
            node_key: "nodekey:00".into(),
            disco_key: String::new(),
            hostname: "laptop".into(),
            given_name: "laptop".into(),
            user: User::new(1, "alice"),
            ip_addresses: Vec::new(),
            host_info: Default::default(),
            forced_tags: Vec::new(),
        }
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_seal_accepts_bare_hex_key() {
        let server = MachinePrivate::generate();
        let client = MachinePrivate::generate();

        let bare = client.public().to_string().trim_start_matches("mkey:").to_string();
        let encoding = LegacyEncoding::new(server.clone());

        let sealed = encoding.seal(b"payload".to_vec(), &machine_with_key(bare)).unwrap();
        let opened = client.open_from(&encoding.server_public(), &sealed).unwrap();
        assert_eq!(opened, b"payload");
    }

    #[test]
    fn test_seal_rejects_bad_key() {
        let encoding = LegacyEncoding::new(MachinePrivate::generate());
        let result = encoding.seal(b"payload".to_vec(), &machine_with_key("garbage".into()));
        assert!(matches!(result, Err(MapperError::KeyParse(_))));
    }
}
