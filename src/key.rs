//! # Machine Keys
//!
//! Long-term Curve25519 machine keys used by the legacy transport encoding.
//!
//! The server holds a [`MachinePrivate`]; every client declares a
//! [`MachinePublic`] at registration. Legacy map responses are sealed with a
//! NaCl box (XSalsa20-Poly1305) from the server key to the client key.
//!
//! ## Text Forms
//! - Public keys: `mkey:<64 hex chars>`
//! - Private keys: `privkey:<64 hex chars>`
//!
//! ## Sealed Payload Layout
//! ```text
//! [Nonce(24)] [Ciphertext + Poly1305 tag(N + 16)]
//! ```

use crate::error::{constants, MapperError, Result};
use crypto_box::aead::generic_array::GenericArray;
use crypto_box::aead::{Aead, AeadCore, OsRng};
use crypto_box::{PublicKey, SalsaBox, SecretKey, KEY_SIZE};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Text prefix for machine public keys
pub const MACHINE_PUBLIC_PREFIX: &str = "mkey:";

/// Text prefix for machine private keys
pub const MACHINE_PRIVATE_PREFIX: &str = "privkey:";

/// Length of the random nonce prepended to sealed payloads
pub const NONCE_LEN: usize = 24;

/// Prepends `mkey:` to a stored machine key that lacks it.
///
/// Older records persisted the bare hex form.
pub fn ensure_machine_key_prefix(key: &str) -> Cow<'_, str> {
    if key.starts_with(MACHINE_PUBLIC_PREFIX) {
        Cow::Borrowed(key)
    } else {
        Cow::Owned(format!("{MACHINE_PUBLIC_PREFIX}{key}"))
    }
}

fn decode_key_hex(text: &str, prefix: &str) -> Result<[u8; KEY_SIZE]> {
    let raw = text
        .strip_prefix(prefix)
        .ok_or_else(|| MapperError::KeyParse(constants::ERR_KEY_PREFIX.to_string()))?;

    let bytes = hex::decode(raw).map_err(|e| MapperError::KeyParse(e.to_string()))?;

    <[u8; KEY_SIZE]>::try_from(bytes.as_slice())
        .map_err(|_| MapperError::KeyParse(constants::ERR_KEY_LENGTH.to_string()))
}

/// A client's long-term public machine key
#[derive(Clone, PartialEq, Eq)]
pub struct MachinePublic(PublicKey);

impl MachinePublic {
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        self.0.as_bytes()
    }
}

impl From<[u8; KEY_SIZE]> for MachinePublic {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        Self(PublicKey::from(bytes))
    }
}

impl FromStr for MachinePublic {
    type Err = MapperError;

    fn from_str(s: &str) -> Result<Self> {
        decode_key_hex(s, MACHINE_PUBLIC_PREFIX).map(Self::from)
    }
}

impl fmt::Display for MachinePublic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{MACHINE_PUBLIC_PREFIX}{}", hex::encode(self.as_bytes()))
    }
}

impl fmt::Debug for MachinePublic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MachinePublic({self})")
    }
}

/// The server's (or a client's) long-term private machine key
#[derive(Clone)]
pub struct MachinePrivate(SecretKey);

impl MachinePrivate {
    /// Generate a fresh key from the OS random source
    pub fn generate() -> Self {
        Self(SecretKey::generate(&mut OsRng))
    }

    pub fn public(&self) -> MachinePublic {
        MachinePublic(self.0.public_key())
    }

    /// Text form suitable for a key file (`privkey:<hex>`)
    pub fn encode_text(&self) -> String {
        format!("{MACHINE_PRIVATE_PREFIX}{}", hex::encode(self.0.to_bytes()))
    }

    /// Seal `cleartext` so that only `peer` can open it, authenticated as `self`.
    ///
    /// # Errors
    /// Returns `MapperError::EncryptionFailure` if the AEAD rejects the input
    pub fn seal_to(&self, peer: &MachinePublic, cleartext: &[u8]) -> Result<Vec<u8>> {
        let salsa_box = SalsaBox::new(&peer.0, &self.0);
        let nonce = SalsaBox::generate_nonce(&mut OsRng);

        let ciphertext = salsa_box
            .encrypt(&nonce, cleartext)
            .map_err(|_| MapperError::EncryptionFailure)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Open a payload produced by [`MachinePrivate::seal_to`] from `peer`.
    ///
    /// # Errors
    /// Returns `MapperError::DecryptionFailure` if the payload is truncated or
    /// fails authentication
    pub fn open_from(&self, peer: &MachinePublic, sealed: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < NONCE_LEN {
            tracing::debug!(
                len = sealed.len(),
                "{}",
                constants::ERR_SEALED_TOO_SHORT
            );
            return Err(MapperError::DecryptionFailure);
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let salsa_box = SalsaBox::new(&peer.0, &self.0);

        salsa_box
            .decrypt(GenericArray::from_slice(nonce), ciphertext)
            .map_err(|_| MapperError::DecryptionFailure)
    }
}

impl FromStr for MachinePrivate {
    type Err = MapperError;

    fn from_str(s: &str) -> Result<Self> {
        decode_key_hex(s.trim(), MACHINE_PRIVATE_PREFIX).map(|bytes| Self(SecretKey::from(bytes)))
    }
}

impl fmt::Debug for MachinePrivate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MachinePrivate({})", self.public())
    }
}
