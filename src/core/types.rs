//! Common types used across the ledger modules.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 256-bit hash value (SHA3-256).
///
/// Serialized as a lowercase hex string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// Create a new Hash256 from bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create a zero hash.
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Get the bytes of the hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl std::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Default for Hash256 {
    fn default() -> Self {
        Self::zero()
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        // only the canonical form, so decoded hashes re-encode to the same bytes
        if s.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(serde::de::Error::custom("hash must be lowercase hex"));
        }
        Hash256::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Timestamp wrapper for consistent serialization.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Get current UTC timestamp.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}

/// Role an identity plays in the consortium.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Submits artifacts and receives credentials.
    Holder,
    /// Reviews submissions and mints credentials.
    Issuer,
    /// Checks presented credentials.
    Verifier,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Holder => write!(f, "HOLDER"),
            Role::Issuer => write!(f, "ISSUER"),
            Role::Verifier => write!(f, "VERIFIER"),
        }
    }
}

/// An opaque content payload with its filename.
///
/// Artifacts are identified by the hash of their payload; the filename is
/// metadata only and never hashed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Raw content (base64 in JSON)
    #[serde(with = "base64_bytes")]
    pub payload: Vec<u8>,
    /// Original filename
    pub filename: String,
}

impl Artifact {
    /// Create a new artifact.
    pub fn new(payload: impl Into<Vec<u8>>, filename: &str) -> Self {
        Self {
            payload: payload.into(),
            filename: filename.to_string(),
        }
    }
}

/// Serde adapter encoding byte payloads as standard base64 strings.
pub(crate) mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(s.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash256_zero() {
        let hash = Hash256::zero();
        assert_eq!(hash.0, [0u8; 32]);
    }

    #[test]
    fn test_hash256_from_hex_rejects_short_input() {
        assert!(Hash256::from_hex("abcd").is_err());
        assert!(Hash256::from_hex("zz").is_err());
    }

    #[test]
    fn test_hash256_serializes_as_hex_string() {
        let hash = Hash256::new([0xab; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        let parsed: Hash256 = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn test_hash256_rejects_non_canonical_hex() {
        let hex = Hash256::new([0xab; 32]).to_hex();
        let upper = serde_json::to_string(&hex.to_uppercase()).unwrap();
        assert!(serde_json::from_str::<Hash256>(&upper).is_err());
        assert!(serde_json::from_str::<Hash256>("\"deadbeef\"").is_err());
        let canonical = serde_json::to_string(&hex).unwrap();
        assert_eq!(
            serde_json::from_str::<Hash256>(&canonical).unwrap(),
            Hash256::new([0xab; 32])
        );
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Issuer).unwrap(), "\"ISSUER\"");
        let role: Role = serde_json::from_str("\"VERIFIER\"").unwrap();
        assert_eq!(role, Role::Verifier);
        assert_eq!(Role::Holder.to_string(), "HOLDER");
    }

    #[test]
    fn test_artifact_payload_is_base64() {
        let artifact = Artifact::new(b"report".to_vec(), "report.pdf");
        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json["payload"], "cmVwb3J0");
        assert_eq!(json["filename"], "report.pdf");
    }
}
