//! Credential verification protocol.
//!
//! A presented credential moves through
//! `Parse -> ResolveIssuer -> VerifySignature -> CheckRegistry` and stops at
//! the first failing stage. Each failure kind has a stable reason string.

use crate::core::Timestamp;
use crate::identity::{Credential, CredentialRegistry, DidRegistry, SignatureScheme};
use serde::{Deserialize, Serialize};

/// Stages of the verification state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStage {
    Parse,
    ResolveIssuer,
    VerifySignature,
    CheckRegistry,
}

/// Why a credential was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationFailure {
    /// Input could not be decoded as a credential.
    MalformedCredential,
    /// Issuer DID is not in the DID registry.
    UnknownIssuer,
    /// Signature does not match the payload under the issuer's key.
    BadSignature,
    /// Credential was never minted by this engine.
    UnknownCredential,
}

impl VerificationFailure {
    /// Stable, human-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            VerificationFailure::MalformedCredential => "Invalid Format",
            VerificationFailure::UnknownIssuer => "Issuer DID not found in Registry",
            VerificationFailure::BadSignature => "Invalid Digital Signature",
            VerificationFailure::UnknownCredential => {
                "Credential not found in Ledger Registry (Fake VC)"
            }
        }
    }

    /// Stage at which this failure occurs.
    pub fn stage(&self) -> VerificationStage {
        match self {
            VerificationFailure::MalformedCredential => VerificationStage::Parse,
            VerificationFailure::UnknownIssuer => VerificationStage::ResolveIssuer,
            VerificationFailure::BadSignature => VerificationStage::VerifySignature,
            VerificationFailure::UnknownCredential => VerificationStage::CheckRegistry,
        }
    }
}

impl std::fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Outcome of verifying one credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Typed failure kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<VerificationFailure>,
}

impl VerificationResult {
    /// A successful verification.
    pub fn verified(issuer: &str) -> Self {
        Self {
            verified: true,
            reason: None,
            issuer: Some(issuer.to_string()),
            failure: None,
        }
    }

    /// A rejected verification.
    pub fn rejected(failure: VerificationFailure) -> Self {
        Self {
            verified: false,
            reason: Some(failure.reason().to_string()),
            issuer: None,
            failure: Some(failure),
        }
    }
}

/// One entry of the verification history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub timestamp: Timestamp,
    /// ID of the presented credential, when it could be parsed
    pub credential_id: Option<String>,
    pub result: VerificationResult,
}

/// Runs the verification chain against borrowed registries.
pub struct CredentialVerifier<'a> {
    dids: &'a DidRegistry,
    credentials: &'a CredentialRegistry,
    scheme: &'a dyn SignatureScheme,
}

impl<'a> CredentialVerifier<'a> {
    pub fn new(
        dids: &'a DidRegistry,
        credentials: &'a CredentialRegistry,
        scheme: &'a dyn SignatureScheme,
    ) -> Self {
        Self {
            dids,
            credentials,
            scheme,
        }
    }

    /// Parse and verify a serialized credential.
    ///
    /// Returns the parsed credential (if parsing succeeded) with the outcome.
    pub fn verify_json(&self, serialized: &str) -> (Option<Credential>, VerificationResult) {
        match Self::parse(serialized) {
            Ok(credential) => {
                let result = self.verify(&credential);
                (Some(credential), result)
            }
            Err(failure) => (None, VerificationResult::rejected(failure)),
        }
    }

    /// Verify an already decoded credential (skips the parse stage).
    pub fn verify(&self, credential: &Credential) -> VerificationResult {
        match self.run(credential) {
            Ok(()) => VerificationResult::verified(&credential.issuer_did),
            Err(failure) => VerificationResult::rejected(failure),
        }
    }

    fn run(&self, credential: &Credential) -> Result<(), VerificationFailure> {
        let public_key = self.resolve_issuer(credential)?;
        self.verify_signature(credential, public_key)?;
        self.check_registry(credential)
    }

    fn parse(serialized: &str) -> Result<Credential, VerificationFailure> {
        Credential::from_json(serialized).map_err(|e| {
            tracing::debug!(error = %e, "credential parse failed");
            VerificationFailure::MalformedCredential
        })
    }

    fn resolve_issuer(&self, credential: &Credential) -> Result<&'a [u8], VerificationFailure> {
        tracing::debug!(credential_id = %credential.id, issuer = %credential.issuer_did, "resolving issuer");
        self.dids
            .resolve(&credential.issuer_did)
            .map_err(|_| VerificationFailure::UnknownIssuer)
    }

    fn verify_signature(
        &self,
        credential: &Credential,
        public_key: &[u8],
    ) -> Result<(), VerificationFailure> {
        tracing::debug!(credential_id = %credential.id, "verifying signature");
        let signature =
            hex::decode(&credential.signature).map_err(|_| VerificationFailure::BadSignature)?;
        self.scheme
            .verify(public_key, &credential.signing_payload(), &signature)
            .map_err(|_| VerificationFailure::BadSignature)
    }

    /// The presented credential must be exactly one we minted.
    ///
    /// A known id with contents that differ from the minted record was
    /// altered after issuance and fails as a bad signature.
    fn check_registry(&self, credential: &Credential) -> Result<(), VerificationFailure> {
        tracing::debug!(credential_id = %credential.id, "checking credential registry");
        match self.credentials.get(&credential.id) {
            Some(stored) if stored == credential => Ok(()),
            Some(_) => {
                tracing::debug!(credential_id = %credential.id, "presented credential differs from minted record");
                Err(VerificationFailure::BadSignature)
            }
            None => Err(VerificationFailure::UnknownCredential),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Artifact, Role};
    use crate::identity::{sha3_256, Ed25519Scheme, IdentitySigner};
    use std::sync::Arc;

    struct Fixture {
        dids: DidRegistry,
        credentials: CredentialRegistry,
        issuer: IdentitySigner,
    }

    fn fixture() -> Fixture {
        let scheme: Arc<dyn SignatureScheme> = Arc::new(Ed25519Scheme);
        let issuer = IdentitySigner::new(
            "did:consortium:issuer",
            scheme.generate_keypair(),
            scheme,
        );
        let mut dids = DidRegistry::new();
        dids.register(issuer.did(), issuer.public_key(), Role::Issuer)
            .unwrap();
        Fixture {
            dids,
            credentials: CredentialRegistry::new(),
            issuer,
        }
    }

    fn mint(f: &mut Fixture) -> Credential {
        let credential =
            Credential::mint(&f.issuer, "did:consortium:holder", &sha3_256(b"x"), None).unwrap();
        f.credentials.insert(credential.clone());
        credential
    }

    #[test]
    fn test_reason_strings_are_stable() {
        assert_eq!(VerificationFailure::MalformedCredential.reason(), "Invalid Format");
        assert_eq!(
            VerificationFailure::UnknownIssuer.reason(),
            "Issuer DID not found in Registry"
        );
        assert_eq!(
            VerificationFailure::BadSignature.reason(),
            "Invalid Digital Signature"
        );
        assert_eq!(
            VerificationFailure::UnknownCredential.reason(),
            "Credential not found in Ledger Registry (Fake VC)"
        );
    }

    #[test]
    fn test_failure_stages() {
        assert_eq!(
            VerificationFailure::BadSignature.stage(),
            VerificationStage::VerifySignature
        );
        assert_eq!(
            VerificationFailure::UnknownCredential.stage(),
            VerificationStage::CheckRegistry
        );
    }

    #[test]
    fn test_valid_credential() {
        let mut f = fixture();
        let credential = mint(&mut f);
        let verifier = CredentialVerifier::new(&f.dids, &f.credentials, &Ed25519Scheme);
        let (parsed, result) = verifier.verify_json(&credential.to_json().unwrap());
        assert_eq!(parsed.as_ref(), Some(&credential));
        assert_eq!(result, VerificationResult::verified(f.issuer.did()));
    }

    #[test]
    fn test_malformed_input() {
        let f = fixture();
        let verifier = CredentialVerifier::new(&f.dids, &f.credentials, &Ed25519Scheme);
        let (parsed, result) = verifier.verify_json("{\"id\": 42}");
        assert!(parsed.is_none());
        assert_eq!(result.failure, Some(VerificationFailure::MalformedCredential));
        assert_eq!(result.reason.as_deref(), Some("Invalid Format"));
    }

    #[test]
    fn test_non_hex_signature_is_bad_signature() {
        let mut f = fixture();
        let mut credential = mint(&mut f);
        credential.signature = "not-hex".into();
        let verifier = CredentialVerifier::new(&f.dids, &f.credentials, &Ed25519Scheme);
        assert_eq!(
            verifier.verify(&credential).failure,
            Some(VerificationFailure::BadSignature)
        );
    }

    #[test]
    fn test_unknown_issuer_checked_before_signature() {
        let mut f = fixture();
        let mut credential = mint(&mut f);
        credential.issuer_did = "did:consortium:stranger".into();
        credential.signature = "00".into();
        let verifier = CredentialVerifier::new(&f.dids, &f.credentials, &Ed25519Scheme);
        assert_eq!(
            verifier.verify(&credential).failure,
            Some(VerificationFailure::UnknownIssuer)
        );
    }

    #[test]
    fn test_well_signed_but_never_minted() {
        let f = fixture();
        let credential =
            Credential::mint(&f.issuer, "did:consortium:holder", &sha3_256(b"x"), None).unwrap();
        let verifier = CredentialVerifier::new(&f.dids, &f.credentials, &Ed25519Scheme);
        let result = verifier.verify(&credential);
        assert!(!result.verified);
        assert_eq!(result.failure, Some(VerificationFailure::UnknownCredential));
    }

    #[test]
    fn test_altered_minted_credential_is_bad_signature() {
        let mut f = fixture();
        let attachments = vec![
            Artifact::new(b"ab".to_vec(), "one.pdf"),
            Artifact::new(b"c".to_vec(), "two.pdf"),
        ];
        let credential = Credential::mint(
            &f.issuer,
            "did:consortium:holder",
            &sha3_256(b"x"),
            Some(attachments),
        )
        .unwrap();
        f.credentials.insert(credential.clone());
        let verifier = CredentialVerifier::new(&f.dids, &f.credentials, &Ed25519Scheme);

        let mut renamed = credential.clone();
        if let Some(list) = renamed.issuer_attachments.as_mut() {
            list[0].filename = "forged.pdf".into();
        }
        assert_eq!(
            verifier.verify(&renamed).failure,
            Some(VerificationFailure::BadSignature)
        );

        let mut resplit = credential;
        if let Some(list) = resplit.issuer_attachments.as_mut() {
            list[0].data = b"a".to_vec();
            list[1].data = b"bc".to_vec();
        }
        assert_eq!(
            verifier.verify(&resplit).failure,
            Some(VerificationFailure::BadSignature)
        );
    }

    #[test]
    fn test_result_json_shape() {
        let json = serde_json::to_value(VerificationResult::verified("did:x")).unwrap();
        assert_eq!(json["verified"], true);
        assert_eq!(json["issuer"], "did:x");
        assert!(json.get("reason").is_none());

        let json =
            serde_json::to_value(VerificationResult::rejected(VerificationFailure::BadSignature))
                .unwrap();
        assert_eq!(json["verified"], false);
        assert_eq!(json["reason"], "Invalid Digital Signature");
    }
}
