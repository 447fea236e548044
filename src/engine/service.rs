//! Credential engine.
//!
//! Owns the ledger, the DID registry and the credential registry behind one
//! lock. Registration, submission and minting each check their preconditions
//! and append under a single write guard; reads return owned snapshots.

use crate::core::{now, Artifact, Error, Hash256, Result, Role};
use crate::engine::config::EngineConfig;
use crate::engine::verification::{CredentialVerifier, VerificationRecord, VerificationResult};
use crate::identity::crypto::{hash_artifacts, sha3_256_multi};
use crate::identity::{
    derive_did, Credential, CredentialRegistry, DidRegistry, Ed25519Scheme, IdentitySigner,
    SignatureScheme, User,
};
use crate::ledger::{
    Ledger, LedgerTransaction, LedgerVerification, TransactionPayload, TransactionType,
};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

/// A newly registered identity: its public record and its signing capability.
#[derive(Clone, Debug)]
pub struct Identity {
    pub user: User,
    pub signer: IdentitySigner,
}

#[derive(Debug, Default)]
struct EngineState {
    dids: DidRegistry,
    credentials: CredentialRegistry,
    ledger: Ledger,
}

impl EngineState {
    fn require_role(&self, did: &str, required: Role) -> Result<()> {
        match self.dids.role_of(did) {
            Some(role) if role == required => Ok(()),
            Some(_) => Err(Error::Unauthorized {
                did: did.to_string(),
                required,
            }),
            None => Err(Error::DidNotFound(did.to_string())),
        }
    }

    fn find_submission(&self, holder_did: &str, artifact_hash: &Hash256) -> Option<&LedgerTransaction> {
        self.ledger
            .find_all_by_data_hash(artifact_hash)
            .into_iter()
            .find(|tx| {
                tx.transaction_type() == TransactionType::PortfolioSubmission
                    && tx.actor == holder_did
            })
    }
}

/// The consortium ledger and credential engine.
///
/// Cloning yields another handle to the same engine.
#[derive(Clone)]
pub struct CredentialEngine {
    config: Arc<EngineConfig>,
    scheme: Arc<dyn SignatureScheme>,
    state: Arc<RwLock<EngineState>>,
    history: Arc<Mutex<VecDeque<VerificationRecord>>>,
}

impl CredentialEngine {
    /// Create an engine using Ed25519 signatures.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_scheme(config, Arc::new(Ed25519Scheme))
    }

    /// Create an engine with a specific signature scheme.
    pub fn with_scheme(config: EngineConfig, scheme: Arc<dyn SignatureScheme>) -> Self {
        tracing::info!(
            scheme = scheme.name(),
            did_method = %config.did_method,
            "credential engine initialized"
        );
        Self {
            config: Arc::new(config),
            scheme,
            state: Arc::new(RwLock::new(EngineState::default())),
            history: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // -- Actor operations -----------------------------------------------------

    /// Generate a key pair, derive a DID and register it with `role`.
    ///
    /// The returned signer is the only holder of the private key.
    pub fn register_identity(&self, role: Role) -> Result<Identity> {
        let key_pair = self.scheme.generate_keypair();
        let did = derive_did(
            &self.config.did_method,
            &key_pair.public_key,
            self.config.effective_did_hash_len(),
        );
        let public_key_hex = hex::encode(&key_pair.public_key);

        let mut state = self.state.write();
        state
            .dids
            .register(&did, &key_pair.public_key, role)
            .map_err(|e| rejected("register_identity", e))?;

        let data_hash = sha3_256_multi(&[did.as_bytes(), public_key_hex.as_bytes()]);
        state.ledger.append(
            &did,
            data_hash,
            TransactionPayload::DidRegistration {
                role,
                public_key: public_key_hex.clone(),
            },
        );
        drop(state);

        tracing::info!(did = %did, role = %role, "identity registered");

        let signer = IdentitySigner::new(&did, key_pair, Arc::clone(&self.scheme));
        Ok(Identity {
            user: User {
                did,
                role,
                public_key: public_key_hex,
            },
            signer,
        })
    }

    /// Look up a registered identity's public record.
    pub fn login(&self, did: &str) -> Result<User> {
        self.state
            .read()
            .dids
            .user(did)
            .ok_or_else(|| Error::DidNotFound(did.to_string()))
    }

    /// Record a holder's ordered portfolio and return its combined hash.
    pub fn submit_portfolio(&self, holder_did: &str, artifacts: Vec<Artifact>) -> Result<Hash256> {
        let mut state = self.state.write();
        state
            .require_role(holder_did, Role::Holder)
            .map_err(|e| rejected("submit_portfolio", e))?;
        if artifacts.is_empty() {
            return Err(rejected("submit_portfolio", Error::EmptyPortfolio));
        }

        let artifact_hash = hash_artifacts(&artifacts);
        state.ledger.append(
            holder_did,
            artifact_hash.clone(),
            TransactionPayload::PortfolioSubmission {
                artifact_hash: artifact_hash.clone(),
                artifacts,
            },
        );
        Ok(artifact_hash)
    }

    /// Mint, register and record a credential for a holder's submission.
    pub fn mint_credential(
        &self,
        issuer: &IdentitySigner,
        holder_did: &str,
        artifact_hash: &Hash256,
        attachments: Option<Vec<Artifact>>,
    ) -> Result<Credential> {
        let mut state = self.state.write();
        self.check_mint(&state, issuer, holder_did, artifact_hash)
            .map_err(|e| rejected("mint_credential", e))?;

        let credential = Credential::mint(issuer, holder_did, artifact_hash, attachments)?;
        let data_hash = credential.content_hash()?;

        state.credentials.insert(credential.clone());
        state.ledger.append(
            issuer.did(),
            data_hash,
            TransactionPayload::VcIssuance {
                credential_id: credential.id.clone(),
                holder_did: holder_did.to_string(),
                credential: credential.clone(),
            },
        );
        drop(state);

        tracing::info!(
            credential_id = %credential.id,
            issuer = %credential.issuer_did,
            holder = %holder_did,
            "credential minted"
        );
        Ok(credential)
    }

    fn check_mint(
        &self,
        state: &EngineState,
        issuer: &IdentitySigner,
        holder_did: &str,
        artifact_hash: &Hash256,
    ) -> Result<()> {
        state.require_role(issuer.did(), Role::Issuer)?;
        // signer must hold the key registered for its DID
        if state.dids.resolve(issuer.did())? != issuer.public_key() {
            return Err(Error::Unauthorized {
                did: issuer.did().to_string(),
                required: Role::Issuer,
            });
        }
        state.require_role(holder_did, Role::Holder)?;

        if self.config.require_submission
            && state.find_submission(holder_did, artifact_hash).is_none()
        {
            return Err(Error::SubmissionNotFound {
                holder_did: holder_did.to_string(),
                artifact_hash: artifact_hash.to_hex(),
            });
        }
        if self.config.reject_duplicate_mint && state.credentials.is_minted(holder_did, artifact_hash)
        {
            return Err(Error::AlreadyMinted {
                holder_did: holder_did.to_string(),
                artifact_hash: artifact_hash.to_hex(),
            });
        }
        Ok(())
    }

    /// Verify a serialized credential and record the outcome in the history.
    pub fn verify_credential(&self, serialized: &str) -> VerificationResult {
        let state = self.state.read();
        let (credential, result) =
            CredentialVerifier::new(&state.dids, &state.credentials, self.scheme.as_ref())
                .verify_json(serialized);
        drop(state);

        self.record_verification(credential.map(|c| c.id), &result);
        result
    }

    /// Verify an already decoded credential and record the outcome.
    pub fn verify_presented(&self, credential: &Credential) -> VerificationResult {
        let state = self.state.read();
        let result = CredentialVerifier::new(&state.dids, &state.credentials, self.scheme.as_ref())
            .verify(credential);
        drop(state);

        self.record_verification(Some(credential.id.clone()), &result);
        result
    }

    fn record_verification(&self, credential_id: Option<String>, result: &VerificationResult) {
        match &result.reason {
            None => tracing::info!(
                credential_id = credential_id.as_deref().unwrap_or("-"),
                "credential verified"
            ),
            Some(reason) => tracing::warn!(
                credential_id = credential_id.as_deref().unwrap_or("-"),
                reason = %reason,
                "credential rejected"
            ),
        }

        let limit = self.config.verification_history_limit;
        if limit == 0 {
            return;
        }
        let mut history = self.history.lock();
        while history.len() >= limit {
            history.pop_back();
        }
        history.push_front(VerificationRecord {
            timestamp: now(),
            credential_id,
            result: result.clone(),
        });
    }

    // -- Snapshots ------------------------------------------------------------

    /// Every ledger transaction, in order.
    pub fn ledger_snapshot(&self) -> Vec<LedgerTransaction> {
        self.state.read().ledger.all()
    }

    pub fn ledger_len(&self) -> usize {
        self.state.read().ledger.len()
    }

    /// `did -> public key (hex)`.
    pub fn did_registry_snapshot(&self) -> BTreeMap<String, String> {
        self.state.read().dids.snapshot()
    }

    /// Public records of every identity, in registration order.
    pub fn users_snapshot(&self) -> Vec<User> {
        self.state.read().dids.users()
    }

    /// Verification outcomes, newest first.
    pub fn verification_history(&self) -> Vec<VerificationRecord> {
        self.history.lock().iter().cloned().collect()
    }

    /// Check the hash chain of the whole ledger.
    pub fn verify_ledger(&self) -> LedgerVerification {
        self.state.read().ledger.verify()
    }

    // -- Workflow queries -----------------------------------------------------

    /// First transaction recorded with `hash`.
    pub fn find_by_data_hash(&self, hash: &Hash256) -> Option<LedgerTransaction> {
        self.state.read().ledger.find_by_data_hash(hash).cloned()
    }

    /// Transactions of one type, in order.
    pub fn transactions_of_type(&self, tx_type: TransactionType) -> Vec<LedgerTransaction> {
        self.state
            .read()
            .ledger
            .filter_by_type(tx_type)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Portfolio submissions made by a holder.
    pub fn submissions_by(&self, holder_did: &str) -> Vec<LedgerTransaction> {
        self.state
            .read()
            .ledger
            .filter_by_type(TransactionType::PortfolioSubmission)
            .into_iter()
            .filter(|tx| tx.actor == holder_did)
            .cloned()
            .collect()
    }

    /// The holder's submission backing an artifact hash.
    pub fn submission_for(&self, holder_did: &str, artifact_hash: &Hash256) -> Option<LedgerTransaction> {
        self.state
            .read()
            .find_submission(holder_did, artifact_hash)
            .cloned()
    }

    /// Submissions that have no credential yet.
    pub fn pending_submissions(&self) -> Vec<LedgerTransaction> {
        let state = self.state.read();
        state
            .ledger
            .filter_by_type(TransactionType::PortfolioSubmission)
            .into_iter()
            .filter(|tx| !state.credentials.is_minted(&tx.actor, &tx.data_hash))
            .cloned()
            .collect()
    }

    /// Whether a credential exists for this holder and artifact hash.
    pub fn is_minted(&self, holder_did: &str, artifact_hash: &Hash256) -> bool {
        self.state.read().credentials.is_minted(holder_did, artifact_hash)
    }

    /// Credentials issued to a holder, in ledger order.
    pub fn credentials_for(&self, holder_did: &str) -> Vec<Credential> {
        self.issued_where(|c| c.holder_did == holder_did)
    }

    /// Credentials minted by an issuer, in ledger order.
    pub fn credentials_issued_by(&self, issuer_did: &str) -> Vec<Credential> {
        self.issued_where(|c| c.issuer_did == issuer_did)
    }

    fn issued_where(&self, predicate: impl Fn(&Credential) -> bool) -> Vec<Credential> {
        self.state
            .read()
            .ledger
            .filter_by_type(TransactionType::VcIssuance)
            .into_iter()
            .filter_map(|tx| tx.credential())
            .filter(|c| predicate(c))
            .cloned()
            .collect()
    }

    /// A minted credential by ID.
    pub fn credential(&self, credential_id: &str) -> Option<Credential> {
        self.state.read().credentials.get(credential_id).cloned()
    }
}

impl Default for CredentialEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for CredentialEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("CredentialEngine")
            .field("scheme", &self.scheme.name())
            .field("identities", &state.dids.len())
            .field("credentials", &state.credentials.len())
            .field("ledger_len", &state.ledger.len())
            .finish()
    }
}

fn rejected(operation: &'static str, err: Error) -> Error {
    tracing::warn!(operation, error = %err, "operation rejected");
    err
}
