//! Audit Infrastructure
//!
//! This crate records every authorization, validation and dispatch decision
//! as an encrypted, append-only audit trail.
//!
//! # Record Format
//!
//! Each record is one JSON object per line:
//!
//! ```text
//! {"id":"…","timestamp":"…","action":"claim_processed","actorRole":"provider","resourceId":"claim-1","encryptedDetails":"<base64>"}
//! ```
//!
//! `encryptedDetails` is `base64(nonce || ciphertext)` of the canonical
//! (sorted-key) JSON of the details, sealed with XChaCha20-Poly1305.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_audit::{AuditKey, AuditRecorder, FileAuditSink, XChaChaAuditCipher};
//!
//! let cipher = XChaChaAuditCipher::new(&AuditKey::from_base64(&key)?);
//! let recorder = AuditRecorder::new(Arc::new(cipher), Arc::new(FileAuditSink::new("audit.log")));
//! recorder.record("claim_processed", "provider", "claim-1", &details).await?;
//! ```

pub mod error;
pub mod cipher;
pub mod entry;
pub mod sink;
pub mod recorder;
pub mod reader;

pub use error::AuditError;
pub use cipher::{AuditCipher, AuditKey, XChaChaAuditCipher};
pub use entry::{AuditEntry, DecryptedAuditEntry};
pub use sink::{AuditSink, FileAuditSink, MemoryAuditSink};
pub use recorder::{AuditRecorder, AuditReceipt, DEFAULT_AUDIT_TIMEOUT};
pub use reader::AuditLogReader;
