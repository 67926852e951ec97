//! Zentra Artifact
//!
//! Turns an execution result into a durable, fetchable proof. The
//! [`Publisher`] trait is the hosting backend (a paste service by default);
//! [`ProofPublisher`] wraps it with the placeholder fallback and the optional
//! local archive, so publishing always yields a URL.

mod archive;
mod artifact;
mod error;
mod paste;
mod proof;

pub use archive::FsArchive;
pub use artifact::ProofArtifact;
pub use error::PublishError;
pub use paste::PasteRsPublisher;
pub use proof::{Proof, ProofPublisher, placeholder_url};

use async_trait::async_trait;

/// Proof hosting backend.
#[async_trait]
pub trait Publisher: Send + Sync {
  /// Upload a serialized artifact, returning the URL it can be fetched from.
  async fn publish(&self, body: &str) -> Result<String, PublishError>;
}
