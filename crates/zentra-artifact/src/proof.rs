use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use zentra_config::ProofConfig;

use crate::Publisher;
use crate::archive::FsArchive;
use crate::artifact::ProofArtifact;
use crate::error::PublishError;
use crate::paste::PasteRsPublisher;

/// Where a proof ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
  pub url: String,
  /// False when `url` is a synthesized placeholder that hosts nothing.
  pub hosted: bool,
}

/// `<base>/proof?taskId=<id>&ts=<millis>`
pub fn placeholder_url(base: &str, task_id: u64, millis: i64) -> String {
  format!(
    "{}/proof?taskId={}&ts={}",
    base.trim_end_matches('/'),
    task_id,
    millis
  )
}

/// Publishes artifacts, archiving them locally and falling back to a
/// placeholder URL when hosting fails.
pub struct ProofPublisher {
  publisher: Arc<dyn Publisher>,
  placeholder_base: String,
  archive: Option<FsArchive>,
}

impl ProofPublisher {
  pub fn new(publisher: Arc<dyn Publisher>, placeholder_base: impl Into<String>) -> Self {
    Self {
      publisher,
      placeholder_base: placeholder_base.into(),
      archive: None,
    }
  }

  pub fn from_config(config: &ProofConfig) -> Result<Self, PublishError> {
    let publisher = PasteRsPublisher::new(config.endpoint.clone(), config.timeout())?;
    let mut proof = Self::new(Arc::new(publisher), config.placeholder_base.clone());
    if let Some(dir) = &config.archive_dir {
      proof = proof.with_archive(FsArchive::new(dir));
    }
    Ok(proof)
  }

  pub fn with_archive(mut self, archive: FsArchive) -> Self {
    self.archive = Some(archive);
    self
  }

  /// Publish `artifact`. Never fails; see [`Proof::hosted`].
  pub async fn publish(&self, artifact: &ProofArtifact) -> Proof {
    if let Some(archive) = &self.archive {
      match archive.write(artifact).await {
        Ok(path) => info!(task_id = artifact.task_id, path = %path.display(), "proof archived"),
        Err(e) => warn!(task_id = artifact.task_id, error = %e, "failed to archive proof"),
      }
    }

    let uploaded = match artifact.to_json() {
      Ok(body) => self.publisher.publish(&body).await,
      Err(e) => Err(e),
    };

    match uploaded {
      Ok(url) => {
        info!(task_id = artifact.task_id, url = %url, "proof published");
        Proof { url, hosted: true }
      }
      Err(e) => {
        let url = placeholder_url(
          &self.placeholder_base,
          artifact.task_id,
          Utc::now().timestamp_millis(),
        );
        warn!(task_id = artifact.task_id, error = %e, url = %url, "proof upload failed, using placeholder");
        Proof { url, hosted: false }
      }
    }
  }
}
