use std::path::PathBuf;

use tokio::io::AsyncWriteExt;

use crate::artifact::ProofArtifact;
use crate::error::PublishError;

/// Local directory that keeps a copy of every artifact.
#[derive(Debug, Clone)]
pub struct FsArchive {
  root: PathBuf,
}

impl FsArchive {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Write `artifact` as `zentra-<taskId>-<millis>.json`, returning its path.
  pub async fn write(&self, artifact: &ProofArtifact) -> Result<PathBuf, PublishError> {
    tokio::fs::create_dir_all(&self.root).await?;

    let name = format!(
      "zentra-{}-{}.json",
      artifact.task_id,
      artifact.completed_at.timestamp_millis()
    );
    let path = self.root.join(name);

    let mut file = tokio::fs::File::create(&path).await?;
    file.write_all(artifact.to_json()?.as_bytes()).await?;
    file.flush().await?;

    Ok(path)
  }
}
