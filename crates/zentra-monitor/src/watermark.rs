/// Attempted to move a watermark backwards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("watermark cannot move from block {current} back to {requested}")]
pub struct WatermarkError {
  pub current: u64,
  pub requested: u64,
}

/// Highest block height already scanned for events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Watermark {
  height: Option<u64>,
}

impl Watermark {
  /// A watermark that has not scanned anything yet.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn at(height: u64) -> Self {
    Self {
      height: Some(height),
    }
  }

  pub fn height(&self) -> Option<u64> {
    self.height
  }

  /// Move to `height`. Staying put is allowed; going back is not.
  pub fn advance(&mut self, height: u64) -> Result<(), WatermarkError> {
    if let Some(current) = self.height
      && height < current
    {
      return Err(WatermarkError {
        current,
        requested: height,
      });
    }
    self.height = Some(height);
    Ok(())
  }
}
