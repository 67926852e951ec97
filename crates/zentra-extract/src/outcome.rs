use std::fmt;

/// Result of a call to an optional external service.
///
/// `Degraded` means the service answered (or was never configured) but gave
/// nothing usable; `Failed` means the call itself did not succeed. Both carry
/// a human-readable reason that ends up in the published result.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
  Ok(T),
  Degraded(String),
  Failed(String),
}

impl<T> Outcome<T> {
  /// The value, discarding any failure reason.
  pub fn ok(self) -> Option<T> {
    match self {
      Outcome::Ok(value) => Some(value),
      _ => None,
    }
  }

  /// Why no value is available, if it is not.
  pub fn reason(&self) -> Option<&str> {
    match self {
      Outcome::Ok(_) => None,
      Outcome::Degraded(reason) | Outcome::Failed(reason) => Some(reason),
    }
  }

  /// Chain a fallible conversion; its failure degrades the outcome.
  pub fn and_then<U, E: fmt::Display>(self, f: impl FnOnce(T) -> Result<U, E>) -> Outcome<U> {
    match self {
      Outcome::Ok(value) => match f(value) {
        Ok(u) => Outcome::Ok(u),
        Err(e) => Outcome::Degraded(e.to_string()),
      },
      Outcome::Degraded(reason) => Outcome::Degraded(reason),
      Outcome::Failed(reason) => Outcome::Failed(reason),
    }
  }
}
