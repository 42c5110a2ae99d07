use std::{
  fmt::Display,
  ops::{Deref, DerefMut},
};

/// All errors collected during one build pass. Module tasks run concurrently, so a pass can fail
/// for several unrelated reasons at once.
#[derive(Debug)]
pub struct BuildError(pub Vec<anyhow::Error>);

impl BuildError {
  pub fn messages(&self) -> impl Iterator<Item = String> + '_ {
    self.0.iter().map(|error| format!("{error:#}"))
  }
}

impl Deref for BuildError {
  type Target = Vec<anyhow::Error>;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl DerefMut for BuildError {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.0
  }
}

impl Display for BuildError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for (index, message) in self.messages().enumerate() {
      if index > 0 {
        writeln!(f)?;
      }
      write!(f, "{message}")?;
    }
    Ok(())
  }
}

impl std::error::Error for BuildError {}

impl From<anyhow::Error> for BuildError {
  fn from(error: anyhow::Error) -> Self {
    Self(vec![error])
  }
}

impl From<Vec<anyhow::Error>> for BuildError {
  fn from(errors: Vec<anyhow::Error>) -> Self {
    Self(errors)
  }
}

impl From<std::io::Error> for BuildError {
  fn from(error: std::io::Error) -> Self {
    Self(vec![error.into()])
  }
}

pub type BuildResult<T> = anyhow::Result<T, BuildError>;

#[test]
fn display_joins_every_error() {
  let error = BuildError::from(vec![anyhow::anyhow!("first"), anyhow::anyhow!("second")]);
  assert_eq!(error.to_string(), "first\nsecond");
  assert_eq!(error.len(), 2);
}

#[test]
fn display_keeps_context_chain() {
  let error = BuildError::from(anyhow::anyhow!("root cause").context("reading package.json"));
  assert_eq!(error.to_string(), "reading package.json: root cause");
}
