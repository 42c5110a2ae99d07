use std::{borrow::Cow, path::Path};

use arcstr::ArcStr;
use sugar_path::SugarPath;

/// `ModuleId` is the unique string identifier for each module.
/// - For modules on disk it is the absolute path.
/// - For external modules it is the specifier they are imported with.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct ModuleId(ArcStr);

impl ModuleId {
  pub fn new(value: impl Into<ArcStr>) -> Self {
    Self(value.into())
  }

  pub fn inner(&self) -> &ArcStr {
    &self.0
  }

  /// Slash separated path relative to `cwd`, stable across machines.
  pub fn stabilize(&self, cwd: &Path) -> String {
    if self.as_path().is_absolute() {
      self.relative(cwd).as_path().to_slash_lossy().into_owned()
    } else {
      self.to_string()
    }
  }

  pub fn base_name(&self) -> Cow<'_, str> {
    Path::new(self.0.as_str())
      .file_name()
      .map_or_else(|| Cow::Borrowed(self.0.as_str()), |name| name.to_string_lossy())
  }
}

impl std::ops::Deref for ModuleId {
  type Target = str;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl AsRef<str> for ModuleId {
  fn as_ref(&self) -> &str {
    self
  }
}

impl std::fmt::Display for ModuleId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<ArcStr> for ModuleId {
  fn from(value: ArcStr) -> Self {
    Self::new(value)
  }
}

impl From<&str> for ModuleId {
  fn from(value: &str) -> Self {
    Self::new(value)
  }
}

#[test]
fn stabilize_relative_to_cwd() {
  let cwd = std::env::current_dir().unwrap();
  let id = ModuleId::new(cwd.join("src").join("index.ts").to_string_lossy().as_ref());
  assert_eq!(id.stabilize(&cwd), "src/index.ts");
  assert_eq!(ModuleId::from("left-pad").stabilize(&cwd), "left-pad");
}

#[test]
fn base_name_of_paths_and_specifiers() {
  assert_eq!(ModuleId::from("/project/src/util.ts").base_name(), "util.ts");
  assert_eq!(ModuleId::from("left-pad").base_name(), "left-pad");
}
