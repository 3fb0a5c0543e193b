//! Workspace Root
//!
//! Every path a model hands to a tool is interpreted relative to one root
//! directory and may not leave it.

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, ToolsError};

/// Directory the file tools operate in
#[derive(Clone, Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Workspace rooted at the process working directory
    pub fn current_dir() -> Result<Self> {
        std::env::current_dir()
            .map(Self::new)
            .map_err(ToolsError::io(Path::new(".")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a model-supplied relative path under the root.
    ///
    /// Absolute paths and `..` components are refused.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let path = Path::new(relative);
        let escapes = path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(ToolsError::OutsideRoot(relative.to_owned()));
        }
        Ok(self.root.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative() {
        let ws = Workspace::new("/srv/project");
        assert_eq!(
            ws.resolve("src/main.rs").unwrap(),
            PathBuf::from("/srv/project/src/main.rs")
        );
        assert_eq!(ws.resolve(".").unwrap(), PathBuf::from("/srv/project/."));
    }

    #[test]
    fn test_resolve_refuses_escape() {
        let ws = Workspace::new("/srv/project");
        for path in ["../secrets", "/etc/passwd", "src/../../x"] {
            assert!(
                matches!(ws.resolve(path), Err(ToolsError::OutsideRoot(_))),
                "accepted {path}"
            );
        }
    }

    #[test]
    fn test_current_dir_root() {
        let ws = Workspace::current_dir().unwrap();
        assert_eq!(ws.root(), std::env::current_dir().unwrap().as_path());
    }
}
