//! Script files on disk.
//!
//! Scripts are TOML files in the format described in
//! [`crate::application::script`].  Every path, including those named by
//! `file` steps, is resolved against one base directory (normally the
//! config directory), so an included file does not change where the next
//! include is looked up.

use std::path::{Path, PathBuf};

use crate::application::script::{compile, Script, ScriptError, ScriptLoader, ScriptSpec, StepSpec};

/// Reads script files relative to `base_dir`.
#[derive(Debug, Clone)]
pub struct FileScriptLoader {
    base_dir: PathBuf,
}

impl FileScriptLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl ScriptLoader for FileScriptLoader {
    fn load(&self, path: &str) -> Result<ScriptSpec, ScriptError> {
        let full = self.base_dir.join(path);
        let load_error = |reason: String| ScriptError::Load {
            path: full.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(&full).map_err(|e| load_error(e.to_string()))?;
        toml::from_str(&content).map_err(|e| load_error(e.to_string()))
    }
}

/// Loads and compiles the script at `path` (relative to `base_dir`).
///
/// # Errors
///
/// Returns [`ScriptError::Load`] if the file or one it includes cannot be
/// read or parsed, and the other [`ScriptError`] variants for invalid
/// content.
pub fn load_script(path: &str, base_dir: &Path) -> Result<Script, ScriptError> {
    let root = ScriptSpec {
        steps: vec![StepSpec::File(path.to_string())],
    };
    compile(&root, &FileScriptLoader::new(base_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::script::Step;
    use keybridge_core::InputEvent;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("keybridge-script-test-{}-{}", std::process::id(), name));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_script_follows_includes_relative_to_base_dir() {
        // Arrange
        let dir = scratch_dir("include");
        std::fs::create_dir_all(dir.join("lib")).unwrap();
        std::fs::write(
            dir.join("main.toml"),
            "[[steps]]\nfile = \"lib/copy.toml\"\n\n[[steps]]\ndo = { on = \"f9\", steps = [{ press = \"a\" }] }\n",
        )
        .unwrap();
        std::fs::write(dir.join("lib/copy.toml"), "[[steps]]\nhold = \"ctrl\"\n").unwrap();

        // Act
        let script = load_script("main.toml", &dir).expect("load");

        // Assert
        assert_eq!(script.steps, vec![Step::Send(vec![InputEvent::key_down(0x11)])]);
        assert_eq!(script.triggers.len(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_script_is_a_load_error_naming_the_file() {
        let dir = scratch_dir("missing");

        let err = load_script("absent.toml", &dir).unwrap_err();

        match err {
            ScriptError::Load { path, .. } => assert!(path.ends_with("absent.toml")),
            other => panic!("expected Load, got {other:?}"),
        }
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_malformed_script_is_a_load_error() {
        // Arrange
        let dir = scratch_dir("malformed");
        std::fs::write(dir.join("bad.toml"), "[[steps]]\nwiggle = \"a\"\n").unwrap();

        // Act
        let result = load_script("bad.toml", &dir);

        // Assert
        assert!(matches!(result, Err(ScriptError::Load { .. })));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
