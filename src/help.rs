/// Instructions text shown by the front end
use std::path::Path;

use crate::error::{DrumError, Result};

pub fn load_help_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| DrumError::HelpUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if text.trim().is_empty() {
        return Err(DrumError::HelpUnavailable {
            path: path.to_path_buf(),
            reason: "file is empty".to_string(),
        });
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let err = load_help_text("/nonexistent/user_manual.md").unwrap_err();
        assert!(matches!(err, DrumError::HelpUnavailable { .. }));
    }

    #[test]
    fn test_bundled_manual_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/user_manual.md");
        let text = load_help_text(path).unwrap();
        assert!(text.contains("Sequencer"));
    }
}
