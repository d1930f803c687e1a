//! Input layout detection
//!
//! A collection directory holds either a tabular layout (`factory.csv` and
//! optionally `tokens.csv`) or a discrete-document layout (`factory.json`,
//! optionally `defaultToken.json`, plus one `*.token.json` per token).

use nftmeta_common::{DiagnosticKind, Diagnostics, NftError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const FACTORY_CSV: &str = "factory.csv";
pub const TOKENS_CSV: &str = "tokens.csv";
pub const FACTORY_JSON: &str = "factory.json";
pub const DEFAULT_TOKEN_JSON: &str = "defaultToken.json";
pub const TOKEN_JSON_SUFFIX: &str = ".token.json";

/// Shape of the input directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// `factory.csv` + `tokens.csv`
    Csv,
    /// `factory.json` + `defaultToken.json` + `*.token.json`
    Json,
}

impl InputFormat {
    /// File that must exist for this layout
    pub fn factory_file(self) -> &'static str {
        match self {
            InputFormat::Csv => FACTORY_CSV,
            InputFormat::Json => FACTORY_JSON,
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Csv => write!(f, "csv"),
            InputFormat::Json => write!(f, "json"),
        }
    }
}

/// Decide which normalizer reads `dir`.
///
/// A forced format still requires its factory file. Without one, tabular
/// input wins when both layouts are present.
pub fn detect(
    dir: &Path,
    forced: Option<InputFormat>,
    diagnostics: &mut Diagnostics,
) -> Result<InputFormat> {
    let has = |format: InputFormat| dir.join(format.factory_file()).is_file();

    if let Some(format) = forced {
        if !has(format) {
            return Err(NftError::missing_document(
                format.factory_file(),
                dir.display().to_string(),
            ));
        }
        return Ok(format);
    }

    match (has(InputFormat::Csv), has(InputFormat::Json)) {
        (true, true) => {
            diagnostics.record(
                DiagnosticKind::AmbiguousInput,
                format!(
                    "Both {} and {} found in '{}', reading tabular input",
                    FACTORY_CSV,
                    FACTORY_JSON,
                    dir.display()
                ),
            );
            Ok(InputFormat::Csv)
        },
        (true, false) => Ok(InputFormat::Csv),
        (false, true) => Ok(InputFormat::Json),
        (false, false) => Err(NftError::missing_document(
            "factory",
            dir.display().to_string(),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) {
        std::fs::write(dir.path().join(name), "").unwrap();
    }

    #[test]
    fn test_detect_csv() {
        let dir = TempDir::new().unwrap();
        touch(&dir, FACTORY_CSV);
        let mut diagnostics = Diagnostics::new();

        assert_eq!(detect(dir.path(), None, &mut diagnostics).unwrap(), InputFormat::Csv);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_detect_json() {
        let dir = TempDir::new().unwrap();
        touch(&dir, FACTORY_JSON);
        let mut diagnostics = Diagnostics::new();

        assert_eq!(detect(dir.path(), None, &mut diagnostics).unwrap(), InputFormat::Json);
    }

    #[test]
    fn test_both_layouts_prefers_csv() {
        let dir = TempDir::new().unwrap();
        touch(&dir, FACTORY_CSV);
        touch(&dir, FACTORY_JSON);
        let mut diagnostics = Diagnostics::new();

        assert_eq!(detect(dir.path(), None, &mut diagnostics).unwrap(), InputFormat::Csv);
        assert_eq!(diagnostics.count(DiagnosticKind::AmbiguousInput), 1);
    }

    #[test]
    fn test_forced_format() {
        let dir = TempDir::new().unwrap();
        touch(&dir, FACTORY_CSV);
        touch(&dir, FACTORY_JSON);
        let mut diagnostics = Diagnostics::new();

        let format = detect(dir.path(), Some(InputFormat::Json), &mut diagnostics).unwrap();
        assert_eq!(format, InputFormat::Json);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_forced_format_requires_factory() {
        let dir = TempDir::new().unwrap();
        touch(&dir, FACTORY_CSV);
        let mut diagnostics = Diagnostics::new();

        let result = detect(dir.path(), Some(InputFormat::Json), &mut diagnostics);
        assert!(matches!(result, Err(NftError::MissingDocument { .. })));
    }

    #[test]
    fn test_no_factory_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut diagnostics = Diagnostics::new();

        let result = detect(dir.path(), None, &mut diagnostics);
        assert!(matches!(result, Err(NftError::MissingDocument { .. })));
    }
}
