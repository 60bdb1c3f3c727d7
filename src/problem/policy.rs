use crate::{
    errors::{ImportError, Result},
    problem::snapshot::{BuiltinChecker, Checker, ComparisonKind},
};
use std::path::Path;
use tracing::{info, warn};

/// What happens to a statement in a format the platform cannot render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unsupported {
    Skip,
    Fail,
}

/// Per-format differences in how missing or unusable artifacts are treated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatPolicy {
    /// Checker used when the package provides none; `None` makes that an error.
    pub default_checker: Option<BuiltinChecker>,
    pub unsupported_statement: Unsupported,
}

impl FormatPolicy {
    pub const POLYGON: FormatPolicy = FormatPolicy {
        default_checker: None,
        unsupported_statement: Unsupported::Skip,
    };

    pub const KATTIS: FormatPolicy = FormatPolicy {
        default_checker: Some(BuiltinChecker {
            kind: ComparisonKind::Tokens,
            precision: 0,
            case_sensitive: false,
        }),
        unsupported_statement: Unsupported::Fail,
    };

    /// Resolves the checker of a package whose checker `name` could not be mapped.
    pub fn missing_checker(&self, name: &str) -> Result<Checker> {
        match self.default_checker {
            Some(checker) => {
                info!(checker = %name, ?checker, "using default checker");
                Ok(Checker::Builtin(checker))
            }
            None => Err(ImportError::UnsupportedChecker(name.to_string())),
        }
    }

    /// Applies the policy to a statement in an unsupported `format`.
    pub fn unsupported_statement(&self, path: &Path, format: &str) -> Result<()> {
        match self.unsupported_statement {
            Unsupported::Skip => {
                warn!(path = %path.display(), %format, "skipping statement in unsupported format");
                Ok(())
            }
            Unsupported::Fail => Err(ImportError::UnsupportedStatement {
                path: path.to_path_buf(),
                format: format.to_string(),
            }),
        }
    }
}
