//! Tree walk errors

use crate::compiler::tree::NodeKind;
use crate::kit::diagnostics::{Diagnostic, GrammarErrorKind};
use crate::kit::lexer::core::SourceSpan;

pub type WalkResult = Result<(), WalkError>;

/// Errors raised while walking a grammar tree
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum WalkError {
    /// A node does not have the shape its production requires
    #[error("{production}: expected {expected}, found {found}")]
    Mismatch {
        production: &'static str,
        expected: String,
        found: String,
        span: Option<SourceSpan>,
    },

    #[error("no production named `{0}`")]
    UnknownProduction(String),

    #[error("walk exceeded the maximum depth of {0}")]
    RecursionLimit(usize),
}

impl WalkError {
    pub(crate) fn mismatch(production: &'static str, expected: impl Into<String>, found: Option<NodeKind>) -> Self {
        WalkError::Mismatch {
            production,
            expected: expected.into(),
            found: found.map_or_else(|| "end of children".to_string(), |k| k.name().to_string()),
            span: None,
        }
    }

    pub(crate) fn with_span(self, span: Option<SourceSpan>) -> Self {
        match self {
            WalkError::Mismatch {
                production,
                expected,
                found,
                span: None,
            } => WalkError::Mismatch {
                production,
                expected,
                found,
                span,
            },
            other => other,
        }
    }

    pub fn kind(&self) -> GrammarErrorKind {
        match self {
            WalkError::Mismatch { .. } => GrammarErrorKind::StructuralMismatch,
            WalkError::UnknownProduction(_) => GrammarErrorKind::UnknownProduction,
            WalkError::RecursionLimit(_) => GrammarErrorKind::RecursionLimit,
        }
    }

    /// Structured form handed to a diagnostic sink
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::new(self.kind());
        match self {
            WalkError::Mismatch {
                production,
                expected,
                found,
                span,
            } => Diagnostic {
                span: *span,
                ..diagnostic
            }
            .with_arg(*production)
            .with_arg(expected.clone())
            .with_arg(found.clone()),
            WalkError::UnknownProduction(name) => diagnostic.with_arg(name.clone()),
            WalkError::RecursionLimit(depth) => diagnostic.with_arg(depth.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message() {
        let err = WalkError::mismatch("rule", "RULE_REF", Some(NodeKind::Block));
        assert_eq!(err.to_string(), "rule: expected RULE_REF, found BLOCK");

        let err = WalkError::mismatch("range", "STRING_LITERAL", None);
        assert_eq!(err.to_string(), "range: expected STRING_LITERAL, found end of children");
    }

    #[test]
    fn test_to_diagnostic() {
        let diag = WalkError::UnknownProduction("nope".into()).to_diagnostic();
        assert_eq!(diag.kind, GrammarErrorKind::UnknownProduction);
        assert_eq!(diag.args, vec!["nope".to_string()]);

        let diag = WalkError::mismatch("alternative", "ALT", Some(NodeKind::Rule)).to_diagnostic();
        assert_eq!(diag.kind, GrammarErrorKind::StructuralMismatch);
        assert_eq!(diag.args.len(), 3);
    }
}
