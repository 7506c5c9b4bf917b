//! Store failure diagnostics
//!
//! Turns store errors into messages a user or operator can act on.

use serde::Serialize;

use crate::types::{FOREIGN_KEY_VIOLATION_CODE, ForgeError, POLICY_VIOLATION_CODE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisKind {
    PolicyViolation,
    ForeignKey,
    NotFound,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub kind: DiagnosisKind,
    pub code: Option<String>,
    pub message: String,
}

/// Diagnose a store error.
pub fn diagnose(err: &ForgeError) -> Diagnosis {
    match err.code() {
        Some(POLICY_VIOLATION_CODE) => {
            let table = match err {
                ForgeError::AccessDenied { table, .. } => table.as_str(),
                _ => "the table",
            };
            Diagnosis {
                kind: DiagnosisKind::PolicyViolation,
                code: Some(POLICY_VIOLATION_CODE.to_string()),
                message: format!(
                    "Permission denied by the access policy on '{}'. Check that the row-level \
                     policies let authenticated users insert, read and delete rows whose \
                     user_id matches their own id, and that the request is signed in.",
                    table
                ),
            }
        }
        Some(FOREIGN_KEY_VIOLATION_CODE) => Diagnosis {
            kind: DiagnosisKind::ForeignKey,
            code: Some(FOREIGN_KEY_VIOLATION_CODE.to_string()),
            message: "The record is still referenced by another record (delete the blueprint \
                      before its idea) or references a record that does not exist."
                .to_string(),
        },
        _ => match err {
            ForgeError::NotFound { entity, id } => Diagnosis {
                kind: DiagnosisKind::NotFound,
                code: None,
                message: format!("{} '{}' was not found", entity, id),
            },
            other => Diagnosis {
                kind: DiagnosisKind::Other,
                code: None,
                message: format!("Storage operation failed: {}", other),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_violation_is_actionable() {
        let err = ForgeError::access_denied("ideas", "new row violates row-level security policy");
        let diagnosis = diagnose(&err);
        assert_eq!(diagnosis.kind, DiagnosisKind::PolicyViolation);
        assert_eq!(diagnosis.code.as_deref(), Some("42501"));
        assert!(diagnosis.message.contains("'ideas'"));
        assert!(diagnosis.message.contains("policies"));
    }

    #[test]
    fn test_generic_error_keeps_underlying_text() {
        let err = ForgeError::Storage("disk I/O error".to_string());
        let diagnosis = diagnose(&err);
        assert_eq!(diagnosis.kind, DiagnosisKind::Other);
        assert!(diagnosis.message.contains("disk I/O error"));
    }

    #[test]
    fn test_not_found() {
        let err = ForgeError::NotFound {
            entity: "Idea",
            id: "i-1".to_string(),
        };
        assert_eq!(diagnose(&err).kind, DiagnosisKind::NotFound);
    }
}
