use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::model::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueType {
    Lexical,
    Syntactic,
    Semantic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

/// A problem found while transforming. Issues are collected, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub issue_type: IssueType,
    pub message: String,
    pub severity: IssueSeverity,
    pub span: Option<Span>,
}

impl Issue {
    pub fn lexical(message: impl Into<String>, severity: IssueSeverity, span: Option<Span>) -> Issue {
        Issue { issue_type: IssueType::Lexical, message: message.into(), severity, span }
    }

    pub fn syntactic(message: impl Into<String>, severity: IssueSeverity, span: Option<Span>) -> Issue {
        Issue { issue_type: IssueType::Syntactic, message: message.into(), severity, span }
    }

    pub fn semantic(message: impl Into<String>, severity: IssueSeverity, span: Option<Span>) -> Issue {
        Issue { issue_type: IssueType::Semantic, message: message.into(), severity, span }
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} ({:?})", self.severity, self.issue_type)?;

        if let Some(span) = &self.span {
            write!(f, " at {span}")?;
        }

        write!(f, ": {}", self.message)
    }
}
