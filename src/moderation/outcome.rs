//! Results of successful moderation commands

use crate::model::Subject;
use chrono::TimeDelta;

/// What a moderation command did, for reporting back to the chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A warning was recorded below the escalation threshold
    Warned {
        subject: Subject,
        reason: String,
        count: u32,
        max: u32,
    },
    /// The warning reached the threshold: the subject was muted and the count reset
    Escalated {
        subject: Subject,
        reason: String,
        count: u32,
        duration: TimeDelta,
    },
    WarningsCleared {
        subject: Subject,
    },
    NoWarnings {
        subject: Subject,
    },
    WarningCount {
        subject: Subject,
        count: u32,
        max: u32,
    },
    Muted {
        subject: Subject,
        duration: TimeDelta,
    },
    Unmuted {
        subject: Subject,
    },
    Banned {
        subject: Subject,
    },
    Unbanned {
        subject: Subject,
    },
    Promoted {
        subject: Subject,
    },
    Demoted {
        subject: Subject,
    },
}

impl Outcome {
    /// The user the command acted on
    #[must_use]
    pub fn subject(&self) -> &Subject {
        match self {
            Self::Warned { subject, .. }
            | Self::Escalated { subject, .. }
            | Self::WarningsCleared { subject }
            | Self::NoWarnings { subject }
            | Self::WarningCount { subject, .. }
            | Self::Muted { subject, .. }
            | Self::Unmuted { subject }
            | Self::Banned { subject }
            | Self::Unbanned { subject }
            | Self::Promoted { subject }
            | Self::Demoted { subject } => subject,
        }
    }

    /// Short machine-readable name for logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Warned { .. } => "warned",
            Self::Escalated { .. } => "escalated",
            Self::WarningsCleared { .. } => "warnings_cleared",
            Self::NoWarnings { .. } => "no_warnings",
            Self::WarningCount { .. } => "warning_count",
            Self::Muted { .. } => "muted",
            Self::Unmuted { .. } => "unmuted",
            Self::Banned { .. } => "banned",
            Self::Unbanned { .. } => "unbanned",
            Self::Promoted { .. } => "promoted",
            Self::Demoted { .. } => "demoted",
        }
    }
}
