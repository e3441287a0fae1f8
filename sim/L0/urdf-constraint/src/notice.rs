//! Non-fatal parse diagnostics.
//!
//! Absent-but-tolerated input is resolved to a default and reported as a
//! [`Notice`] next to the parse result instead of being logged from inside the
//! parser. Callers pick how to surface them; [`Notice::emit`] forwards to
//! `tracing`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NoticeLevel {
    /// Detail useful only when debugging a model.
    Debug,
    /// Something a model author likely wants to know.
    Info,
}

/// What a notice is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NoticeKind {
    /// An endpoint element has no `link` attribute; the endpoint may be the root.
    MissingEndpointLink,
    /// An origin element is absent; the transform is the identity.
    DefaultOrigin,
    /// An axis element is absent; the axis takes its default.
    DefaultAxis,
    /// An axis element has no `xyz` attribute; the axis keeps its default.
    AxisWithoutXyz,
    /// An axis element on a fixed loop constraint was not read.
    AxisIgnoredForFixed,
    /// A joint origin element named for the other endpoint schema was not read.
    OriginIgnoredForSchema,
}

/// A non-fatal diagnostic raised while parsing one constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Category.
    pub kind: NoticeKind,
    /// Name of the constraint being parsed.
    pub constraint: String,
    /// Human readable description.
    pub message: String,
}

impl Notice {
    /// Create an info-level notice.
    pub fn info(
        kind: NoticeKind,
        constraint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level: NoticeLevel::Info,
            kind,
            constraint: constraint.into(),
            message: message.into(),
        }
    }

    /// Create a debug-level notice.
    pub fn debug(
        kind: NoticeKind,
        constraint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level: NoticeLevel::Debug,
            kind,
            constraint: constraint.into(),
            message: message.into(),
        }
    }

    /// Log this notice through `tracing` at its level.
    pub fn emit(&self) {
        match self.level {
            NoticeLevel::Info => tracing::info!(
                constraint = %self.constraint,
                kind = ?self.kind,
                "{}",
                self.message
            ),
            NoticeLevel::Debug => tracing::debug!(
                constraint = %self.constraint,
                kind = ?self.kind,
                "{}",
                self.message
            ),
        }
    }
}

/// A parse result together with the notices raised while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    /// The parsed value.
    pub value: T,
    /// Non-fatal diagnostics, in the order they were raised.
    pub notices: Vec<Notice>,
}

impl<T> Parsed<T> {
    /// Wrap a value with no notices.
    pub fn new(value: T) -> Self {
        Self {
            value,
            notices: Vec::new(),
        }
    }

    /// Emit every notice through `tracing` and return the value.
    pub fn emit(self) -> T {
        for notice in &self.notices {
            notice.emit();
        }
        self.value
    }

    /// Transform the value, keeping the notices.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<U> {
        Parsed {
            value: f(self.value),
            notices: self.notices,
        }
    }

    /// Whether any notice of the given kind was raised.
    pub fn has_notice(&self, kind: NoticeKind) -> bool {
        self.notices.iter().any(|n| n.kind == kind)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        let n = Notice::info(NoticeKind::MissingEndpointLink, "c", "no link");
        assert_eq!(n.level, NoticeLevel::Info);
        let n = Notice::debug(NoticeKind::DefaultAxis, "c", "default axis");
        assert_eq!(n.level, NoticeLevel::Debug);
        assert!(NoticeLevel::Debug < NoticeLevel::Info);
    }

    #[test]
    fn test_parsed_map_keeps_notices() {
        let mut p = Parsed::new(1);
        p.notices
            .push(Notice::debug(NoticeKind::DefaultOrigin, "c", "identity"));
        let p = p.map(|v| v + 1);
        assert_eq!(p.value, 2);
        assert!(p.has_notice(NoticeKind::DefaultOrigin));
        assert!(!p.has_notice(NoticeKind::DefaultAxis));
        assert_eq!(p.emit(), 2);
    }
}
