//! Message catalog
//!
//! The exact text a denied interception point fails with.

use serde::Serialize;

/// Why a mutation was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// `document.write`/`writeln` outside the top realm
    NonTopDocumentWriteBlocked,
    /// Lazy-document content that would create a frame
    HtmlFramesSrcdocBlocked,
    /// Declarative shadow tree carrying a frame
    DeclarativeShadowsBlocked,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 3] = [
        ErrorKind::NonTopDocumentWriteBlocked,
        ErrorKind::HtmlFramesSrcdocBlocked,
        ErrorKind::DeclarativeShadowsBlocked,
    ];

    /// Stable error code
    pub fn code(self) -> &'static str {
        match self {
            Self::NonTopDocumentWriteBlocked => "ERR_NON_TOP_DOCUMENT_WRITE_BLOCKED",
            Self::HtmlFramesSrcdocBlocked => "ERR_HTML_FRAMES_SRCDOC_BLOCKED",
            Self::DeclarativeShadowsBlocked => "ERR_DECLARATIVE_SHADOWS_BLOCKED",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::NonTopDocumentWriteBlocked => {
                "document.write/writeln is blocked for documents other than the top document"
            }
            Self::HtmlFramesSrcdocBlocked => "srcdoc content that creates frames is blocked",
            Self::DeclarativeShadowsBlocked => "declarative shadow roots that contain frames are blocked",
        }
    }
}

/// The message a denial of `kind` carries
pub fn format_message(kind: ErrorKind) -> String {
    format!("frameguard: {} ({})", kind.description(), kind.code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_distinct() {
        let messages: Vec<String> = ErrorKind::ALL.iter().map(|k| format_message(*k)).collect();
        assert_eq!(messages.len(), 3);
        assert_ne!(messages[0], messages[1]);
        assert_ne!(messages[1], messages[2]);
        for (kind, message) in ErrorKind::ALL.iter().zip(&messages) {
            assert!(message.contains(kind.code()));
        }
    }

    #[test]
    fn test_message_is_stable() {
        assert_eq!(
            format_message(ErrorKind::HtmlFramesSrcdocBlocked),
            format_message(ErrorKind::HtmlFramesSrcdocBlocked)
        );
    }
}
