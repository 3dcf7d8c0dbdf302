use core::fmt;

/// Outcome of one decoding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// The frame (or structure) is fully decoded.
    Done,
    /// More input is required; call again with further bytes.
    InProgress,
    /// The input is malformed. The listener has been told; do not resume.
    Error,
}

impl fmt::Display for DecodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Done => "DecodeDone",
            Self::InProgress => "DecodeInProgress",
            Self::Error => "DecodeError",
        })
    }
}
