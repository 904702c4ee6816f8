/// Failures surfaced by a race session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("peer message could not be decoded: {0}")]
    Decode(#[from] proto::ProtoError),
    #[error("track transfer rejected: {0}")]
    CorruptTrack(String),
    #[error("no track received from host within {0} ticks")]
    TrackTransferTimeout(u64),
    #[error("unexpected {0} message")]
    UnexpectedMessage(&'static str),
    #[error("peer send failed: {0}")]
    Send(String),
}

impl SessionError {
    /// Errors that end the session
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::CorruptTrack(_) | SessionError::TrackTransferTimeout(_)
        )
    }
}
