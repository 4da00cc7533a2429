use {crate::*, certs::Certificate};

/// Where a scan session is. Only the controller moves it.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    Idle,
    Initializing,
    Scanning,
    /// A code was found, the camera is closed and ingestion is in flight.
    Decoded(DecodedPayload),
    Failed(ErrorKind),
    Closed,
}

impl ScanState {
    /// True while an open request is being served.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ScanState::Initializing | ScanState::Scanning | ScanState::Decoded(_)
        )
    }
}

/// Outcome of the ingestion call, one per decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Ingested(Certificate),
    IngestionFailed(ScanError),
}
