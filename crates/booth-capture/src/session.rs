//! Backup recording sessions.

use std::time::Duration;

use booth_models::{ChunkIndex, SessionId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::BoothClient;
use crate::recorder::RecorderSettings;

/// How long `release` waits for the recorder's final chunk.
pub const FLUSH_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Open,
    Active,
    Released,
}

/// One continuous recording: a session id, fixed settings and the task
/// that forwards recorder chunks to the server.
pub struct RecordingSession {
    id: SessionId,
    settings: RecorderSettings,
    phase: SessionPhase,
    pump: Option<JoinHandle<u32>>,
}

impl RecordingSession {
    pub fn open(settings: RecorderSettings) -> Self {
        Self {
            id: SessionId::new(),
            settings,
            phase: SessionPhase::Open,
            pump: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn settings(&self) -> &RecorderSettings {
        &self.settings
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Start forwarding chunks from the recorder. Only an open session can
    /// be activated.
    pub fn activate(&mut self, chunks: mpsc::Receiver<Vec<u8>>, client: BoothClient) {
        if self.phase != SessionPhase::Open {
            warn!(session = %self.id, phase = ?self.phase, "Ignoring activation of a used session");
            return;
        }

        info!(
            session = %self.id,
            mime_type = self.settings.mime_type,
            bps = self.settings.bits_per_second,
            "Backup recording started"
        );
        self.pump = Some(tokio::spawn(forward_chunks(
            chunks,
            client,
            self.id.clone(),
            self.settings.mime_type,
        )));
        self.phase = SessionPhase::Active;
    }

    /// Wait for the recorder to close its channel, then mark the session
    /// released. Returns the number of chunks dispatched.
    ///
    /// The recorder must already have been told to stop.
    pub async fn release(&mut self) -> u32 {
        self.phase = SessionPhase::Released;
        let Some(mut pump) = self.pump.take() else {
            return 0;
        };

        match tokio::time::timeout(FLUSH_GRACE, &mut pump).await {
            Ok(Ok(count)) => {
                debug!(session = %self.id, chunks = count, "Backup recording released");
                count
            }
            Ok(Err(e)) => {
                warn!(session = %self.id, error = %e, "Chunk forwarder failed");
                0
            }
            Err(_) => {
                warn!(session = %self.id, "Recorder did not flush in time");
                pump.abort();
                0
            }
        }
    }

    /// Mark released without waiting. The forwarder drains whatever the
    /// recorder still flushes on its own.
    pub fn detach(&mut self) {
        self.phase = SessionPhase::Released;
        self.pump = None;
    }
}

async fn forward_chunks(
    mut chunks: mpsc::Receiver<Vec<u8>>,
    client: BoothClient,
    session: SessionId,
    mime_type: &'static str,
) -> u32 {
    let mut next = 0u32;
    while let Some(bytes) = chunks.recv().await {
        if bytes.is_empty() {
            continue;
        }
        // Detached; chunk failures never reach the photo flow
        let _ = client.dispatch_chunk(session.clone(), ChunkIndex(next), mime_type, bytes);
        next += 1;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::Resolution;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings() -> RecorderSettings {
        RecorderSettings::for_resolution(Resolution::new(1280, 720), "video/webm;codecs=vp8")
    }

    #[tokio::test]
    async fn test_lifecycle_and_indices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload-video-chunk"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let client = BoothClient::new(&server.uri()).unwrap();

        let mut session = RecordingSession::open(settings());
        assert_eq!(session.phase(), SessionPhase::Open);
        assert_eq!(session.id().as_str().len(), 32);

        let (tx, rx) = mpsc::channel(8);
        session.activate(rx, client);
        assert_eq!(session.phase(), SessionPhase::Active);

        tx.send(b"one".to_vec()).await.unwrap();
        tx.send(Vec::new()).await.unwrap();
        tx.send(b"two".to_vec()).await.unwrap();
        drop(tx);

        // Server failures are swallowed; empty chunks are skipped
        assert_eq!(session.release().await, 2);
        assert_eq!(session.phase(), SessionPhase::Released);
    }

    #[tokio::test]
    async fn test_release_without_activation() {
        let mut session = RecordingSession::open(settings());
        assert_eq!(session.release().await, 0);
        assert_eq!(session.phase(), SessionPhase::Released);
    }

    #[tokio::test]
    async fn test_released_session_cannot_reactivate() {
        let client = BoothClient::new("http://127.0.0.1:9").unwrap();
        let mut session = RecordingSession::open(settings());
        session.release().await;

        let (_tx, rx) = mpsc::channel(1);
        session.activate(rx, client);
        assert_eq!(session.phase(), SessionPhase::Released);
    }
}
