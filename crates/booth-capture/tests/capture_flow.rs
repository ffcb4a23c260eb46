//! Capture workflow tests against a scripted device and a mock API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use booth_capture::{
    BoothClient, CaptureError, CaptureResult, CaptureState, MediaDevice, Photobooth, PhotoboothConfig,
    RecorderSettings, Resolution, SessionPhase,
};
use booth_models::Version;
use image::{Rgba, RgbaImage};
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// What the fake device saw, shared with the test.
#[derive(Default)]
struct DeviceLog {
    recording_settings: Option<RecorderSettings>,
    stop_recording_calls: u32,
    closed: bool,
}

struct FakeDevice {
    fail_open: bool,
    supported: Vec<&'static str>,
    resolution: Resolution,
    recorder: Option<mpsc::Sender<Vec<u8>>>,
    log: Arc<Mutex<DeviceLog>>,
}

impl FakeDevice {
    fn new(log: Arc<Mutex<DeviceLog>>) -> Self {
        Self {
            fail_open: false,
            supported: vec!["video/webm;codecs=vp8", "video/webm", "video/mp4"],
            resolution: Resolution::new(1920, 1080),
            recorder: None,
            log,
        }
    }
}

#[async_trait]
impl MediaDevice for FakeDevice {
    async fn open(&mut self) -> CaptureResult<Resolution> {
        if self.fail_open {
            return Err(CaptureError::camera_unavailable("permission denied"));
        }
        Ok(self.resolution)
    }

    async fn grab_frame(&mut self) -> CaptureResult<RgbaImage> {
        Ok(RgbaImage::from_pixel(
            self.resolution.width,
            self.resolution.height,
            Rgba([10, 120, 200, 255]),
        ))
    }

    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.supported.contains(&mime_type)
    }

    fn start_recording(&mut self, settings: &RecorderSettings) -> CaptureResult<mpsc::Receiver<Vec<u8>>> {
        let (tx, rx) = mpsc::channel(8);
        tx.try_send(b"first".to_vec())
            .map_err(|e| CaptureError::recorder(e.to_string()))?;
        self.recorder = Some(tx);
        self.log.lock().unwrap().recording_settings = Some(settings.clone());
        Ok(rx)
    }

    fn stop_recording(&mut self) {
        self.log.lock().unwrap().stop_recording_calls += 1;
        if let Some(tx) = self.recorder.take() {
            let _ = tx.try_send(b"final".to_vec());
        }
    }

    fn close(&mut self) {
        self.log.lock().unwrap().closed = true;
    }
}

async fn mock_api(upload: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(upload)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/upload-video-chunk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "url": "https://cdn.test/chunk",
            "pathname": "chunk"
        })))
        .mount(&server)
        .await;
    server
}

async fn chunk_requests(server: &MockServer, expected: usize) -> Vec<Request> {
    for _ in 0..100 {
        let chunks: Vec<Request> = server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == "/api/upload-video-chunk")
            .collect();
        if chunks.len() >= expected {
            return chunks;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("expected {} chunk uploads", expected);
}

fn booth(server: &MockServer, device: FakeDevice) -> Photobooth<FakeDevice> {
    let client = BoothClient::new(&server.uri()).unwrap();
    Photobooth::new(device, client, PhotoboothConfig::default())
}

#[tokio::test]
async fn test_full_capture_cycle() {
    let server = mock_api(
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true, "version": 42})),
    )
    .await;
    let log = Arc::new(Mutex::new(DeviceLog::default()));
    let mut booth = booth(&server, FakeDevice::new(Arc::clone(&log)));

    booth.start_camera().await.unwrap();
    assert_eq!(booth.state(), &CaptureState::CameraReady);

    let session = booth.recording().unwrap();
    assert_eq!(session.phase(), SessionPhase::Active);
    assert_eq!(session.settings().mime_type, "video/webm;codecs=vp8");
    assert_eq!(session.settings().bits_per_second, 8_000_000);

    booth.take_photo().await.unwrap();
    let frame = booth.state().frame().unwrap();
    assert_eq!((frame.width, frame.height), (1920, 1080));
    assert_eq!(&frame.jpeg[..2], &[0xFF, 0xD8]);

    booth.cancel().unwrap();
    assert_eq!(booth.state(), &CaptureState::CameraReady);

    booth.take_photo().await.unwrap();
    let outcome = booth.upload().await.unwrap();
    assert_eq!(outcome.version, Version(42));
    assert_eq!(outcome.navigate_home_after, Duration::from_millis(1500));
    assert_eq!(booth.state(), &CaptureState::Done { version: Version(42) });

    // Recording was stopped and both chunks went out with ordered indices
    assert!(booth.recording().is_none());
    assert_eq!(log.lock().unwrap().stop_recording_calls, 1);

    let chunks = chunk_requests(&server, 2).await;
    let mut bodies: Vec<String> = chunks
        .iter()
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect();
    bodies.sort_by_key(|b| b.contains("final"));
    assert!(bodies[0].contains("name=\"idx\"\r\n\r\n0"));
    assert!(bodies[1].contains("name=\"idx\"\r\n\r\n1"));

    booth.teardown().await;
    assert_eq!(booth.state(), &CaptureState::Idle);
    assert!(log.lock().unwrap().closed);
}

#[tokio::test]
async fn test_failed_upload_keeps_photo() {
    let server = mock_api(ResponseTemplate::new(500).set_body_string("bucket unavailable")).await;
    let log = Arc::new(Mutex::new(DeviceLog::default()));
    let mut booth = booth(&server, FakeDevice::new(Arc::clone(&log)));

    booth.start_camera().await.unwrap();
    booth.take_photo().await.unwrap();

    let err = booth.upload().await.unwrap_err();
    assert!(matches!(err, CaptureError::UploadRejected { status: 500, .. }));
    assert_eq!(booth.error(), Some("bucket unavailable"));
    assert!(booth.state().frame().is_some());

    // Recording keeps running after a failed upload
    assert_eq!(booth.recording().unwrap().phase(), SessionPhase::Active);
    assert_eq!(log.lock().unwrap().stop_recording_calls, 0);
}

#[tokio::test]
async fn test_camera_failure_is_reported() {
    let server = mock_api(ResponseTemplate::new(200)).await;
    let log = Arc::new(Mutex::new(DeviceLog::default()));
    let mut device = FakeDevice::new(Arc::clone(&log));
    device.fail_open = true;
    let mut booth = booth(&server, device);

    assert!(booth.start_camera().await.is_err());
    assert!(matches!(booth.state(), CaptureState::Error { .. }));
    assert!(booth.error().unwrap().contains("permission denied"));
    assert!(booth.recording().is_none());

    // Photo actions are rejected without touching the device
    let err = booth.take_photo().await.unwrap_err();
    assert!(matches!(err, CaptureError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_recording_skipped_without_supported_type() {
    let server = mock_api(ResponseTemplate::new(200)).await;
    let log = Arc::new(Mutex::new(DeviceLog::default()));
    let mut device = FakeDevice::new(Arc::clone(&log));
    device.supported.clear();
    let mut booth = booth(&server, device);

    booth.start_camera().await.unwrap();
    assert_eq!(booth.state(), &CaptureState::CameraReady);
    assert!(booth.recording().is_none());
    assert!(log.lock().unwrap().recording_settings.is_none());
}

#[tokio::test]
async fn test_page_hidden_flushes_recording() {
    let server = mock_api(ResponseTemplate::new(200)).await;
    let log = Arc::new(Mutex::new(DeviceLog::default()));
    let mut booth = booth(&server, FakeDevice::new(Arc::clone(&log)));

    booth.start_camera().await.unwrap();
    booth.on_page_hidden().await;

    assert!(booth.recording().is_none());
    assert_eq!(chunk_requests(&server, 2).await.len(), 2);
    // The camera stays live for the rest of the page
    assert_eq!(booth.state(), &CaptureState::CameraReady);
}

#[tokio::test]
async fn test_page_visible_resumes_recording() {
    let server = mock_api(ResponseTemplate::new(200)).await;
    let log = Arc::new(Mutex::new(DeviceLog::default()));
    let mut booth = booth(&server, FakeDevice::new(Arc::clone(&log)));

    booth.start_camera().await.unwrap();
    let first_session = booth.recording().unwrap().id().clone();

    booth.on_page_hidden().await;
    assert!(booth.recording().is_none());

    booth.on_page_visible();
    let resumed = booth.recording().unwrap();
    assert_eq!(resumed.phase(), SessionPhase::Active);
    assert_ne!(resumed.id(), &first_session);
    assert_eq!(resumed.settings().mime_type, "video/webm;codecs=vp8");

    // Showing the page again while recording leaves the session alone
    let resumed_id = resumed.id().clone();
    booth.on_page_visible();
    assert_eq!(booth.recording().unwrap().id(), &resumed_id);

    // Two chunks per session: the first one and the flush
    booth.teardown().await;
    assert_eq!(chunk_requests(&server, 4).await.len(), 4);
    assert_eq!(log.lock().unwrap().stop_recording_calls, 2);
}

#[tokio::test]
async fn test_page_visible_before_camera_does_nothing() {
    let server = mock_api(ResponseTemplate::new(200)).await;
    let log = Arc::new(Mutex::new(DeviceLog::default()));
    let mut booth = booth(&server, FakeDevice::new(Arc::clone(&log)));

    booth.on_page_visible();
    assert!(booth.recording().is_none());
    assert!(log.lock().unwrap().recording_settings.is_none());
}

#[tokio::test]
async fn test_drop_releases_device() {
    let server = mock_api(ResponseTemplate::new(200)).await;
    let log = Arc::new(Mutex::new(DeviceLog::default()));
    let mut booth = booth(&server, FakeDevice::new(Arc::clone(&log)));

    booth.start_camera().await.unwrap();
    drop(booth);

    let log = log.lock().unwrap();
    assert!(log.closed);
    assert_eq!(log.stop_recording_calls, 1);
}
