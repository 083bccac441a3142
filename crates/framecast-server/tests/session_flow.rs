//! Application-level flows without sockets: open/close sequences, status,
//! fan-out, and a capture source that never opens.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use framecast_core::{Frame, PayloadKind, TransformPlan, WireFrame};
use framecast_server::application::mock::{FailingSink, RecordingSink};
use framecast_server::application::{
    Broadcaster, CaptureError, Connection, ConnectionRegistry, FrameProducer, ProducerError,
    ProducerSettings, ProducerStatus, SessionLifecycle, StatusReporter, TickOutcome,
};
use framecast_server::domain::{ConnectionId, StatusReport, StreamState};
use framecast_server::infrastructure::capture::mock::MockCaptureSource;
use framecast_server::infrastructure::encoder::JpegFrameEncoder;
use image::{Rgb, RgbImage};

struct World {
    registry: Arc<ConnectionRegistry>,
    lifecycle: SessionLifecycle,
    status: StatusReporter,
    producer_status: ProducerStatus,
    broadcaster: Arc<Broadcaster>,
}

impl World {
    fn new() -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let producer_status = ProducerStatus::new();
        Self {
            lifecycle: SessionLifecycle::new(Arc::clone(&registry)),
            status: StatusReporter::new(Arc::clone(&registry), producer_status.clone()),
            broadcaster: Arc::new(Broadcaster::new(Arc::clone(&registry))),
            registry,
            producer_status,
        }
    }

    fn producer(&self, capture: MockCaptureSource) -> FrameProducer {
        FrameProducer::new(
            ProducerSettings {
                plan: TransformPlan::new(16, 12, &PayloadKind::ALL).expect("valid plan"),
                quality: 75,
                tick_interval: Duration::from_millis(1),
            },
            Box::new(capture),
            Arc::new(JpegFrameEncoder::new()),
            Arc::clone(&self.broadcaster),
            self.producer_status.clone(),
        )
    }

    fn open(&self, sink: Arc<dyn framecast_server::application::FrameSink>) -> ConnectionId {
        let id = ConnectionId::new();
        self.lifecycle.on_open(Connection::new(id, None, sink));
        id
    }
}

fn frame() -> Frame {
    Frame::new(RgbImage::from_pixel(32, 24, Rgb([10, 200, 30])), 42)
}

#[test]
fn test_five_opens_two_closes() {
    // Arrange
    let world = World::new();
    let ids: Vec<_> = (0..5)
        .map(|_| world.open(Arc::new(RecordingSink::new())))
        .collect();

    // Act
    world.lifecycle.on_close(ids[1], 1000, "bye");
    world.lifecycle.on_close(ids[3], 1001, "going away");

    // Assert
    assert_eq!(world.status.status(), StatusReport::running(3, StreamState::Idle));
    let snapshot = world.registry.snapshot();
    assert!(snapshot.iter().all(|c| c.id() != ids[1] && c.id() != ids[3]));
}

#[tokio::test]
async fn test_capture_unavailable_is_fatal_but_everything_else_works() {
    // Arrange
    let world = World::new();
    let capture = MockCaptureSource::failing_open("device busy");
    let probe = capture.probe();
    let producer = world.producer(capture);

    // Act
    let result = producer.run(Arc::new(AtomicBool::new(true))).await;

    // Assert: reported once, never streaming.
    assert!(matches!(
        result,
        Err(ProducerError::CaptureUnavailable(CaptureError::DeviceUnavailable { .. }))
    ));
    assert_eq!(probe.open_calls(), 1);
    assert_eq!(probe.grab_calls(), 0);
    assert_eq!(world.status.status().stream, StreamState::Idle);

    // The registry and status keep working.
    let a = world.open(Arc::new(RecordingSink::new()));
    world.open(Arc::new(RecordingSink::new()));
    world.lifecycle.on_close(a, 1000, "");
    assert_eq!(world.status.status().clients, 1);
}

#[tokio::test]
async fn test_real_encoder_fans_out_to_every_viewer_despite_failures() {
    // Arrange
    let world = World::new();
    let good: Vec<_> = (0..2).map(|_| Arc::new(RecordingSink::new())).collect();
    let bad = Arc::new(FailingSink::new());
    world.open(good[0].clone());
    let bad_id = world.open(bad.clone());
    world.open(good[1].clone());
    let mut producer = world.producer(MockCaptureSource::repeating(frame()));

    // Act
    let outcome = producer.tick().await;

    // Assert: 3 viewers x (2 variants + frameInfo).
    let TickOutcome::Broadcast(report) = outcome else {
        panic!("expected a broadcast, got {outcome:?}");
    };
    assert_eq!(report.recipients, 3);
    assert_eq!(report.attempts, 9);
    assert_eq!(report.failures, 3);
    assert_eq!(bad.attempts(), 3);
    assert!(world.registry.contains(bad_id));

    for sink in &good {
        let frames = sink.frames();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].kind(), Some(PayloadKind::Color));
        assert_eq!(frames[1].kind(), Some(PayloadKind::Gray));
        assert_eq!(
            frames[2],
            WireFrame::Text(r#"{"type":"frameInfo","timestamp":42}"#.to_string())
        );
    }
}

#[tokio::test]
async fn test_viewer_opened_after_a_tick_only_sees_later_ticks() {
    let world = World::new();
    let early = Arc::new(RecordingSink::new());
    world.open(early.clone());
    let mut producer = world.producer(MockCaptureSource::repeating(frame()));

    producer.tick().await;
    let late = Arc::new(RecordingSink::new());
    world.open(late.clone());
    producer.tick().await;

    assert_eq!(early.count(), 6);
    assert_eq!(late.count(), 3);
}
