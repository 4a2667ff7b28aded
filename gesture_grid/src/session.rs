// THEORY:
// A `RecognitionSession` runs a `GesturePipeline` inside its own tokio task, the
// same actor shape the grid manager uses for its chunk analyzers. The task is
// the only owner of the tracker state; everyone else talks to it through a
// cloneable `SessionHandle` and gets answers back over oneshot channels.
//
// Frames are handled strictly one at a time in the order they are sent, so a
// host can acquire frames on other tasks without the recognition logic ever
// seeing two frames interleaved.

use crate::core_modules::detection::Detection;
use crate::core_modules::geometry::Point;
use crate::core_modules::tracker::TrackerPhase;
use crate::error::{ConfigError, LocateError, SessionError};
use crate::pipeline::{GesturePipeline, RecognizerConfig, Report};
use image::GrayImage;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

const MAILBOX_CAPACITY: usize = 16;

/// Tracker state as seen by a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: TrackerPhase,
    pub history: Vec<usize>,
    pub path: Vec<Point>,
    pub completed_gestures: u64,
}

/// Message type for the session actor
enum SessionMessage {
    Frame(Vec<Detection>, oneshot::Sender<Result<Report, LocateError>>),
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Overlay(oneshot::Sender<GrayImage>),
    Reset,
    Shutdown,
}

/// A pipeline running on its own task.
pub struct RecognitionSession;

impl RecognitionSession {
    /// Validates `config`, then spawns the actor task on the current tokio
    /// runtime.
    pub fn spawn(config: RecognizerConfig) -> Result<SessionHandle, ConfigError> {
        let mut pipeline = GesturePipeline::new(config)?;
        let (tx, mut rx) = mpsc::channel::<SessionMessage>(MAILBOX_CAPACITY);

        let task = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    SessionMessage::Frame(detections, reply) => {
                        let _ = reply.send(pipeline.process_frame(&detections));
                    }
                    SessionMessage::Snapshot(reply) => {
                        let _ = reply.send(SessionSnapshot {
                            phase: pipeline.phase(),
                            history: pipeline.history().to_vec(),
                            path: pipeline.path().to_vec(),
                            completed_gestures: pipeline.completed_gestures(),
                        });
                    }
                    SessionMessage::Overlay(reply) => {
                        let _ = reply.send(pipeline.grid().surface().clone());
                    }
                    SessionMessage::Reset => pipeline.reset(),
                    SessionMessage::Shutdown => break,
                }
            }
            debug!("recognition session stopped");
        });

        Ok(SessionHandle {
            tx,
            task: Arc::new(Mutex::new(Some(task))),
        })
    }
}

/// Cloneable handle to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionMessage>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SessionHandle {
    /// Sends one frame's detections and waits for its report.
    pub async fn process_frame(&self, detections: Vec<Detection>) -> Result<Report, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionMessage::Frame(detections, reply))
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(rx.await.map_err(|_| SessionError::Closed)??)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionMessage::Snapshot(reply))
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// A copy of the grid overlay surface.
    pub async fn overlay(&self) -> Result<GrayImage, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionMessage::Overlay(reply))
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn reset(&self) -> Result<(), SessionError> {
        self.tx
            .send(SessionMessage::Reset)
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Stops the actor and waits for it to finish. Later calls on any clone of
    /// this handle fail with `SessionError::Closed`.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(SessionMessage::Shutdown).await;
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}
