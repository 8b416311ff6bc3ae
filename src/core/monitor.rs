// Posture monitoring orchestration - frame throttling, single-slot frame
// delivery, and status publishing around one PostureEvaluator

use crate::core::config::MonitorConfig;
use crate::core::evaluator::PostureEvaluator;
use crate::detector::bridge::PoseBackend;
use crate::models::pose::{LandmarkSet, PoseError, PoseResult};
use crate::models::status::PostureStatus;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

// ==============================================================================
// Frame Throttle
// ==============================================================================

/// Drops frames that arrive faster than the configured interval.
///
/// Bounds the detector invocation rate regardless of the camera refresh
/// rate, trading temporal resolution for CPU cost.
#[derive(Debug)]
pub struct FrameThrottle {
    interval: Duration,
    last_accepted: Option<Instant>,
}

impl FrameThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_accepted: None,
        }
    }

    /// Whether a frame arriving at `now` should be processed
    pub fn accept_at(&mut self, now: Instant) -> bool {
        match self.last_accepted {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last_accepted = Some(now);
                true
            }
        }
    }

    pub fn accept(&mut self) -> bool {
        self.accept_at(Instant::now())
    }

    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

// ==============================================================================
// Posture Monitor
// ==============================================================================

/// Drives a PostureEvaluator from an asynchronous frame source.
///
/// Landmark sets flow through a single-slot inbox into one spawned
/// processing task; the resulting statuses are published on a watch channel
/// with this monitor as the only writer. Commands (baseline capture,
/// pause/resume, warning acknowledgement) are plain async methods.
pub struct PostureMonitor {
    config: MonitorConfig,
    evaluator: Arc<RwLock<PostureEvaluator>>,
    active: Arc<RwLock<bool>>,
    paused: Arc<RwLock<bool>>,
    session_id: Arc<RwLock<Option<String>>>,
    frame_tx: Arc<RwLock<Option<mpsc::Sender<LandmarkSet>>>>,
    throttle: Arc<RwLock<FrameThrottle>>,
    status_tx: Arc<watch::Sender<PostureStatus>>,
}

impl PostureMonitor {
    pub fn new(config: MonitorConfig) -> PoseResult<Self> {
        config.validate()?;
        let (status_tx, _status_rx) = watch::channel(PostureStatus::default());
        let throttle = FrameThrottle::new(config.frame_interval());

        Ok(Self {
            config,
            evaluator: Arc::new(RwLock::new(PostureEvaluator::new())),
            active: Arc::new(RwLock::new(false)),
            paused: Arc::new(RwLock::new(false)),
            session_id: Arc::new(RwLock::new(None)),
            frame_tx: Arc::new(RwLock::new(None)),
            throttle: Arc::new(RwLock::new(throttle)),
            status_tx: Arc::new(status_tx),
        })
    }

    /// Start accepting frames.
    pub async fn activate(&self) -> PoseResult<()> {
        let mut active = self.active.write().await;
        if *active {
            return Err(PoseError::AlreadyRunning);
        }

        let session_id = Uuid::new_v4().to_string();
        *self.session_id.write().await = Some(session_id.clone());

        // Capacity 1: at most one detection result in flight at a time
        let (tx, rx) = mpsc::channel::<LandmarkSet>(1);
        *self.frame_tx.write().await = Some(tx);
        self.throttle.write().await.reset();
        *self.paused.write().await = false;
        *active = true;

        let evaluator = self.evaluator.clone();
        let active_flag = self.active.clone();
        let paused_flag = self.paused.clone();
        let status_tx = self.status_tx.clone();

        tokio::spawn(async move {
            Self::process_loop(rx, evaluator, active_flag, paused_flag, status_tx).await;
        });

        info!(session_id = %session_id, "posture monitoring activated");
        Ok(())
    }

    /// Stop accepting frames and halt the processing task.
    ///
    /// With `reset_on_deactivate` set (the default), the evaluator returns
    /// to its initial state and the default status is re-published.
    pub async fn deactivate(&self) -> PoseResult<()> {
        {
            let mut active = self.active.write().await;
            if !*active {
                return Ok(());
            }
            *active = false;
        }

        // Dropping the sender closes the inbox and ends the loop
        *self.frame_tx.write().await = None;
        *self.paused.write().await = false;
        *self.session_id.write().await = None;

        if self.config.reset_on_deactivate {
            self.evaluator.write().await.reset();
            self.status_tx.send_replace(PostureStatus::default());
        }

        info!("posture monitoring deactivated");
        Ok(())
    }

    /// Deliver one frame's detection result to the evaluator.
    ///
    /// Hosts that run the pose detector themselves feed results here; hosts
    /// with an in-process backend use `process_camera_frame`. A frame
    /// landing while the previous one is still being evaluated is dropped,
    /// as are frames arriving while paused or inactive.
    pub async fn submit_landmarks(&self, landmarks: LandmarkSet) {
        if !*self.active.read().await || *self.paused.read().await {
            return;
        }

        if let Some(tx) = self.frame_tx.read().await.as_ref() {
            if tx.try_send(landmarks).is_err() {
                debug!("frame dropped: previous result still in flight");
            }
        }
    }

    /// Run one camera frame through a detector backend.
    ///
    /// Rate-limited to the configured target FPS: frames arriving faster
    /// than the frame interval are dropped before the backend is invoked.
    pub async fn process_camera_frame(
        &self,
        backend: &dyn PoseBackend,
        frame_data: &[u8],
        width: u32,
        height: u32,
    ) -> PoseResult<()> {
        if !*self.active.read().await || *self.paused.read().await {
            return Ok(());
        }
        if !self.throttle.write().await.accept() {
            debug!("frame dropped by throttle");
            return Ok(());
        }

        match backend.process_frame(frame_data, width, height)? {
            Some(landmarks) => self.submit_landmarks(landmarks).await,
            None => debug!("no subject detected this frame"),
        }
        Ok(())
    }

    /// Capture the current posture as the reference baseline.
    ///
    /// Returns false when no frame has been observed yet.
    pub async fn capture_baseline(&self) -> bool {
        let (captured, status) = {
            let mut evaluator = self.evaluator.write().await;
            let captured = evaluator.capture_baseline();
            (captured, evaluator.status().clone())
        };
        if captured {
            self.status_tx.send_replace(status);
        }
        captured
    }

    /// Acknowledge the currently shown warnings.
    ///
    /// Only the published list is emptied; a persisting condition reappears
    /// on the next processed frame.
    pub async fn clear_warnings(&self) {
        let status = {
            let mut evaluator = self.evaluator.write().await;
            evaluator.clear_warnings();
            evaluator.status().clone()
        };
        self.status_tx.send_replace(status);
    }

    /// Freeze evaluator state; frames are discarded until resume.
    pub async fn pause(&self) {
        *self.paused.write().await = true;
        info!("posture monitoring paused");
    }

    pub async fn resume(&self) {
        *self.paused.write().await = false;
        info!("posture monitoring resumed");
    }

    pub async fn is_active(&self) -> bool {
        *self.active.read().await
    }

    pub async fn is_paused(&self) -> bool {
        *self.paused.read().await
    }

    pub async fn baseline_set(&self) -> bool {
        self.evaluator.read().await.baseline_set()
    }

    pub async fn session_id(&self) -> Option<String> {
        self.session_id.read().await.clone()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Most recently published status
    pub fn status(&self) -> PostureStatus {
        self.status_tx.borrow().clone()
    }

    /// Subscribe to status updates
    pub fn subscribe(&self) -> watch::Receiver<PostureStatus> {
        self.status_tx.subscribe()
    }

    async fn process_loop(
        mut rx: mpsc::Receiver<LandmarkSet>,
        evaluator: Arc<RwLock<PostureEvaluator>>,
        active: Arc<RwLock<bool>>,
        paused: Arc<RwLock<bool>>,
        status_tx: Arc<watch::Sender<PostureStatus>>,
    ) {
        while let Some(landmarks) = rx.recv().await {
            if !*active.read().await {
                break;
            }
            if *paused.read().await {
                // Discard, not buffer: evaluator state stays frozen
                continue;
            }

            let published = {
                let mut evaluator = evaluator.write().await;
                evaluator.process_frame(landmarks);
                // Without a baseline the status is frozen; publishing only
                // resumes once scoring is meaningful again
                evaluator
                    .baseline_set()
                    .then(|| evaluator.status().clone())
            };

            if let Some(status) = published {
                // Teardown may have started while evaluating
                if *active.read().await {
                    status_tx.send_replace(status);
                }
            }
        }
        debug!("posture processing loop stopped");
    }
}
