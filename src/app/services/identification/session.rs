//! Identification session with change notification
//!
//! A session owns the detections of one night and forwards every batch of
//! changed detections to a caller-supplied listener. The engine itself knows
//! nothing about persistence; whoever writes documents to disk subscribes here.

use super::batch::{BatchOutcome, identify_many};
use super::input::{IdentificationContext, IdentificationInput};
use crate::app::models::DetectionEntity;
use std::collections::BTreeMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

/// Notification that a detection's persisted state is stale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionChange {
    pub detection_id: String,
    pub photo_id: String,
    pub night_id: String,
}

impl From<&DetectionEntity> for DetectionChange {
    fn from(detection: &DetectionEntity) -> Self {
        Self {
            detection_id: detection.id.clone(),
            photo_id: detection.photo_id.clone(),
            night_id: detection.night_id.clone(),
        }
    }
}

/// Receiver of "detections changed" notifications
pub trait DetectionChangeListener {
    /// Called once per batch with every detection that changed
    fn detections_changed(&mut self, changed: &[DetectionEntity]);
}

impl<F> DetectionChangeListener for F
where
    F: FnMut(&[DetectionEntity]),
{
    fn detections_changed(&mut self, changed: &[DetectionEntity]) {
        self(changed)
    }
}

/// Listener forwarding one [`DetectionChange`] per detection over a tokio channel
#[derive(Debug, Clone)]
pub struct ChannelListener(pub UnboundedSender<DetectionChange>);

impl DetectionChangeListener for ChannelListener {
    fn detections_changed(&mut self, changed: &[DetectionEntity]) {
        for detection in changed {
            if self.0.send(DetectionChange::from(detection)).is_err() {
                warn!(
                    "Change receiver closed; dropping notification for {}",
                    detection.id
                );
                return;
            }
        }
    }
}

/// Detections of one night plus an optional change listener
pub struct IdentificationSession {
    detections: BTreeMap<String, DetectionEntity>,
    listener: Option<Box<dyn DetectionChangeListener + Send>>,
}

impl IdentificationSession {
    /// Create a session over the given detections, keyed by id
    pub fn new(detections: Vec<DetectionEntity>) -> Self {
        Self {
            detections: detections
                .into_iter()
                .map(|detection| (detection.id.clone(), detection))
                .collect(),
            listener: None,
        }
    }

    /// Subscribe a listener to change notifications
    pub fn with_listener(mut self, listener: impl DetectionChangeListener + Send + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn get(&self, id: &str) -> Option<&DetectionEntity> {
        self.detections.get(id)
    }

    /// All detections, ordered by id
    pub fn detections(&self) -> impl Iterator<Item = &DetectionEntity> {
        self.detections.values()
    }

    /// All detection ids, sorted
    pub fn ids(&self) -> Vec<String> {
        self.detections.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Apply an input to the requested detections and notify the listener
    pub fn apply(
        &mut self,
        ids: &[String],
        input: &IdentificationInput,
        context: &IdentificationContext,
    ) -> BatchOutcome {
        let outcome = identify_many(self.detections.values(), ids, input, context);

        for detection in &outcome.updated {
            self.detections
                .insert(detection.id.clone(), detection.clone());
        }

        if !outcome.updated.is_empty() {
            if let Some(listener) = self.listener.as_mut() {
                listener.detections_changed(&outcome.updated);
            }
        }

        outcome
    }

    /// Consume the session, returning detections ordered by id
    pub fn into_detections(self) -> Vec<DetectionEntity> {
        self.detections.into_values().collect()
    }
}
