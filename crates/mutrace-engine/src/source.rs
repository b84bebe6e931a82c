//! Where incidents, snapshots and live channels come from.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use mutrace_core::config::DEFAULT_CHANNEL_CAPACITY;
use mutrace_core::errors::{MutraceError, Result};
use mutrace_core::{Incident, Post};
use tokio::sync::mpsc;

/// Backend consumed by the viewer
///
/// Mirrors `GET /incidents`, `GET /incidents/{id}/posts` and the per-incident
/// live channel. Channel frames are delivered raw; decoding happens in the
/// event loop so malformed frames can be dropped individually.
#[async_trait]
pub trait IncidentSource: Send + Sync {
    async fn list_incidents(&self) -> Result<Vec<Incident>>;

    /// Bulk snapshot of an incident's posts
    async fn fetch_posts(&self, incident_id: &str) -> Result<Vec<Post>>;

    /// Open the live channel; the receiver closes when the channel does
    async fn open_channel(&self, incident_id: &str) -> Result<mpsc::Receiver<String>>;
}

#[derive(Default)]
struct MemoryState {
    incidents: Vec<Incident>,
    posts: HashMap<String, Vec<Post>>,
    channels: HashMap<String, Vec<mpsc::Sender<String>>>,
    fetch_delays: HashMap<String, Duration>,
    failing: HashMap<String, String>,
}

/// In-process source backed by plain collections
///
/// Frames published with [`MemorySource::publish`] reach every channel
/// currently open for the incident.
pub struct MemorySource {
    state: Mutex<MemoryState>,
    channel_capacity: usize,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource {
    pub fn new() -> Self {
        Self::with_channel_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_channel_capacity(channel_capacity: usize) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            channel_capacity: channel_capacity.max(1),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|_| MutraceError::TransportError {
            incident_id: String::new(),
            reason: "memory source poisoned".to_string(),
        })
    }

    /// Register an incident with its snapshot posts
    pub fn insert_incident(&self, incident: Incident, posts: Vec<Post>) -> Result<()> {
        let mut state = self.lock()?;
        state.posts.insert(incident.id.clone(), posts);
        state.incidents.retain(|i| i.id != incident.id);
        state.incidents.push(incident);
        Ok(())
    }

    /// Add a post to the snapshot without publishing it
    pub fn add_post(&self, incident_id: &str, post: Post) -> Result<()> {
        self.lock()?
            .posts
            .entry(incident_id.to_string())
            .or_default()
            .push(post);
        Ok(())
    }

    /// Hold every snapshot fetch for `incident_id` for `delay`
    pub fn set_fetch_delay(&self, incident_id: &str, delay: Duration) -> Result<()> {
        self.lock()?
            .fetch_delays
            .insert(incident_id.to_string(), delay);
        Ok(())
    }

    /// Make fetches and channel opens for `incident_id` fail until cleared
    pub fn set_failing(&self, incident_id: &str, reason: Option<&str>) -> Result<()> {
        let mut state = self.lock()?;
        match reason {
            Some(reason) => {
                state
                    .failing
                    .insert(incident_id.to_string(), reason.to_string());
            }
            None => {
                state.failing.remove(incident_id);
            }
        }
        Ok(())
    }

    /// Deliver a raw frame to every open channel of the incident
    ///
    /// Returns how many channels accepted it.
    pub async fn publish(&self, incident_id: &str, frame: impl Into<String>) -> Result<usize> {
        let frame = frame.into();
        let senders: Vec<mpsc::Sender<String>> = {
            let mut state = self.lock()?;
            let senders = state.channels.entry(incident_id.to_string()).or_default();
            senders.retain(|tx| !tx.is_closed());
            senders.clone()
        };

        let mut delivered = 0;
        for tx in senders {
            if tx.send(frame.clone()).await.is_ok() {
                delivered += 1;
            }
        }
        Ok(delivered)
    }

    /// Close every open channel of the incident
    pub fn close_channels(&self, incident_id: &str) -> Result<usize> {
        Ok(self
            .lock()?
            .channels
            .remove(incident_id)
            .map_or(0, |senders| senders.len()))
    }

    /// Number of channels still open for the incident
    pub fn open_channel_count(&self, incident_id: &str) -> usize {
        self.lock()
            .map(|state| {
                state
                    .channels
                    .get(incident_id)
                    .map_or(0, |senders| senders.iter().filter(|tx| !tx.is_closed()).count())
            })
            .unwrap_or(0)
    }

    fn check_failing(&self, incident_id: &str) -> Result<()> {
        match self.lock()?.failing.get(incident_id) {
            Some(reason) => Err(MutraceError::TransportError {
                incident_id: incident_id.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl IncidentSource for MemorySource {
    async fn list_incidents(&self) -> Result<Vec<Incident>> {
        let mut incidents = self.lock()?.incidents.clone();
        incidents.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(incidents)
    }

    async fn fetch_posts(&self, incident_id: &str) -> Result<Vec<Post>> {
        let delay = self.lock()?.fetch_delays.get(incident_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_failing(incident_id)?;
        Ok(self
            .lock()?
            .posts
            .get(incident_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn open_channel(&self, incident_id: &str) -> Result<mpsc::Receiver<String>> {
        self.check_failing(incident_id)?;
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        self.lock()?
            .channels
            .entry(incident_id.to_string())
            .or_default()
            .push(tx);
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mutrace_core::Severity;

    fn incident(id: &str) -> Incident {
        Incident {
            id: id.to_string(),
            title: format!("Incident {}", id),
            severity: Severity::High,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_fetch_returns_snapshot() {
        let source = MemorySource::new();
        let post = Post::new("p1", "alice", "hello", Utc::now());
        source.insert_incident(incident("inc"), vec![post.clone()]).unwrap();

        assert_eq!(source.fetch_posts("inc").await.unwrap(), vec![post]);
        assert!(source.fetch_posts("other").await.unwrap().is_empty());
        assert_eq!(source.list_incidents().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_publish_reaches_open_channels() {
        let source = MemorySource::new();
        let mut rx = source.open_channel("inc").await.unwrap();

        assert_eq!(source.publish("inc", "frame").await.unwrap(), 1);
        assert_eq!(rx.recv().await.as_deref(), Some("frame"));

        drop(rx);
        assert_eq!(source.publish("inc", "frame").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_close_channels_ends_stream() {
        let source = MemorySource::new();
        let mut rx = source.open_channel("inc").await.unwrap();

        assert_eq!(source.close_channels("inc").unwrap(), 1);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_failing_incident() {
        let source = MemorySource::new();
        source.set_failing("inc", Some("503")).unwrap();

        let err = source.fetch_posts("inc").await.unwrap_err();
        assert!(matches!(err, MutraceError::TransportError { .. }));
        assert!(source.open_channel("inc").await.is_err());

        source.set_failing("inc", None).unwrap();
        assert!(source.open_channel("inc").await.is_ok());
    }
}
