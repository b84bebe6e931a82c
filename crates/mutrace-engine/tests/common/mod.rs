use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use mutrace_core::config::EngineConfig;
use mutrace_core::{Incident, Post, Severity};
use mutrace_engine::{IncidentView, MemorySource, Viewer, ViewerHandle};

#[allow(dead_code)]
pub fn post(id: &str, parent: Option<&str>, content: &str, offset_secs: i64) -> Post {
    let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + ChronoDuration::seconds(offset_secs);
    let p = Post::new(id, format!("author-{}", id), content, ts);
    match parent {
        Some(parent_id) => p.with_parent(parent_id),
        None => p,
    }
}

#[allow(dead_code)]
pub fn incident(id: &str) -> Incident {
    Incident {
        id: id.to_string(),
        title: format!("Incident {}", id),
        severity: Severity::Medium,
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
    }
}

/// Source with two incidents: "sky" (root + one mutation) and "moon" (single root)
#[allow(dead_code)]
pub fn seeded_source() -> Arc<MemorySource> {
    let source = MemorySource::new();
    source
        .insert_incident(
            incident("sky"),
            vec![
                post("a", None, "The sky is blue", 0),
                post("b", Some("a"), "The sky is red", 10),
            ],
        )
        .unwrap();
    source
        .insert_incident(incident("moon"), vec![post("m1", None, "The moon is cheese", 0)])
        .unwrap();
    Arc::new(source)
}

#[allow(dead_code)]
pub fn start(source: Arc<MemorySource>) -> (ViewerHandle, tokio::task::JoinHandle<()>) {
    Viewer::spawn(source, EngineConfig::default())
}

/// Wait until a published view satisfies `predicate`
#[allow(dead_code)]
pub async fn wait_for_view<F>(handle: &ViewerHandle, mut predicate: F) -> IncidentView
where
    F: FnMut(&IncidentView) -> bool,
{
    let mut rx = handle.subscribe();
    let view = tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|view| view.as_ref().is_some_and(&mut predicate)),
    )
    .await
    .expect("timed out waiting for view")
    .expect("viewer stopped");
    (*view).clone().expect("view present")
}

/// Poll until `condition` holds
#[allow(dead_code)]
pub async fn eventually<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition never held");
}
