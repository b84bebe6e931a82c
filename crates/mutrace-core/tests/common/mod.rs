use chrono::{DateTime, Duration, TimeZone, Utc};
use mutrace_core::Post;

/// Fixed base instant so fixtures are reproducible
#[allow(dead_code)]
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Create a post `offset_secs` after the base instant
#[allow(dead_code)]
pub fn post_at(id: &str, parent: Option<&str>, content: &str, offset_secs: i64) -> Post {
    let post = Post::new(
        id,
        format!("author-{}", id),
        content,
        base_time() + Duration::seconds(offset_secs),
    );
    match parent {
        Some(parent_id) => post.with_parent(parent_id),
        None => post,
    }
}

/// Incident fixture: one root, a mutated reply chain, an orphan and a 2-cycle
///
/// ```text
/// p1 "The sky is blue"
/// ├── p2 "The sky is red"
/// │   └── p4 "The sky is red and falling"
/// └── p3 "The sky is blue"
/// p5 -> missing
/// c1 <-> c2
/// ```
#[allow(dead_code)]
pub fn messy_incident() -> Vec<Post> {
    vec![
        post_at("p1", None, "The sky is blue", 0),
        post_at("p2", Some("p1"), "The sky is red", 10),
        post_at("p3", Some("p1"), "The sky is blue", 20),
        post_at("p4", Some("p2"), "The sky is red and falling", 30),
        post_at("p5", Some("missing"), "Heard it elsewhere", 40),
        post_at("c1", Some("c2"), "loop one", 50),
        post_at("c2", Some("c1"), "loop two", 60),
    ]
}

/// Linear reply chain `n0 <- n1 <- ... <- n{len-1}`
#[allow(dead_code)]
pub fn chain(len: usize) -> Vec<Post> {
    (0..len)
        .map(|i| {
            let id = format!("n{}", i);
            let parent = (i > 0).then(|| format!("n{}", i - 1));
            post_at(&id, parent.as_deref(), &format!("message {}", i), i as i64)
        })
        .collect()
}
