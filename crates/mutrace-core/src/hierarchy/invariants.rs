use std::collections::HashMap;

use crate::model::Post;

/// Id-keyed view over a post list, first occurrence wins
pub(crate) type PostIndex<'a> = HashMap<&'a str, &'a Post>;

pub(crate) fn index_posts(posts: &[Post]) -> (PostIndex<'_>, Vec<String>) {
    let mut index: PostIndex<'_> = HashMap::with_capacity(posts.len());
    let mut duplicates = Vec::new();
    for post in posts {
        if index.contains_key(post.id.as_str()) {
            duplicates.push(post.id.clone());
        } else {
            index.insert(post.id.as_str(), post);
        }
    }
    (index, duplicates)
}

/// Check whether `post_id` is reachable from itself through parent links
///
/// The walk is bounded by the number of indexed posts, so it terminates even
/// when the ancestors loop without ever returning to `post_id`.
pub(crate) fn is_in_cycle(index: &PostIndex<'_>, post_id: &str) -> bool {
    let mut current = index
        .get(post_id)
        .and_then(|p| p.parent_id.as_deref());

    for _ in 0..index.len() {
        let Some(id) = current else {
            return false;
        };
        if id == post_id {
            return true;
        }
        current = index.get(id).and_then(|p| p.parent_id.as_deref());
    }

    false
}

/// Posts whose declared parent is absent, as `(post_id, parent_id)`
pub fn find_orphans(posts: &[Post]) -> Vec<(String, String)> {
    let (index, _) = index_posts(posts);
    let mut orphans: Vec<(String, String)> = index
        .values()
        .filter_map(|post| {
            let parent = post.parent_id.as_deref()?;
            (!index.contains_key(parent)).then(|| (post.id.clone(), parent.to_string()))
        })
        .collect();
    orphans.sort();
    orphans
}

/// Ids of every post that is its own ancestor, sorted
pub fn find_cycles(posts: &[Post]) -> Vec<String> {
    let (index, _) = index_posts(posts);
    let mut cycles: Vec<String> = index
        .keys()
        .filter(|id| is_in_cycle(&index, id))
        .map(|id| id.to_string())
        .collect();
    cycles.sort();
    cycles
}
