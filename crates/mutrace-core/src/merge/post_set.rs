use std::collections::HashMap;

use crate::model::Post;

/// Insertion-ordered post collection with at most one entry per id
///
/// Posts are immutable once created, so the first copy seen wins and later
/// copies are discarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostSet {
    posts: Vec<Post>,
    index: HashMap<String, usize>,
}

impl PostSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `post` unless its id is already present; returns whether it was added
    pub fn insert(&mut self, post: Post) -> bool {
        if self.index.contains_key(&post.id) {
            return false;
        }
        self.index.insert(post.id.clone(), self.posts.len());
        self.posts.push(post);
        true
    }

    /// Insert each post in order; returns how many were added
    pub fn extend<I: IntoIterator<Item = Post>>(&mut self, posts: I) -> usize {
        let mut added = 0;
        for post in posts {
            if self.insert(post) {
                added += 1;
            }
        }
        added
    }

    pub fn contains(&self, post_id: &str) -> bool {
        self.index.contains_key(post_id)
    }

    pub fn get(&self, post_id: &str) -> Option<&Post> {
        self.index.get(post_id).map(|&i| &self.posts[i])
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn as_slice(&self) -> &[Post] {
        &self.posts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Post> {
        self.posts.iter()
    }

    pub fn into_vec(self) -> Vec<Post> {
        self.posts
    }
}

impl FromIterator<Post> for PostSet {
    fn from_iter<I: IntoIterator<Item = Post>>(iter: I) -> Self {
        let mut set = PostSet::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_first_seen_wins() {
        let now = Utc::now();
        let mut set = PostSet::new();

        assert!(set.insert(Post::new("a", "x", "first", now)));
        assert!(!set.insert(Post::new("a", "x", "second", now)));

        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a").unwrap().content, "first");
    }

    #[test]
    fn test_extend_counts_new_only() {
        let now = Utc::now();
        let mut set: PostSet = vec![Post::new("a", "x", "a", now)].into_iter().collect();

        let added = set.extend(vec![
            Post::new("a", "x", "a", now),
            Post::new("b", "x", "b", now),
            Post::new("b", "x", "b", now),
        ]);

        assert_eq!(added, 1);
        let ids: Vec<&str> = set.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
