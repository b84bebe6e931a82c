//! Tree command
//!
//! Usage: mutrace tree <POSTS_JSON>

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Args;
use mutrace_core::config::EngineConfig;
use mutrace_core::{assign_layout, build_forest, MutationScorer, NodeStatus, Post};

use super::{load_posts, CliResult};

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// JSON array of posts
    pub posts: PathBuf,
}

pub fn execute(args: TreeArgs, config: &EngineConfig) -> CliResult<()> {
    let posts = load_posts(&args.posts)?;
    print!("{}", render_tree(posts, config));
    Ok(())
}

/// Indented forest, one post per line, followed by an integrity summary
pub fn render_tree(mut posts: Vec<Post>, config: &EngineConfig) -> String {
    MutationScorer::from_config(config).annotate(&mut posts);
    let (mut forest, report) = build_forest(&posts);
    assign_layout(&forest, &config.layout).apply_to(&mut forest);

    let mut out = String::new();
    for node in forest.nodes() {
        let indent = "  ".repeat(node.depth);
        let tag = match node.post.mutation_score {
            Some(score) => format!("{} {:.2}", node.post.effective_mutation_type(), score),
            None => "PATIENT_ZERO".to_string(),
        };
        let flag = match &node.status {
            NodeStatus::Orphan { missing_parent } => format!(" !orphan(parent {})", missing_parent),
            NodeStatus::Cycle => " !cycle".to_string(),
            NodeStatus::Root | NodeStatus::Attached => String::new(),
        };
        let position = node
            .layout_position
            .map(|p| format!(" @({:.0},{:.0})", p.x, p.y))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{}{} [{}] {}{}{}",
            indent, node.post.id, tag, node.post.author, position, flag
        );
    }

    let _ = writeln!(
        out,
        "{} posts, {} roots, depth {}, {} orphans, {} cycles, {} duplicates",
        forest.len(),
        forest.roots().len(),
        forest.max_depth(),
        report.orphans.len(),
        report.cycles.len(),
        report.duplicates.len()
    );
    out
}
