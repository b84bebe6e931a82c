//! Diff command
//!
//! Usage: mutrace diff <POSTS_JSON> <POST_ID> [--json]

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Args;
use mutrace_core::config::EngineConfig;
use mutrace_core::diff::render_inline;
use mutrace_core::{analyze_post, PostAnalysis};

use super::{load_posts, CliResult};

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// JSON array of posts
    pub posts: PathBuf,

    /// Post to compare against its parent
    pub post_id: String,

    /// Emit the analysis as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: DiffArgs, config: &EngineConfig) -> CliResult<()> {
    let posts = load_posts(&args.posts)?;
    let analysis = analyze_post(&posts, &args.post_id, config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", render_analysis(&analysis));
    }
    Ok(())
}

pub fn render_analysis(analysis: &PostAnalysis) -> String {
    let mut out = String::new();
    let Some(parent) = &analysis.parent else {
        let _ = writeln!(out, "{} is patient zero (no parent to compare)", analysis.post.id);
        return out;
    };

    let _ = writeln!(out, "{} <- {}", analysis.post.id, parent.id);
    for op in &analysis.diff {
        let _ = writeln!(
            out,
            "  {:<7} {}-{} / {}-{}",
            op.tag.as_str(),
            op.i1,
            op.i2,
            op.j1,
            op.j2
        );
    }
    let _ = writeln!(
        out,
        "{}",
        render_inline(&parent.content, &analysis.post.content, &analysis.diff)
    );
    if let Some(score) = analysis.score {
        let _ = writeln!(out, "score {:.2} {}", score, analysis.mutation_type);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mutrace_core::Post;

    #[test]
    fn test_render_analysis() {
        let now = Utc::now();
        let posts = vec![
            Post::new("a", "x", "The sky is blue", now),
            Post::new("b", "y", "The sky is red", now).with_parent("a"),
        ];
        let analysis = analyze_post(&posts, "b", &EngineConfig::default()).unwrap();

        let text = render_analysis(&analysis);

        assert!(text.starts_with("b <- a\n"));
        assert!(text.contains("  equal   0-11 / 0-11\n"));
        assert!(text.contains("The sky is [-blu-]{+r+}e{+d+}\n"));
        assert!(text.ends_with("score 17.24 MODIFIED\n"));
    }

    #[test]
    fn test_render_patient_zero() {
        let posts = vec![Post::new("a", "x", "hello", Utc::now())];
        let analysis = analyze_post(&posts, "a", &EngineConfig::default()).unwrap();
        assert!(render_analysis(&analysis).contains("patient zero"));
    }
}
