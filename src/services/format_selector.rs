//! Winning-format selection from a campaign's post history.

use crate::domain::models::{Post, PostFormat};

/// Format with the highest average likes + comments per post.
///
/// Formats are compared in order of first appearance and only a strictly
/// better average replaces the current best, so ties keep the first-seen
/// format. The search starts from reels at zero engagement, which makes reels
/// the answer both for an empty history and for a history with no engagement.
pub fn winning_format(posts: &[Post]) -> PostFormat {
    // (format, total engagement, post count) in first-seen order
    let mut tallies: Vec<(PostFormat, u64, u64)> = Vec::new();
    for post in posts {
        match tallies.iter_mut().find(|(format, _, _)| *format == post.format) {
            Some((_, total, count)) => {
                *total += post.engagement();
                *count += 1;
            }
            None => tallies.push((post.format, post.engagement(), 1)),
        }
    }

    let mut best = PostFormat::Reels;
    let mut best_average = 0.0;
    for (format, total, count) in tallies {
        let average = total as f64 / count as f64;
        if average > best_average {
            best_average = average;
            best = format;
        }
    }
    best
}

/// Format to pivot to: the first of reels, story, post that differs from
/// the current winner.
pub fn pivot_format(current: PostFormat) -> PostFormat {
    PostFormat::ALL
        .into_iter()
        .find(|format| *format != current)
        .unwrap_or(PostFormat::Reels)
}
