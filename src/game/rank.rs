//! Rank titles and progress.

use crate::config::Rank;

/// Title for a score: the highest threshold not exceeding it.
#[must_use]
pub fn rank_title(ranks: &[Rank], score: u64) -> &str {
    ranks
        .iter()
        .rev()
        .find(|rank| score >= rank.threshold)
        .or_else(|| ranks.first())
        .map_or("", |rank| rank.title.as_str())
}

/// The next rank to reach, `None` at the top.
#[must_use]
pub fn next_rank(ranks: &[Rank], score: u64) -> Option<&Rank> {
    ranks.iter().find(|rank| score < rank.threshold)
}

/// Progress towards the next threshold in percent, 100 at the top.
#[must_use]
pub fn progress_percent(ranks: &[Rank], score: u64) -> u8 {
    match next_rank(ranks, score) {
        Some(next) if next.threshold > 0 => {
            let percent = (u128::from(score) * 100 / u128::from(next.threshold)).min(100);
            u8::try_from(percent).unwrap_or(100)
        }
        _ => 100,
    }
}

/// Ten-cell progress bar.
#[must_use]
pub fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100) / 10);
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}
