//! Leaderboard computation.

use quizhub_protocol::LeaderboardEntry;

use crate::Participant;

/// Ranks participants by score, descending.
///
/// The sort must be stable: ties keep join order, so the first-joined
/// participant ranks higher. Ranks are sequential (1, 2, 3, …) — equal
/// scores still get distinct consecutive ranks.
pub fn rank(participants: &[Participant]) -> Vec<LeaderboardEntry> {
    let mut ordered: Vec<&Participant> = participants.iter().collect();
    ordered.sort_by(|a, b| b.score.cmp(&a.score));

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, p)| LeaderboardEntry {
            rank: i + 1,
            username: p.username.clone(),
            score: p.score,
            id: p.id,
        })
        .collect()
}
