use rand::Rng;
use rand::rngs::SmallRng;
use std::collections::HashSet;

/// Picks the next track index under random mode without repeating a track
/// until the whole catalog has been covered once.
///
/// `played` holds the indices seen in the current shuffle cycle. When the
/// cycle is exhausted the set is cleared here, re-seeded with `current_index`
/// (if there is more than one track) so the track that just finished cannot
/// come up again immediately. The returned pick is NOT inserted into
/// `played`; that happens when the track actually loads, keeping selection
/// and played-bookkeeping separate.
pub fn next_random_index(
    rng: &mut SmallRng,
    current_index: usize,
    track_count: usize,
    played: &mut HashSet<usize>,
) -> usize {
    assert!(track_count > 0, "catalog must not be empty");
    debug_assert!(current_index < track_count);
    debug_assert!(played.iter().all(|idx| *idx < track_count));

    if played.len() == track_count {
        played.clear();
        if track_count > 1 {
            played.insert(current_index);
        }
    }

    let remaining: Vec<usize> = (0..track_count)
        .filter(|idx| !played.contains(idx))
        .collect();

    // Never empty: either played.len() < track_count, or the reset above just
    // freed at least track_count - 1 slots (all of them for a single track).
    remaining[rng.random_range(0..remaining.len())]
}
