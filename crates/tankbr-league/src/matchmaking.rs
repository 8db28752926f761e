//! Splits the ranked population into match groups.
//!
//! Players are taken best first. With a spread of one, neighbours in the
//! ranking play each other. With a wider spread, each group is drawn from a
//! window of `match_size * spread` players, weighted by rating variance so
//! that players the league knows least about get matched most.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

use crate::player::{PlayerId, PlayerRecord};

/// A player as matchmaking sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    id: PlayerId,
    sigma: f64,
}

/// Groups `ranked` (best first) into matches of up to `match_size`.
///
/// Every player lands in at most one group. A trailing group of fewer than
/// two players is dropped; those players sit the round out. `default_sigma`
/// stands in for players without a rating.
pub fn make_groups(
    ranked: &[&PlayerRecord],
    match_size: usize,
    spread: usize,
    default_sigma: f64,
    rng: &mut impl Rng,
) -> Vec<Vec<PlayerId>> {
    let match_size = match_size.max(2);
    let mut pool: Vec<Candidate> = ranked
        .iter()
        .map(|p| Candidate {
            id: p.id,
            sigma: p.sigma().unwrap_or(default_sigma),
        })
        .collect();

    let mut groups = Vec::new();
    while pool.len() >= 2 {
        let window = (match_size * spread.max(1)).min(pool.len());
        let group = if window <= match_size {
            pool.drain(..window).map(|c| c.id).collect()
        } else {
            draw(&mut pool, window, match_size, rng)
        };
        groups.push(group);
    }

    if let Some(left) = pool.first() {
        warn!(player = %left.id, "no opponents left, sitting out this round");
    }
    groups
}

/// Removes `amount` candidates from the first `window` of `pool`, weighted by
/// variance, and returns them in ranking order.
fn draw(
    pool: &mut Vec<Candidate>,
    window: usize,
    amount: usize,
    rng: &mut impl Rng,
) -> Vec<PlayerId> {
    let chosen: Vec<PlayerId> = match pool[..window]
        .choose_multiple_weighted(rng, amount, |c| (c.sigma * c.sigma).max(f64::EPSILON))
    {
        Ok(picked) => picked.map(|c| c.id).collect(),
        Err(error) => {
            warn!(%error, "weighted draw failed, taking the top of the window");
            pool[..amount].iter().map(|c| c.id).collect()
        }
    };

    let mut group = Vec::with_capacity(amount);
    pool.retain(|c| {
        if chosen.contains(&c.id) {
            group.push(c.id);
            false
        } else {
            true
        }
    });
    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::Rating;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[allow(clippy::cast_precision_loss)]
    fn population(n: u64) -> Vec<PlayerRecord> {
        (0..n)
            .map(|i| {
                let mut p = PlayerRecord::new(PlayerId::new(i), format!("p{i}"), None);
                p.rating = Some(Rating::new(40.0 - i as f64, 1.0 + (i % 3) as f64));
                p
            })
            .collect()
    }

    fn groups(n: u64, size: usize, spread: usize, seed: u64) -> Vec<Vec<PlayerId>> {
        let players = population(n);
        let ranked: Vec<&PlayerRecord> = players.iter().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        make_groups(&ranked, size, spread, 25.0 / 3.0, &mut rng)
    }

    fn flattened(groups: &[Vec<PlayerId>]) -> Vec<PlayerId> {
        let mut all: Vec<PlayerId> = groups.iter().flatten().copied().collect();
        all.sort();
        all
    }

    #[test]
    fn neighbours_play_without_spread() {
        let groups = groups(6, 3, 1, 0);
        assert_eq!(
            groups,
            vec![
                vec![PlayerId::new(0), PlayerId::new(1), PlayerId::new(2)],
                vec![PlayerId::new(3), PlayerId::new(4), PlayerId::new(5)],
            ]
        );
    }

    #[test]
    fn short_tail_still_plays() {
        let groups = groups(7, 5, 1, 0);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1], vec![PlayerId::new(5), PlayerId::new(6)]);
    }

    #[test]
    fn lone_player_sits_out() {
        let groups = groups(5, 2, 1, 0);
        assert_eq!(groups.len(), 2);
        assert!(!flattened(&groups).contains(&PlayerId::new(4)));
    }

    #[test]
    fn spread_draws_every_player_once() {
        let groups = groups(20, 5, 2, 9);
        assert_eq!(groups.len(), 4);
        assert!(groups.iter().all(|g| g.len() == 5));
        let all = flattened(&groups);
        assert_eq!(all, (0..20).map(PlayerId::new).collect::<Vec<_>>());
    }

    #[test]
    fn spread_draw_is_seeded() {
        assert_eq!(groups(20, 4, 3, 42), groups(20, 4, 3, 42));
    }

    #[test]
    fn groups_keep_ranking_order() {
        for group in groups(20, 5, 2, 3) {
            assert!(group.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn first_group_comes_from_the_top_window() {
        let groups = groups(20, 5, 2, 11);
        assert!(groups[0].iter().all(|id| id.as_u64() < 10));
    }
}
