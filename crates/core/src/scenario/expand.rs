//! Role expansion: the multiset of roles to deal for a player count
//!
//! Three passes over the scenario, all in document order:
//!
//! 1. every explicit role whose `added_at` threshold is met;
//! 2. if that falls short, each side's default role, either up to the
//!    side's population quota or, for a side without a usable rate, up to
//!    the player count;
//! 3. a stable sort on the SHA-256 digest of each role name.
//!
//! The result is not clamped to the player count. Callers that need an
//! exact fit go through [`Scenario::expand`].

use crate::models::{Role, Scenario};

/// Population rates outside this band are treated as absent
pub const RATE_MIN: f64 = 0.01;
pub const RATE_MAX: f64 = 0.99;

/// Expand `scenario` for `players`, labelling every copy with its side
pub fn expand_roles(scenario: &Scenario, players: usize) -> Vec<Role> {
    if players == 0 {
        return Vec::new();
    }

    let mut roles: Vec<Role> = scenario
        .sides
        .iter()
        .flat_map(|side| {
            side.roles
                .iter()
                .filter(|role| role.is_eligible(players))
                .map(|role| role.stamped(&side.name))
        })
        .collect();

    if roles.len() < players {
        for side in &scenario.sides {
            let Some(default) = &side.default_role else {
                continue;
            };

            // Quota subtracts the declared role count, not the admitted one
            let copies = match usable_rate(side.population_rate) {
                Some(rate) => side_quota(players, rate).saturating_sub(side.roles.len()),
                None => players.saturating_sub(roles.len()),
            };

            tracing::trace!(side = %side.name, copies, "default role copies");
            roles.extend(std::iter::repeat_with(|| default.stamped(&side.name)).take(copies));
        }
    }

    canonical_sort(&mut roles);
    roles
}

/// Target number of players on a side with the given rate
pub fn side_quota(players: usize, rate: f64) -> usize {
    (players as f64 * rate).floor() as usize
}

/// Sort by the hex SHA-256 digest of the role name. Stable.
pub fn canonical_sort(roles: &mut [Role]) {
    roles.sort_by_cached_key(|role| sha256::digest(role.name.as_str()));
}

fn usable_rate(rate: Option<f64>) -> Option<f64> {
    rate.filter(|r| (RATE_MIN..=RATE_MAX).contains(r))
}
