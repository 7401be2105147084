//! Dealer - pairs expanded roles with players
//!
//! Players are sorted by id and roles are shuffled with Fisher-Yates, so
//! for a fixed shuffler state the outcome is reproducible.

use std::collections::HashSet;

use rand::{Rng, RngCore};

use crate::error::{Error, Result};
use crate::models::{Assignments, Role, UserId};

/// The randomness a dealer needs: permute `n` indices through `swap`
pub trait RoleShuffler {
    fn shuffle(&mut self, n: usize, swap: &mut dyn FnMut(usize, usize));
}

impl<R: RngCore + ?Sized> RoleShuffler for R {
    fn shuffle(&mut self, n: usize, swap: &mut dyn FnMut(usize, usize)) {
        for i in (1..n).rev() {
            let j = self.gen_range(0..=i);
            swap(i, j);
        }
    }
}

/// Deal `roles` to `players`, one each
pub fn deal(
    roles: &[Role],
    players: &[UserId],
    rng: &mut (impl RoleShuffler + ?Sized),
) -> Result<Assignments> {
    if roles.len() != players.len() {
        return Err(Error::PlayerRoleMismatch {
            players: players.len(),
            roles: roles.len(),
        });
    }

    let mut players = players.to_vec();
    players.sort_unstable();
    let unique: HashSet<UserId> = players.iter().copied().collect();
    if unique.len() != players.len() {
        return Err(Error::InvalidInput("duplicate player id".to_string()));
    }

    let mut shuffled = roles.to_vec();
    rng.shuffle(shuffled.len(), &mut |i, j| shuffled.swap(i, j));

    Ok(players.into_iter().zip(shuffled).collect())
}
