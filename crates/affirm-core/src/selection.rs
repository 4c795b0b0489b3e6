//! Anti-repetition random pick over the active set.
//!
//! No I/O and no hidden state: the caller supplies the candidates, the id that
//! was shown last, and the random source.

use rand::{Rng, seq::SliceRandom};
use uuid::Uuid;

use crate::affirmation::Affirmation;

/// Choose one affirmation uniformly at random from `active`, skipping
/// `exclude`.
///
/// - An empty set yields `None` (no content, not an error).
/// - A single-member set yields that member even when it is `exclude`;
///   repetition cannot be avoided with one candidate.
/// - An `exclude` that is not in the set has no effect.
///
/// For two or more candidates, feeding each result back in as the next
/// `exclude` never yields the same id twice in a row.
pub fn select<'a, R>(
  active: &'a [Affirmation],
  exclude: Option<Uuid>,
  rng: &mut R,
) -> Option<&'a Affirmation>
where
  R: Rng + ?Sized,
{
  match active {
    [] => None,
    [only] => Some(only),
    _ => {
      let eligible: Vec<&Affirmation> = active
        .iter()
        .filter(|a| Some(a.id) != exclude)
        .collect();
      if eligible.is_empty() {
        // Every candidate shares the excluded id; nothing better to offer.
        active.choose(rng)
      } else {
        eligible.choose(rng).copied()
      }
    }
  }
}
