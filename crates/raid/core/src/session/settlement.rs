use rand::Rng;
use rand::seq::SliceRandom;

use crate::actor::SpecimenTraits;
use crate::config::CatchLimit;
use crate::event::Contribution;
use crate::state::{ParticipantId, SessionId, Ticks};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SettlementOutcome {
    Success,
    Failure,
}

/// Final result of a session.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settlement {
    pub session: SessionId,
    pub outcome: SettlementOutcome,
    pub winners: Vec<ParticipantId>,
    /// Participants rewarded with `won = false`.
    pub others: Vec<ParticipantId>,
    pub specimen: Option<SpecimenTraits>,
    pub contributions: Vec<Contribution>,
    pub elapsed: Ticks,
}

impl Settlement {
    pub fn is_success(&self) -> bool {
        self.outcome == SettlementOutcome::Success
    }
}

/// Splits `roster` into winners and the rest.
///
/// An unlimited catch limit, or one the roster does not exceed, makes everyone a
/// winner. Otherwise the roster is shuffled and the first `limit` entries win.
pub fn split_by_catch_limit<P: Copy, R: Rng + ?Sized>(
    roster: &[P],
    limit: CatchLimit,
    rng: &mut R,
) -> (Vec<P>, Vec<P>) {
    let limit = match limit {
        CatchLimit::Unlimited => return (roster.to_vec(), Vec::new()),
        CatchLimit::Limited(limit) => limit as usize,
    };
    if limit == 0 {
        return (Vec::new(), roster.to_vec());
    }
    if roster.len() <= limit {
        return (roster.to_vec(), Vec::new());
    }
    let mut shuffled = roster.to_vec();
    shuffled.shuffle(rng);
    let others = shuffled.split_off(limit);
    (shuffled, others)
}
