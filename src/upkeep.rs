use solana_program::clock::UnixTimestamp;

use crate::state::{Lottery, RoundStatus};

/// Result of evaluating the round-closure predicate, with the individual
/// conditions retained for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpkeepCheck {
    pub is_open: bool,
    pub interval_elapsed: bool,
    pub has_players: bool,
    pub has_balance: bool,
}

impl UpkeepCheck {
    /// Evaluate whether the round is eligible to close. Pure: the same
    /// inputs give the same verdict whether this backs a dry-run or the
    /// closure transition itself.
    pub fn evaluate(lottery: &Lottery, now: UnixTimestamp) -> Self {
        Self {
            is_open: lottery.status == RoundStatus::Open,
            interval_elapsed: now - lottery.opened_at >= lottery.config.interval,
            has_players: lottery.entry_count() > 0,
            has_balance: lottery.pool_lamports > 0,
        }
    }

    pub fn needed(&self) -> bool {
        self.is_open && self.interval_elapsed && self.has_players && self.has_balance
    }
}

/// True iff the round is open, the interval has elapsed, and there is at
/// least one player and a non-empty pot.
pub fn upkeep_needed(lottery: &Lottery, now: UnixTimestamp) -> bool {
    UpkeepCheck::evaluate(lottery, now).needed()
}
