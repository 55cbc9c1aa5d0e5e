use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    program_error::ProgramError,
    program_pack::{IsInitialized, Sealed},
    pubkey::Pubkey,
};

use crate::error::LotteryError;

/// Status of the current round
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundStatus {
    /// Round is open for entries
    Open,
    /// Round is closed, waiting for the oracle to deliver randomness
    Calculating,
}

/// Lottery configuration, immutable after initialization
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LotteryConfig {
    /// Organizer account that receives the fee cut of every pot
    pub organizer: Pubkey,
    /// Oracle coordinator identity; the only signer accepted for fulfillment
    pub vrf_coordinator: Pubkey,
    /// Minimum contribution per entry, in lamports
    pub entrance_fee: u64,
    /// Minimum seconds a round stays open before it may close
    pub interval: i64,
    /// Percentage of the pot retained by the organizer (0-100)
    pub organizer_fee_percent: u8,
    /// Randomness-source identity forwarded to the oracle
    pub gas_lane: [u8; 32],
    /// Oracle subscription funding the requests
    pub subscription_id: u64,
    /// Gas limit the oracle should allot to the fulfillment callback
    pub callback_gas_limit: u32,
}

impl LotteryConfig {
    pub const SIZE: usize = 32 + 32 + 8 + 8 + 1 + 32 + 8 + 4;
}

/// Lottery account data: configuration plus the current round
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Lottery {
    /// Is the account initialized
    pub is_initialized: bool,
    /// Immutable configuration
    pub config: LotteryConfig,
    /// Status of the current round
    pub status: RoundStatus,
    /// Players of the current round, insertion order, duplicates allowed
    pub players: Vec<Pubkey>,
    /// Pot accumulated by the current round, in lamports
    pub pool_lamports: u64,
    /// When the current round opened
    pub opened_at: UnixTimestamp,
    /// Outstanding randomness request; set while Calculating, cleared on fulfillment
    pub pending_request_id: Option<u64>,
    /// Monotone counter from which request ids are issued
    pub request_counter: u64,
    /// Winner of the most recently completed round
    pub recent_winner: Option<Pubkey>,
    /// When the most recent round completed
    pub last_won_at: UnixTimestamp,
}

impl Sealed for Lottery {}

impl IsInitialized for Lottery {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Lottery {
    /// Entry capacity of a round; the account is allocated once
    pub const MAX_PLAYERS: usize = 200;

    /// Allocation size of the lottery account
    pub const ACCOUNT_SIZE: usize =
        1 + LotteryConfig::SIZE + 1 + (4 + 32 * Self::MAX_PLAYERS) + 8 + 8 + 9 + 8 + 33 + 8;

    /// Seed of the lottery PDA
    pub const SEED: &'static [u8] = b"lottery";

    pub fn new(config: LotteryConfig, now: UnixTimestamp) -> Self {
        Self {
            is_initialized: true,
            config,
            status: RoundStatus::Open,
            players: Vec::new(),
            pool_lamports: 0,
            opened_at: now,
            pending_request_id: None,
            request_counter: 0,
            recent_winner: None,
            last_won_at: 0,
        }
    }

    /// Number of entries in the current round
    pub fn entry_count(&self) -> usize {
        self.players.len()
    }

    /// Player at the given entry index
    pub fn player_at(&self, index: usize) -> Result<&Pubkey, LotteryError> {
        self.players.get(index).ok_or(LotteryError::IndexOutOfRange)
    }

    /// Record a paid entry for the current round.
    ///
    /// Appends the player and adds the contribution to the pot. The caller is
    /// responsible for actually moving the lamports; any failure there aborts
    /// the transaction along with this bookkeeping.
    pub fn record_entry(&mut self, player: Pubkey, amount: u64) -> Result<(), LotteryError> {
        if amount < self.config.entrance_fee {
            return Err(LotteryError::InsufficientContribution);
        }
        if self.status != RoundStatus::Open {
            return Err(LotteryError::RoundNotOpen);
        }
        if self.players.len() >= Self::MAX_PLAYERS {
            return Err(LotteryError::RoundFull);
        }
        self.pool_lamports = self
            .pool_lamports
            .checked_add(amount)
            .ok_or(LotteryError::TransferFailed)?;
        self.players.push(player);
        Ok(())
    }

    /// Clear the ledger and reopen for the next round
    pub fn reset_round(&mut self, now: UnixTimestamp) {
        self.players.clear();
        self.pool_lamports = 0;
        self.status = RoundStatus::Open;
        self.opened_at = now;
        self.pending_request_id = None;
    }

    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        Self::deserialize(&mut &data[..]).map_err(|_| ProgramError::InvalidAccountData)
    }

    pub fn pack_into(&self, dst: &mut [u8]) -> Result<(), ProgramError> {
        let mut writer = dst;
        self.serialize(&mut writer)
            .map_err(|_| ProgramError::AccountDataTooSmall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> LotteryConfig {
        LotteryConfig {
            organizer: Pubkey::new_unique(),
            vrf_coordinator: Pubkey::new_unique(),
            entrance_fee: 100,
            interval: 30,
            organizer_fee_percent: 10,
            gas_lane: [7u8; 32],
            subscription_id: 1,
            callback_gas_limit: 500_000,
        }
    }

    fn open_lottery() -> Lottery {
        Lottery::new(test_config(), 1_000)
    }

    #[test]
    fn record_entry_appends_and_accumulates() {
        let mut lottery = open_lottery();
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();

        lottery.record_entry(alice, 100).unwrap();
        lottery.record_entry(bob, 150).unwrap();
        lottery.record_entry(alice, 100).unwrap(); // same player may enter twice

        assert_eq!(lottery.entry_count(), 3);
        assert_eq!(lottery.pool_lamports, 350);
        assert_eq!(lottery.player_at(0).unwrap(), &alice);
        assert_eq!(lottery.player_at(1).unwrap(), &bob);
        assert_eq!(lottery.player_at(2).unwrap(), &alice);
    }

    #[test]
    fn record_entry_rejects_underpayment_without_mutation() {
        let mut lottery = open_lottery();
        let err = lottery.record_entry(Pubkey::new_unique(), 99).unwrap_err();
        assert_eq!(err, LotteryError::InsufficientContribution);
        assert_eq!(lottery.entry_count(), 0);
        assert_eq!(lottery.pool_lamports, 0);
    }

    #[test]
    fn record_entry_rejects_closed_round() {
        let mut lottery = open_lottery();
        lottery.status = RoundStatus::Calculating;
        let err = lottery.record_entry(Pubkey::new_unique(), 100).unwrap_err();
        assert_eq!(err, LotteryError::RoundNotOpen);
        assert_eq!(lottery.entry_count(), 0);
    }

    #[test]
    fn record_entry_rejects_full_round() {
        let mut lottery = open_lottery();
        let player = Pubkey::new_unique();
        for _ in 0..Lottery::MAX_PLAYERS {
            lottery.record_entry(player, 100).unwrap();
        }
        let err = lottery.record_entry(player, 100).unwrap_err();
        assert_eq!(err, LotteryError::RoundFull);
        assert_eq!(lottery.entry_count(), Lottery::MAX_PLAYERS);
    }

    #[test]
    fn player_at_rejects_out_of_range_index() {
        let mut lottery = open_lottery();
        lottery.record_entry(Pubkey::new_unique(), 100).unwrap();
        assert_eq!(lottery.player_at(1).unwrap_err(), LotteryError::IndexOutOfRange);
    }

    #[test]
    fn reset_round_clears_ledger_and_reopens() {
        let mut lottery = open_lottery();
        lottery.record_entry(Pubkey::new_unique(), 100).unwrap();
        lottery.status = RoundStatus::Calculating;
        lottery.pending_request_id = Some(1);

        lottery.reset_round(2_000);

        assert_eq!(lottery.entry_count(), 0);
        assert_eq!(lottery.pool_lamports, 0);
        assert_eq!(lottery.status, RoundStatus::Open);
        assert_eq!(lottery.opened_at, 2_000);
        assert_eq!(lottery.pending_request_id, None);
    }

    #[test]
    fn pack_round_trips_through_fixed_size_account() {
        let mut lottery = open_lottery();
        lottery.record_entry(Pubkey::new_unique(), 100).unwrap();
        lottery.recent_winner = Some(Pubkey::new_unique());

        let mut data = vec![0u8; Lottery::ACCOUNT_SIZE];
        lottery.pack_into(&mut data).unwrap();
        let unpacked = Lottery::unpack(&data).unwrap();
        assert_eq!(unpacked, lottery);
    }
}
