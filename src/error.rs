use solana_program::{
    decode_error::DecodeError, msg, program_error::PrintProgramError, program_error::ProgramError,
};
use thiserror::Error;

/// Errors that may be returned by the Lottery program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum LotteryError {
    /// Contribution is below the entrance fee
    #[error("Contribution is below the entrance fee")]
    InsufficientContribution,

    /// Round is not open for entries
    #[error("Round is not open for entries")]
    RoundNotOpen,

    /// Upkeep conditions are not met
    #[error("Upkeep conditions are not met")]
    UpkeepNotNeeded,

    /// Request id is unknown or does not match the pending request
    #[error("Request id is unknown or does not match the pending request")]
    RequestMismatch,

    /// Randomness request could not be issued to the oracle
    #[error("Randomness request could not be issued to the oracle")]
    OracleUnavailable,

    /// Cannot select a winner from an empty entry list
    #[error("Cannot select a winner from an empty entry list")]
    EmptyEntryList,

    /// Player index is out of range
    #[error("Player index is out of range")]
    IndexOutOfRange,

    /// Payout transfer could not be completed
    #[error("Payout transfer could not be completed")]
    TransferFailed,

    /// Round has reached its entry capacity
    #[error("Round has reached its entry capacity")]
    RoundFull,

    /// Fulfillment was not signed by the configured oracle
    #[error("Fulfillment was not signed by the configured oracle")]
    UnauthorizedOracle,

    /// Payout account does not match the selected winner or organizer
    #[error("Payout account does not match the selected winner or organizer")]
    PayoutAccountMismatch,

    /// Organizer fee percentage must not exceed 100
    #[error("Organizer fee percentage must not exceed 100")]
    InvalidFeePercent,
}

impl From<LotteryError> for ProgramError {
    fn from(e: LotteryError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for LotteryError {
    fn type_of() -> &'static str {
        "Lottery Error"
    }
}

impl PrintProgramError for LotteryError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}
