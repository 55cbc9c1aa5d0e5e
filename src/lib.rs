// Sol-Lottery
// A self-custodying lottery on Solana: paid entries, scheduler-cranked
// round closure, oracle-delivered randomness, winner-takes-the-pot payout
// minus an organizer fee.

pub mod error;
pub mod instruction;
pub mod processor;
pub mod state;
pub mod upkeep;
pub mod vrf;
pub mod winner;

#[cfg(not(feature = "no-entrypoint"))]
pub mod entrypoint;

use solana_program::{account_info::AccountInfo, entrypoint::ProgramResult, pubkey::Pubkey};

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    processor::Processor::process_instruction(program_id, accounts, instruction_data)
}
