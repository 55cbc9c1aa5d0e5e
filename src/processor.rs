use crate::error::LotteryError;
use crate::instruction::LotteryInstruction;
use crate::state::{Lottery, LotteryConfig, RoundStatus};
use crate::upkeep::UpkeepCheck;
use crate::vrf;
use crate::winner;

use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed, set_return_data},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_instruction,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};

pub struct Processor;

impl Processor {
    pub fn process_instruction(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = LotteryInstruction::unpack(instruction_data)?;

        match instruction {
            LotteryInstruction::Initialize {
                entrance_fee,
                interval,
                organizer_fee_percent,
                gas_lane,
                subscription_id,
                callback_gas_limit,
            } => {
                msg!("Instruction: Initialize");
                Self::process_initialize(
                    program_id,
                    accounts,
                    entrance_fee,
                    interval,
                    organizer_fee_percent,
                    gas_lane,
                    subscription_id,
                    callback_gas_limit,
                )
            }
            LotteryInstruction::Enter { amount } => {
                msg!("Instruction: Enter");
                Self::process_enter(program_id, accounts, amount)
            }
            LotteryInstruction::CheckUpkeep {} => {
                msg!("Instruction: Check Upkeep");
                Self::process_check_upkeep(program_id, accounts)
            }
            LotteryInstruction::PerformUpkeep {} => {
                msg!("Instruction: Perform Upkeep");
                Self::process_perform_upkeep(program_id, accounts)
            }
            LotteryInstruction::FulfillRandomness {
                request_id,
                random_value,
            } => {
                msg!("Instruction: Fulfill Randomness");
                Self::process_fulfill_randomness(program_id, accounts, request_id, random_value)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn process_initialize(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        entrance_fee: u64,
        interval: i64,
        organizer_fee_percent: u8,
        gas_lane: [u8; 32],
        subscription_id: u64,
        callback_gas_limit: u32,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let organizer_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !organizer_info.is_signer {
            msg!("Organizer must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if organizer_fee_percent > 100 {
            msg!("Organizer fee percentage cannot exceed 100");
            return Err(LotteryError::InvalidFeePercent.into());
        }

        let (expected_lottery_pubkey, bump_seed) =
            Pubkey::find_program_address(&[Lottery::SEED], program_id);
        if *lottery_info.key != expected_lottery_pubkey {
            msg!("Invalid lottery account address");
            return Err(ProgramError::InvalidArgument);
        }

        if lottery_info.owner != program_id {
            msg!("Creating new lottery account");
            let rent = Rent::get()?;
            let rent_lamports = rent.minimum_balance(Lottery::ACCOUNT_SIZE);

            invoke_signed(
                &system_instruction::create_account(
                    organizer_info.key,
                    lottery_info.key,
                    rent_lamports,
                    Lottery::ACCOUNT_SIZE as u64,
                    program_id,
                ),
                &[
                    organizer_info.clone(),
                    lottery_info.clone(),
                    system_program_info.clone(),
                ],
                &[&[Lottery::SEED, &[bump_seed]]],
            )?;
        }

        if let Ok(lottery) = Lottery::unpack(&lottery_info.data.borrow()) {
            if lottery.is_initialized {
                msg!("Lottery account is already initialized");
                return Err(ProgramError::AccountAlreadyInitialized);
            }
        }

        let clock = Clock::get()?;
        let config = LotteryConfig {
            organizer: *organizer_info.key,
            vrf_coordinator: *coordinator_info.key,
            entrance_fee,
            interval,
            organizer_fee_percent,
            gas_lane,
            subscription_id,
            callback_gas_limit,
        };
        let lottery = Lottery::new(config, clock.unix_timestamp);
        lottery.pack_into(&mut lottery_info.data.borrow_mut())?;

        msg!(
            "Lottery initialized: organizer={} coordinator={} entrance_fee={} interval={}s fee={}%",
            organizer_info.key,
            coordinator_info.key,
            entrance_fee,
            interval,
            organizer_fee_percent
        );
        Ok(())
    }

    fn process_enter(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let player_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !player_info.is_signer {
            msg!("Player must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if lottery_info.owner != program_id {
            msg!("Lottery account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut lottery = Lottery::unpack(&lottery_info.data.borrow())?;
        if !lottery.is_initialized {
            return Err(ProgramError::UninitializedAccount);
        }

        lottery.record_entry(*player_info.key, amount)?;

        // Contribution moves into the pool account; a failure here aborts the
        // transaction, ledger bookkeeping included.
        invoke(
            &system_instruction::transfer(player_info.key, lottery_info.key, amount),
            &[
                player_info.clone(),
                lottery_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        lottery.pack_into(&mut lottery_info.data.borrow_mut())?;

        msg!(
            "EntryRecorded: player={} amount={} entries={} pool={}",
            player_info.key,
            amount,
            lottery.entry_count(),
            lottery.pool_lamports
        );
        Ok(())
    }

    /// Dry-run entry point for external schedulers. Evaluates the same
    /// predicate as PerformUpkeep against the current clock, logs the
    /// verdict and publishes it as return data without touching state.
    fn process_check_upkeep(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let lottery_info = next_account_info(account_info_iter)?;

        if lottery_info.owner != program_id {
            msg!("Lottery account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let lottery = Lottery::unpack(&lottery_info.data.borrow())?;
        if !lottery.is_initialized {
            return Err(ProgramError::UninitializedAccount);
        }

        let clock = Clock::get()?;
        let check = UpkeepCheck::evaluate(&lottery, clock.unix_timestamp);
        msg!(
            "CheckUpkeep: needed={} open={} interval_elapsed={} players={} pool={}",
            check.needed(),
            check.is_open,
            check.interval_elapsed,
            lottery.entry_count(),
            lottery.pool_lamports
        );
        set_return_data(&[check.needed() as u8]);
        Ok(())
    }

    fn process_perform_upkeep(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let cranker_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;

        if !cranker_info.is_signer {
            msg!("Cranker must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if lottery_info.owner != program_id {
            msg!("Lottery account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut lottery = Lottery::unpack(&lottery_info.data.borrow())?;
        if !lottery.is_initialized {
            return Err(ProgramError::UninitializedAccount);
        }

        let clock = Clock::get()?;
        let check = UpkeepCheck::evaluate(&lottery, clock.unix_timestamp);
        if !check.needed() {
            msg!(
                "Upkeep not needed: open={} interval_elapsed={} players={} pool={}",
                check.is_open,
                check.interval_elapsed,
                lottery.entry_count(),
                lottery.pool_lamports
            );
            return Err(LotteryError::UpkeepNotNeeded.into());
        }

        // The request must be placed before any state changes so that a
        // coordinator failure leaves the round open and retryable.
        let request_id = vrf::request_randomness(&lottery, coordinator_info)?;

        lottery.request_counter = request_id;
        lottery.pending_request_id = Some(request_id);
        lottery.status = RoundStatus::Calculating;
        lottery.pack_into(&mut lottery_info.data.borrow_mut())?;

        msg!("RandomnessRequested: request_id={}", request_id);
        Ok(())
    }

    fn process_fulfill_randomness(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        request_id: u64,
        random_value: [u8; 32],
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let oracle_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;
        let organizer_info = next_account_info(account_info_iter)?;

        if !oracle_info.is_signer {
            msg!("Oracle coordinator must sign the fulfillment");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if lottery_info.owner != program_id {
            msg!("Lottery account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut lottery = Lottery::unpack(&lottery_info.data.borrow())?;
        if !lottery.is_initialized {
            return Err(ProgramError::UninitializedAccount);
        }

        if *oracle_info.key != lottery.config.vrf_coordinator {
            msg!(
                "Fulfillment signer {} is not the configured coordinator {}",
                oracle_info.key,
                lottery.config.vrf_coordinator
            );
            return Err(LotteryError::UnauthorizedOracle.into());
        }

        // Correlation guard: duplicate, stale or forged deliveries must be
        // rejected before anything is mutated.
        if lottery.status != RoundStatus::Calculating
            || lottery.pending_request_id != Some(request_id)
        {
            msg!(
                "Request {} does not match pending request {:?} (status {:?})",
                request_id,
                lottery.pending_request_id,
                lottery.status
            );
            return Err(LotteryError::RequestMismatch.into());
        }

        let (winner_index, winner_key) = winner::select_winner(&random_value, &lottery.players)?;
        let pool = lottery.pool_lamports;
        let (winner_amount, organizer_amount) =
            winner::split_pot(pool, lottery.config.organizer_fee_percent);

        if *winner_info.key != winner_key {
            msg!(
                "Winner account {} does not match selected player {} (index {})",
                winner_info.key,
                winner_key,
                winner_index
            );
            return Err(LotteryError::PayoutAccountMismatch.into());
        }
        if *organizer_info.key != lottery.config.organizer {
            msg!(
                "Organizer account {} does not match configured organizer {}",
                organizer_info.key,
                lottery.config.organizer
            );
            return Err(LotteryError::PayoutAccountMismatch.into());
        }

        // Bookkeeping first, fund movement last: a failed transfer aborts the
        // transaction and the round stays Calculating with the request
        // pending, so the coordinator can retry the delivery.
        let clock = Clock::get()?;
        lottery.recent_winner = Some(winner_key);
        lottery.last_won_at = clock.unix_timestamp;
        lottery.reset_round(clock.unix_timestamp);
        lottery.pack_into(&mut lottery_info.data.borrow_mut())?;

        let remaining = lottery_info
            .lamports()
            .checked_sub(pool)
            .ok_or(LotteryError::TransferFailed)?;
        **lottery_info.try_borrow_mut_lamports()? = remaining;
        **winner_info.try_borrow_mut_lamports()? = winner_info
            .lamports()
            .checked_add(winner_amount)
            .ok_or(LotteryError::TransferFailed)?;
        **organizer_info.try_borrow_mut_lamports()? = organizer_info
            .lamports()
            .checked_add(organizer_amount)
            .ok_or(LotteryError::TransferFailed)?;

        msg!(
            "WinnerPicked: request_id={} winner={} prize={} organizer_fee={}",
            request_id,
            winner_key,
            winner_amount,
            organizer_amount
        );
        Ok(())
    }
}
