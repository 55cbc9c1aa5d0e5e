//! Randomness request glue. The oracle coordinator is an external
//! collaborator configured at initialization: requests are recorded
//! on-chain and announced through the program log, which the coordinator
//! service watches; it later delivers the result by signing a
//! FulfillRandomness instruction. Request ids come from a 1-based monotone
//! counter, so an id is never reused and a late delivery for an earlier
//! round can never match a later one.

use solana_program::{account_info::AccountInfo, msg, program_error::ProgramError};

use crate::error::LotteryError;
use crate::state::Lottery;

/// Issue a randomness request against the configured coordinator and
/// return the fresh request id. Fails with OracleUnavailable if the
/// request cannot be placed; the caller must not have mutated any state
/// before this point, so a failed closure attempt can simply be retried.
pub fn request_randomness(
    lottery: &Lottery,
    coordinator_info: &AccountInfo,
) -> Result<u64, ProgramError> {
    if *coordinator_info.key != lottery.config.vrf_coordinator {
        msg!(
            "Coordinator account {} does not match the configured oracle {}",
            coordinator_info.key,
            lottery.config.vrf_coordinator
        );
        return Err(LotteryError::OracleUnavailable.into());
    }

    let request_id = lottery
        .request_counter
        .checked_add(1)
        .ok_or(LotteryError::OracleUnavailable)?;

    msg!(
        "Randomness request {} -> coordinator {}: subscription={} callback_gas_limit={}",
        request_id,
        lottery.config.vrf_coordinator,
        lottery.config.subscription_id,
        lottery.config.callback_gas_limit
    );

    Ok(request_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LotteryConfig;
    use solana_program::pubkey::Pubkey;

    fn lottery_with_coordinator(coordinator: Pubkey) -> Lottery {
        let config = LotteryConfig {
            organizer: Pubkey::new_unique(),
            vrf_coordinator: coordinator,
            entrance_fee: 100,
            interval: 30,
            organizer_fee_percent: 10,
            gas_lane: [0u8; 32],
            subscription_id: 1,
            callback_gas_limit: 500_000,
        };
        Lottery::new(config, 1_000)
    }

    fn account_info<'a>(
        key: &'a Pubkey,
        lamports: &'a mut u64,
        data: &'a mut [u8],
        owner: &'a Pubkey,
    ) -> AccountInfo<'a> {
        AccountInfo::new(key, false, false, lamports, data, owner, false, 0)
    }

    #[test]
    fn issues_monotone_request_ids() {
        let coordinator = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut lamports = 0;
        let mut data = [0u8; 0];
        let info = account_info(&coordinator, &mut lamports, &mut data, &owner);

        let mut lottery = lottery_with_coordinator(coordinator);
        assert_eq!(request_randomness(&lottery, &info).unwrap(), 1);

        lottery.request_counter = 41;
        assert_eq!(request_randomness(&lottery, &info).unwrap(), 42);
    }

    #[test]
    fn rejects_unknown_coordinator() {
        let coordinator = Pubkey::new_unique();
        let stranger = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut lamports = 0;
        let mut data = [0u8; 0];
        let info = account_info(&stranger, &mut lamports, &mut data, &owner);

        let lottery = lottery_with_coordinator(coordinator);
        let err = request_randomness(&lottery, &info).unwrap_err();
        assert_eq!(err, LotteryError::OracleUnavailable.into());
    }

    #[test]
    fn rejects_exhausted_request_counter() {
        let coordinator = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut lamports = 0;
        let mut data = [0u8; 0];
        let info = account_info(&coordinator, &mut lamports, &mut data, &owner);

        let mut lottery = lottery_with_coordinator(coordinator);
        lottery.request_counter = u64::MAX;
        let err = request_randomness(&lottery, &info).unwrap_err();
        assert_eq!(err, LotteryError::OracleUnavailable.into());
    }
}
