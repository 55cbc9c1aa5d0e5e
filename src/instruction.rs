use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};
use std::convert::TryInto;
use std::mem::size_of;

#[derive(Clone, Debug, PartialEq)]
pub enum LotteryInstruction {
    /// Initialize the lottery and open the first round
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The organizer, pays for the lottery account and receives fees
    /// 1. `[writable]` The lottery account (PDA, seed "lottery")
    /// 2. `[]` The oracle coordinator identity recorded in the configuration
    /// 3. `[]` The system program
    Initialize {
        /// Minimum contribution per entry in lamports
        entrance_fee: u64,
        /// Minimum seconds a round stays open
        interval: i64,
        /// Percentage of the pot retained by the organizer (0-100)
        organizer_fee_percent: u8,
        /// Randomness-source identity forwarded to the oracle
        gas_lane: [u8; 32],
        /// Oracle subscription funding the requests
        subscription_id: u64,
        /// Gas limit for the fulfillment callback
        callback_gas_limit: u32,
    },

    /// Enter the current round
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The player, pays the contribution
    /// 1. `[writable]` The lottery account
    /// 2. `[]` The system program
    Enter {
        /// Contribution in lamports, must be at least the entrance fee
        amount: u64,
    },

    /// Read-only upkeep simulation for external schedulers; the verdict is
    /// logged and published as return data, no state is mutated
    ///
    /// Accounts expected:
    /// 0. `[]` The lottery account
    CheckUpkeep {},

    /// Close the round and request randomness (anyone may crank this,
    /// it only takes effect when upkeep is actually needed)
    ///
    /// Accounts expected:
    /// 0. `[signer]` The cranker, pays the transaction
    /// 1. `[writable]` The lottery account
    /// 2. `[]` The oracle coordinator account
    PerformUpkeep {},

    /// Deliver the oracle result, pay out the pot and open the next round
    ///
    /// Accounts expected:
    /// 0. `[signer]` The oracle coordinator configured at initialization
    /// 1. `[writable]` The lottery account
    /// 2. `[writable]` The winning player account
    /// 3. `[writable]` The organizer account
    FulfillRandomness {
        /// Id of the request being fulfilled
        request_id: u64,
        /// Verifiable random value delivered by the oracle
        random_value: [u8; 32],
    },
}

impl LotteryInstruction {
    /// Unpacks a byte buffer into a LotteryInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (tag, rest) = input
            .split_first()
            .ok_or(ProgramError::InvalidInstructionData)?;

        Ok(match tag {
            0 => {
                let (entrance_fee, rest) = Self::unpack_u64(rest)?;
                let (interval, rest) = Self::unpack_i64(rest)?;
                let (organizer_fee_percent, rest) = Self::unpack_u8(rest)?;
                let (gas_lane, rest) = Self::unpack_bytes32(rest)?;
                let (subscription_id, rest) = Self::unpack_u64(rest)?;
                let (callback_gas_limit, _) = Self::unpack_u32(rest)?;
                Self::Initialize {
                    entrance_fee,
                    interval,
                    organizer_fee_percent,
                    gas_lane,
                    subscription_id,
                    callback_gas_limit,
                }
            }
            1 => {
                let (amount, _) = Self::unpack_u64(rest)?;
                Self::Enter { amount }
            }
            2 => Self::CheckUpkeep {},
            3 => Self::PerformUpkeep {},
            4 => {
                let (request_id, rest) = Self::unpack_u64(rest)?;
                let (random_value, _) = Self::unpack_bytes32(rest)?;
                Self::FulfillRandomness {
                    request_id,
                    random_value,
                }
            }
            _ => return Err(ProgramError::InvalidInstructionData),
        })
    }

    /// Packs a LotteryInstruction into a byte buffer
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(size_of::<Self>());
        match *self {
            Self::Initialize {
                entrance_fee,
                interval,
                organizer_fee_percent,
                ref gas_lane,
                subscription_id,
                callback_gas_limit,
            } => {
                buf.push(0);
                buf.extend_from_slice(&entrance_fee.to_le_bytes());
                buf.extend_from_slice(&interval.to_le_bytes());
                buf.push(organizer_fee_percent);
                buf.extend_from_slice(gas_lane);
                buf.extend_from_slice(&subscription_id.to_le_bytes());
                buf.extend_from_slice(&callback_gas_limit.to_le_bytes());
            }
            Self::Enter { amount } => {
                buf.push(1);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::CheckUpkeep {} => buf.push(2),
            Self::PerformUpkeep {} => buf.push(3),
            Self::FulfillRandomness {
                request_id,
                ref random_value,
            } => {
                buf.push(4);
                buf.extend_from_slice(&request_id.to_le_bytes());
                buf.extend_from_slice(random_value);
            }
        }
        buf
    }

    fn unpack_u64(input: &[u8]) -> Result<(u64, &[u8]), ProgramError> {
        let value = input
            .get(..8)
            .and_then(|slice| slice.try_into().ok())
            .map(u64::from_le_bytes)
            .ok_or(ProgramError::InvalidInstructionData)?;
        Ok((value, &input[8..]))
    }

    fn unpack_i64(input: &[u8]) -> Result<(i64, &[u8]), ProgramError> {
        let value = input
            .get(..8)
            .and_then(|slice| slice.try_into().ok())
            .map(i64::from_le_bytes)
            .ok_or(ProgramError::InvalidInstructionData)?;
        Ok((value, &input[8..]))
    }

    fn unpack_u32(input: &[u8]) -> Result<(u32, &[u8]), ProgramError> {
        let value = input
            .get(..4)
            .and_then(|slice| slice.try_into().ok())
            .map(u32::from_le_bytes)
            .ok_or(ProgramError::InvalidInstructionData)?;
        Ok((value, &input[4..]))
    }

    fn unpack_u8(input: &[u8]) -> Result<(u8, &[u8]), ProgramError> {
        let value = *input.first().ok_or(ProgramError::InvalidInstructionData)?;
        Ok((value, &input[1..]))
    }

    fn unpack_bytes32(input: &[u8]) -> Result<([u8; 32], &[u8]), ProgramError> {
        let bytes: [u8; 32] = input
            .get(..32)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(ProgramError::InvalidInstructionData)?;
        Ok((bytes, &input[32..]))
    }
}

/// Create an initialize instruction
#[allow(clippy::too_many_arguments)]
pub fn initialize(
    program_id: &Pubkey,
    organizer: &Pubkey,
    lottery_account: &Pubkey,
    vrf_coordinator: &Pubkey,
    entrance_fee: u64,
    interval: i64,
    organizer_fee_percent: u8,
    gas_lane: [u8; 32],
    subscription_id: u64,
    callback_gas_limit: u32,
) -> Instruction {
    let data = LotteryInstruction::Initialize {
        entrance_fee,
        interval,
        organizer_fee_percent,
        gas_lane,
        subscription_id,
        callback_gas_limit,
    }
    .pack();

    let accounts = vec![
        AccountMeta::new(*organizer, true),
        AccountMeta::new(*lottery_account, false),
        AccountMeta::new_readonly(*vrf_coordinator, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create an enter instruction
pub fn enter(
    program_id: &Pubkey,
    player: &Pubkey,
    lottery_account: &Pubkey,
    amount: u64,
) -> Instruction {
    let data = LotteryInstruction::Enter { amount }.pack();

    let accounts = vec![
        AccountMeta::new(*player, true),
        AccountMeta::new(*lottery_account, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create a check_upkeep instruction
pub fn check_upkeep(program_id: &Pubkey, lottery_account: &Pubkey) -> Instruction {
    let data = LotteryInstruction::CheckUpkeep {}.pack();

    let accounts = vec![AccountMeta::new_readonly(*lottery_account, false)];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create a perform_upkeep instruction
pub fn perform_upkeep(
    program_id: &Pubkey,
    cranker: &Pubkey,
    lottery_account: &Pubkey,
    vrf_coordinator: &Pubkey,
) -> Instruction {
    let data = LotteryInstruction::PerformUpkeep {}.pack();

    let accounts = vec![
        AccountMeta::new_readonly(*cranker, true),
        AccountMeta::new(*lottery_account, false),
        AccountMeta::new_readonly(*vrf_coordinator, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create a fulfill_randomness instruction
pub fn fulfill_randomness(
    program_id: &Pubkey,
    vrf_coordinator: &Pubkey,
    lottery_account: &Pubkey,
    winner: &Pubkey,
    organizer: &Pubkey,
    request_id: u64,
    random_value: [u8; 32],
) -> Instruction {
    let data = LotteryInstruction::FulfillRandomness {
        request_id,
        random_value,
    }
    .pack();

    let accounts = vec![
        AccountMeta::new_readonly(*vrf_coordinator, true),
        AccountMeta::new(*lottery_account, false),
        AccountMeta::new(*winner, false),
        AccountMeta::new(*organizer, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_round_trips() {
        let instructions = [
            LotteryInstruction::Initialize {
                entrance_fee: 100_000_000,
                interval: 30,
                organizer_fee_percent: 10,
                gas_lane: [9u8; 32],
                subscription_id: 7,
                callback_gas_limit: 500_000,
            },
            LotteryInstruction::Enter { amount: 150_000_000 },
            LotteryInstruction::CheckUpkeep {},
            LotteryInstruction::PerformUpkeep {},
            LotteryInstruction::FulfillRandomness {
                request_id: 3,
                random_value: [0xAB; 32],
            },
        ];
        for instruction in instructions {
            let unpacked = LotteryInstruction::unpack(&instruction.pack()).unwrap();
            assert_eq!(unpacked, instruction);
        }
    }

    #[test]
    fn unpack_rejects_bad_input() {
        assert!(LotteryInstruction::unpack(&[]).is_err());
        assert!(LotteryInstruction::unpack(&[99]).is_err());
        // truncated Enter payload
        assert!(LotteryInstruction::unpack(&[1, 0, 0]).is_err());
    }
}
