use solana_program::pubkey::Pubkey;

use crate::error::LotteryError;

/// Map a random value onto an entry index. The first eight little-endian
/// bytes of the oracle result are reduced modulo the entry count.
pub fn winning_index(random_value: &[u8; 32], entry_count: usize) -> Result<usize, LotteryError> {
    if entry_count == 0 {
        return Err(LotteryError::EmptyEntryList);
    }
    let mut word = [0u8; 8];
    word.copy_from_slice(&random_value[..8]);
    let random = u64::from_le_bytes(word);
    Ok((random % entry_count as u64) as usize)
}

/// Select the winning entry for this round. Deterministic in the random
/// value and the entry list; the list must not be empty (the Calculating
/// invariant guarantees it, but it is checked anyway).
pub fn select_winner(
    random_value: &[u8; 32],
    players: &[Pubkey],
) -> Result<(usize, Pubkey), LotteryError> {
    let index = winning_index(random_value, players.len())?;
    Ok((index, players[index]))
}

/// Split the pot into (winner amount, organizer amount). Integer floor
/// division only; the remainder always accrues to the winner.
pub fn split_pot(pool_lamports: u64, organizer_fee_percent: u8) -> (u64, u64) {
    let organizer = (pool_lamports as u128 * organizer_fee_percent as u128 / 100) as u64;
    (pool_lamports - organizer, organizer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_value(n: u64) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&n.to_le_bytes());
        bytes
    }

    #[test]
    fn index_is_random_value_modulo_entry_count() {
        assert_eq!(winning_index(&random_value(7), 3).unwrap(), 1);
        assert_eq!(winning_index(&random_value(0), 3).unwrap(), 0);
        assert_eq!(winning_index(&random_value(2), 3).unwrap(), 2);
        assert_eq!(winning_index(&random_value(u64::MAX), 1).unwrap(), 0);
    }

    #[test]
    fn empty_entry_list_is_rejected() {
        assert_eq!(
            winning_index(&random_value(7), 0).unwrap_err(),
            LotteryError::EmptyEntryList
        );
        assert_eq!(
            select_winner(&random_value(7), &[]).unwrap_err(),
            LotteryError::EmptyEntryList
        );
    }

    #[test]
    fn selects_second_entrant_for_three_entries_and_random_seven() {
        let players: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();
        let (index, winner) = select_winner(&random_value(7), &players).unwrap();
        assert_eq!(index, 1);
        assert_eq!(winner, players[1]);
    }

    #[test]
    fn split_conserves_the_pot_exactly() {
        let (winner, organizer) = split_pot(300, 10);
        assert_eq!(organizer, 30);
        assert_eq!(winner, 270);

        for pool in [0u64, 1, 99, 100, 101, 1_000_000_007] {
            for fee in [0u8, 1, 10, 33, 99, 100] {
                let (w, o) = split_pot(pool, fee);
                assert_eq!(w + o, pool);
            }
        }
    }

    #[test]
    fn split_remainder_goes_to_the_winner() {
        // floor(101 * 10 / 100) = 10, the stray lamport stays in the prize
        let (winner, organizer) = split_pot(101, 10);
        assert_eq!(organizer, 10);
        assert_eq!(winner, 91);
    }

    #[test]
    fn split_edge_percentages() {
        assert_eq!(split_pot(300, 0), (300, 0));
        assert_eq!(split_pot(300, 100), (0, 300));
        // no overflow near u64::MAX
        let (w, o) = split_pot(u64::MAX, 100);
        assert_eq!(o, u64::MAX);
        assert_eq!(w, 0);
    }
}
