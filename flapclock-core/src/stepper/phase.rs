//! Half-step phase table

/// Number of entries in the half-step sequence
pub const PHASE_COUNT: u8 = 8;

/// Coil line levels for one phase (line 0..=3)
pub type PhasePattern = [bool; 4];

/// Two-phase/one-phase hybrid drive sequence
///
/// Consecutive entries differ in exactly one coil line, in both directions
/// and across the wrap from the last entry back to the first.
pub const HALF_STEP_SEQUENCE: [PhasePattern; PHASE_COUNT as usize] = [
    [true, false, false, false],
    [true, true, false, false],
    [false, true, false, false],
    [false, true, true, false],
    [false, false, true, false],
    [false, false, true, true],
    [false, false, false, true],
    [true, false, false, true],
];

/// Pattern for a phase index (wrapped into range)
pub fn pattern(phase: u8) -> PhasePattern {
    HALF_STEP_SEQUENCE[(phase % PHASE_COUNT) as usize]
}

/// Phase index one step away from `phase` in the given direction
pub fn advance(phase: u8, forward: bool) -> u8 {
    if forward {
        (phase + 1) % PHASE_COUNT
    } else {
        (phase + PHASE_COUNT - 1) % PHASE_COUNT
    }
}

/// Find the phase index for a coil pattern, if it is one of the table entries
pub fn decode(lines: PhasePattern) -> Option<u8> {
    HALF_STEP_SEQUENCE
        .iter()
        .position(|p| *p == lines)
        .map(|i| i as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbours_differ_in_one_line() {
        for phase in 0..PHASE_COUNT {
            let here = pattern(phase);
            let next = pattern(advance(phase, true));
            let changed = here.iter().zip(next.iter()).filter(|(a, b)| a != b).count();
            assert_eq!(changed, 1, "phase {} -> next", phase);
        }
    }

    #[test]
    fn test_advance_wraps_both_ways() {
        assert_eq!(advance(7, true), 0);
        assert_eq!(advance(0, false), 7);
        assert_eq!(advance(3, true), 4);
        assert_eq!(advance(3, false), 2);
    }

    #[test]
    fn test_decode_round_trip() {
        for phase in 0..PHASE_COUNT {
            assert_eq!(decode(pattern(phase)), Some(phase));
        }
        assert_eq!(decode([false; 4]), None);
        assert_eq!(decode([true; 4]), None);
    }
}
