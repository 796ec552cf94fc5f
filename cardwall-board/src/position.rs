//! Position allocation for task ordering.
//!
//! Positions are plain `f64` sort keys. Inserting at an index takes the
//! midpoint of the two neighbours, so no other card is renumbered. Repeated
//! midpoints between the same neighbours halve the gap each time; once any
//! gap in a column drops below an epsilon the column is respread to
//! integer positions with [`spread`].

/// Gap below which a column is respread to integer positions
pub const DEFAULT_REBALANCE_EPSILON: f64 = 1e-6;

/// Position of the only card in a column
pub fn first() -> f64 {
    0.0
}

/// Position sorting before `head`
pub fn before(head: f64) -> f64 {
    head - 1.0
}

/// Position sorting after `last`
pub fn after(last: f64) -> f64 {
    last + 1.0
}

/// Arithmetic mean of two neighbouring positions
pub fn between(lower: f64, upper: f64) -> f64 {
    lower + (upper - lower) / 2.0
}

/// Compute the position that sorts exactly at `index` in `positions`.
///
/// `positions` must be ascending; it is not sorted here. An `index` past
/// the end appends.
pub fn allocate(positions: &[f64], index: usize) -> f64 {
    match positions {
        [] => first(),
        [head, ..] if index == 0 => before(*head),
        [.., last] if index >= positions.len() => after(*last),
        _ => between(positions[index - 1], positions[index]),
    }
}

/// True when any adjacent gap is below `epsilon` or out of order
pub fn needs_rebalance(positions: &[f64], epsilon: f64) -> bool {
    positions.windows(2).any(|pair| {
        let gap = pair[1] - pair[0];
        gap.is_nan() || gap < epsilon
    })
}

/// Contiguous integer positions `0..len`
pub fn spread(len: usize) -> Vec<f64> {
    (0..len).map(|i| i as f64).collect()
}

/// True when every position sorts strictly after the one before it
pub fn is_strictly_ordered(positions: &[f64]) -> bool {
    positions.windows(2).all(|pair| pair[0] < pair[1])
}

/// True when positions already equal [`spread`] of their length
pub fn is_spread(positions: &[f64]) -> bool {
    positions
        .iter()
        .enumerate()
        .all(|(i, position)| *position == i as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_allocate_empty_column() {
        assert_eq!(allocate(&[], 0), 0.0);
        assert_eq!(allocate(&[], 5), 0.0);
    }

    #[test]
    fn test_allocate_known_values() {
        let positions = [0.0, 2.0, 4.0];
        assert_eq!(allocate(&positions, 1), 1.0);
        assert_eq!(allocate(&positions, 0), -1.0);
        assert_eq!(allocate(&positions, 3), 5.0);
        assert_eq!(allocate(&positions, 2), 3.0);
    }

    #[test]
    fn test_allocate_past_end_appends() {
        assert_eq!(allocate(&[1.0, 1.5], 99), 2.5);
    }

    #[test]
    fn test_allocate_single() {
        assert_eq!(allocate(&[3.0], 0), 2.0);
        assert_eq!(allocate(&[3.0], 1), 4.0);
    }

    #[test]
    fn test_midpoint_drift_detected() {
        let mut lower = 0.0;
        let upper = 1.0;
        let mut rounds = 0;
        while !needs_rebalance(&[lower, upper], DEFAULT_REBALANCE_EPSILON) {
            lower = between(lower, upper);
            rounds += 1;
        }
        // 2^-20 is the first gap under 1e-6
        assert_eq!(rounds, 20);
    }

    #[test]
    fn test_needs_rebalance() {
        assert!(!needs_rebalance(&[], DEFAULT_REBALANCE_EPSILON));
        assert!(!needs_rebalance(&[0.0], DEFAULT_REBALANCE_EPSILON));
        assert!(!needs_rebalance(&[0.0, 1.0, 1.5], DEFAULT_REBALANCE_EPSILON));
        assert!(needs_rebalance(&[0.0, 1e-9], DEFAULT_REBALANCE_EPSILON));
        assert!(needs_rebalance(&[1.0, 1.0], DEFAULT_REBALANCE_EPSILON));
        assert!(needs_rebalance(&[2.0, 1.0], DEFAULT_REBALANCE_EPSILON));
        assert!(needs_rebalance(&[0.0, f64::NAN], DEFAULT_REBALANCE_EPSILON));
    }

    #[test]
    fn test_spread() {
        assert_eq!(spread(0), Vec::<f64>::new());
        assert_eq!(spread(3), vec![0.0, 1.0, 2.0]);
        assert!(is_spread(&spread(4)));
        assert!(!is_spread(&[0.0, 2.0]));
    }

    #[test]
    fn test_is_strictly_ordered() {
        assert!(is_strictly_ordered(&[]));
        assert!(is_strictly_ordered(&[0.0, 1e-9, 2.0]));
        assert!(!is_strictly_ordered(&[0.0, 1.0, 1.0]));
        assert!(!is_strictly_ordered(&[1.0, 0.0]));
        assert!(!is_strictly_ordered(&[0.0, f64::NAN]));
    }

    fn sorted_positions() -> impl Strategy<Value = Vec<f64>> {
        proptest::collection::vec(1u32..1000, 0..20).prop_map(|gaps| {
            let mut acc = -500.0;
            gaps.into_iter()
                .map(|gap| {
                    acc += gap as f64;
                    acc
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn allocated_position_sorts_at_index(
            positions in sorted_positions(),
            raw_index in 0usize..25,
        ) {
            let index = raw_index.min(positions.len());
            let p = allocate(&positions, index);

            let mut inserted = positions.clone();
            inserted.insert(index, p);

            for pair in inserted.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            prop_assert!(!positions.contains(&p));
        }
    }
}
