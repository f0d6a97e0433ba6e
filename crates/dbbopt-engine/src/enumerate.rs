//! ---
//! dbb_section: "08-energy-models-optimization"
//! dbb_subsection: "module"
//! dbb_type: "source"
//! dbb_scope: "code"
//! dbb_description: "Coupler loading estimation and busbar split optimisation routines."
//! dbb_version: "v0.1.0"
//! dbb_owner: "tbd"
//! ---
use tracing::debug;

use crate::{
    errors::{EngineError, Result},
    model::Configuration,
};

/// Enumeration is 2^N; beyond this bay count the search space stops being
/// practical and the caller gets a structured error instead of an
/// out-of-memory abort.
pub const MAX_BAYS: usize = 30;

/// Produce every busbar split for `n` bays that passes the balance filter.
///
/// The raw search space is the power set {0,1}^N. A split survives only if
/// each busbar hosts at least `ceil(balance_fraction * n)` bays; near-
/// degenerate splits are operationally meaningless and would distort the
/// ranking. Output order is ascending by bit mask and therefore
/// deterministic. `n = 0`, `n = 1`, or an over-tight fraction yield an empty
/// set, which the caller must treat as "no coupler question to answer".
pub fn enumerate_configurations(n: usize, balance_fraction: f64) -> Result<Vec<Configuration>> {
    if n > MAX_BAYS {
        return Err(EngineError::TooManyBays {
            bays: n,
            max: MAX_BAYS,
        });
    }
    if n == 0 {
        return Ok(Vec::new());
    }

    let min_per_busbar = (balance_fraction * n as f64).ceil() as usize;
    let (lower, upper) = (min_per_busbar, n.saturating_sub(min_per_busbar));

    let mut survivors = Vec::new();
    for mask in 0u32..(1u32 << n) {
        let on_busbar_one = mask.count_ones() as usize;
        if on_busbar_one >= lower && on_busbar_one <= upper {
            survivors.push(Configuration::from_mask(mask, n));
        }
    }

    debug!(
        bays = n,
        raw = 1u64 << n,
        surviving = survivors.len(),
        lower,
        upper,
        "busbar splits enumerated"
    );
    Ok(survivors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_fraction_keeps_the_full_power_set() {
        for n in 1..=6 {
            let configs = enumerate_configurations(n, 0.0).unwrap();
            assert_eq!(configs.len(), 1 << n);
        }
    }

    #[test]
    fn survivors_respect_the_popcount_bounds() {
        let n = 8;
        let fraction = 0.3;
        let min = (fraction * n as f64).ceil() as usize;
        let configs = enumerate_configurations(n, fraction).unwrap();
        assert!(!configs.is_empty());
        for config in &configs {
            let pop = config.popcount();
            assert!(pop >= min && pop <= n - min, "popcount {pop} out of bounds");
        }
    }

    #[test]
    fn two_bays_default_fraction_leaves_only_the_split_pair() {
        let configs = enumerate_configurations(2, 0.3).unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].bits(), &[1, 0]);
        assert_eq!(configs[1].bits(), &[0, 1]);
    }

    #[test]
    fn complement_of_a_survivor_also_survives() {
        let configs = enumerate_configurations(5, 0.3).unwrap();
        for config in &configs {
            assert!(
                configs.contains(&config.complement()),
                "complement of {:?} missing",
                config.bits()
            );
        }
    }

    #[test]
    fn degenerate_bay_counts_yield_no_configurations() {
        assert!(enumerate_configurations(0, 0.3).unwrap().is_empty());
        assert!(enumerate_configurations(1, 0.3).unwrap().is_empty());
    }

    #[test]
    fn bay_count_above_ceiling_is_rejected() {
        assert!(matches!(
            enumerate_configurations(MAX_BAYS + 1, 0.3),
            Err(EngineError::TooManyBays { .. })
        ));
    }

    #[test]
    fn duplicates_are_impossible() {
        let configs = enumerate_configurations(6, 0.3).unwrap();
        let mut sorted = configs.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), configs.len());
    }
}
