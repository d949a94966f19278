//! Fixed-weight blend of the three trigger probability estimates.

use hail_trigger_models::{CombinedEstimate, Ratio};

use crate::config::CombinationWeights;

pub const METHODOLOGY: &str = "Spatial Expansion + Regional Benchmarking + Bayesian";

/// The estimates being blended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentEstimates {
    /// Annual probability of the configured spatial buffer ring.
    pub spatial: f64,
    /// Regional aggregate weighted probability.
    pub regional: Ratio,
    /// Conservative Bayesian estimate at the target.
    pub original: f64,
}

/// Blends the components.
///
/// The result is not clamped: a spatial ring density above one event per
/// km² per year can push the probability past 1. An undefined regional
/// estimate makes the blend undefined. The improvement over the
/// conservative estimate is undefined when either side is.
#[must_use]
pub fn combine(
    components: ComponentEstimates,
    weights: &CombinationWeights,
    payout_per_trigger: f64,
) -> CombinedEstimate {
    let probability = components.regional.map(|regional| {
        components.spatial * weights.spatial
            + regional * weights.regional
            + components.original * weights.original
    });

    match probability {
        Ratio::Defined(p) if p > 1.0 => {
            log::warn!("Combined probability {p:.4} exceeds 1 and is reported unclamped");
        }
        Ratio::Undefined => {
            log::warn!("Regional estimate is undefined; combined probability is undefined");
        }
        Ratio::Defined(_) => {}
    }

    let improvement_vs_basic = match probability {
        Ratio::Defined(p) => Ratio::percent_change(p, components.original),
        Ratio::Undefined => Ratio::Undefined,
    };

    CombinedEstimate {
        probability,
        expected_payout: probability.map(|p| p * payout_per_trigger),
        methodology: METHODOLOGY.to_string(),
        improvement_vs_basic,
    }
}
