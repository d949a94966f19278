//! Beta-Binomial trigger rate model with a Jeffreys prior.

use hail_trigger_models::BayesianEstimate;

use crate::AnalysisError;

/// Pseudo-count added to both triggered and untriggered years.
pub const PRIOR_PSEUDO_COUNT: f64 = 0.5;

/// Haircut applied to the posterior mean.
pub const CONSERVATIVE_FACTOR: f64 = 0.95;

/// Posterior over the annual trigger probability given `triggers` hits in
/// `total_years` observed years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetaBinomialModel {
    triggers: u32,
    total_years: u32,
}

impl BetaBinomialModel {
    /// # Errors
    ///
    /// Returns [`AnalysisError::TriggersExceedYears`] if more years
    /// triggered than were observed.
    pub fn new(triggers: u32, total_years: u32) -> Result<Self, AnalysisError> {
        if triggers > total_years {
            return Err(AnalysisError::TriggersExceedYears {
                triggers,
                total_years,
            });
        }
        Ok(Self {
            triggers,
            total_years,
        })
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        f64::from(self.triggers) + PRIOR_PSEUDO_COUNT
    }

    #[must_use]
    pub fn beta(&self) -> f64 {
        f64::from(self.total_years - self.triggers) + PRIOR_PSEUDO_COUNT
    }

    #[must_use]
    pub fn posterior_mean(&self) -> f64 {
        let alpha = self.alpha();
        alpha / (alpha + self.beta())
    }

    #[must_use]
    pub fn conservative_estimate(&self) -> f64 {
        self.posterior_mean() * CONSERVATIVE_FACTOR
    }

    #[must_use]
    pub fn estimate(&self, payout_per_trigger: f64) -> BayesianEstimate {
        let conservative_estimate = self.conservative_estimate();
        BayesianEstimate {
            alpha: self.alpha(),
            beta: self.beta(),
            bayesian_mean: self.posterior_mean(),
            conservative_estimate,
            expected_payout: conservative_estimate * payout_per_trigger,
        }
    }
}
