//! Commission policy configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::handlers::commissions::CommissionPolicy;

/// Tunable commission amounts. Defaults match the standing policy, so
/// deployments only override these during promotions.
#[derive(Debug, Clone, Deserialize)]
pub struct CommissionsConfig {
    /// Flat bonus paid alongside an affiliate referral commission
    #[serde(default = "default_affiliate_upgrade_bonus")]
    pub affiliate_upgrade_bonus: f64,

    /// Flat bonus for DCS-link purchases attributed as learner referrals
    #[serde(default = "default_dcs_addon_bonus")]
    pub dcs_addon_bonus: f64,

    /// Currency of the flat bonuses
    #[serde(default = "default_bonus_currency")]
    pub bonus_currency: String,
}

impl CommissionsConfig {
    /// Validate commission configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.affiliate_upgrade_bonus < 0.0 || self.dcs_addon_bonus < 0.0 {
            return Err(ValidationError::NegativeBonusAmount);
        }
        if self.bonus_currency.is_empty() {
            return Err(ValidationError::MissingRequired("COMMISSIONS__BONUS_CURRENCY"));
        }
        Ok(())
    }

    /// Build the runtime policy the attribution handler consumes.
    pub fn policy(&self) -> CommissionPolicy {
        CommissionPolicy {
            affiliate_upgrade_bonus: self.affiliate_upgrade_bonus,
            dcs_addon_bonus: self.dcs_addon_bonus,
            bonus_currency: self.bonus_currency.clone(),
        }
    }
}

impl Default for CommissionsConfig {
    fn default() -> Self {
        Self {
            affiliate_upgrade_bonus: default_affiliate_upgrade_bonus(),
            dcs_addon_bonus: default_dcs_addon_bonus(),
            bonus_currency: default_bonus_currency(),
        }
    }
}

fn default_affiliate_upgrade_bonus() -> f64 {
    10_000.0
}

fn default_dcs_addon_bonus() -> f64 {
    5_000.0
}

fn default_bonus_currency() -> String {
    "NGN".to_string()
}
