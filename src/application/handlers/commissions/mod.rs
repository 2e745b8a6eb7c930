//! Referral commission attribution.

mod attribute_commissions;

pub use attribute_commissions::{
    AttributeCommissionsCommand, AttributeCommissionsHandler, AttributeCommissionsResult,
    AttributionError, CommissionPolicy,
};
