//! Gateway-agnostic view of a verified transaction.
//!
//! Each provider adapter maps its own response shape into
//! [`VerificationOutcome`], so the reconciliation engine never sees a
//! provider-specific field name or status vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::foundation::{PackageId, Timestamp};

/// Supported payment gateway providers.
///
/// Stored on each payment record; also the registry key. Unknown
/// provider names fail to parse rather than defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayProvider {
    Paystack,
    Flutterwave,
}

impl GatewayProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayProvider::Paystack => "paystack",
            GatewayProvider::Flutterwave => "flutterwave",
        }
    }

    /// Fixed priority order used when probing gateways for a payment
    /// the store has never seen.
    pub fn probe_order() -> [GatewayProvider; 2] {
        [GatewayProvider::Paystack, GatewayProvider::Flutterwave]
    }
}

impl fmt::Display for GatewayProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GatewayProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "paystack" => Ok(GatewayProvider::Paystack),
            "flutterwave" => Ok(GatewayProvider::Flutterwave),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

/// Error for provider names outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment gateway provider '{0}'")]
pub struct UnknownProvider(pub String);

/// Canonical transaction status vocabulary.
///
/// Paystack reports `"success"`, Flutterwave `"successful"`; both map to
/// `Success`. Anything unrecognized or absent maps to `Other` and is
/// treated as not-successful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayTxStatus {
    Success,
    Failed,
    Other,
}

/// Normalized result of one gateway verification call. Ephemeral, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationOutcome {
    /// Which provider produced this result.
    pub provider: GatewayProvider,

    /// Whether the gateway reported the verification call itself as
    /// successful (distinct from the transaction status).
    pub ok: bool,

    /// Canonical transaction status.
    pub status: GatewayTxStatus,

    /// Amount in major currency units.
    pub amount: f64,

    /// ISO currency code as reported by the gateway.
    pub currency: String,

    /// When the customer paid, if the gateway reported it.
    pub paid_at: Option<Timestamp>,

    /// External transaction reference.
    pub reference: String,

    /// Payer email, when the gateway includes customer details.
    pub customer_email: Option<String>,

    /// Arbitrary provider metadata; may carry membership/referral hints
    /// set at checkout initiation.
    pub metadata: serde_json::Value,
}

impl VerificationOutcome {
    /// True when both the call succeeded and the transaction settled.
    pub fn is_success(&self) -> bool {
        self.ok && self.status == GatewayTxStatus::Success
    }

    /// Membership package hint carried in gateway metadata.
    ///
    /// Required when a payment record has to be synthesized from the
    /// gateway result alone.
    pub fn package_hint(&self) -> Option<PackageId> {
        self.metadata
            .get("package_id")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
    }

    /// Addon-upgrade hint carried in gateway metadata.
    pub fn addon_hint(&self) -> bool {
        self.metadata
            .get("addon")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outcome(ok: bool, status: GatewayTxStatus) -> VerificationOutcome {
        VerificationOutcome {
            provider: GatewayProvider::Paystack,
            ok,
            status,
            amount: 120.0,
            currency: "NGN".to_string(),
            paid_at: None,
            reference: "ref_1".to_string(),
            customer_email: None,
            metadata: json!({}),
        }
    }

    #[test]
    fn provider_parse_is_case_insensitive() {
        assert_eq!(
            "Paystack".parse::<GatewayProvider>().unwrap(),
            GatewayProvider::Paystack
        );
        assert_eq!(
            "FLUTTERWAVE".parse::<GatewayProvider>().unwrap(),
            GatewayProvider::Flutterwave
        );
    }

    #[test]
    fn unknown_provider_fails_closed() {
        let err = "stripe".parse::<GatewayProvider>().unwrap_err();
        assert!(err.to_string().contains("stripe"));
    }

    #[test]
    fn success_requires_both_flags() {
        assert!(outcome(true, GatewayTxStatus::Success).is_success());
        assert!(!outcome(false, GatewayTxStatus::Success).is_success());
        assert!(!outcome(true, GatewayTxStatus::Failed).is_success());
        assert!(!outcome(true, GatewayTxStatus::Other).is_success());
    }

    #[test]
    fn package_hint_reads_metadata() {
        let mut o = outcome(true, GatewayTxStatus::Success);
        assert!(o.package_hint().is_none());

        let id = PackageId::new();
        o.metadata = json!({ "package_id": id.to_string() });
        assert_eq!(o.package_hint(), Some(id));

        o.metadata = json!({ "package_id": "garbage" });
        assert!(o.package_hint().is_none());
    }

    #[test]
    fn addon_hint_defaults_to_false() {
        let mut o = outcome(true, GatewayTxStatus::Success);
        assert!(!o.addon_hint());
        o.metadata = json!({ "addon": true });
        assert!(o.addon_hint());
    }
}
