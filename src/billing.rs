//! One-time-payment checkout: order creation and signature verification.
//!
//! The gateway signs `"{order_id}|{payment_id}"` with HMAC-SHA256 over a
//! shared secret; verification is a constant-time MAC check. Order creation
//! against the real gateway API is out of scope — orders here are local
//! records handed to the checkout client.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::config::BillingConfig;
use crate::error::{IdealensError, Result};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub amount: u64,
    pub currency: String,
    pub key_id: String,
}

/// Create a checkout order for a configured plan.
pub fn create_order(config: &BillingConfig, plan_id: &str) -> Result<Order> {
    let plan = config.plan(plan_id).ok_or_else(|| IdealensError::Validation {
        message: format!("unknown plan '{}'", plan_id),
    })?;
    Ok(Order {
        order_id: format!("order_{}", Uuid::new_v4().simple()),
        amount: plan.amount,
        currency: config.currency.clone(),
        key_id: config.key_id.clone(),
    })
}

/// Compute the expected signature for an (order, payment) pair. Used by
/// tests and by any client-side tooling that needs to sign.
pub fn sign(secret: &[u8], order_id: &str, payment_id: &str) -> Result<String> {
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|e| IdealensError::PaymentVerification {
            message: format!("invalid secret: {}", e),
        })?;
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a gateway signature. Constant-time comparison via the MAC itself.
pub fn verify_signature(
    secret: &[u8],
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> Result<()> {
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|e| IdealensError::PaymentVerification {
            message: format!("invalid secret: {}", e),
        })?;
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());

    let sig_bytes = hex::decode(signature).map_err(|_| IdealensError::PaymentVerification {
        message: "signature is not valid hex".to_string(),
    })?;

    mac.verify_slice(&sig_bytes)
        .map_err(|_| IdealensError::PaymentVerification {
            message: "signature mismatch".to_string(),
        })
}
