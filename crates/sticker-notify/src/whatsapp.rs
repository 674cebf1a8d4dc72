//! WhatsApp delivery for new-order notices.
//!
//! ## Delivery Contract
//! ```text
//! submit_order (sticker-db)
//!      │  order persisted; outcome already decided
//!      ▼
//! notify_detached(notifier, notice)      ← tokio::spawn, returns at once
//!      │
//!      ▼
//! send_with_retry: up to 3 attempts, linear backoff (2s × attempt)
//!      │
//!      ├── success → info! and done
//!      └── all attempts failed → error! and done
//! ```
//!
//! Delivery failure is logged, never escalated: it must not block or roll
//! back the order that triggered it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use sticker_core::{Money, PaymentMethod};

use crate::config::{clean_phone, NotifyConfig};

/// Maximum delivery attempts per notice.
pub const MAX_ATTEMPTS: u32 = 3;

/// Backoff step between attempts (multiplied by the attempt number).
const BACKOFF_STEP: Duration = Duration::from_secs(2);

/// Per-request timeout against the gateway.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// =============================================================================
// Notice Payload
// =============================================================================

/// The facts of a freshly submitted order, as carried to the admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPlacedNotice {
    pub order_id: String,
    pub customer_name: String,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub phone: String,
}

impl OrderPlacedNotice {
    /// Short order reference for the message (last 8 characters of the id).
    pub fn short_ref(&self) -> &str {
        let id = self.order_id.as_str();
        &id[id.len().saturating_sub(8)..]
    }

    /// Renders the plain-text message sent to the admin.
    pub fn render_message(&self, site_base_url: &str) -> String {
        format!(
            "New order received!\n\
             \n\
             Customer: {}\n\
             Total: {}\n\
             Payment: {}\n\
             Phone: {}\n\
             Order: #{}\n\
             \n\
             Details: {}/admin/orders/{}",
            self.customer_name,
            self.total,
            self.payment_method.as_str(),
            self.phone,
            self.short_ref(),
            site_base_url.trim_end_matches('/'),
            self.order_id,
        )
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur when delivering a notice.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP request failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("Gateway rejected the notice with status {status}")]
    Gateway { status: u16 },
}

// =============================================================================
// Notifier
// =============================================================================

/// Sends order notices through a WhatsApp HTTP gateway.
///
/// Cloneable; the underlying HTTP client is reference-counted.
#[derive(Debug, Clone)]
pub struct WhatsAppNotifier {
    client: reqwest::Client,
    config: NotifyConfig,
}

impl WhatsAppNotifier {
    /// Creates a notifier from a validated config.
    pub fn new(config: NotifyConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            // Builder only fails on TLS backend misconfiguration; fall
            // back to the default client rather than refusing to start
            .unwrap_or_default();

        WhatsAppNotifier { client, config }
    }

    /// Sends a single notice to the gateway (one attempt, no retry).
    pub async fn send(&self, notice: &OrderPlacedNotice) -> Result<(), NotifyError> {
        let message = notice.render_message(&self.config.site_base_url);
        let phone = clean_phone(&self.config.admin_phone);

        let response = self
            .client
            .get(&self.config.gateway_url)
            .query(&[
                ("phone", phone.as_str()),
                ("text", message.as_str()),
                ("apikey", self.config.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Gateway {
                status: status.as_u16(),
            });
        }

        Ok(())
    }

    /// Sends a notice with bounded retries and linear backoff.
    ///
    /// Returns the last error after [`MAX_ATTEMPTS`] failures; most
    /// callers go through [`notify_detached`] instead and never see it.
    pub async fn send_with_retry(&self, notice: &OrderPlacedNotice) -> Result<(), NotifyError> {
        let mut last_err = None;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.send(notice).await {
                Ok(()) => {
                    info!(
                        order_ref = notice.short_ref(),
                        attempt, "Order notice delivered"
                    );
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        order_ref = notice.short_ref(),
                        attempt,
                        error = %e,
                        "Order notice delivery attempt failed"
                    );
                    last_err = Some(e);

                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(backoff_delay(attempt)).await;
                    }
                }
            }
        }

        // MAX_ATTEMPTS >= 1, so last_err is always set here
        Err(last_err.unwrap_or(NotifyError::Gateway { status: 0 }))
    }
}

/// Backoff before the next attempt: 2s after the first failure, 4s after
/// the second.
pub fn backoff_delay(attempt: u32) -> Duration {
    BACKOFF_STEP * attempt
}

/// Fire-and-forget delivery.
///
/// Spawns the retry loop on the runtime and returns immediately. Total
/// failure is logged and swallowed - order creation already succeeded and
/// must not be affected.
pub fn notify_detached(notifier: WhatsAppNotifier, notice: OrderPlacedNotice) {
    tokio::spawn(async move {
        if let Err(e) = notifier.send_with_retry(&notice).await {
            error!(
                order_ref = notice.short_ref(),
                error = %e,
                "Order notice delivery failed after {} attempts",
                MAX_ATTEMPTS
            );
        }
    });
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn notice() -> OrderPlacedNotice {
        OrderPlacedNotice {
            order_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            customer_name: "Dana Levi".to_string(),
            total: Money::from_cents(19_800),
            payment_method: PaymentMethod::Bit,
            phone: "+972501234567".to_string(),
        }
    }

    #[test]
    fn test_short_ref() {
        assert_eq!(notice().short_ref(), "55440000");

        let tiny = OrderPlacedNotice {
            order_id: "abc".to_string(),
            ..notice()
        };
        assert_eq!(tiny.short_ref(), "abc");
    }

    #[test]
    fn test_render_message() {
        let msg = notice().render_message("https://shop.example.com/");

        assert!(msg.contains("Customer: Dana Levi"));
        assert!(msg.contains("Total: ₪198.00"));
        assert!(msg.contains("Payment: bit"));
        assert!(msg.contains("Order: #55440000"));
        // Trailing slash on the base URL doesn't double up
        assert!(msg.contains(
            "https://shop.example.com/admin/orders/550e8400-e29b-41d4-a716-446655440000"
        ));
    }

    #[test]
    fn test_backoff_is_linear_and_bounded() {
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
        // Bounded by the attempt cap: the longest wait is before the final try
        assert!(backoff_delay(MAX_ATTEMPTS - 1) <= Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_unreachable_gateway_reports_error_without_panicking() {
        // Reserved TEST-NET address: connection fails fast, exercising the
        // error path end to end without a live gateway
        let config = NotifyConfig {
            admin_phone: "+972501234567".to_string(),
            api_key: "key".to_string(),
            gateway_url: "http://192.0.2.1:9/send".to_string(),
            site_base_url: "https://shop.example.com".to_string(),
        };
        let notifier = WhatsAppNotifier::new(config);

        let result = notifier.send(&notice()).await;
        assert!(matches!(result, Err(NotifyError::Http(_))));
    }
}
