//! # sticker-notify: Best-Effort Order Notifications
//!
//! Delivers "new order" notices to the shop admin through a WhatsApp HTTP
//! gateway.
//!
//! ## Guarantees (and non-guarantees)
//!
//! - Delivery is **best-effort**: up to three attempts with linear
//!   backoff, then the failure is logged and dropped.
//! - Delivery is **detached**: [`notify_detached`] spawns the work and
//!   returns immediately. A gateway outage can never block checkout or
//!   roll back an order.
//! - There is no delivery-reliability system here on purpose - no queue,
//!   no persistence, no exactly-once. The admin order board remains the
//!   source of truth; notices are a convenience.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sticker_notify::{notify_detached, NotifyConfig, OrderPlacedNotice, WhatsAppNotifier};
//! # use sticker_core::{Money, PaymentMethod};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let notifier = WhatsAppNotifier::new(NotifyConfig::from_env()?);
//!
//! let notice = OrderPlacedNotice {
//!     order_id: "...".to_string(),
//!     customer_name: "Dana Levi".to_string(),
//!     total: Money::from_cents(19_800),
//!     payment_method: PaymentMethod::Bit,
//!     phone: "+972501234567".to_string(),
//! };
//!
//! // Returns immediately; delivery happens in the background
//! notify_detached(notifier, notice);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod whatsapp;

pub use config::{ConfigError, NotifyConfig};
pub use whatsapp::{
    backoff_delay, notify_detached, NotifyError, OrderPlacedNotice, WhatsAppNotifier,
    MAX_ATTEMPTS,
};
