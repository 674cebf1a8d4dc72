//! # Repository Module
//!
//! Database repository implementations for the sticker shop.
//!
//! ## Repository Pattern
//! ```text
//! Caller (storefront page / admin action)
//!      │
//!      │  db.products().get_by_id(id)
//!      ▼
//! ProductRepository / OrderRepository
//!      │
//!      │  SQL
//!      ▼
//! SQLite Database
//! ```
//!
//! SQL is isolated here; business rules stay in sticker-core, and the
//! multi-step checkout/confirmation flows live in
//! [`crate::reconciler::StockReconciler`].

pub mod order;
pub mod product;
