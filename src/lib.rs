//! Credit risk scoring and financial forecasting engines for a multi-tenant
//! personal finance platform.
//!
//! Two cooperating services, both pure computation over a per-tenant data
//! snapshot fetched through the [`store::FinanceStore`] seam:
//!
//! - [`engines::credit::CreditRiskService`]: weighted multi-factor credit
//!   scoring onto the 0–999 range, score history persistence, and
//!   amortization-based loan affordability with stress testing.
//! - [`engines::advisor::AdvisorService`]: spending and goal forecasting,
//!   avalanche/snowball debt payoff strategy, and AI-assisted personalized
//!   advice with deterministic rule-based fallbacks.
//!
//! Hosts inject their storage and text-generation adapters; everything here
//! is synchronous, stateless per request, and test-double friendly.

pub mod config;
pub mod domain;
pub mod engines;
pub mod error;
pub mod store;
pub mod telemetry;

pub use config::{AdviceConfig, AppConfig, SnapshotConfig};
pub use domain::TenantId;
pub use engines::advisor::AdvisorService;
pub use engines::credit::CreditRiskService;
pub use error::AdvisorError;
