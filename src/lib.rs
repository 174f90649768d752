//! Travel Predict - purchase-likelihood prediction behind a form and a dashboard.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod inference;
pub mod logging;
pub mod prediction;
pub mod record;
pub mod schema;
pub mod web;
