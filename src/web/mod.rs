//! HTTP presentation adapters.
//!
//! Both front-ends share the JSON API and differ only in how they collect
//! input and show the outcome:
//! - **form**: server-rendered page, urlencoded POST
//! - **dashboard**: widget page driven over a WebSocket

pub mod api;
pub mod dashboard;
pub mod form;
pub mod html;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::inference::InferenceService;

/// Router for the form variant.
pub fn form_app(service: InferenceService) -> Router {
    form::form_routes(service.clone())
        .merge(api::api_routes(service, "travel-predict"))
        .layer(TraceLayer::new_for_http())
}

/// Router for the dashboard variant.
pub fn dashboard_app(service: InferenceService) -> Router {
    dashboard::dashboard_routes(service.clone())
        .merge(api::api_routes(service, "travel-dashboard"))
        .layer(TraceLayer::new_for_http())
}

/// Router for a dashboard whose artifacts failed to load.
pub fn halted_app(reason: String) -> Router {
    dashboard::halted_routes(reason).layer(TraceLayer::new_for_http())
}
