//! Form front-end: one page, GET to display, POST to predict.

use std::collections::HashMap;

use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Form, Router};
use tracing::warn;
use uuid::Uuid;

use super::html;
use crate::inference::InferenceService;
use crate::prediction::Outcome;
use crate::record::RawInput;

#[derive(Clone)]
struct FormState {
    service: InferenceService,
}

pub fn form_routes(service: InferenceService) -> Router {
    Router::new()
        .route("/", get(show_form).post(submit_form))
        .with_state(FormState { service })
}

async fn show_form() -> Html<String> {
    Html(render(&HashMap::new(), &Outcome::Empty))
}

/// Every per-request failure ends up in the page as `Error: ...`, including a
/// body axum cannot decode; the response itself is always a rendered page.
async fn submit_form(
    State(state): State<FormState>,
    submission: Result<Form<HashMap<String, String>>, FormRejection>,
) -> (StatusCode, Html<String>) {
    let fields = match submission {
        Ok(Form(fields)) => fields,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected form submission");
            let outcome = Outcome::Failed(rejection.body_text());
            return (rejection.status(), Html(render(&HashMap::new(), &outcome)));
        }
    };

    let raw = RawInput::from_text_fields(&fields);
    let outcome = Outcome::from(state.service.handle(Uuid::new_v4(), &raw).await);
    (StatusCode::OK, Html(render(&fields, &outcome)))
}

fn render(values: &HashMap<String, String>, outcome: &Outcome) -> String {
    html::page(
        "Travel package purchase prediction",
        &format!(
            "<h1>Travel package purchase prediction</h1>\n\
             <form method=\"post\" action=\"/\">\n{widgets}\
             <button type=\"submit\">Predict</button>\n</form>\n{outcome}",
            widgets = html::widgets(values),
            outcome = html::outcome_panel(outcome),
        ),
    )
}
