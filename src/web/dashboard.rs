//! Dashboard front-end: widget page plus a WebSocket for predictions.
//!
//! Protocol (JSON, tagged by `type`):
//! - server → client on connect: `{"type": "ready", "fields": [...]}`
//! - client → server: `{"type": "predict", "fields": {"Age": 30, ...}}`
//! - server → client: `{"type": "outcome", "outcome": "likely" | "not_likely" | "error", "message": "..."}`

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::html;
use crate::error::Error;
use crate::inference::InferenceService;
use crate::prediction::{Outcome, PredictionResult};
use crate::record::RawInput;
use crate::schema::{self, Field, FieldDescriptor};

/// Message from dashboard client → server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Run one prediction over the current widget values.
    Predict { fields: RawInput },
}

/// Message from server → dashboard client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once on connect.
    Ready { fields: Vec<FieldDescriptor> },
    Outcome {
        outcome: &'static str,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<Field>,
    },
}

impl ServerMessage {
    fn from_result(result: Result<PredictionResult, Error>) -> Self {
        let field = match &result {
            Err(Error::Input(e)) => Some(e.field()),
            _ => None,
        };
        let outcome = Outcome::from(result);
        Self::Outcome {
            outcome: outcome.tag(),
            message: outcome.text(),
            field,
        }
    }
}

#[derive(Clone)]
struct DashboardState {
    service: InferenceService,
}

pub fn dashboard_routes(service: InferenceService) -> Router {
    Router::new()
        .route("/", get(show_dashboard))
        .route("/ws", get(ws_handler))
        .with_state(DashboardState { service })
}

/// Routes served when the artifacts failed to load: every path answers with
/// the halting page and no widgets are offered.
pub fn halted_routes(reason: String) -> Router {
    let body: Arc<str> = html::halted_page(&reason).into();
    Router::new().fallback(move || {
        let body = Arc::clone(&body);
        async move { (StatusCode::SERVICE_UNAVAILABLE, Html(body.to_string())) }
    })
}

async fn show_dashboard() -> Html<String> {
    Html(html::page(
        "Travel package dashboard",
        &format!(
            "<h1>Travel package purchase dashboard</h1>\n\
             <div class=\"widgets\">\n{widgets}\
             <button type=\"button\" id=\"predict\">Predict</button>\n</div>\n{outcome}\n\
             <script>{SCRIPT}</script>",
            widgets = html::widgets(&Default::default()),
            outcome = html::outcome_panel(&Outcome::Empty),
        ),
    ))
}

// ── WebSocket ───────────────────────────────────────────────────────────

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<DashboardState>) -> impl IntoResponse {
    info!("Dashboard client connecting");
    ws.on_upgrade(|socket| handle_socket(socket, state.service))
}

async fn handle_socket(mut socket: WebSocket, service: InferenceService) {
    let ready = ServerMessage::Ready {
        fields: schema::describe(),
    };
    if send(&mut socket, &ready).await.is_err() {
        warn!("Failed to send ready message, client disconnected");
        return;
    }

    // One prediction at a time per connection.
    loop {
        match socket.recv().await {
            Some(Ok(Message::Text(text))) => {
                let reply = handle_client_message(&text, &service).await;
                if send(&mut socket, &reply).await.is_err() {
                    debug!("Client disconnected during send");
                    break;
                }
            }
            Some(Ok(Message::Ping(data))) => {
                if socket.send(Message::Pong(data)).await.is_err() {
                    break;
                }
            }
            Some(Ok(Message::Close(_))) | None => {
                info!("Dashboard client disconnected");
                break;
            }
            Some(Err(e)) => {
                warn!(error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }
}

async fn handle_client_message(text: &str, service: &InferenceService) -> ServerMessage {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Predict { fields }) => {
            ServerMessage::from_result(service.handle(Uuid::new_v4(), &fields).await)
        }
        Err(e) => {
            debug!(error = %e, text = text, "Unrecognized WS message from client");
            ServerMessage::Outcome {
                outcome: "error",
                message: format!("Error: invalid request: {e}"),
                field: None,
            }
        }
    }
}

async fn send(socket: &mut WebSocket, msg: &ServerMessage) -> Result<(), axum::Error> {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!(error = %e, "Failed to serialize server message");
            Ok(())
        }
    }
}

const SCRIPT: &str = r#"
(() => {
  const panel = document.getElementById("outcome");
  const button = document.getElementById("predict");
  const scheme = location.protocol === "https:" ? "wss" : "ws";
  const ws = new WebSocket(`${scheme}://${location.host}/ws`);

  const show = (tag, text) => {
    panel.className = `outcome ${tag}`;
    panel.textContent = text;
  };

  const collect = () => {
    const fields = {};
    document.querySelectorAll("[data-type]").forEach((el) => {
      const raw = el.value.trim();
      if (raw === "") return;
      const type = el.dataset.type;
      if ((type === "integer" || type === "integer_choice") && /^-?\d+$/.test(raw)) {
        fields[el.name] = Number(raw);
      } else if (type === "decimal" && Number.isFinite(Number(raw))) {
        fields[el.name] = Number(raw);
      } else {
        fields[el.name] = el.tagName === "SELECT" ? el.value : raw;
      }
    });
    return fields;
  };

  button.disabled = true;
  ws.onopen = () => { button.disabled = false; };
  ws.onclose = () => { button.disabled = true; show("error", "Error: connection to the service was lost"); };
  ws.onmessage = (event) => {
    const msg = JSON.parse(event.data);
    if (msg.type === "outcome") {
      show(msg.outcome, msg.message);
      button.disabled = false;
    }
  };
  button.addEventListener("click", () => {
    button.disabled = true;
    ws.send(JSON.stringify({ type: "predict", fields: collect() }));
  });
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InferenceError, InputError};
    use crate::prediction::Label;

    #[test]
    fn predict_message_parses_typed_fields() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type": "predict", "fields": {"Age": 30, "Gender": "Male", "MonthlyIncome": 35000.5}}"#,
        )
        .unwrap();
        let ClientMessage::Predict { fields } = msg;
        assert_eq!(fields.get(Field::Age), Some(&crate::record::RawValue::Integer(30)));
    }

    #[test]
    fn likely_outcome_serializes_with_message() {
        let msg = ServerMessage::from_result(Ok(PredictionResult::new(Label::Likely)));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "outcome");
        assert_eq!(json["outcome"], "likely");
        assert_eq!(
            json["message"],
            "✔ Customer is LIKELY to purchase the travel package."
        );
        assert!(json.get("field").is_none());
    }

    #[test]
    fn input_error_outcome_names_field() {
        let msg = ServerMessage::from_result(Err(InputError::Missing { field: Field::OwnCar }.into()));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["outcome"], "error");
        assert_eq!(json["field"], "OwnCar");
        assert_eq!(json["message"], "Error: OwnCar is missing");
    }

    #[test]
    fn inference_error_outcome_has_no_field() {
        let msg = ServerMessage::from_result(Err(InferenceError::InvalidLabel(5).into()));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["outcome"], "error");
        assert!(json.get("field").is_none());
    }

    #[test]
    fn ready_lists_all_fields() {
        let msg = ServerMessage::Ready {
            fields: schema::describe(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "ready");
        assert_eq!(json["fields"].as_array().unwrap().len(), 17);
    }
}
