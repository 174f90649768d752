//! Server-side HTML rendering for both front-ends.

use std::collections::HashMap;
use std::fmt::Write;

use crate::prediction::Outcome;
use crate::schema::{Field, FieldKind};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 44rem; margin: 2rem auto; padding: 0 1rem; color: #1d2430; }
h1 { font-size: 1.5rem; }
form, .widgets { display: grid; grid-template-columns: 1fr 1fr; gap: 0.6rem 1.2rem; }
label { display: flex; flex-direction: column; font-size: 0.9rem; gap: 0.2rem; }
input, select { padding: 0.35rem; font-size: 1rem; }
button { grid-column: span 2; padding: 0.6rem; font-size: 1rem; cursor: pointer; }
.outcome { margin-top: 1.5rem; padding: 0.8rem 1rem; border-radius: 6px; min-height: 1.2rem; }
.outcome.likely { background: #e3f6e8; color: #17642f; }
.outcome.not_likely { background: #fde8e8; color: #8a1c1c; }
.outcome.error { background: #fff4d6; color: #6b4b00; }
.halted { background: #fde8e8; color: #8a1c1c; padding: 1rem; border-radius: 6px; }
"#;

/// Escape text for use in element content and quoted attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Wrap a body in a complete document.
pub fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        title = escape(title),
    )
}

/// One labelled input widget. `value` pre-fills the widget (form echo).
pub fn field_widget(field: Field, value: Option<&str>) -> String {
    let name = field.name();
    let descriptor = field.descriptor();
    let mut html = format!(
        "<label for=\"{name}\">{label}\n",
        label = escape(field.label())
    );

    match field.kind() {
        FieldKind::Choice(options) => {
            let options: Vec<String> = options.iter().map(|o| o.to_string()).collect();
            html.push_str(&select(name, descriptor.kind, &options, value));
        }
        FieldKind::IntegerChoice(options) => {
            let options: Vec<String> = options.iter().map(|o| o.to_string()).collect();
            html.push_str(&select(name, descriptor.kind, &options, value));
        }
        FieldKind::Integer { min, max } => {
            let _ = write!(
                html,
                "<input type=\"number\" id=\"{name}\" name=\"{name}\" data-type=\"{kind}\" \
                 min=\"{min}\" max=\"{max}\" step=\"1\" value=\"{value}\" required>",
                kind = descriptor.kind,
                value = escape(value.unwrap_or_default()),
            );
        }
        FieldKind::Decimal { min, max } => {
            let _ = write!(
                html,
                "<input type=\"number\" id=\"{name}\" name=\"{name}\" data-type=\"{kind}\" \
                 min=\"{min}\" max=\"{max}\" step=\"any\" value=\"{value}\" required>",
                kind = descriptor.kind,
                value = escape(value.unwrap_or_default()),
            );
        }
    }

    html.push_str("</label>\n");
    html
}

fn select(name: &str, kind: &str, options: &[String], selected: Option<&str>) -> String {
    let mut html = format!("<select id=\"{name}\" name=\"{name}\" data-type=\"{kind}\" required>");
    for option in options {
        let attr = if Some(option.as_str()) == selected {
            " selected"
        } else {
            ""
        };
        let option = escape(option);
        let _ = write!(html, "<option value=\"{option}\"{attr}>{option}</option>");
    }
    html.push_str("</select>");
    html
}

/// All 17 widgets, pre-filled from previously submitted values.
pub fn widgets(values: &HashMap<String, String>) -> String {
    Field::ALL
        .iter()
        .map(|f| field_widget(*f, values.get(f.name()).map(String::as_str)))
        .collect()
}

/// The message area. Always present so the layout does not jump.
pub fn outcome_panel(outcome: &Outcome) -> String {
    format!(
        "<p id=\"outcome\" class=\"outcome {tag}\" role=\"status\">{text}</p>",
        tag = outcome.tag(),
        text = escape(&outcome.text()),
    )
}

/// Halting page shown when the artifacts could not be loaded.
pub fn halted_page(reason: &str) -> String {
    page(
        "Travel package prediction unavailable",
        &format!(
            "<h1>Travel package prediction</h1>\n\
             <div class=\"halted\"><strong>Model or preprocessor missing.</strong>\
             <p>{}</p><p>Provide both artifact files and restart the service.</p></div>",
            escape(reason)
        ),
    )
}
