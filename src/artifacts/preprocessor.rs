//! Column-transformer preprocessor loaded from JSON.
//!
//! ```json
//! {
//!   "version": 1,
//!   "transformers": [
//!     {"kind": "standard_scaler", "columns": ["Age"], "mean": [37.6], "scale": [9.3]},
//!     {"kind": "one_hot", "columns": ["CityTier"], "categories": [[1, 2, 3]]},
//!     {"kind": "passthrough", "columns": ["Passport"]}
//!   ]
//! }
//! ```
//!
//! Columns bind to record fields by name. Output order is transformer order,
//! then column order within a transformer, then category order.

use serde::Deserialize;

use super::{ARTIFACT_VERSION, Preprocessor};
use crate::error::{ArtifactError, ArtifactKind, InferenceError};
use crate::record::CustomerRecord;
use crate::schema::{Field, FieldKind};

/// What a one-hot encoder does with a category it was not fitted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    Ignore,
}

/// Categories may be exported as strings or as integers (for integer-coded
/// columns such as `CityTier`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum CategoryRepr {
    Integer(i64),
    Text(String),
}

impl From<CategoryRepr> for String {
    fn from(c: CategoryRepr) -> Self {
        match c {
            CategoryRepr::Integer(v) => v.to_string(),
            CategoryRepr::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TransformerSpec {
    StandardScaler {
        columns: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    OneHot {
        columns: Vec<String>,
        categories: Vec<Vec<CategoryRepr>>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
    Passthrough {
        columns: Vec<String>,
    },
}

#[derive(Debug, Deserialize)]
struct PreprocessorFile {
    version: u32,
    transformers: Vec<TransformerSpec>,
}

/// A transformer with its columns resolved to schema fields.
#[derive(Debug, Clone, PartialEq)]
enum Transformer {
    StandardScaler(Vec<ScaledColumn>),
    OneHot {
        columns: Vec<(Field, Vec<String>)>,
        handle_unknown: HandleUnknown,
    },
    Passthrough(Vec<Field>),
}

#[derive(Debug, Clone, PartialEq)]
struct ScaledColumn {
    field: Field,
    mean: f64,
    scale: f64,
}

/// Preprocessor backed by a JSON column-transformer export.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPreprocessor {
    transformers: Vec<Transformer>,
    width: usize,
}

impl JsonPreprocessor {
    /// Parse and validate a preprocessor export.
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let file: PreprocessorFile =
            serde_json::from_str(json).map_err(|source| ArtifactError::Parse {
                kind: ArtifactKind::Preprocessor,
                source,
            })?;

        if file.version != ARTIFACT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                kind: ArtifactKind::Preprocessor,
                found: file.version,
                expected: ARTIFACT_VERSION,
            });
        }
        if file.transformers.is_empty() {
            return Err(invalid("no transformers defined"));
        }

        let transformers = file
            .transformers
            .into_iter()
            .map(resolve)
            .collect::<Result<Vec<_>, _>>()?;

        let width = transformers.iter().map(Transformer::width).sum();
        Ok(Self {
            transformers,
            width,
        })
    }
}

impl Preprocessor for JsonPreprocessor {
    fn transform(&self, record: &CustomerRecord) -> Result<Vec<f64>, InferenceError> {
        let mut out = Vec::with_capacity(self.width);
        for transformer in &self.transformers {
            match transformer {
                Transformer::StandardScaler(columns) => {
                    for col in columns {
                        let x = numeric(record, col.field)?;
                        out.push((x - col.mean) / col.scale);
                    }
                }
                Transformer::OneHot {
                    columns,
                    handle_unknown,
                } => {
                    for (field, categories) in columns {
                        let value = record.get(*field).as_category();
                        let hit = categories.iter().position(|c| *c == value);
                        if hit.is_none() && *handle_unknown == HandleUnknown::Error {
                            return Err(InferenceError::UnknownCategory {
                                column: field.name().to_string(),
                                value,
                            });
                        }
                        out.extend((0..categories.len()).map(|i| {
                            if Some(i) == hit { 1.0 } else { 0.0 }
                        }));
                    }
                }
                Transformer::Passthrough(fields) => {
                    for field in fields {
                        out.push(numeric(record, *field)?);
                    }
                }
            }
        }
        Ok(out)
    }

    fn output_width(&self) -> Option<usize> {
        Some(self.width)
    }
}

impl Transformer {
    fn width(&self) -> usize {
        match self {
            Self::StandardScaler(columns) => columns.len(),
            Self::OneHot { columns, .. } => columns.iter().map(|(_, c)| c.len()).sum(),
            Self::Passthrough(fields) => fields.len(),
        }
    }
}

fn numeric(record: &CustomerRecord, field: Field) -> Result<f64, InferenceError> {
    record
        .get(field)
        .as_number()
        .ok_or_else(|| InferenceError::NotNumeric {
            column: field.name().to_string(),
        })
}

fn invalid(reason: impl Into<String>) -> ArtifactError {
    ArtifactError::Invalid {
        kind: ArtifactKind::Preprocessor,
        reason: reason.into(),
    }
}

fn resolve_column(name: &str) -> Result<Field, ArtifactError> {
    Field::from_name(name).ok_or_else(|| invalid(format!("unknown column {name:?}")))
}

fn resolve_numeric_column(name: &str) -> Result<Field, ArtifactError> {
    let field = resolve_column(name)?;
    if matches!(field.kind(), FieldKind::Choice(_)) {
        return Err(invalid(format!("column {name:?} is categorical text, not numeric")));
    }
    Ok(field)
}

fn resolve(spec: TransformerSpec) -> Result<Transformer, ArtifactError> {
    match spec {
        TransformerSpec::StandardScaler {
            columns,
            mean,
            scale,
        } => {
            if columns.len() != mean.len() || columns.len() != scale.len() {
                return Err(invalid(format!(
                    "standard_scaler has {} columns, {} means and {} scales",
                    columns.len(),
                    mean.len(),
                    scale.len()
                )));
            }
            let columns = columns
                .iter()
                .zip(mean)
                .zip(scale)
                .map(|((name, mean), scale)| {
                    let field = resolve_numeric_column(name)?;
                    if !mean.is_finite() || !scale.is_finite() {
                        return Err(invalid(format!("non-finite scaling for column {name:?}")));
                    }
                    // Zero variance columns are left unscaled.
                    let scale = if scale == 0.0 { 1.0 } else { scale };
                    Ok(ScaledColumn { field, mean, scale })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Transformer::StandardScaler(columns))
        }
        TransformerSpec::OneHot {
            columns,
            categories,
            handle_unknown,
        } => {
            if columns.len() != categories.len() {
                return Err(invalid(format!(
                    "one_hot has {} columns but {} category lists",
                    columns.len(),
                    categories.len()
                )));
            }
            let columns = columns
                .iter()
                .zip(categories)
                .map(|(name, cats)| {
                    let field = resolve_column(name)?;
                    if cats.is_empty() {
                        return Err(invalid(format!("column {name:?} has no categories")));
                    }
                    Ok((field, cats.into_iter().map(String::from).collect::<Vec<_>>()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Transformer::OneHot {
                columns,
                handle_unknown,
            })
        }
        TransformerSpec::Passthrough { columns } => {
            let fields = columns
                .iter()
                .map(|name| resolve_numeric_column(name))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Transformer::Passthrough(fields))
        }
    }
}
