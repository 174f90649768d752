//! Record builder: raw form or widget values → validated `CustomerRecord`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::InputError;
use crate::schema::{Field, FieldKind};

/// A single raw value as supplied by a front-end.
///
/// Forms supply text; the dashboard and JSON API supply typed JSON values.
/// Any JSON shape deserializes, so malformed values are reported per field
/// by [`CustomerRecord::from_raw`] rather than rejected wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Integer(i64),
    Number(f64),
    Text(String),
    /// JSON `null`, treated as missing.
    Null,
    /// Booleans, arrays and objects.
    Other(serde_json::Value),
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(v: serde_json::Value) -> Self {
        serde_json::from_value(v.clone()).unwrap_or(Self::Other(v))
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl std::fmt::Display for RawValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Null => f.write_str("null"),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}

/// Raw input keyed by field wire name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInput {
    values: HashMap<String, RawValue>,
}

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<RawValue> {
        self.values.remove(name)
    }

    pub fn get(&self, field: Field) -> Option<&RawValue> {
        self.values.get(field.name())
    }

    /// Build from string pairs, as submitted by an HTML form.
    pub fn from_text_fields(fields: &HashMap<String, String>) -> Self {
        fields
            .iter()
            .map(|(k, v)| (k.clone(), RawValue::Text(v.clone())))
            .collect()
    }

    /// Keys that do not name any schema field.
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.values
            .keys()
            .filter(|k| Field::from_name(k).is_none())
            .map(String::as_str)
            .collect()
    }
}

impl FromIterator<(String, RawValue)> for RawInput {
    fn from_iter<I: IntoIterator<Item = (String, RawValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// A coerced field value, borrowed from a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Integer(i64),
    Decimal(f64),
    Text(&'a str),
}

impl FieldValue<'_> {
    /// Numeric view, or `None` for text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Decimal(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// Category view used by one-hot encoders: integers render without a
    /// fractional part, so `CityTier = 1` matches category `"1"`.
    pub fn as_category(&self) -> String {
        match self {
            Self::Integer(v) => v.to_string(),
            Self::Decimal(v) => v.to_string(),
            Self::Text(s) => (*s).to_string(),
        }
    }
}

/// One fully validated row of customer attributes.
///
/// Only constructible through [`CustomerRecord::from_raw`], so every instance
/// satisfies the input schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerRecord {
    age: i64,
    gender: String,
    marital_status: String,
    product_pitched: String,
    preferred_property_star: i64,
    number_of_trips: i64,
    #[serde(rename = "TypeofContact")]
    typeof_contact: String,
    duration_of_pitch: i64,
    number_of_followups: i64,
    pitch_satisfaction_score: i64,
    designation: String,
    city_tier: i64,
    occupation: String,
    passport: i64,
    own_car: i64,
    monthly_income: f64,
    total_visiting: i64,
}

impl CustomerRecord {
    /// Validate and coerce raw input into a record.
    ///
    /// Fields are checked in canonical order and the first failure is
    /// returned. Keys that name no field are ignored.
    pub fn from_raw(raw: &RawInput) -> Result<Self, InputError> {
        let unknown = raw.unknown_keys();
        if !unknown.is_empty() {
            debug!(keys = ?unknown, "Ignoring unknown input keys");
        }

        Ok(Self {
            age: integer(raw, Field::Age)?,
            gender: choice(raw, Field::Gender)?,
            marital_status: choice(raw, Field::MaritalStatus)?,
            product_pitched: choice(raw, Field::ProductPitched)?,
            preferred_property_star: integer(raw, Field::PreferredPropertyStar)?,
            number_of_trips: integer(raw, Field::NumberOfTrips)?,
            typeof_contact: choice(raw, Field::TypeofContact)?,
            duration_of_pitch: integer(raw, Field::DurationOfPitch)?,
            number_of_followups: integer(raw, Field::NumberOfFollowups)?,
            pitch_satisfaction_score: integer(raw, Field::PitchSatisfactionScore)?,
            designation: choice(raw, Field::Designation)?,
            city_tier: integer(raw, Field::CityTier)?,
            occupation: choice(raw, Field::Occupation)?,
            passport: integer(raw, Field::Passport)?,
            own_car: integer(raw, Field::OwnCar)?,
            monthly_income: decimal(raw, Field::MonthlyIncome)?,
            total_visiting: integer(raw, Field::TotalVisiting)?,
        })
    }

    /// Value of a field, looked up by name rather than position.
    pub fn get(&self, field: Field) -> FieldValue<'_> {
        match field {
            Field::Age => FieldValue::Integer(self.age),
            Field::Gender => FieldValue::Text(&self.gender),
            Field::MaritalStatus => FieldValue::Text(&self.marital_status),
            Field::ProductPitched => FieldValue::Text(&self.product_pitched),
            Field::PreferredPropertyStar => FieldValue::Integer(self.preferred_property_star),
            Field::NumberOfTrips => FieldValue::Integer(self.number_of_trips),
            Field::TypeofContact => FieldValue::Text(&self.typeof_contact),
            Field::DurationOfPitch => FieldValue::Integer(self.duration_of_pitch),
            Field::NumberOfFollowups => FieldValue::Integer(self.number_of_followups),
            Field::PitchSatisfactionScore => FieldValue::Integer(self.pitch_satisfaction_score),
            Field::Designation => FieldValue::Text(&self.designation),
            Field::CityTier => FieldValue::Integer(self.city_tier),
            Field::Occupation => FieldValue::Text(&self.occupation),
            Field::Passport => FieldValue::Integer(self.passport),
            Field::OwnCar => FieldValue::Integer(self.own_car),
            Field::MonthlyIncome => FieldValue::Decimal(self.monthly_income),
            Field::TotalVisiting => FieldValue::Integer(self.total_visiting),
        }
    }
}

fn present(raw: &RawInput, field: Field) -> Result<&RawValue, InputError> {
    match raw.get(field) {
        None | Some(RawValue::Null) => Err(InputError::Missing { field }),
        Some(RawValue::Text(s)) if s.trim().is_empty() => Err(InputError::Missing { field }),
        Some(value) => Ok(value),
    }
}

/// Integer and integer-choice fields. No fractional tolerance: `"3.0"` and
/// JSON `3.0` are both rejected.
fn integer(raw: &RawInput, field: Field) -> Result<i64, InputError> {
    let value = match present(raw, field)? {
        RawValue::Integer(v) => *v,
        RawValue::Text(s) => s.trim().parse::<i64>().map_err(|_| InputError::NotInteger {
            field,
            value: s.clone(),
        })?,
        other @ (RawValue::Number(_) | RawValue::Null | RawValue::Other(_)) => {
            return Err(InputError::NotInteger {
                field,
                value: other.to_string(),
            });
        }
    };

    match field.kind() {
        FieldKind::Integer { min, max } if !(min..=max).contains(&value) => {
            Err(InputError::OutOfRange {
                field,
                value: value.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            })
        }
        FieldKind::IntegerChoice(allowed) if !allowed.contains(&value) => {
            Err(InputError::NotAllowed {
                field,
                value: value.to_string(),
                allowed: allowed
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
        }
        _ => Ok(value),
    }
}

fn decimal(raw: &RawInput, field: Field) -> Result<f64, InputError> {
    let value = match present(raw, field)? {
        RawValue::Integer(v) => *v as f64,
        RawValue::Number(v) => *v,
        RawValue::Text(s) => s.trim().parse::<f64>().map_err(|_| InputError::NotNumber {
            field,
            value: s.clone(),
        })?,
        other @ (RawValue::Null | RawValue::Other(_)) => {
            return Err(InputError::NotNumber {
                field,
                value: other.to_string(),
            });
        }
    };

    // "inf" and "NaN" parse successfully but are not meaningful incomes.
    if !value.is_finite() {
        return Err(InputError::NotNumber {
            field,
            value: value.to_string(),
        });
    }

    if let FieldKind::Decimal { min, max } = field.kind() {
        if value < min || value > max {
            return Err(InputError::OutOfRange {
                field,
                value: value.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            });
        }
    }
    Ok(value)
}

/// Text choice fields: exact, case-sensitive match.
fn choice(raw: &RawInput, field: Field) -> Result<String, InputError> {
    let FieldKind::Choice(allowed) = field.kind() else {
        unreachable!("choice() called for non-choice field {field}");
    };

    let value = present(raw, field)?.to_string();
    if allowed.contains(&value.as_str()) {
        Ok(value)
    } else {
        Err(InputError::NotAllowed {
            field,
            value,
            allowed: allowed.join(", "),
        })
    }
}
