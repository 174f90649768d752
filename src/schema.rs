//! Input schema: the 17 customer fields, their types and allowed domains.

use serde::{Deserialize, Serialize};

/// One named input field of a customer record.
///
/// Variant names are the wire names used by the form, the dashboard and the
/// preprocessor's column bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Age,
    Gender,
    MaritalStatus,
    ProductPitched,
    PreferredPropertyStar,
    NumberOfTrips,
    TypeofContact,
    DurationOfPitch,
    NumberOfFollowups,
    PitchSatisfactionScore,
    Designation,
    CityTier,
    Occupation,
    Passport,
    OwnCar,
    MonthlyIncome,
    TotalVisiting,
}

/// Declared type and domain of a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Whole number within an inclusive range.
    Integer { min: i64, max: i64 },
    /// Whole number drawn from a fixed set.
    IntegerChoice(&'static [i64]),
    /// Finite decimal within an inclusive range.
    Decimal { min: f64, max: f64 },
    /// Exact, case-sensitive text from a fixed set.
    Choice(&'static [&'static str]),
}

impl Field {
    /// All fields in canonical order. Validation reports the first failure in
    /// this order.
    pub const ALL: [Field; 17] = [
        Field::Age,
        Field::Gender,
        Field::MaritalStatus,
        Field::ProductPitched,
        Field::PreferredPropertyStar,
        Field::NumberOfTrips,
        Field::TypeofContact,
        Field::DurationOfPitch,
        Field::NumberOfFollowups,
        Field::PitchSatisfactionScore,
        Field::Designation,
        Field::CityTier,
        Field::Occupation,
        Field::Passport,
        Field::OwnCar,
        Field::MonthlyIncome,
        Field::TotalVisiting,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Gender => "Gender",
            Self::MaritalStatus => "MaritalStatus",
            Self::ProductPitched => "ProductPitched",
            Self::PreferredPropertyStar => "PreferredPropertyStar",
            Self::NumberOfTrips => "NumberOfTrips",
            Self::TypeofContact => "TypeofContact",
            Self::DurationOfPitch => "DurationOfPitch",
            Self::NumberOfFollowups => "NumberOfFollowups",
            Self::PitchSatisfactionScore => "PitchSatisfactionScore",
            Self::Designation => "Designation",
            Self::CityTier => "CityTier",
            Self::Occupation => "Occupation",
            Self::Passport => "Passport",
            Self::OwnCar => "OwnCar",
            Self::MonthlyIncome => "MonthlyIncome",
            Self::TotalVisiting => "TotalVisiting",
        }
    }

    /// Look up a field by its wire name (exact match).
    pub fn from_name(name: &str) -> Option<Field> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::Age => FieldKind::Integer { min: 18, max: 90 },
            Self::Gender => FieldKind::Choice(&["Male", "Female"]),
            Self::MaritalStatus => FieldKind::Choice(&["Married", "Unmarried", "Divorced"]),
            Self::ProductPitched => FieldKind::Choice(&["Basic", "Deluxe"]),
            Self::PreferredPropertyStar => FieldKind::Integer { min: 1, max: 5 },
            Self::NumberOfTrips => FieldKind::Integer { min: 0, max: 50 },
            Self::TypeofContact => FieldKind::Choice(&["Self Enquiry", "Company Invited"]),
            Self::DurationOfPitch => FieldKind::Integer { min: 0, max: 180 },
            Self::NumberOfFollowups => FieldKind::Integer { min: 0, max: 10 },
            Self::PitchSatisfactionScore => FieldKind::Integer { min: 1, max: 5 },
            Self::Designation => FieldKind::Choice(&["Executive", "Manager"]),
            Self::CityTier => FieldKind::IntegerChoice(&[1, 2, 3]),
            Self::Occupation => FieldKind::Choice(&["Salaried", "Free Lancer", "Small Business"]),
            Self::Passport => FieldKind::IntegerChoice(&[0, 1]),
            Self::OwnCar => FieldKind::IntegerChoice(&[0, 1]),
            Self::MonthlyIncome => FieldKind::Decimal {
                min: 0.0,
                max: 1_000_000.0,
            },
            Self::TotalVisiting => FieldKind::Integer { min: 1, max: 10 },
        }
    }

    /// Human label used by the presentation adapters.
    pub fn label(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Gender => "Gender",
            Self::MaritalStatus => "Marital status",
            Self::ProductPitched => "Product pitched",
            Self::PreferredPropertyStar => "Preferred property star",
            Self::NumberOfTrips => "Number of trips per year",
            Self::TypeofContact => "Type of contact",
            Self::DurationOfPitch => "Duration of pitch (minutes)",
            Self::NumberOfFollowups => "Number of follow-ups",
            Self::PitchSatisfactionScore => "Pitch satisfaction score",
            Self::Designation => "Designation",
            Self::CityTier => "City tier",
            Self::Occupation => "Occupation",
            Self::Passport => "Has passport",
            Self::OwnCar => "Owns a car",
            Self::MonthlyIncome => "Monthly income",
            Self::TotalVisiting => "Total people visiting",
        }
    }

    pub fn descriptor(self) -> FieldDescriptor {
        let (kind, min, max, options) = match self.kind() {
            FieldKind::Integer { min, max } => ("integer", Some(min as f64), Some(max as f64), vec![]),
            FieldKind::IntegerChoice(opts) => (
                "integer_choice",
                None,
                None,
                opts.iter().map(|o| serde_json::json!(o)).collect(),
            ),
            FieldKind::Decimal { min, max } => ("decimal", Some(min), Some(max), vec![]),
            FieldKind::Choice(opts) => (
                "choice",
                None,
                None,
                opts.iter().map(|o| serde_json::json!(o)).collect(),
            ),
        };
        FieldDescriptor {
            name: self.name(),
            label: self.label(),
            kind,
            min,
            max,
            options,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Serializable description of a field, served to clients that build input
/// widgets from the schema.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<serde_json::Value>,
}

/// Descriptors for every field in canonical order.
pub fn describe() -> Vec<FieldDescriptor> {
    Field::ALL.iter().map(|f| f.descriptor()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_lookup() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(field));
        }
        assert_eq!(Field::from_name("age"), None);
        assert_eq!(Field::from_name("Typeofcontact"), None);
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&Field::TypeofContact).unwrap();
        assert_eq!(json, "\"TypeofContact\"");
        let parsed: Field = serde_json::from_str("\"MonthlyIncome\"").unwrap();
        assert_eq!(parsed, Field::MonthlyIncome);
    }

    #[test]
    fn all_fields_are_distinct() {
        let mut names: Vec<_> = Field::ALL.iter().map(|f| f.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 17);
    }

    #[test]
    fn descriptor_for_choice_lists_options() {
        let d = Field::Occupation.descriptor();
        assert_eq!(d.kind, "choice");
        assert_eq!(d.options.len(), 3);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["type"], "choice");
        assert!(json.get("min").is_none());
    }

    #[test]
    fn descriptor_for_integer_carries_range() {
        let d = Field::Age.descriptor();
        assert_eq!(d.kind, "integer");
        assert_eq!(d.min, Some(18.0));
        assert_eq!(d.max, Some(90.0));
        assert!(d.options.is_empty());
    }
}
