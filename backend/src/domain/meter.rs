//! Meter reading chain model.
//!
//! Readings form an append-only chain per `(user, meter kind)`. The
//! `previous_value`/`consumption` pair is captured from the chain head at
//! submission time and never recomputed afterwards.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

/// Closed set of utility meters a reading can belong to.
///
/// The `MeterType` catalog layers display data (name, unit) on top of this
/// enum; business logic branches on the enum, never on catalog rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MeterKind {
    Electricity,
    ColdWater,
    HotWater,
    Gas,
    Heating,
}

impl MeterKind {
    /// All kinds in catalog order.
    pub const ALL: [Self; 5] = [
        Self::Electricity,
        Self::ColdWater,
        Self::HotWater,
        Self::Gas,
        Self::Heating,
    ];

    /// Stable wire/storage code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electricity => "electricity",
            Self::ColdWater => "cold_water",
            Self::HotWater => "hot_water",
            Self::Gas => "gas",
            Self::Heating => "heating",
        }
    }
}

impl fmt::Display for MeterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure parsing a meter kind code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMeterKindError(pub String);

impl fmt::Display for UnknownMeterKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown meter kind: {}", self.0)
    }
}

impl std::error::Error for UnknownMeterKindError {}

impl FromStr for MeterKind {
    type Err = UnknownMeterKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "electricity" => Ok(Self::Electricity),
            "cold_water" => Ok(Self::ColdWater),
            "hot_water" => Ok(Self::HotWater),
            "gas" => Ok(Self::Gas),
            "heating" => Ok(Self::Heating),
            other => Err(UnknownMeterKindError(other.to_owned())),
        }
    }
}

/// One submitted meter reading.
///
/// Immutable once verified; the only permitted mutation is the single
/// verification stamp applied by an administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeterReading {
    pub id: Uuid,
    pub user_id: UserId,
    pub kind: MeterKind,
    pub value: f64,
    /// Value of the chain head at submission time; `None` when the chain was
    /// empty. A previous reading of `0.0` is real history, not absence.
    pub previous_value: Option<f64>,
    /// `value - previous_value`, only defined when history exists.
    pub consumption: Option<f64>,
    pub notes: Option<String>,
    /// Blob-store reference; left unset when photo persistence failed.
    pub photo: Option<String>,
    pub is_verified: bool,
    pub verified_by: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog row describing a meter kind for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeterType {
    pub code: MeterKind,
    pub name: String,
    pub unit: String,
    pub description: Option<String>,
    pub is_active: bool,
}

/// Default catalog seeded on first boot with an empty `meter_types` table.
pub fn default_meter_types() -> Vec<MeterType> {
    let row = |code: MeterKind, name: &str, unit: &str, description: &str| MeterType {
        code,
        name: name.to_owned(),
        unit: unit.to_owned(),
        description: Some(description.to_owned()),
        is_active: true,
    };
    vec![
        row(MeterKind::Electricity, "Electricity", "kWh", "Electricity meter readings"),
        row(MeterKind::ColdWater, "Cold water", "m3", "Cold water meter readings"),
        row(MeterKind::HotWater, "Hot water", "m3", "Hot water meter readings"),
        row(MeterKind::Gas, "Gas", "m3", "Gas meter readings"),
        row(MeterKind::Heating, "Heating", "Gcal", "Heating meter readings"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("electricity", MeterKind::Electricity)]
    #[case("cold_water", MeterKind::ColdWater)]
    #[case("hot_water", MeterKind::HotWater)]
    #[case("gas", MeterKind::Gas)]
    #[case("heating", MeterKind::Heating)]
    fn codes_round_trip(#[case] code: &str, #[case] kind: MeterKind) {
        assert_eq!(code.parse::<MeterKind>(), Ok(kind));
        assert_eq!(kind.as_str(), code);
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = "water".parse::<MeterKind>().expect_err("unknown kind");
        assert_eq!(err, UnknownMeterKindError("water".to_owned()));
    }

    #[test]
    fn default_catalog_covers_every_kind() {
        let catalog = default_meter_types();
        assert_eq!(catalog.len(), MeterKind::ALL.len());
        for kind in MeterKind::ALL {
            assert!(catalog.iter().any(|row| row.code == kind));
        }
    }
}
