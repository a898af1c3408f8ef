//! Laboratory catalogue
//!
//! The set of laboratories is closed: every asset belongs to exactly one of
//! these, and marker configs are keyed either by one of them or by the
//! `Global` sentinel used by the universal scanner.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Laboratory served by the AR scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Laboratory {
    Pressure,
    ForceAndTorque,
    Mass,
    ChemistryAndVolume,
    Electricity,
    Humidity,
    Temperature,
    LengthAndAngle,
}

impl Laboratory {
    /// All laboratories in display order
    pub const ALL: [Laboratory; 8] = [
        Laboratory::Pressure,
        Laboratory::ForceAndTorque,
        Laboratory::Mass,
        Laboratory::ChemistryAndVolume,
        Laboratory::Electricity,
        Laboratory::Humidity,
        Laboratory::Temperature,
        Laboratory::LengthAndAngle,
    ];

    /// Display name, also the stored and wire form
    pub fn name(self) -> &'static str {
        match self {
            Laboratory::Pressure => "Laboratorio de presión",
            Laboratory::ForceAndTorque => "Laboratorio de Fuerza y Torque",
            Laboratory::Mass => "Laboratorio de Masa",
            Laboratory::ChemistryAndVolume => "Laboratorio de Química y Volúmen",
            Laboratory::Electricity => "Laboratorio de Electricidad",
            Laboratory::Humidity => "Laboratorio de humedad",
            Laboratory::Temperature => "Laboratorio de temperatura",
            Laboratory::LengthAndAngle => "Laboratorio de Longitud y Ángulo",
        }
    }
}

impl fmt::Display for Laboratory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Laboratory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Laboratory::ALL
            .into_iter()
            .find(|lab| lab.name() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown laboratory: {}", s)))
    }
}

impl Serialize for Laboratory {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Laboratory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Key of a marker config row: one laboratory, or the universal scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabKey {
    Global,
    Lab(Laboratory),
}

impl LabKey {
    pub const GLOBAL_NAME: &'static str = "Global";

    /// Every key the admin console manages, `Global` first
    pub fn all() -> impl Iterator<Item = LabKey> {
        std::iter::once(LabKey::Global).chain(Laboratory::ALL.into_iter().map(LabKey::Lab))
    }

    pub fn name(self) -> &'static str {
        match self {
            LabKey::Global => Self::GLOBAL_NAME,
            LabKey::Lab(lab) => lab.name(),
        }
    }
}

impl From<Laboratory> for LabKey {
    fn from(lab: Laboratory) -> Self {
        LabKey::Lab(lab)
    }
}

impl From<Option<Laboratory>> for LabKey {
    fn from(lab: Option<Laboratory>) -> Self {
        lab.map_or(LabKey::Global, LabKey::Lab)
    }
}

impl fmt::Display for LabKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LabKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == Self::GLOBAL_NAME {
            Ok(LabKey::Global)
        } else {
            s.parse().map(LabKey::Lab)
        }
    }
}

impl Serialize for LabKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for LabKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Lower-case and collapse whitespace runs to `_`
///
/// Used for the cosmetic `image_name` of an asset and for marker object names.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for c in text.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('_');
            }
            in_whitespace = true;
        } else {
            slug.push(c);
            in_whitespace = false;
        }
    }
    slug
}
