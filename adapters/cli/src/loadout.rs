#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use lane_defence_core::{Catalog, Position};
use lane_defence_system_autopilot::BuildStep;
use serde::{Deserialize, Serialize};

const PLAN_DOMAIN: &str = "lane";
const PLAN_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded plan payload.
pub(crate) const PLAN_HEADER: &str = "lane:v1";
/// Delimiter used to separate the prefix, step count and payload.
const FIELD_DELIMITER: char = ':';

/// Build plan captured as a single-line transfer string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct LoadoutPlan {
    /// Planned placements in build order.
    pub(crate) steps: Vec<LoadoutStep>,
}

/// Single planned placement, with the class referenced by catalog name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct LoadoutStep {
    /// Catalog name of the tower class to place.
    pub(crate) class: String,
    /// World-space x coordinate of the placement.
    pub(crate) x: f32,
    /// World-space y coordinate of the placement.
    pub(crate) y: f32,
}

impl LoadoutPlan {
    /// Encodes the plan into a single-line string suitable for sharing.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let json = serde_json::to_vec(self).expect("loadout serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{PLAN_HEADER}:{}:{encoded}", self.steps.len())
    }

    /// Decodes a plan from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LoadoutError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LoadoutError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LoadoutError::MissingPrefix)?;
        let version = parts.next().ok_or(LoadoutError::MissingVersion)?;
        let count = parts.next().ok_or(LoadoutError::MissingCount)?;
        let payload = parts.next().ok_or(LoadoutError::MissingPayload)?;

        if domain != PLAN_DOMAIN {
            return Err(LoadoutError::InvalidPrefix(domain.to_owned()));
        }
        if version != PLAN_VERSION {
            return Err(LoadoutError::UnsupportedVersion(version.to_owned()));
        }

        let declared = count
            .trim()
            .parse::<u32>()
            .map_err(|_| LoadoutError::InvalidCount(count.to_owned()))?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LoadoutError::InvalidEncoding)?;
        let plan: Self = serde_json::from_slice(&bytes).map_err(LoadoutError::InvalidPayload)?;

        if plan.steps.len() != declared as usize {
            return Err(LoadoutError::CountMismatch {
                declared,
                actual: plan.steps.len() as u32,
            });
        }

        Ok(plan)
    }

    /// Resolves class names against the catalog into concrete build steps.
    pub(crate) fn resolve(&self, catalog: &Catalog) -> Result<Vec<BuildStep>, LoadoutError> {
        let mut steps = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let Some(class) = catalog.tower_by_name(&step.class) else {
                return Err(LoadoutError::UnknownClass(step.class.clone()));
            };
            steps.push(BuildStep::new(class, Position::new(step.x, step.y)));
        }
        Ok(steps)
    }

    /// Captures an in-memory plan as name-referenced loadout records.
    pub(crate) fn from_steps(steps: &[BuildStep], catalog: &Catalog) -> Result<Self, LoadoutError> {
        let mut records = Vec::with_capacity(steps.len());
        for step in steps {
            let Some(class) = catalog.tower(step.class) else {
                return Err(LoadoutError::UnknownClass(format!("#{}", step.class.get())));
            };
            records.push(LoadoutStep {
                class: class.name.clone(),
                x: step.at.x(),
                y: step.at.y(),
            });
        }
        Ok(Self { steps: records })
    }
}

/// Errors that can occur while decoding loadout transfer strings.
#[derive(Debug)]
pub(crate) enum LoadoutError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded plan.
    MissingPrefix,
    /// The encoded plan did not contain a version segment.
    MissingVersion,
    /// The encoded plan did not include the step count.
    MissingCount,
    /// The encoded plan did not include the payload segment.
    MissingPayload,
    /// The encoded plan used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded plan used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The step count could not be parsed from the encoded plan.
    InvalidCount(String),
    /// The declared step count does not match the decoded list.
    CountMismatch {
        /// Count carried in the header segment.
        declared: u32,
        /// Number of steps actually present in the payload.
        actual: u32,
    },
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
    /// The plan references a tower class the catalog does not carry.
    UnknownClass(String),
}

impl fmt::Display for LoadoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "loadout string was empty"),
            Self::MissingPrefix => write!(f, "loadout string is missing the prefix"),
            Self::MissingVersion => write!(f, "loadout string is missing the version"),
            Self::MissingCount => write!(f, "loadout string is missing the step count"),
            Self::MissingPayload => write!(f, "loadout string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "loadout prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "loadout version '{version}' is not supported")
            }
            Self::InvalidCount(count) => write!(f, "could not parse step count '{count}'"),
            Self::CountMismatch { declared, actual } => {
                write!(f, "loadout declares {declared} steps but carries {actual}")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode loadout payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse loadout payload: {error}")
            }
            Self::UnknownClass(class) => {
                write!(f, "tower class '{class}' is not in the catalog")
            }
        }
    }
}

impl Error for LoadoutError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}
