// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Athlete profiles and the tier ladder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Training tier. Variant order is the promotion order; an athlete
/// without a tier sits below `Foundational` (`None < Some(_)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Foundational,
    Intermediate,
    SportPerformance,
}

impl Tier {
    pub const ALL: [Tier; 3] = [
        Tier::Foundational,
        Tier::Intermediate,
        Tier::SportPerformance,
    ];

    /// Database / form representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Foundational => "foundational",
            Self::Intermediate => "intermediate",
            Self::SportPerformance => "sport_performance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "foundational" => Some(Self::Foundational),
            "intermediate" => Some(Self::Intermediate),
            "sport_performance" => Some(Self::SportPerformance),
            _ => None,
        }
    }

    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Foundational => "Foundational",
            Self::Intermediate => "Intermediate",
            Self::SportPerformance => "Sport Performance",
        }
    }

    /// The tier one step above `current`, or `None` at the ceiling.
    ///
    /// Never skips a step: an untiered athlete goes to `Foundational`.
    pub fn next(current: Option<Tier>) -> Option<Tier> {
        match current {
            None => Some(Self::Foundational),
            Some(Self::Foundational) => Some(Self::Intermediate),
            Some(Self::Intermediate) => Some(Self::SportPerformance),
            Some(Self::SportPerformance) => None,
        }
    }

    /// Parse an optional form value where the empty string means "no tier".
    pub fn parse_optional(s: &str) -> Result<Option<Self>, String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Self::parse(trimmed)
            .map(Some)
            .ok_or_else(|| format!("Unknown tier '{trimmed}'"))
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trainee profile managed by coaches.
#[derive(Debug, Clone, Serialize)]
pub struct Athlete {
    pub id: i64,
    pub name: String,
    pub tier: Option<Tier>,
    pub notes: String,
    pub goal: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Athlete {
    /// Whether a promotion is still possible.
    pub fn can_promote(&self) -> bool {
        Tier::next(self.tier).is_some()
    }
}

/// Create/update payload for an athlete.
#[derive(Debug, Clone)]
pub struct AthleteInput {
    pub name: String,
    pub tier: Option<Tier>,
    pub notes: String,
    pub goal: String,
}
