//! Value objects for the Sales Goals context.

use std::fmt;

use chrono::{DateTime, Utc};
use salesarena_core::result::DomainResult;
use salesarena_core::value_object::rules::{char_len, first_failure};
use salesarena_core::value_object::{Props, ValueObject};
use serde::{Deserialize, Serialize};

/// Shortest accepted goal title, in characters.
pub const TITLE_MIN_CHARS: usize = 2;
/// Longest accepted goal title, in characters.
pub const TITLE_MAX_CHARS: usize = 80;

/// Props behind [`GoalTitle`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalTitleProps {
    /// The title text.
    pub value: String,
}

impl Props for GoalTitleProps {
    fn normalize(self) -> Self {
        Self {
            value: self.value.trim().to_owned(),
        }
    }

    fn validate(&self) -> DomainResult<()> {
        let len = char_len(&self.value);
        first_failure([
            (!self.value.is_empty(), "Måltitel får inte vara tom"),
            (len >= TITLE_MIN_CHARS, "Måltitel måste vara minst 2 tecken"),
            (len <= TITLE_MAX_CHARS, "Måltitel får vara högst 80 tecken"),
        ])
    }
}

/// What a goal is called: trimmed, 2 to 80 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GoalTitle(ValueObject<GoalTitleProps>);

impl GoalTitle {
    /// Trims and validates a raw title.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the trimmed title is empty, too
    /// short, or too long.
    pub fn create(raw: &str) -> DomainResult<Self> {
        ValueObject::create(GoalTitleProps {
            value: raw.to_owned(),
        })
        .map(Self)
    }

    /// The normalized title.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0.props().value
    }
}

impl fmt::Display for GoalTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Props behind [`GoalTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalTargetProps {
    /// Units (deals, calls, kronor) to reach.
    pub amount: u64,
}

impl Props for GoalTargetProps {
    fn validate(&self) -> DomainResult<()> {
        first_failure([(self.amount > 0, "Målvärde måste vara större än 0")])
    }
}

/// The amount a goal asks for. Always positive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GoalTarget(ValueObject<GoalTargetProps>);

impl GoalTarget {
    /// Validates a target amount.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for zero.
    pub fn create(amount: u64) -> DomainResult<Self> {
        ValueObject::create(GoalTargetProps { amount }).map(Self)
    }

    /// The target amount.
    #[must_use]
    pub fn amount(&self) -> u64 {
        self.0.props().amount
    }

    /// `true` once `progress` reaches the target.
    #[must_use]
    pub fn is_reached_by(&self, progress: u64) -> bool {
        progress >= self.amount()
    }
}

/// Props behind [`GoalPeriod`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalPeriodProps {
    /// First instant of the period.
    pub starts_at: DateTime<Utc>,
    /// End of the period, exclusive.
    pub ends_at: DateTime<Utc>,
}

impl Props for GoalPeriodProps {
    fn validate(&self) -> DomainResult<()> {
        first_failure([(
            self.starts_at < self.ends_at,
            "Målperiodens start måste vara före dess slut",
        )])
    }
}

/// The half-open window `[starts_at, ends_at)` a goal runs over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GoalPeriod(ValueObject<GoalPeriodProps>);

impl GoalPeriod {
    /// Validates a period.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` unless `starts_at < ends_at`.
    pub fn create(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> DomainResult<Self> {
        ValueObject::create(GoalPeriodProps { starts_at, ends_at }).map(Self)
    }

    /// First instant of the period.
    #[must_use]
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.0.props().starts_at
    }

    /// End of the period, exclusive.
    #[must_use]
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.0.props().ends_at
    }

    /// `true` if `at` falls inside the period.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.starts_at() <= at && at < self.ends_at()
    }
}

/// Lifecycle of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// Open for progress.
    Active,
    /// Progress reached the target.
    Achieved,
    /// Called off; accepts nothing more.
    Cancelled,
}

impl GoalStatus {
    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Achieved => "achieved",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
