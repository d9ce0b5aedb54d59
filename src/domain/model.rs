use crate::utils::error::{SourceError, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniversityId(pub u32);

impl fmt::Display for DirectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UniversityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A university program together with the university that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Direction {
    pub id: DirectionId,
    pub name: String,
    pub university_id: UniversityId,
    pub university_name: String,
    pub university_full_name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct University {
    pub id: UniversityId,
    pub name: String,
    pub full_name: String,
}

/// Identifier of an applicant inside external rating lists (SNILS).
///
/// The aggregation engine treats the value as opaque; [`NationalId::parse_snils`]
/// is for callers that accept it from users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NationalId(String);

impl NationalId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parses and validates a SNILS, accepting `112-233-445 95` and `11223344595`.
    pub fn parse_snils(raw: &str) -> Result<Self, ValidationError> {
        let digits: String = raw.chars().filter(|c| *c != '-' && *c != ' ').collect();
        if digits.len() != 11 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::Format(raw.to_string()));
        }

        let values: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
        let number = values[..9].iter().fold(0u32, |acc, d| acc * 10 + d);
        // Numbers up to 001-001-998 were issued before control sums existed.
        if number > 1_001_998 {
            let expected = snils_control_sum(&values[..9]);
            let actual = values[9] * 10 + values[10];
            if expected != actual {
                return Err(ValidationError::Checksum {
                    value: raw.to_string(),
                    expected,
                    actual,
                });
            }
        }

        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Only the ASCII digits, used to compare IDs written in different formats.
    pub fn digits(&self) -> String {
        self.0.chars().filter(|c| c.is_ascii_digit()).collect()
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn snils_control_sum(digits: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (9 - i as u32))
        .sum();

    match sum {
        0..=99 => sum,
        100 | 101 => 0,
        _ => {
            let rest = sum % 101;
            if rest == 100 {
                0
            } else {
                rest
            }
        }
    }
}

/// Standing of an applicant in one rating list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub position: u32,
    pub score: u32,
    pub priority_one_upper: u32,
    pub submitted_consent_upper: u32,
    pub budget_places: u32,
}

/// Classified result of querying one rating list.
#[derive(Debug)]
pub enum ParsingOutcome {
    Found(RatingRecord),
    NotFound,
    Error(SourceError),
}

impl ParsingOutcome {
    /// Numeric fields to render; `NotFound` renders as all zeros.
    pub fn record(&self) -> Option<RatingRecord> {
        match self {
            ParsingOutcome::Found(record) => Some(*record),
            ParsingOutcome::NotFound => Some(RatingRecord::default()),
            ParsingOutcome::Error(_) => None,
        }
    }
}

impl From<Result<RatingRecord, SourceError>> for ParsingOutcome {
    fn from(result: Result<RatingRecord, SourceError>) -> Self {
        match result {
            Ok(record) => ParsingOutcome::Found(record),
            Err(SourceError::NotListed) => ParsingOutcome::NotFound,
            Err(err) => ParsingOutcome::Error(err),
        }
    }
}

/// A direction paired with its (non-error) rating list outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionOutcome {
    pub direction: Direction,
    pub record: RatingRecord,
    pub listed: bool,
}

impl DirectionOutcome {
    pub fn found(direction: Direction, record: RatingRecord) -> Self {
        Self {
            direction,
            record,
            listed: true,
        }
    }

    pub fn not_found(direction: Direction) -> Self {
        Self {
            direction,
            record: RatingRecord::default(),
            listed: false,
        }
    }
}

/// Rendered row of a university group in an aggregation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionRating {
    pub id: DirectionId,
    pub name: String,
    pub position: u32,
    pub score: u32,
    pub priority_one_upper: u32,
    pub submitted_consent_upper: u32,
    pub budget_places: u32,
    pub listed: bool,
}

impl From<DirectionOutcome> for DirectionRating {
    fn from(outcome: DirectionOutcome) -> Self {
        Self {
            id: outcome.direction.id,
            name: outcome.direction.name,
            position: outcome.record.position,
            score: outcome.record.score,
            priority_one_upper: outcome.record.priority_one_upper,
            submitted_consent_upper: outcome.record.submitted_consent_upper,
            budget_places: outcome.record.budget_places,
            listed: outcome.listed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionSummary {
    pub id: DirectionId,
    pub name: String,
}

/// Directions of one university, ordered by direction id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversityGroup<T> {
    pub university_id: UniversityId,
    pub university_name: String,
    pub university_full_name: String,
    pub directions: Vec<T>,
}

pub type UniversityDirections = UniversityGroup<DirectionSummary>;
pub type UniversityRating = UniversityGroup<DirectionRating>;

/// Groups ordered by ascending university id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregationResult {
    pub groups: Vec<UniversityRating>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of direction rows across every group.
    pub fn direction_count(&self) -> usize {
        self.groups.iter().map(|g| g.directions.len()).sum()
    }
}
