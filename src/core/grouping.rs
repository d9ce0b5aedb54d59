use crate::domain::model::{
    AggregationResult, Direction, DirectionId, DirectionOutcome, DirectionRating, DirectionSummary,
    UniversityDirections, UniversityGroup, UniversityId,
};
use std::collections::HashMap;

/// Row types that can be placed inside a [`UniversityGroup`].
pub trait GroupRow {
    fn direction_id(&self) -> DirectionId;
}

impl GroupRow for DirectionRating {
    fn direction_id(&self) -> DirectionId {
        self.id
    }
}

impl GroupRow for DirectionSummary {
    fn direction_id(&self) -> DirectionId {
        self.id
    }
}

struct UniversityHeader {
    id: UniversityId,
    name: String,
    full_name: String,
}

impl From<&Direction> for UniversityHeader {
    fn from(direction: &Direction) -> Self {
        Self {
            id: direction.university_id,
            name: direction.university_name.clone(),
            full_name: direction.university_full_name.clone(),
        }
    }
}

/// Groups rating outcomes by owning university.
///
/// Groups come out ordered by university id and rows by direction id. Both
/// sorts are stable, so rows with equal keys keep their input order.
pub fn group_outcomes(outcomes: Vec<DirectionOutcome>) -> AggregationResult {
    let rows = outcomes.into_iter().map(|outcome| {
        let header = UniversityHeader::from(&outcome.direction);
        (header, DirectionRating::from(outcome))
    });

    AggregationResult {
        groups: group_rows(rows),
    }
}

/// Same ordering as [`group_outcomes`], for listings without ratings.
pub fn group_directions(directions: Vec<Direction>) -> Vec<UniversityDirections> {
    let rows = directions.into_iter().map(|direction| {
        let header = UniversityHeader::from(&direction);
        let summary = DirectionSummary {
            id: direction.id,
            name: direction.name,
        };
        (header, summary)
    });

    group_rows(rows)
}

fn group_rows<T, I>(rows: I) -> Vec<UniversityGroup<T>>
where
    T: GroupRow,
    I: IntoIterator<Item = (UniversityHeader, T)>,
{
    let mut by_university: HashMap<UniversityId, UniversityGroup<T>> = HashMap::new();

    for (header, row) in rows {
        by_university
            .entry(header.id)
            .or_insert_with(|| UniversityGroup {
                university_id: header.id,
                university_name: header.name,
                university_full_name: header.full_name,
                directions: Vec::new(),
            })
            .directions
            .push(row);
    }

    // HashMap iteration order is arbitrary; never let it leak into output.
    let mut groups: Vec<UniversityGroup<T>> = by_university.into_values().collect();
    groups.sort_by_key(|group| group.university_id);
    for group in &mut groups {
        group.directions.sort_by_key(|row| row.direction_id());
    }

    groups
}
