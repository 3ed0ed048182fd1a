//! Roster views over stored snapshots: search, filter, sort.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use super::player::{PlayerSnapshot, School};

/// Sort key used when none of the rank fields is known.
const UNRANKED: u32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitFilter {
    #[default]
    All,
    Committed,
    InPortal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    School,
    #[default]
    Rank,
    Rating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Filter and sort options for a roster listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RosterQuery {
    pub search: Option<String>,
    pub position: Option<String>,
    pub status: CommitFilter,
    pub sort: SortField,
    pub order: SortOrder,
}

impl RosterQuery {
    /// Apply filters then sorting, returning a new list.
    pub fn apply(&self, players: &[PlayerSnapshot]) -> Vec<PlayerSnapshot> {
        let term = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);
        let position = self
            .position
            .as_deref()
            .filter(|p| !p.is_empty() && *p != "all");

        let mut filtered: Vec<PlayerSnapshot> = players
            .iter()
            .filter(|p| term.as_deref().is_none_or(|t| matches_search(p, t)))
            .filter(|p| position.is_none_or(|pos| p.position.as_deref() == Some(pos)))
            .filter(|p| match self.status {
                CommitFilter::All => true,
                CommitFilter::Committed => p.is_committed(),
                CommitFilter::InPortal => !p.is_committed(),
            })
            .cloned()
            .collect();

        filtered.sort_by(|a, b| {
            let ord = compare(a, b, self.sort);
            match self.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        filtered
    }
}

fn matches_search(player: &PlayerSnapshot, term: &str) -> bool {
    let hit = |value: Option<&str>| value.is_some_and(|v| v.to_lowercase().contains(term));
    hit(Some(&player.name))
        || hit(player.to_school.as_ref().map(|s| s.name.as_str()))
        || hit(player.from_school.as_ref().map(|s| s.name.as_str()))
}

/// School shown for a player: destination if committed, else origin.
fn display_school(player: &PlayerSnapshot) -> &str {
    player
        .to_school
        .as_ref()
        .or(player.from_school.as_ref())
        .map_or("", |s| s.name.as_str())
}

fn compare(a: &PlayerSnapshot, b: &PlayerSnapshot, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name.cmp(&b.name),
        SortField::School => display_school(a).cmp(display_school(b)),
        SortField::Rank => a
            .national_rank
            .unwrap_or(UNRANKED)
            .cmp(&b.national_rank.unwrap_or(UNRANKED)),
        SortField::Rating => a
            .rating
            .unwrap_or(0.0)
            .total_cmp(&b.rating.unwrap_or(0.0)),
    }
}

/// Distinct positions, sorted.
pub fn unique_positions(players: &[PlayerSnapshot]) -> Vec<String> {
    players
        .iter()
        .filter_map(|p| p.position.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct origin and destination schools, sorted by name.
///
/// A school listed once without a logo and once with one keeps the logo.
pub fn unique_schools(players: &[PlayerSnapshot]) -> Vec<School> {
    let mut schools: BTreeMap<&str, &School> = BTreeMap::new();
    for school in players
        .iter()
        .flat_map(|p| [p.from_school.as_ref(), p.to_school.as_ref()])
        .flatten()
    {
        let entry = schools.entry(school.name.as_str()).or_insert(school);
        if entry.logo_url.is_none() {
            *entry = school;
        }
    }
    schools.into_values().cloned().collect()
}
