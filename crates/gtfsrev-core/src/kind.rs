//! Entity kinds and their declared foreign-key dependencies

use serde::{Deserialize, Serialize};
use std::fmt;

/// A category of record within a revision.
///
/// Each kind declares which other kinds its rows reference by foreign key.
/// The [`EntityCatalog`](crate::EntityCatalog) turns those edges into the
/// delete and write orders used when a revision is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Agency,
    Stop,
    Calendar,
    CalendarDate,
    Route,
    TripPattern,
    Trip,
    Block,
    Frequency,
    FareAttribute,
    FareRule,
    Transfer,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [EntityKind; 12] = [
        EntityKind::Agency,
        EntityKind::Stop,
        EntityKind::Calendar,
        EntityKind::CalendarDate,
        EntityKind::Route,
        EntityKind::TripPattern,
        EntityKind::Trip,
        EntityKind::Block,
        EntityKind::Frequency,
        EntityKind::FareAttribute,
        EntityKind::FareRule,
        EntityKind::Transfer,
    ];

    /// The kinds this kind references by foreign key.
    ///
    /// Rows of a dependency must exist before this kind's rows are written,
    /// and must be deleted after this kind's rows when tearing down a
    /// revision.
    pub fn dependencies(&self) -> &'static [EntityKind] {
        match self {
            EntityKind::Agency => &[],
            EntityKind::Stop => &[],
            EntityKind::Calendar => &[],
            EntityKind::CalendarDate => &[EntityKind::Calendar],
            EntityKind::Route => &[EntityKind::Agency],
            EntityKind::TripPattern => &[EntityKind::Route, EntityKind::Stop],
            EntityKind::Trip => &[
                EntityKind::Route,
                EntityKind::Calendar,
                EntityKind::TripPattern,
            ],
            EntityKind::Block => &[EntityKind::Trip, EntityKind::Calendar],
            EntityKind::Frequency => &[EntityKind::Trip],
            EntityKind::FareAttribute => &[],
            EntityKind::FareRule => &[EntityKind::FareAttribute, EntityKind::Route],
            EntityKind::Transfer => &[EntityKind::Stop],
        }
    }

    /// Stable lowercase name, used for store keys and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Agency => "agency",
            EntityKind::Stop => "stop",
            EntityKind::Calendar => "calendar",
            EntityKind::CalendarDate => "calendar_date",
            EntityKind::Route => "route",
            EntityKind::TripPattern => "trip_pattern",
            EntityKind::Trip => "trip",
            EntityKind::Block => "block",
            EntityKind::Frequency => "frequency",
            EntityKind::FareAttribute => "fare_attribute",
            EntityKind::FareRule => "fare_rule",
            EntityKind::Transfer => "transfer",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
