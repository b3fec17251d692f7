//! Station identity and the configuration registry the merge run iterates.
//!
//! Station positions are deliberately absent here: a station's location is a
//! property of its observation series (stations relocate), so coordinates
//! travel with [`crate::StationSeries`] samples instead.

use serde::{Deserialize, Serialize};

/// A surface observation station, as configured for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    /// Operator-assigned station identifier (e.g., "06041").
    pub id: String,
    /// Human-readable station name (e.g., "Skagen Fyr").
    pub name: String,
}

impl Station {
    /// Creates a station from its identifier and display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Station {
        Station {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The static station table for a run.
///
/// One registry instance is built up front and passed by reference to every
/// component that needs station identity; nothing is discovered from the
/// filesystem or rebuilt per stage.
///
/// # Examples
///
/// ```
/// use geowind::StationRegistry;
///
/// let registry = StationRegistry::from_pairs(&[
///     ("06041", "Skagen Fyr"),
///     ("06052", "Thyborøn"),
/// ]);
/// assert_eq!(registry.len(), 2);
/// assert_eq!(registry.get("06052").unwrap().name, "Thyborøn");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationRegistry {
    stations: Vec<Station>,
}

impl StationRegistry {
    /// Builds a registry from an explicit station list.
    pub fn new(stations: Vec<Station>) -> StationRegistry {
        StationRegistry { stations }
    }

    /// Builds a registry from `(id, name)` pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> StationRegistry {
        StationRegistry {
            stations: pairs
                .iter()
                .map(|(id, name)| Station::new(*id, *name))
                .collect(),
        }
    }

    /// Looks a station up by identifier.
    pub fn get(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    /// Iterates stations in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    /// Number of configured stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
