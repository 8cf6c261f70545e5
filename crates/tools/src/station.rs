//! Swap station directory
//!
//! Holds station data pushed by the client on page load (distances and
//! traffic-aware ETAs are computed client-side). Nothing is hardcoded:
//! an empty cache produces a "data not loaded yet" reply.
//!
//! - Nearest = smallest distance (km)
//! - Best = smallest ETA among stations with enough batteries

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::ToolReply;

/// One swap station as reported by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationInfo {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub batteries: u32,
    /// Straight-line or routed distance in km
    #[serde(default)]
    pub distance_km: f64,
    /// Traffic-aware travel time in minutes, when the client had route data
    #[serde(default)]
    pub eta_minutes: Option<f64>,
}

impl StationInfo {
    /// Station names arrive as "Operator - Area"; speak only the area part
    pub fn short_name(&self) -> &str {
        match self.name.rsplit_once(" - ") {
            Some((_, short)) => short,
            None => &self.name,
        }
    }
}

/// Client-pushed station data plus the caller's location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationSnapshot {
    #[serde(default)]
    pub stations: Vec<StationInfo>,
    #[serde(default)]
    pub user_location: Value,
}

/// Per-process cache of the latest station snapshot
#[derive(Default)]
pub struct StationDirectory {
    snapshot: RwLock<Option<StationSnapshot>>,
}

impl StationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached snapshot with fresh client data
    pub fn update(&self, snapshot: StationSnapshot) {
        tracing::info!(stations = snapshot.stations.len(), "Station cache updated");
        *self.snapshot.write() = Some(snapshot);
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot
            .read()
            .as_ref()
            .is_some_and(|s| !s.stations.is_empty())
    }

    /// The station directions should point at, if data is loaded
    pub fn best(&self, min_batteries: u32) -> Option<StationInfo> {
        let snapshot = self.snapshot.read().clone()?;
        Self::rank(&snapshot.stations, min_batteries).1
    }

    /// Find the nearest and best stations
    pub fn find(&self, min_batteries: u32, limit: usize) -> ToolReply {
        let snapshot = match self.snapshot.read().clone() {
            Some(s) if !s.stations.is_empty() => s,
            _ => {
                tracing::warn!("Station lookup requested before client pushed data");
                return ToolReply::with_payload(
                    "Maaf kijiye, station ka data abhi load nahi hua hai. \
                     Kripya thodi der baad try karein.",
                    json!({
                        "stations": [],
                        "nearest_station": null,
                        "best_station": null,
                        "total_nearby": 0,
                        "has_eta_data": false,
                    }),
                );
            },
        };

        let (by_distance, best) = Self::rank(&snapshot.stations, min_batteries);
        let nearest = by_distance.first().cloned();

        let total = snapshot.stations.len();
        let speech = Self::speech(total, nearest.as_ref(), best.as_ref());
        let nearby: Vec<&StationInfo> = by_distance.iter().take(limit).collect();

        tracing::info!(
            total,
            nearest = nearest.as_ref().map(|s| s.name.as_str()).unwrap_or("none"),
            best = best.as_ref().map(|s| s.name.as_str()).unwrap_or("none"),
            "Station lookup complete"
        );

        ToolReply::with_payload(
            speech,
            json!({
                "stations": nearby,
                "nearest_station": nearest,
                "best_station": best,
                "total_nearby": total,
                "user_location": snapshot.user_location,
                "has_eta_data": true,
            }),
        )
    }

    /// Sort by distance and pick the best candidate: lowest ETA with
    /// stock, else nearest with stock
    fn rank(
        stations: &[StationInfo],
        min_batteries: u32,
    ) -> (Vec<StationInfo>, Option<StationInfo>) {
        let mut by_distance = stations.to_vec();
        by_distance.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

        let mut available_with_eta: Vec<&StationInfo> = by_distance
            .iter()
            .filter(|s| s.batteries >= min_batteries && s.eta_minutes.is_some())
            .collect();
        available_with_eta.sort_by(|a, b| {
            a.eta_minutes
                .unwrap_or(f64::MAX)
                .total_cmp(&b.eta_minutes.unwrap_or(f64::MAX))
        });

        let best = available_with_eta.first().map(|s| (*s).clone()).or_else(|| {
            by_distance
                .iter()
                .find(|s| s.batteries >= min_batteries)
                .cloned()
        });
        (by_distance, best)
    }

    fn speech(total: usize, nearest: Option<&StationInfo>, best: Option<&StationInfo>) -> String {
        let Some(nearest) = nearest else {
            return "Maaf kijiye, aapke aas-paas koi station nahi mila.".to_string();
        };

        match best {
            Some(best) if best.eta_minutes.is_some() => {
                let best_eta = best.eta_minutes.unwrap_or(0.0) as i64;
                if best.id == nearest.id {
                    format!(
                        "Main dekh rahi hu ki aapke paas {total} station hain. \
                         Sabse nazdeeki aur best option {} hai jo sirf {best_eta} minute door hai \
                         aur wahan {} battery available hain. Kya aapko directions chahiye?",
                        best.short_name(),
                        best.batteries
                    )
                } else {
                    match nearest.eta_minutes {
                        Some(nearest_eta) => format!(
                            "Aapke sabse paas waala station {} hai jo {} minute door hai, \
                             lekin traffic ke hisaab se best option {} hai jo {best_eta} minute \
                             mein pahunch sakte hain aur wahan {} battery available hain.",
                            nearest.short_name(),
                            nearest_eta as i64,
                            best.short_name(),
                            best.batteries
                        ),
                        None => format!(
                            "Sabse nazdeeki station {} hai jo {:.1} km door hai. \
                             Lekin best option {} hai jo {best_eta} minute mein pahunch sakte \
                             hain aur wahan {} battery available hain.",
                            nearest.short_name(),
                            nearest.distance_km,
                            best.short_name(),
                            best.batteries
                        ),
                    }
                }
            },
            Some(best) => format!(
                "Aapke paas {total} station hain. Best option {} hai jo {:.1} km door hai \
                 aur wahan {} battery available hain.",
                best.short_name(),
                best.distance_km,
                best.batteries
            ),
            None => format!(
                "Maaf kijiye, abhi aas-paas ke {total} stations mein se kisi mein bhi \
                 battery available nahi hai. Kripya thodi der baad try karein."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: &str, distance: f64, eta: Option<f64>, batteries: u32) -> StationInfo {
        StationInfo {
            id: id.to_string(),
            name: format!("Swap Point - {id}"),
            lat: 28.6,
            lng: 77.2,
            batteries,
            distance_km: distance,
            eta_minutes: eta,
        }
    }

    #[test]
    fn empty_cache_asks_to_retry() {
        let directory = StationDirectory::new();
        let reply = directory.find(1, 5);
        assert!(reply.speech.contains("load nahi hua"));
        let payload = reply.payload.unwrap();
        assert_eq!(payload["total_nearby"], 0);
    }

    #[test]
    fn nearest_by_distance_best_by_eta() {
        let directory = StationDirectory::new();
        directory.update(StationSnapshot {
            stations: vec![
                station("A", 0.8, Some(12.0), 3),
                station("B", 2.1, Some(5.0), 6),
                station("C", 1.5, Some(9.0), 0),
            ],
            user_location: json!({"lat": 28.6, "lng": 77.2}),
        });
        let reply = directory.find(1, 5);
        let payload = reply.payload.unwrap();
        assert_eq!(payload["nearest_station"]["id"], "A");
        assert_eq!(payload["best_station"]["id"], "B");
        assert_eq!(payload["total_nearby"], 3);
        assert!(reply.speech.contains('B'));
    }

    #[test]
    fn best_accessor_follows_eta_ranking() {
        let directory = StationDirectory::new();
        assert!(directory.best(1).is_none());
        directory.update(StationSnapshot {
            stations: vec![
                station("A", 0.8, Some(12.0), 3),
                station("B", 2.1, Some(5.0), 6),
            ],
            user_location: Value::Null,
        });
        let best = directory.best(1).unwrap();
        assert_eq!(best.id, "B");
        assert_eq!(best.short_name(), "B");
    }

    #[test]
    fn no_stock_anywhere() {
        let directory = StationDirectory::new();
        directory.update(StationSnapshot {
            stations: vec![station("A", 0.8, Some(12.0), 0)],
            user_location: Value::Null,
        });
        let reply = directory.find(1, 5);
        assert!(reply.speech.contains("battery available nahi"));
        assert!(reply.payload.unwrap()["best_station"].is_null());
    }
}
