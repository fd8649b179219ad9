//! Geographic points handed to the engine by its callers.

use serde::{Deserialize, Serialize};

/// What a point stands for in a planning request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointRole {
    Hub,
    Silo,
    Truck,
    Order,
    Depot,
}

/// Immutable (lat, lng) coordinate with an optional per-role identifier.
///
/// Identifiers are unique within a role only. Moving an entity means
/// creating a new point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
    id: Option<u32>,
    role: PointRole,
}

impl GeoPoint {
    pub fn new(role: PointRole, lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            id: None,
            role,
        }
    }

    pub fn with_id(self, id: u32) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }

    pub fn hub(lat: f64, lng: f64) -> Self {
        Self::new(PointRole::Hub, lat, lng)
    }

    pub fn silo(id: u32, lat: f64, lng: f64) -> Self {
        Self::new(PointRole::Silo, lat, lng).with_id(id)
    }

    pub fn truck(id: u32, lat: f64, lng: f64) -> Self {
        Self::new(PointRole::Truck, lat, lng).with_id(id)
    }

    pub fn order(id: u32, lat: f64, lng: f64) -> Self {
        Self::new(PointRole::Order, lat, lng).with_id(id)
    }

    pub fn depot(lat: f64, lng: f64) -> Self {
        Self::new(PointRole::Depot, lat, lng)
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    pub fn id(&self) -> Option<u32> {
        self.id
    }

    pub fn role(&self) -> PointRole {
        self.role
    }

    /// Location as a (lat, lng) tuple.
    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_role_and_id() {
        let silo = GeoPoint::silo(3, 1.0, 2.0);
        assert_eq!(silo.role(), PointRole::Silo);
        assert_eq!(silo.id(), Some(3));
        assert_eq!(silo.coords(), (1.0, 2.0));

        let hub = GeoPoint::hub(0.5, 0.5);
        assert_eq!(hub.role(), PointRole::Hub);
        assert_eq!(hub.id(), None);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let truck = GeoPoint::truck(1, -17.78, -63.18);
        let json = serde_json::to_string(&truck).unwrap();
        assert!(json.contains("\"role\":\"truck\""));
    }
}
