//! Demo scenarios around Santa Cruz de la Sierra.
//!
//! Every scenario has as many trucks as silos.

use silo_planner::geo::GeoPoint;

/// Central hub used by every scenario.
pub const HUB: (f64, f64) = (-17.783375, -63.182061);

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub silos: &'static [(f64, f64)],
    pub trucks: &'static [(f64, f64)],
}

impl Scenario {
    pub fn hub(&self) -> GeoPoint {
        GeoPoint::hub(HUB.0, HUB.1)
    }

    pub fn silos(&self) -> Vec<GeoPoint> {
        numbered(self.silos, GeoPoint::silo)
    }

    pub fn trucks(&self) -> Vec<GeoPoint> {
        numbered(self.trucks, GeoPoint::truck)
    }
}

fn numbered(coords: &[(f64, f64)], make: fn(u32, f64, f64) -> GeoPoint) -> Vec<GeoPoint> {
    coords
        .iter()
        .enumerate()
        .map(|(i, &(lat, lng))| make(i as u32 + 1, lat, lng))
        .collect()
}

pub const SMALL: Scenario = Scenario {
    name: "small",
    silos: &[(-17.790000, -63.170000), (-17.775000, -63.175000), (-17.795000, -63.195000)],
    trucks: &[(-17.788000, -63.168000), (-17.772000, -63.180000), (-17.798000, -63.190000)],
};

pub const MEDIUM: Scenario = Scenario {
    name: "medium",
    silos: &[
        (-17.790000, -63.170000),
        (-17.775000, -63.175000),
        (-17.795000, -63.195000),
        (-17.770000, -63.185000),
        (-17.800000, -63.178000),
    ],
    trucks: &[
        (-17.788000, -63.168000),
        (-17.772000, -63.180000),
        (-17.798000, -63.190000),
        (-17.768000, -63.188000),
        (-17.802000, -63.175000),
    ],
};

pub const LARGE: Scenario = Scenario {
    name: "large",
    silos: &[
        (-17.750000, -63.150000),
        (-17.820000, -63.140000),
        (-17.760000, -63.220000),
        (-17.800000, -63.200000),
        (-17.770000, -63.160000),
        (-17.790000, -63.170000),
        (-17.795000, -63.210000),
        (-17.765000, -63.190000),
    ],
    trucks: &[
        (-17.755000, -63.155000),
        (-17.815000, -63.145000),
        (-17.765000, -63.215000),
        (-17.805000, -63.195000),
        (-17.775000, -63.165000),
        (-17.785000, -63.175000),
        (-17.800000, -63.205000),
        (-17.770000, -63.185000),
    ],
};

/// Trucks parked far from the silo a greedy pick would give them.
pub const ASYMMETRIC: Scenario = Scenario {
    name: "asymmetric",
    silos: &[
        (-17.750000, -63.150000),
        (-17.785000, -63.180000),
        (-17.820000, -63.210000),
        (-17.775000, -63.185000),
    ],
    trucks: &[
        (-17.820000, -63.150000),
        (-17.750000, -63.210000),
        (-17.788000, -63.175000),
        (-17.770000, -63.190000),
    ],
};

pub const ALL: &[Scenario] = &[SMALL, MEDIUM, LARGE, ASYMMETRIC];
