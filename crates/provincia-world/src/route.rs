//! Routes reconstructed from a flow solution.
//!
//! A route is the hop sequence one unit of flow follows from an origin
//! province to the hub, including transshipment hops inside a province
//! (e.g. `P2(land)->P2(water)->P1(water)`).

use provincia_types::{ProvinceId, TransportMode};
use rust_decimal::Decimal;

/// One step of a route: a province entered in a given mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    /// The province.
    pub province: ProvinceId,
    /// The mode used in that province.
    pub mode: TransportMode,
}

impl core::fmt::Display for Hop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}({})", self.province, self.mode)
    }
}

/// A hop sequence and the quantity it carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    /// Hops from origin to destination.
    pub hops: Vec<Hop>,
    /// Quantity carried along this route.
    pub quantity: Decimal,
}

impl Route {
    /// The first hop.
    pub fn origin(&self) -> Option<&Hop> {
        self.hops.first()
    }

    /// The last hop.
    pub fn destination(&self) -> Option<&Hop> {
        self.hops.last()
    }

    /// Number of hops.
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    /// Whether the route has no hops.
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// Modes used along the route, without repeats, in first-use order.
    pub fn modes(&self) -> Vec<TransportMode> {
        let mut modes: Vec<TransportMode> = Vec::new();
        for hop in &self.hops {
            if !modes.contains(&hop.mode) {
                modes.push(hop.mode);
            }
        }
        modes
    }
}

impl core::fmt::Display for Route {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut hops = self.hops.iter();
        if let Some(first) = hops.next() {
            write!(f, "{first}")?;
        }
        for hop in hops {
            write!(f, "->{hop}")?;
        }
        Ok(())
    }
}
