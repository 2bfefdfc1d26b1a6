//! Delivery points.

use serde::{Deserialize, Serialize};

/// A delivery point, or the depot when `id == 0`.
///
/// Plain data: the instance owns the list and indexes it by id. Customer
/// lists can be read with serde (TOML, for instance).
///
/// # Examples
///
/// ```
/// use hgs_rr::models::Customer;
///
/// let depot = Customer::depot(35.0, 35.0);
/// assert!(depot.is_depot());
///
/// let c = Customer::new(1, 41.0, 49.0, 10.0).with_service_duration(2.0);
/// assert_eq!(c.demand, 10.0);
/// assert_eq!(c.service_duration, 2.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub demand: f64,
    /// Time spent on site, counted in route duration.
    #[serde(default)]
    pub service_duration: f64,
}

impl Customer {
    pub fn new(id: usize, x: f64, y: f64, demand: f64) -> Self {
        Self {
            id,
            x,
            y,
            demand,
            service_duration: 0.0,
        }
    }

    /// Depot at `(x, y)`: id 0, no demand.
    pub fn depot(x: f64, y: f64) -> Self {
        Self::new(0, x, y, 0.0)
    }

    pub fn with_service_duration(mut self, duration: f64) -> Self {
        self.service_duration = duration;
        self
    }

    pub fn is_depot(&self) -> bool {
        self.id == 0
    }

    /// Straight-line distance between the two locations.
    pub fn euclidean(&self, other: &Customer) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depot_has_no_demand() {
        let d = Customer::depot(35.0, 35.0);
        assert!(d.is_depot());
        assert_eq!(d.demand, 0.0);
        assert!(!Customer::new(3, 0.0, 0.0, 1.0).is_depot());
    }

    #[test]
    fn test_euclidean_pythagorean_triple() {
        let a = Customer::depot(1.0, 1.0);
        let b = Customer::new(1, 4.0, 5.0, 0.0);
        assert!((a.euclidean(&b) - 5.0).abs() < 1e-10);
        assert_eq!(a.euclidean(&b), b.euclidean(&a));
    }

    #[test]
    fn test_deserialize_without_service_duration() {
        let c: Customer = toml::from_str("id = 4\nx = 1.5\ny = -2.0\ndemand = 12.0").unwrap();
        assert_eq!(c, Customer::new(4, 1.5, -2.0, 12.0));

        let timed: Customer =
            toml::from_str("id = 2\nx = 0.0\ny = 0.0\ndemand = 1.0\nservice_duration = 9.0")
                .unwrap();
        assert_eq!(timed.service_duration, 9.0);
    }
}
