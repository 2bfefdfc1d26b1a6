//! Capacitated routing instance.

use crate::distance::DistanceMatrix;
use crate::error::HgsError;

use super::Customer;

/// Instance data for a capacitated vehicle routing problem.
///
/// Location 0 is the depot, locations `1..=num_clients()` are customers.
/// The fleet is homogeneous: every vehicle has the same capacity and the
/// same (optional) route duration limit.
///
/// # Examples
///
/// ```
/// use hgs_rr::models::{Customer, Instance};
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 3.0, 4.0, 10.0),
///     Customer::new(2, 6.0, 8.0, 20.0),
/// ];
/// let instance = Instance::from_customers(customers, 100.0).with_vehicles(2);
/// assert_eq!(instance.num_clients(), 2);
/// assert_eq!(instance.num_vehicles(), 2);
/// assert!((instance.distance(0, 1) - 5.0).abs() < 1e-10);
/// assert!(instance.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Instance {
    customers: Vec<Customer>,
    distances: DistanceMatrix,
    capacity: f64,
    num_vehicles: usize,
    duration_limit: Option<f64>,
}

impl Instance {
    /// Creates an instance from explicit distances.
    ///
    /// The fleet size defaults to `ceil(1.3 * total_demand / capacity) + 3`.
    pub fn new(customers: Vec<Customer>, distances: DistanceMatrix, capacity: f64) -> Self {
        let num_vehicles = default_fleet_size(&customers, capacity);
        Self {
            customers,
            distances,
            capacity,
            num_vehicles,
            duration_limit: None,
        }
    }

    /// Creates an instance with Euclidean distances between customer coordinates.
    pub fn from_customers(customers: Vec<Customer>, capacity: f64) -> Self {
        let distances = DistanceMatrix::from_customers(&customers);
        Self::new(customers, distances, capacity)
    }

    /// Sets the number of available vehicles.
    pub fn with_vehicles(mut self, num_vehicles: usize) -> Self {
        self.num_vehicles = num_vehicles;
        self
    }

    /// Sets a maximum route duration (travel plus service time).
    pub fn with_duration_limit(mut self, limit: f64) -> Self {
        self.duration_limit = Some(limit);
        self
    }

    /// Checks that the instance is internally consistent.
    pub fn validate(&self) -> Result<(), HgsError> {
        if self.customers.is_empty() {
            return Err(HgsError::InvalidInstance("missing depot".into()));
        }
        if self.distances.size() != self.customers.len() {
            return Err(HgsError::InvalidInstance(format!(
                "distance matrix has size {}, expected {}",
                self.distances.size(),
                self.customers.len()
            )));
        }
        if let Some(pos) = self
            .customers
            .iter()
            .enumerate()
            .position(|(idx, c)| c.id != idx)
        {
            return Err(HgsError::InvalidInstance(format!(
                "customer at index {pos} has id {}",
                self.customers[pos].id
            )));
        }
        if !(self.capacity > 0.0) {
            return Err(HgsError::InvalidInstance(format!(
                "capacity must be positive, got {}",
                self.capacity
            )));
        }
        if self.num_vehicles == 0 {
            return Err(HgsError::InvalidInstance("at least one vehicle is required".into()));
        }
        if let Some(limit) = self.duration_limit {
            if !(limit > 0.0) {
                return Err(HgsError::InvalidInstance(format!(
                    "duration limit must be positive, got {limit}"
                )));
            }
        }
        Ok(())
    }

    /// Returns all locations (index 0 = depot).
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Number of customers (excluding depot).
    pub fn num_clients(&self) -> usize {
        self.customers.len().saturating_sub(1)
    }

    /// Number of available vehicles.
    pub fn num_vehicles(&self) -> usize {
        self.num_vehicles
    }

    /// Vehicle capacity.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Maximum route duration, if any.
    pub fn duration_limit(&self) -> Option<f64> {
        self.duration_limit
    }

    /// Demand of location `id`.
    pub fn demand(&self, id: usize) -> f64 {
        self.customers[id].demand
    }

    /// Service duration of location `id`.
    pub fn service_duration(&self, id: usize) -> f64 {
        self.customers[id].service_duration
    }

    /// Travel cost from location `from` to location `to`.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances.get(from, to)
    }

    /// The underlying distance matrix.
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Sum of all customer demands.
    pub fn total_demand(&self) -> f64 {
        self.customers.iter().skip(1).map(|c| c.demand).sum()
    }

    /// Largest single customer demand.
    pub fn max_demand(&self) -> f64 {
        self.customers
            .iter()
            .skip(1)
            .map(|c| c.demand)
            .fold(0.0, f64::max)
    }
}

fn default_fleet_size(customers: &[Customer], capacity: f64) -> usize {
    let total: f64 = customers.iter().skip(1).map(|c| c.demand).sum();
    if capacity > 0.0 {
        (1.3 * total / capacity).ceil() as usize + 3
    } else {
        3
    }
}
