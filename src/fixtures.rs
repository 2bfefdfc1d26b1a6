//! Small instances shared by unit tests.

use crate::models::{Customer, Instance};
use crate::params::{AlgorithmConfig, Params};

/// Customers `1..=n` on the x-axis at `x = i`, demand 10 each, depot at origin.
pub(crate) fn line_customers(n: usize) -> Vec<Customer> {
    let mut customers = vec![Customer::depot(0.0, 0.0)];
    for i in 1..=n {
        customers.push(Customer::new(i, i as f64, 0.0, 10.0));
    }
    customers
}

pub(crate) fn line_params(n: usize, capacity: f64, vehicles: usize) -> Params {
    line_params_with(n, capacity, vehicles, AlgorithmConfig::default().with_seed(42))
}

pub(crate) fn line_params_with(
    n: usize,
    capacity: f64,
    vehicles: usize,
    config: AlgorithmConfig,
) -> Params {
    let instance = Instance::from_customers(line_customers(n), capacity).with_vehicles(vehicles);
    Params::new(instance, config).expect("valid test instance")
}

/// Two clusters of customers on opposite sides of the depot.
///
/// Customers `1..=half` sit around (10, 0), the rest around (-10, 0).
pub(crate) fn cluster_params(n: usize, capacity: f64, vehicles: usize, config: AlgorithmConfig) -> Params {
    let half = n / 2;
    let mut customers = vec![Customer::depot(0.0, 0.0)];
    for i in 1..=n {
        let offset = (i % 5) as f64 * 0.5;
        let (x, y) = if i <= half {
            (10.0 + offset, offset)
        } else {
            (-10.0 - offset, -offset)
        };
        customers.push(Customer::new(i, x, y, 10.0));
    }
    let instance = Instance::from_customers(customers, capacity).with_vehicles(vehicles);
    Params::new(instance, config).expect("valid test instance")
}
