//! Travel-cost matrix between the depot and customers.

use crate::error::HgsError;
use crate::models::Customer;

/// Square travel-cost table indexed by location id, depot at 0.
///
/// Entries are stored row by row; `get(from, to)` need not equal
/// `get(to, from)`.
///
/// # Examples
///
/// ```
/// use hgs_rr::distance::DistanceMatrix;
/// use hgs_rr::models::Customer;
///
/// let dm = DistanceMatrix::from_customers(&[
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 3.0, 4.0, 10.0),
/// ]);
/// assert_eq!(dm.size(), 2);
/// assert!((dm.get(1, 0) - 5.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl DistanceMatrix {
    /// All-zero matrix over `size` locations.
    pub fn new(size: usize) -> Self {
        Self::from_fn(size, |_, _| 0.0)
    }

    /// Fills every cell with `cost(from, to)`.
    pub fn from_fn(size: usize, mut cost: impl FnMut(usize, usize) -> f64) -> Self {
        let cells = (0..size)
            .flat_map(|from| (0..size).map(move |to| (from, to)))
            .map(|(from, to)| cost(from, to))
            .collect();
        Self { size, cells }
    }

    /// Euclidean costs between customer coordinates, in slice order.
    pub fn from_customers(customers: &[Customer]) -> Self {
        Self::from_fn(customers.len(), |i, j| customers[i].euclidean(&customers[j]))
    }

    /// Wraps `size * size` costs given row by row.
    pub fn from_data(size: usize, cells: Vec<f64>) -> Result<Self, HgsError> {
        if cells.len() != size * size {
            return Err(HgsError::InvalidInstance(format!(
                "{} distance entries for {size} locations",
                cells.len()
            )));
        }
        Ok(Self { size, cells })
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.cells[from * self.size + to]
    }

    pub fn set(&mut self, from: usize, to: usize, cost: f64) {
        self.cells[from * self.size + to] = cost;
    }

    /// Costs leaving `from`, indexed by destination.
    pub fn row(&self, from: usize) -> &[f64] {
        &self.cells[from * self.size..(from + 1) * self.size]
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn max_distance(&self) -> f64 {
        self.cells.iter().copied().fold(0.0, f64::max)
    }

    /// Granular neighbourhoods for customers `1..size`.
    ///
    /// Customer `i` keeps its `k` cheapest destinations among the other
    /// customers; `j` kept by `i` also lists `i`, so lists can exceed `k`.
    /// Lists are sorted by id and slot 0 (depot) stays empty.
    pub fn correlated_neighbors(&self, k: usize) -> Vec<Vec<usize>> {
        let mut lists = vec![Vec::new(); self.size];
        for i in 1..self.size {
            let row = self.row(i);
            let mut closest: Vec<usize> = (1..self.size).filter(|&j| j != i).collect();
            closest.sort_by(|&a, &b| row[a].total_cmp(&row[b]));
            closest.truncate(k);
            for j in closest {
                lists[i].push(j);
                lists[j].push(i);
            }
        }
        for list in &mut lists {
            list.sort_unstable();
            list.dedup();
        }
        lists
    }
}
