use nalgebra::{DMatrix, DVector};

use crate::partition::Partition;
use crate::simplex::SolveError;

/// The constraint system and objective expressed relative to a basis.
///
/// A dictionary is never modified in place: every pivot produces a new one.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    /// Transformed constraint matrix `B⁻¹A`
    constraints: DMatrix<f64>,
    /// Transformed right-hand side `B⁻¹b`, the values of the basic variables
    rhs: DVector<f64>,
    /// Objective row; positive entries can still improve the objective
    reduced_costs: DVector<f64>,
    /// Objective value of the current basic solution
    value: f64,
}

impl Dictionary {
    pub fn new(constraints: DMatrix<f64>, rhs: DVector<f64>, reduced_costs: DVector<f64>) -> Self {
        debug_assert_eq!(constraints.nrows(), rhs.len());
        debug_assert_eq!(constraints.ncols(), reduced_costs.len());
        Self {
            constraints,
            rhs,
            reduced_costs,
            value: 0.0,
        }
    }

    pub fn constraints(&self) -> &DMatrix<f64> {
        &self.constraints
    }

    pub fn rhs(&self) -> &DVector<f64> {
        &self.rhs
    }

    pub fn reduced_costs(&self) -> &DVector<f64> {
        &self.reduced_costs
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn num_rows(&self) -> usize {
        self.constraints.nrows()
    }

    pub fn num_columns(&self) -> usize {
        self.constraints.ncols()
    }

    /// Coefficients of one variable across all rows.
    pub fn column(&self, j: usize) -> DVector<f64> {
        self.constraints.column(j).into_owned()
    }

    /// Recompute the dictionary for `partition`, which already holds the
    /// entering variable in place of the leaving one.
    ///
    /// The basis inverse is computed from scratch each time.
    pub fn pivot(&self, partition: &Partition) -> Result<Self, SolveError> {
        let basic = partition.basic();
        debug_assert_eq!(basic.len(), self.num_rows());

        let inverse = self
            .constraints
            .select_columns(basic)
            .try_inverse()
            .ok_or_else(|| SolveError::SingularBasis { basic: basic.to_vec() })?;

        let constraints = &inverse * &self.constraints;
        let rhs = &inverse * &self.rhs;

        // Costs of the new basic variables, taken from the old objective row.
        let basic_costs = gather(&self.reduced_costs, basic);
        let value = self.value + basic_costs.dot(&rhs);
        let reduced_costs = priced_out(&self.reduced_costs, &constraints, &basic_costs, basic);

        Ok(Self {
            constraints,
            rhs,
            reduced_costs,
            value,
        })
    }

    /// Swap in a new objective, priced against the current basis.
    pub fn with_objective(&self, costs: &DVector<f64>, partition: &Partition) -> Self {
        let basic = partition.basic();
        let basic_costs = gather(costs, basic);

        Self {
            constraints: self.constraints.clone(),
            rhs: self.rhs.clone(),
            reduced_costs: priced_out(costs, &self.constraints, &basic_costs, basic),
            value: basic_costs.dot(&self.rhs),
        }
    }

    /// Copy with the rhs entries selected by `zero(row, b)` set to exactly zero.
    pub fn with_rhs_zeroed<F>(&self, zero: F) -> Self
    where
        F: Fn(usize, f64) -> bool,
    {
        let mut rhs = self.rhs.clone();
        for (row, b) in rhs.iter_mut().enumerate() {
            if zero(row, *b) {
                *b = 0.0;
            }
        }
        Self {
            constraints: self.constraints.clone(),
            rhs,
            reduced_costs: self.reduced_costs.clone(),
            value: self.value,
        }
    }

    /// Prepend a column with every entry set to `coefficient`.
    pub fn with_leading_column(&self, coefficient: f64, reduced_costs: DVector<f64>) -> Self {
        debug_assert_eq!(reduced_costs.len(), self.num_columns() + 1);
        Self {
            constraints: self.constraints.clone().insert_column(0, coefficient),
            rhs: self.rhs.clone(),
            reduced_costs,
            value: self.value,
        }
    }

    /// Drop the first column and its reduced cost.
    pub fn without_leading_column(&self) -> Self {
        Self {
            constraints: self.constraints.clone().remove_column(0),
            rhs: self.rhs.clone(),
            reduced_costs: self.reduced_costs.clone().remove_row(0),
            value: self.value,
        }
    }

    /// Values of every column in the basic solution: basic variables take
    /// their rhs entry, nonbasic ones are zero.
    pub fn basic_solution(&self, partition: &Partition) -> Vec<f64> {
        let mut values = vec![0.0; self.num_columns()];
        for (row, &j) in partition.basic().iter().enumerate() {
            values[j] = self.rhs[row];
        }
        values
    }
}

fn gather(costs: &DVector<f64>, basic: &[usize]) -> DVector<f64> {
    DVector::from_iterator(basic.len(), basic.iter().map(|&j| costs[j]))
}

/// `c - Aᵀ c_B`, with the basic entries pinned to exactly zero.
fn priced_out(
    costs: &DVector<f64>,
    constraints: &DMatrix<f64>,
    basic_costs: &DVector<f64>,
    basic: &[usize],
) -> DVector<f64> {
    let mut reduced = costs - constraints.tr_mul(basic_costs);
    for &j in basic {
        reduced[j] = 0.0;
    }
    reduced
}
