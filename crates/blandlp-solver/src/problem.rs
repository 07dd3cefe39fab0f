use nalgebra::{DMatrix, DVector};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    #[error("Problem has no constraints")]
    NoConstraints,
    #[error("Problem has no variables")]
    NoVariables,
    #[error("Constraint row {row} has {found} coefficients, expected {expected}")]
    RowLength { row: usize, expected: usize, found: usize },
    #[error("Right-hand side has {found} entries but there are {expected} constraint rows")]
    RhsLength { expected: usize, found: usize },
    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),
}

/// A linear program in standard form:
///
/// ```text
/// maximize    costsᵀ x
/// subject to  coefficients · x <= rhs
///             x >= 0
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    /// Objective coefficients, one per variable
    costs: Vec<f64>,
    /// Constraint matrix, one row per constraint
    coefficients: Vec<Vec<f64>>,
    /// Right-hand side, one entry per constraint
    rhs: Vec<f64>,
}

impl LpProblem {
    pub fn new(costs: Vec<f64>, coefficients: Vec<Vec<f64>>, rhs: Vec<f64>) -> Result<Self, ProblemError> {
        let problem = Self { costs, coefficients, rhs };
        problem.validate()?;
        Ok(problem)
    }

    /// Check the dimensions and entries. Deserialized problems bypass `new`,
    /// so the solver calls this again before solving.
    pub fn validate(&self) -> Result<(), ProblemError> {
        let n = self.costs.len();
        let m = self.coefficients.len();

        if n == 0 {
            return Err(ProblemError::NoVariables);
        }
        if m == 0 {
            return Err(ProblemError::NoConstraints);
        }
        if self.rhs.len() != m {
            return Err(ProblemError::RhsLength { expected: m, found: self.rhs.len() });
        }
        for (row, coefs) in self.coefficients.iter().enumerate() {
            if coefs.len() != n {
                return Err(ProblemError::RowLength { row, expected: n, found: coefs.len() });
            }
        }

        if !self.costs.iter().all(|x| x.is_finite()) {
            return Err(ProblemError::NonFinite("costs"));
        }
        if !self.coefficients.iter().flatten().all(|x| x.is_finite()) {
            return Err(ProblemError::NonFinite("coefficients"));
        }
        if !self.rhs.iter().all(|x| x.is_finite()) {
            return Err(ProblemError::NonFinite("rhs"));
        }
        Ok(())
    }

    pub fn num_variables(&self) -> usize {
        self.costs.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.coefficients.len()
    }

    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn coefficients(&self) -> &[Vec<f64>] {
        &self.coefficients
    }

    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    /// Whether the all-slack starting basis is feasible (no negative rhs).
    pub fn is_origin_feasible(&self) -> bool {
        self.rhs.iter().all(|&b| b >= 0.0)
    }

    /// The slack-augmented system `[A | I]`, `b`, `[c; 0]`.
    pub(crate) fn augmented(&self) -> (DMatrix<f64>, DVector<f64>, DVector<f64>) {
        let n = self.num_variables();
        let m = self.num_constraints();

        let a = DMatrix::from_fn(m, n + m, |i, j| {
            if j < n {
                self.coefficients[i][j]
            } else if j - n == i {
                1.0
            } else {
                0.0
            }
        });
        let b = DVector::from_column_slice(&self.rhs);
        let c = DVector::from_fn(n + m, |j, _| if j < n { self.costs[j] } else { 0.0 });

        (a, b, c)
    }
}
