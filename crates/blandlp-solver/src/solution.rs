use crate::dictionary::Dictionary;
use crate::partition::Partition;

/// The result of solving an LP problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Number of pivots performed across both phases
    pub pivots: usize,
    /// Optimal objective value (+inf when unbounded, -inf when infeasible)
    pub objective_value: f64,
    /// Optimal values of the original variables
    pub values: Vec<f64>,
    /// Slack of each constraint at the optimum
    pub slacks: Vec<f64>,
    /// Terminal dictionary over the original and slack columns
    pub dictionary: Option<Dictionary>,
    /// Basic columns of the terminal dictionary, ascending
    pub basic: Vec<usize>,
    /// Nonbasic columns of the terminal dictionary, ascending
    pub nonbasic: Vec<usize>,
    /// Sensitivity information
    pub analysis: Analysis,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The objective can grow without bound
    Unbounded,
}

/// Dual information read off the optimal dictionary
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    /// Shadow price of each constraint: objective gain per unit of extra rhs
    pub shadow_prices: Vec<f64>,
    /// Reduced cost of each original variable; zero for basic variables,
    /// otherwise the (non-positive) change in objective per unit forced in
    pub reduced_costs: Vec<f64>,
    /// Constraints with no slack left at the optimum
    pub binding_constraints: Vec<usize>,
}

impl Solution {
    pub(crate) fn optimal(
        dictionary: Dictionary,
        partition: &Partition,
        num_variables: usize,
        pivots: usize,
        tolerance: f64,
    ) -> Self {
        let mut values = dictionary.basic_solution(partition);
        let slacks = values.split_off(num_variables);
        let analysis = Analysis::from_dictionary(&dictionary, num_variables, &slacks, tolerance);

        Self {
            status: SolutionStatus::Optimal,
            pivots,
            objective_value: dictionary.value(),
            values,
            slacks,
            basic: partition.basic().to_vec(),
            nonbasic: partition.nonbasic().to_vec(),
            dictionary: Some(dictionary),
            analysis,
        }
    }

    pub(crate) fn infeasible(pivots: usize) -> Self {
        Self::terminal(SolutionStatus::Infeasible, f64::NEG_INFINITY, pivots)
    }

    pub(crate) fn unbounded(pivots: usize) -> Self {
        Self::terminal(SolutionStatus::Unbounded, f64::INFINITY, pivots)
    }

    fn terminal(status: SolutionStatus, objective_value: f64, pivots: usize) -> Self {
        Self {
            status,
            pivots,
            objective_value,
            values: Vec::new(),
            slacks: Vec::new(),
            dictionary: None,
            basic: Vec::new(),
            nonbasic: Vec::new(),
            analysis: Analysis::default(),
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}

impl Analysis {
    fn from_dictionary(dictionary: &Dictionary, num_variables: usize, slacks: &[f64], tolerance: f64) -> Self {
        let costs = dictionary.reduced_costs();

        // The reduced cost of slack i is minus the dual value of constraint i.
        // `0.0 - x` instead of `-x` so zero prices don't print as -0.
        let shadow_prices = (0..slacks.len()).map(|i| 0.0 - costs[num_variables + i]).collect();
        let reduced_costs = costs.iter().take(num_variables).copied().collect();
        let binding_constraints = slacks
            .iter()
            .enumerate()
            .filter(|&(_, s)| s.abs() <= tolerance)
            .map(|(i, _)| i)
            .collect();

        Self {
            shadow_prices,
            reduced_costs,
            binding_constraints,
        }
    }
}
