use log::{debug, info};
use nalgebra::DVector;
use thiserror::Error;

use crate::dictionary::Dictionary;
use crate::observer::{Phase, PivotEvent, PivotObserver};
use crate::partition::Partition;
use crate::pivot_rule::{select_entering, select_leaving};
use crate::problem::{LpProblem, ProblemError};
use crate::solution::Solution;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(#[from] ProblemError),
    /// The basis columns are linearly dependent. Bland's rule never produces
    /// such a basis, so this means the bookkeeping is broken or the data is
    /// numerically degenerate.
    #[error("Basis matrix over columns {basic:?} is singular")]
    SingularBasis { basic: Vec<usize> },
    #[error("Iteration limit of {0} pivots reached")]
    IterationLimit(usize),
}

/// Two-phase primal simplex solver using Bland's rule
#[derive(Debug, Clone, Copy)]
pub struct Solver {
    /// Maximum pivots across both phases, unlimited if `None`
    max_iterations: Option<usize>,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: None,
            tolerance: 1e-9,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Solve the LP problem using the two-phase simplex method
    pub fn solve(&self, problem: &LpProblem) -> Result<Solution, SolveError> {
        self.solve_with_observer(problem, &mut ())
    }

    /// Same as [`Solver::solve`], reporting every pivot to `observer`.
    pub fn solve_with_observer<O>(&self, problem: &LpProblem, observer: &mut O) -> Result<Solution, SolveError>
    where
        O: PivotObserver + ?Sized,
    {
        problem.validate()?;

        let n = problem.num_variables();
        let m = problem.num_constraints();
        let (constraints, rhs, costs) = problem.augmented();

        let mut run = Run {
            solver: *self,
            observer,
            pivots: 0,
        };

        let mut dictionary = Dictionary::new(constraints, rhs, costs.clone());
        let mut partition = Partition::slack_basis(n + m, m);

        // Phase 1: Find initial basic feasible solution
        if !problem.is_origin_feasible() {
            match run.phase1(dictionary, partition, &costs)? {
                PhaseOne::Feasible(d, p) => {
                    dictionary = d;
                    partition = p;
                }
                PhaseOne::Infeasible => {
                    info!("problem is infeasible after {} pivots", run.pivots);
                    return Ok(Solution::infeasible(run.pivots));
                }
                PhaseOne::Unbounded => {
                    info!("phase one is unbounded after {} pivots", run.pivots);
                    return Ok(Solution::unbounded(run.pivots));
                }
            }
        }

        // Phase 2: Optimize
        match run.phase2(dictionary, partition)? {
            SimplexResult::Optimal(dictionary, partition) => {
                info!("optimal value {} after {} pivots", dictionary.value(), run.pivots);
                Ok(Solution::optimal(dictionary, &partition, n, run.pivots, self.tolerance))
            }
            SimplexResult::Unbounded => {
                info!("problem is unbounded after {} pivots", run.pivots);
                Ok(Solution::unbounded(run.pivots))
            }
        }
    }
}

/// State of one solve: configuration, the caller's observer, pivot count.
struct Run<'a, O: PivotObserver + ?Sized> {
    solver: Solver,
    observer: &'a mut O,
    pivots: usize,
}

enum SimplexResult {
    Optimal(Dictionary, Partition),
    Unbounded,
}

enum PhaseOne {
    Feasible(Dictionary, Partition),
    Infeasible,
    Unbounded,
}

impl<O: PivotObserver + ?Sized> Run<'_, O> {
    /// Find a feasible basis by maximizing `-x0`, where `x0` is an auxiliary
    /// variable subtracted from every row.
    fn phase1(
        &mut self,
        dictionary: Dictionary,
        partition: Partition,
        costs: &DVector<f64>,
    ) -> Result<PhaseOne, SolveError> {
        debug!("initial dictionary is infeasible, starting phase one");

        let width = dictionary.num_columns() + 1;
        let auxiliary_costs = DVector::from_fn(width, |j, _| if j == 0 { -1.0 } else { 0.0 });
        let dictionary = dictionary.with_leading_column(-1.0, auxiliary_costs);
        let mut partition = partition.with_leading_column();

        // x0 enters in place of the most infeasible row.
        let row = most_negative(dictionary.rhs());
        let leaving = partition.basic()[row];
        let dictionary = self.pivot(&dictionary, &mut partition, Phase::One, 0, leaving)?;

        let (dictionary, mut partition) = match self.iterate(dictionary, partition, Phase::One)? {
            SimplexResult::Optimal(d, p) => (d, p),
            SimplexResult::Unbounded => return Ok(PhaseOne::Unbounded),
        };

        if dictionary.value().abs() > self.solver.tolerance {
            debug!("phase one stopped at infeasibility {}", -dictionary.value());
            return Ok(PhaseOne::Infeasible);
        }

        let dictionary = match partition.row_of(0) {
            Some(row) => self.drive_out_auxiliary(&dictionary, &mut partition, row)?,
            None => dictionary,
        };

        let partition = partition.without_leading_column();
        let dictionary = dictionary.without_leading_column().with_objective(costs, &partition);
        debug!("phase one done, feasible basis {:?}", partition.basic());

        Ok(PhaseOne::Feasible(dictionary, partition))
    }

    /// x0 can finish phase one basic at a level within tolerance of zero.
    /// Its row is set to exactly zero, then x0 is swapped for the first
    /// nonbasic column with a nonzero entry in that row. Rounding noise left
    /// in the rhs is cleared after the pivot so no basic variable goes
    /// negative.
    fn drive_out_auxiliary(
        &mut self,
        dictionary: &Dictionary,
        partition: &mut Partition,
        row: usize,
    ) -> Result<Dictionary, SolveError> {
        let tolerance = self.solver.tolerance;
        let dictionary = dictionary.with_rhs_zeroed(|i, b| i == row || b.abs() <= tolerance);
        let entering = partition
            .nonbasic()
            .iter()
            .copied()
            .find(|&j| dictionary.constraints()[(row, j)].abs() > tolerance)
            .ok_or_else(|| SolveError::SingularBasis {
                basic: partition.basic().to_vec(),
            })?;

        debug!("driving auxiliary variable out of row {} with x{}", row, entering);
        let dictionary = self.pivot(&dictionary, partition, Phase::One, entering, 0)?;
        Ok(dictionary.with_rhs_zeroed(|_, b| b.abs() <= tolerance))
    }

    fn phase2(&mut self, dictionary: Dictionary, partition: Partition) -> Result<SimplexResult, SolveError> {
        self.iterate(dictionary, partition, Phase::Two)
    }

    /// Pivot until no reduced cost is positive or a column is unbounded.
    fn iterate(
        &mut self,
        mut dictionary: Dictionary,
        mut partition: Partition,
        phase: Phase,
    ) -> Result<SimplexResult, SolveError> {
        loop {
            let Some(entering) = select_entering(
                dictionary.reduced_costs().as_slice(),
                partition.nonbasic(),
                self.solver.tolerance,
            ) else {
                return Ok(SimplexResult::Optimal(dictionary, partition));
            };

            let column = dictionary.column(entering);
            let Some(leaving) = select_leaving(column.as_slice(), dictionary.rhs().as_slice(), partition.basic())
            else {
                debug!("phase {:?}: x{} can increase without bound", phase, entering);
                return Ok(SimplexResult::Unbounded);
            };

            dictionary = self.pivot(&dictionary, &mut partition, phase, entering, leaving)?;
        }
    }

    fn pivot(
        &mut self,
        dictionary: &Dictionary,
        partition: &mut Partition,
        phase: Phase,
        entering: usize,
        leaving: usize,
    ) -> Result<Dictionary, SolveError> {
        if let Some(max) = self.solver.max_iterations {
            if self.pivots >= max {
                return Err(SolveError::IterationLimit(max));
            }
        }

        partition.exchange(entering, leaving);
        let next = dictionary.pivot(partition)?;
        self.pivots += 1;

        debug!(
            "phase {:?} pivot {}: x{} entering, x{} leaving, value {}",
            phase,
            self.pivots,
            entering,
            leaving,
            next.value()
        );
        self.observer.on_pivot(PivotEvent { phase, entering, leaving });

        Ok(next)
    }
}

/// Row with the most negative entry, first on ties.
fn most_negative(rhs: &DVector<f64>) -> usize {
    let mut best = 0;
    for (i, &b) in rhs.iter().enumerate() {
        if b < rhs[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::SolutionStatus;
    use nalgebra::DMatrix;

    fn lp(costs: &[f64], rows: &[&[f64]], rhs: &[f64]) -> LpProblem {
        LpProblem::new(costs.to_vec(), rows.iter().map(|r| r.to_vec()).collect(), rhs.to_vec()).unwrap()
    }

    fn assert_feasible(problem: &LpProblem, solution: &Solution) {
        for (i, row) in problem.coefficients().iter().enumerate() {
            let lhs: f64 = row.iter().zip(&solution.values).map(|(a, x)| a * x).sum();
            assert!(lhs <= problem.rhs()[i] + 1e-6, "row {}: {} > {}", i, lhs, problem.rhs()[i]);
        }
        assert!(solution.values.iter().all(|&x| x >= -1e-9), "negative value in {:?}", solution.values);

        let objective: f64 = problem.costs().iter().zip(&solution.values).map(|(c, x)| c * x).sum();
        assert!(
            (objective - solution.objective_value).abs() < 1e-6,
            "cᵀx = {} but value = {}",
            objective,
            solution.objective_value
        );
    }

    #[test]
    fn test_simple_maximization() {
        // Maximize: 3x + 2y
        // Subject to:
        //   x + y <= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=11
        let problem = lp(&[3.0, 2.0], &[&[1.0, 1.0], &[1.0, 0.0], &[0.0, 1.0]], &[4.0, 3.0, 3.0]);

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", solution.values[0]);
        assert!((solution.values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", solution.values[1]);
        assert!((solution.objective_value - 11.0).abs() < 1e-6, "obj = {} (expected 11)", solution.objective_value);
        assert_eq!(solution.pivots, 2);
        assert_eq!(solution.analysis.binding_constraints, vec![0, 1]);
        assert_feasible(&problem, &solution);
    }

    #[test]
    fn test_minimization_with_ge() {
        // Minimize 2x + 3y, i.e. maximize -2x - 3y
        //   x + y >= 4   ->   -x - y <= -4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=-9
        let problem = lp(&[-2.0, -3.0], &[&[-1.0, -1.0], &[1.0, 0.0], &[0.0, 1.0]], &[-4.0, 3.0, 3.0]);

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", solution.values[0]);
        assert!((solution.values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", solution.values[1]);
        assert!((solution.objective_value + 9.0).abs() < 1e-6, "obj = {} (expected -9)", solution.objective_value);
        assert_feasible(&problem, &solution);
    }

    #[test]
    fn test_infeasible() {
        // x >= 5
        // x <= 3
        let problem = lp(&[-1.0], &[&[-1.0], &[1.0]], &[-5.0, 3.0]);

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(solution.dictionary.is_none());
        assert!(solution.values.is_empty());
    }

    #[test]
    fn test_phase_one_then_unbounded() {
        // x >= 1, maximize x
        let problem = lp(&[1.0], &[&[-1.0]], &[-1.0]);

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Unbounded);
        assert_eq!(solution.objective_value, f64::INFINITY);
    }

    #[test]
    fn test_phase_one_feeds_phase_two() {
        // Maximize x1 - x2 + x3
        //   2x1 -  x2 + 2x3 <=  4
        //   2x1 - 3x2 +  x3 <= -5
        //   -x1 +  x2 - 2x3 <= -1
        // Optimal value 3/5 at (0, 2.8, 3.4)
        let problem = lp(
            &[1.0, -1.0, 1.0],
            &[&[2.0, -1.0, 2.0], &[2.0, -3.0, 1.0], &[-1.0, 1.0, -2.0]],
            &[4.0, -5.0, -1.0],
        );

        let mut events: Vec<PivotEvent> = Vec::new();
        let solution = Solver::new().solve_with_observer(&problem, &mut events).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value - 0.6).abs() < 1e-6, "obj = {}", solution.objective_value);
        assert!((solution.values[1] - 2.8).abs() < 1e-6);
        assert!((solution.values[2] - 3.4).abs() < 1e-6);
        assert_eq!(solution.basic, vec![1, 2, 5]);
        assert_feasible(&problem, &solution);

        assert_eq!(events.len(), solution.pivots);
        assert_eq!(events[0], PivotEvent { phase: Phase::One, entering: 0, leaving: 5 });
        let first_two = events.iter().position(|e| e.phase == Phase::Two).unwrap();
        assert!(events[first_two..].iter().all(|e| e.phase == Phase::Two));
        assert!(events[..first_two].iter().all(|e| e.phase == Phase::One));
    }

    #[test]
    fn test_degenerate_problem_terminates() {
        // Cycles under the largest-coefficient rule; Bland's rule must not.
        let problem = lp(
            &[10.0, -57.0, -9.0, -24.0],
            &[&[0.5, -5.5, -2.5, 9.0], &[0.5, -1.5, -0.5, 1.0], &[1.0, 0.0, 0.0, 0.0]],
            &[0.0, 0.0, 1.0],
        );

        let solution = Solver::new().with_max_iterations(100).solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value - 1.0).abs() < 1e-6, "obj = {}", solution.objective_value);
        assert!((solution.values[0] - 1.0).abs() < 1e-6);
        assert!((solution.values[2] - 1.0).abs() < 1e-6);
        assert_feasible(&problem, &solution);
    }

    #[test]
    fn test_iteration_limit() {
        let problem = lp(&[6.0, 8.0, 5.0, 9.0], &[&[2.0, 1.0, 1.0, 3.0], &[1.0, 3.0, 1.0, 2.0]], &[5.0, 3.0]);

        let err = Solver::new().with_max_iterations(1).solve(&problem).unwrap_err();
        assert_eq!(err, SolveError::IterationLimit(1));
    }

    #[test]
    fn test_closure_observer() {
        let problem = lp(&[6.0, 8.0, 5.0, 9.0], &[&[2.0, 1.0, 1.0, 3.0], &[1.0, 3.0, 1.0, 2.0]], &[5.0, 3.0]);

        let mut trace = Vec::new();
        let mut observer = |event: PivotEvent| trace.push((event.entering, event.leaving));
        Solver::new().solve_with_observer(&problem, &mut observer).unwrap();

        assert_eq!(trace, vec![(0, 4), (1, 5), (2, 1)]);
    }

    #[test]
    fn test_drive_out_auxiliary() {
        // x0 basic at level zero in the only row.
        let dictionary = Dictionary::new(
            DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 1.0]),
            DVector::from_column_slice(&[0.0]),
            DVector::from_column_slice(&[0.0, -1.0, -1.0]),
        );
        let mut partition = Partition::slack_basis(3, 1);
        partition.exchange(0, 2);

        let mut run = Run {
            solver: Solver::new(),
            observer: &mut (),
            pivots: 0,
        };
        let dictionary = run.drive_out_auxiliary(&dictionary, &mut partition, 0).unwrap();

        assert_eq!(partition.basic(), &[1]);
        assert_eq!(partition.nonbasic(), &[0, 2]);
        assert_eq!(dictionary.rhs()[0], 0.0);
        assert!((dictionary.constraints()[(0, 0)] - 0.5).abs() < 1e-12);
        assert_eq!(run.pivots, 1);
    }

    #[test]
    fn test_drive_out_auxiliary_clears_rounding_residue() {
        // x0 basic at 4e-16; the entering column has a negative entry.
        let dictionary = Dictionary::new(
            DMatrix::from_row_slice(1, 3, &[1.0, -2.0, 1.0]),
            DVector::from_column_slice(&[4e-16]),
            DVector::from_column_slice(&[0.0, -1.0, -1.0]),
        );
        let mut partition = Partition::slack_basis(3, 1);
        partition.exchange(0, 2);

        let mut run = Run {
            solver: Solver::new(),
            observer: &mut (),
            pivots: 0,
        };
        let dictionary = run.drive_out_auxiliary(&dictionary, &mut partition, 0).unwrap();

        assert_eq!(partition.basic(), &[1]);
        assert_eq!(dictionary.rhs()[0], 0.0);
    }

    #[test]
    fn test_auxiliary_basic_after_phase_one() {
        // Only (0, 2) is feasible; phase one ends with x0 basic at rounding level.
        let problem = lp(
            &[-3.0, -4.0],
            &[&[2.0, 1.0], &[-2.0, -1.0], &[-4.0, -3.0], &[5.0, -1.0]],
            &[2.0, 0.0, -5.0, -2.0],
        );

        let mut events: Vec<PivotEvent> = Vec::new();
        let solution = Solver::new().solve_with_observer(&problem, &mut events).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value + 8.0).abs() < 1e-6, "obj = {}", solution.objective_value);
        assert!(solution.values[0].abs() < 1e-6, "x = {}", solution.values[0]);
        assert!((solution.values[1] - 2.0).abs() < 1e-6, "y = {}", solution.values[1]);
        assert_feasible(&problem, &solution);
        assert!(
            events[1..].iter().any(|e| e.phase == Phase::One && e.leaving == 0),
            "x0 never left the basis: {:?}",
            events
        );
    }

    #[test]
    fn test_most_negative_first_on_ties() {
        assert_eq!(most_negative(&DVector::from_column_slice(&[1.0, -2.0, -2.0, -1.0])), 1);
        assert_eq!(most_negative(&DVector::from_column_slice(&[-3.0, 0.0])), 0);
    }
}
