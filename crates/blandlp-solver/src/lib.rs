mod dictionary;
mod observer;
mod partition;
pub mod pivot_rule;
mod problem;
mod simplex;
mod solution;

pub use dictionary::Dictionary;
pub use observer::{Phase, PivotEvent, PivotObserver};
pub use partition::Partition;
pub use pivot_rule::{select_entering, select_leaving};
pub use problem::{LpProblem, ProblemError};
pub use simplex::{SolveError, Solver};
pub use solution::{Analysis, Solution, SolutionStatus};
