/// state variables, condition values and the condition grid
pub mod conditions;
mod conditions_tests;
/// substitutional Redlich–Kister model of one phase
pub mod SolutionModel;
pub mod EquilibriumResult;
/// solver seam and the lowest-Gibbs-energy solver
pub mod EquilibriumSolver;
