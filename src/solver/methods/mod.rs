//! Numerical methods for the phase ODE
//!
//! This module contains concrete implementations of the
//! [`Integrator`](crate::solver::Integrator) trait.
//!
//! # Available Methods
//!
//! - **[`DormandPrinceSolver`]**: embedded Runge-Kutta 5(4)
//!   - Adaptive step size with local error control
//!   - Cost: 6 function evaluations per accepted step (first same as last)
//!   - Use: **default**, production runs
//!
//! - **[`RK4Solver`]**: classical fourth-order Runge-Kutta
//!   - Fixed step, `substeps` steps between two samples
//!   - Cost: 4 function evaluations per step
//!   - Use: reproducible fixed work, benchmarks, convergence studies
//!
//! Both methods are stateless and can be shared between threads.

mod dopri5;
mod rk4;

pub use dopri5::DormandPrinceSolver;
pub use rk4::RK4Solver;
