//! Loan-eligibility assessment for an employee savings-and-loan cooperative
//!
//! [`knowledge`] holds the fuzzy variables and rule base, [`applicant`] turns a
//! member's request into crisp inputs, and [`assessment`] bands the resulting
//! score into a verdict.

pub mod applicant;
pub mod assessment;
pub mod knowledge;

pub use applicant::{ApplicationError, Collateral, EmploymentStatus, LoanApplication, Tenor};
pub use assessment::{assess, assess_batch, Assessment, Verdict};
pub use knowledge::build_engine;
