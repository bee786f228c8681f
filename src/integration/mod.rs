//! Outbound collaborators: the external eligibility service and the results
//! event topic. Handlers only see the traits, so tests can swap in stubs.

pub mod eligibility;
pub mod publisher;

pub use eligibility::{resolve_eligibility, Eligibility, EligibilityCheck, EligibilityError};
pub use publisher::{PublishError, ResultPublisher};
