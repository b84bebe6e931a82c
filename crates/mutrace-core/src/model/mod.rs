pub mod incident;
pub mod post;

pub use incident::{Incident, Severity};
pub use post::{MutationType, Post};
