//! Bearer credentials and the capabilities that produce them.

pub mod credential;
pub mod provider;

pub use credential::*;
pub use provider::*;
