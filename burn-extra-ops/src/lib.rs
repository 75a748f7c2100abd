//! Additional operations for the Burn deep learning framework
//!
//! Helpers that the colorgan networks need but that core Burn does not ship
//! in the shape we want: a backend-free pass-through module and in-place
//! re-initialization of an existing parameter.

mod identity;
mod normal;

pub use identity::Identity;
pub use normal::{normal, normal_};
