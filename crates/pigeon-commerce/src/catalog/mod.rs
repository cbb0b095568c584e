//! Product catalogue module.
//!
//! Products carry the metadata that limits how many units a cart line may hold.

mod product;

pub use product::{Availability, Product};
