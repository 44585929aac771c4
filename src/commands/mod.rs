pub mod build;
pub mod extract;
pub mod inventory;
pub mod reconcile;
