pub mod build;
pub mod page;
pub mod promise;
pub mod relationship;
pub mod state;
