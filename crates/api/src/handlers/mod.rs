//! Request handlers, grouped by resource.

pub mod concepts;
pub mod coords;
pub mod entities;
pub mod links;
pub mod projects;
pub mod schema;
