//! Feature modules. Each has a `controller` (HTTP handlers), a `service`
//! (operations over the role store) and a `router`.

pub mod access;
pub mod migration;
pub mod roles;
pub mod users;
