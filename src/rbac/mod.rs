//! Role-based authorization: the permission table, the evaluator, and the
//! request gate that enforces it on routes.

mod evaluator;
mod gate;
mod policy;

pub use evaluator::{evaluate, Decision, Principal};
pub use gate::{authorize_owned, require_any, FORBIDDEN_MESSAGE};
pub use policy::{actions, PermissionTable, Policy, PolicyMatrix, Role, Scope, UnknownRole, PERMISSIONS};
