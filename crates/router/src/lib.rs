//! Counsel routing: route table, path matching, navigation guard and history

pub mod error;
pub mod guard;
pub mod history;
pub mod matcher;
pub mod router;
pub mod routes;

pub use error::RouterError;
pub use guard::{NavigationDecision, NavigationGuard};
pub use history::History;
pub use matcher::{ResolvedRoute, href, resolve};
pub use router::Router;
pub use routes::{Access, ROUTES, RouteMeta, dashboard_for, route};
