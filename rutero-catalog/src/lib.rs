pub mod error;
pub mod line;
pub mod repository;
pub mod route;
pub mod unit;

pub use error::CatalogError;
pub use line::{BusLine, LineChange, LineFilter, LineService};
pub use repository::{LineStore, RouteStore, UnitStore};
pub use route::{BusRoute, RouteChange, RouteFilter, RouteKey, RouteService};
pub use unit::{BusUnit, UnitChange, UnitFilter, UnitService};
