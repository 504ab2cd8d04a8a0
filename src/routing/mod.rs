// Routing module entry
// Path segment parsing and the method+pattern route table

pub mod path;
pub mod table;

pub use path::Collection;
pub use table::{Resolved, RouteMatch, RouteTable};
