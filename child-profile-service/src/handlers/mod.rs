pub mod children;
pub mod health;
pub mod metrics;

pub use self::children::{add_child, get_child, link_supervisor, list_children, update_child};
pub use self::health::health_check;
pub use self::metrics::metrics;
