pub mod db_interact;
pub mod jwt;
pub mod metrics;

pub use self::db_interact::DbInteractClient;
pub use self::jwt::{AccessTokenClaims, JwtService};
pub use self::metrics::{get_metrics, init_metrics};
