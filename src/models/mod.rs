mod auth;
mod customer;
mod event;
mod invoice;
mod metrics;
mod payment;
mod router_provision;

pub use auth::*;
pub use customer::*;
pub use event::*;
pub use invoice::*;
pub use metrics::*;
pub use payment::*;
pub use router_provision::*;
