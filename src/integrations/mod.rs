//! External service integrations.

pub mod upstream_client {
    pub use crate::upstream_client::*;
}

pub mod upstream_models {
    pub use crate::upstream_models::*;
}
