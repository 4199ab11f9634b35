//! Storage infrastructure
//!
//! In-memory implementations of the gateway's collaborator stores. The
//! real persistence layer (schema, migrations, admin CRUD) lives outside
//! this service; these implementations back standalone deployments and
//! hermetic tests.

mod in_memory;

pub use in_memory::{InMemoryTokenStore, InMemoryUserStore, InMemoryVendorDirectory};
