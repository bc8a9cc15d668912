//! Entity resource managers
//!
//! Managers own entity-specific operation phrasing and hand everything else
//! to the pipeline. They hold only a client handle, so cloning is cheap and
//! concurrent use is safe.

pub mod assets;
pub mod base;
pub mod clients;
pub mod tickets;

pub use assets::AssetManager;
pub use base::ResourceManager;
pub use clients::ClientManager;
pub use tickets::TicketManager;
