//! Redfish REST API Client
//!
//! A Rust client library for the subset of the Redfish API needed to boot a
//! bare-metal node from virtual media: system lookup, manager virtual media,
//! boot source override and system reset.
//!
//! # Example
//!
//! ```no_run
//! use redfish_client::{AuthContext, MediaType, RedfishClient, RedfishClientTrait, TransportConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // BMCs usually ship self-signed certificates
//! let transport = TransportConfig::default().with_insecure_tls(true);
//! let client = RedfishClient::new("https://10.0.0.10", transport)?;
//! let ctx = AuthContext::new().with_basic_auth("admin", "password");
//!
//! let system = client.get_system(&ctx, "1").await?;
//! println!("managed by {:?}", system.manager_reference());
//!
//! let slots = client.get_virtual_media_collection(&ctx, "bmc").await?;
//! for member in slots.members {
//!     println!("slot {}", member.odata_id);
//! }
//! # let _ = MediaType::Cd;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Capability trait**: `RedfishClientTrait` is what callers depend on
//! - **Explicit context**: credentials and cancellation travel with each call
//! - **Mocking**: `MockRedfishClient` behind the `test-util` feature

pub mod client;
pub mod context;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod redfish_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::{RedfishClient, TransportConfig};
pub use context::{AuthContext, BasicAuth};
pub use error::RedfishError;
pub use models::*;
pub use redfish_trait::RedfishClientTrait;
#[cfg(feature = "test-util")]
pub use mock::{MockRedfishClient, Operation, RecordedCall};
