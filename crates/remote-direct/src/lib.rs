//! Redfish remote-direct boot
//!
//! Boots an ephemeral bare-metal node (no OS installed) from an installer ISO
//! by mounting it as BMC virtual media, setting a one-time boot override and
//! resetting the system.
//!
//! # Example
//!
//! ```no_run
//! use remote_direct::new_remote_direct_client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = new_remote_direct_client(
//!     "https://10.23.25.1",
//!     "System.Embedded.1",
//!     "root",
//!     "calvin",
//!     "http://images.local/ephemeral.iso",
//!     true,  // BMC uses a self-signed certificate
//!     false, // BMC network is not behind the proxy
//! )?;
//!
//! let report = client.run().await?;
//! println!("booting {} from virtual media {}", report.system_id, report.media_id);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod retry;
pub mod workflow;

pub use config::{RemoteDirectConfig, connect, new_remote_direct_client};
pub use error::{RemoteDirectError, Step};
pub use extract::resource_id;
pub use retry::{FibonacciBackoff, RetryPolicy};
pub use workflow::{Phase, RemoteDirect, RunReport};
