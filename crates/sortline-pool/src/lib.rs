//! Fixed-capacity package pool for sortline.
//!
//! Every package the line will ever carry lives in one of a fixed number
//! of slots allocated at construction. Spawning reactivates the first
//! inactive slot; exiting marks it inactive again. The pool never grows
//! or shrinks, so memory and per-tick iteration cost are bounded by the
//! configured capacity.
//!
//! ```text
//! PackagePool
//! └── Vec<Package> (slot 0..N-1, scanned in order)
//!     └── LifecycleState: Inactive ⇄ Incoming → Diverting → OnLane
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod pool;

pub use config::PoolConfig;
pub use error::PoolError;
pub use pool::PackagePool;
