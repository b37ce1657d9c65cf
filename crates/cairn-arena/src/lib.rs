//! Region-based ("arena") allocation with shared-ownership teardown.
//!
//! Callers allocate many small objects cheaply from growable backing
//! blocks and reclaim everything at once when the last handle onto the
//! arena is dropped. This crate is the workspace's designated
//! `unsafe`-bearing crate; every `unsafe` block carries a `SAFETY:` note.
//!
//! # Architecture
//!
//! ```text
//! ArenaHandle<T, S> (typed, cheap-to-clone view; drives the refcount)
//! └── ArenaState<S> (shared control object, self-hosted in its store)
//!     ├── Block chain (granule-aligned bump buffers, append-only)
//!     ├── Counters (allocations / deallocation notices / bytes)
//!     └── S: BackingStore (heap by default; any raw-memory source)
//! ```
//!
//! # Allocation model
//!
//! - Requests bump a cursor inside the current block, rounded to the
//!   platform granule so scalars are always naturally aligned.
//! - A block miss is silent: the arena appends a fresh block (doubled for
//!   oversized requests, default-sized otherwise) and retries. Only a
//!   failing backing store surfaces an error.
//! - `deallocate` is a notification. Space returns to the store in one
//!   teardown pass, when the last handle referencing the state drops.
//!
//! Handles are `!Send + !Sync`: the reference count is plain and
//! non-atomic, and sharing an arena across threads requires external
//! exclusion around a single owning thread's handles.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod block;
pub mod config;
pub mod handle;
mod state;
pub mod stats;

// Public re-exports for the primary API surface.
pub use config::ArenaConfig;
pub use handle::ArenaHandle;
pub use stats::ArenaStats;
