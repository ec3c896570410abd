//! # Promptz Architecture
//!
//! Promptz is a **UI-agnostic prompt library**. It stores reusable prompt
//! snippets in a hierarchy of categories, lets a widget pick some of them, and
//! joins the picks into one output string. Rendering the widget is the host's
//! job; this crate owns the model and the rules.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Facade a UI talks to                                     │
//! │  - Keeps library, selection and storage in step             │
//! │  - Rolls back local state when a write fails                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (library/, selection/, favorites.rs, tree.rs, path.rs)│
//! │  - Pure logic over in-memory values                         │
//! │  - No I/O whatsoever                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract PersistenceBridge trait                         │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Paths, not parents
//!
//! Categories are a flat, ordered list. Hierarchy lives in the names:
//! `art/sketch` is a child of `art` whether or not `art` exists as a record.
//! The tree the UI shows is derived on demand (see [`tree`]), so renames and
//! deletes are prefix operations over names (see [`path`]).
//!
//! ## Reserved names
//!
//! - `default` always exists and cannot be renamed or deleted.
//! - `__favorites__` is never stored. It is the favorites view (see
//!   [`favorites`]) and no category may be created under it.
//!
//! ## Testing Strategy
//!
//! 1. **Core modules**: thorough unit tests beside each module, built with
//!    `library::fixtures`.
//! 2. **API** (`api.rs`): dispatch, hook wiring and rollback against
//!    [`store::mem_backend::MemBackend`].
//! 3. **Filesystem** (`tests/`): the same flows over a temp directory.

pub mod api;
pub mod config;
pub mod error;
pub mod favorites;
pub mod init;
pub mod library;
pub mod model;
pub mod path;
pub mod selection;
pub mod store;
pub mod tree;
