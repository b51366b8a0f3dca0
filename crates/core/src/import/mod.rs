//! Subscriber import preparation
//!
//! Resolution happens in three steps, all before any remote call that
//! changes state: the target list and groups are validated, the input is
//! resolved into items (guessing channel and mobile layout when not pinned),
//! and the batch is serialized into one XML document.

pub mod document;
pub mod groups;
pub mod heuristics;

pub use document::subscribers_document;
pub use groups::{find_list, join_ids, resolve_groups};
pub use heuristics::{guess_channel, guess_mobile_input_type, resolve_batch, ResolvedBatch, Signals};
