//! Mutrace Engine - live incident subscriptions
//!
//! Couples an [`IncidentSource`](source::IncidentSource) to the pure merge
//! state machine in `mutrace-core`:
//! - one event loop per viewer, draining a single queue of commands,
//!   snapshot results and channel messages
//! - generation-tagged subscriptions so responses for a released incident
//!   are discarded
//! - derived views (forest, layout, report) rebuilt after every merge and
//!   published through a watch channel

pub mod source;
pub mod view;
pub mod viewer;
pub mod wire;

pub use source::{IncidentSource, MemorySource};
pub use view::IncidentView;
pub use viewer::{Command, Viewer, ViewerHandle};
pub use wire::{decode_message, ChannelMessage};
