//! Client-side synchronisation building blocks.
//!
//! These types run inside each player's client, not in the server
//! request path. They turn the shared record and change-feed events
//! into local decisions: which edges fired, when the countdown ends,
//! and whether a departed host's role may be claimed.

pub mod countdown;
pub mod handover;
pub mod view;

pub use countdown::{CountdownPhase, CountdownSync};
pub use handover::{DepartureFlag, FlagStore, MemoryFlagStore};
pub use view::{EdgeEvent, MatchView};
