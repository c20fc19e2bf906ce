//! Reward and termination bookkeeping for MiniHack-style tasks.
//!
//! A task registers events (message matches, location triggers, coordinate
//! triggers) on a manager. Every step the environment asks the manager whether
//! the episode is over, then drains the reward the manager accumulated.

pub mod builder;
pub mod event;
pub mod grouped;
pub mod manager;
pub mod sequential;
pub mod spec;

pub use builder::{amulet_messages, eat_messages, kill_messages, wear_messages, wield_messages, EventBuilder};
pub use event::{Event, EventKind, EventSettings, EventTrigger, LocActionPhase};
pub use grouped::{GroupedRewardManager, Member};
pub use manager::{EpisodeManager, RewardFn, RewardManager};
pub use sequential::SequentialRewardManager;
pub use spec::{EventSpec, ManagerSpec, MemberSpec};
