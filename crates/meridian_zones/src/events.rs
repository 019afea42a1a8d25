//! # Zone Events
//!
//! Handler traits for membership transitions and zone lifecycle, the
//! context handlers get during dispatch, and a forwarder that turns
//! transitions into channel messages.
//!
//! ## Re-entrancy
//!
//! Membership handlers run while the zone they are told about is locked.
//! They may release it (or any other zone) through [`ZoneContext::store`];
//! the locked zone is destroyed once the dispatch that locked it returns.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use meridian_core::EventDispatcher;
use tracing::warn;

use crate::store::ZoneStore;
use crate::zone::{PlayerId, Zone, ZoneId};

/// Membership transition notifications.
///
/// Both methods default to doing nothing.
pub trait ZoneEventHandler {
    /// `player` was recorded as inside `zone`.
    fn on_player_enter_zone(&self, ctx: &mut ZoneContext<'_>, player: PlayerId, zone: ZoneId) {
        let _ = (ctx, player, zone);
    }

    /// `player` was recorded as outside `zone`.
    fn on_player_leave_zone(&self, ctx: &mut ZoneContext<'_>, player: PlayerId, zone: ZoneId) {
        let _ = (ctx, player, zone);
    }
}

/// Zone pool lifecycle notifications.
pub trait ZonePoolEventHandler {
    /// A zone was created.
    fn on_zone_created(&self, id: ZoneId, zone: &Zone) {
        let _ = (id, zone);
    }

    /// A zone was physically destroyed. Fires once per zone, possibly
    /// later than the release call if the zone was locked.
    fn on_zone_destroyed(&self, id: ZoneId, zone: &Zone) {
        let _ = (id, zone);
    }
}

/// What a membership handler may touch while it runs.
pub struct ZoneContext<'a> {
    /// The zone store, with the current zone locked.
    pub store: &'a mut ZoneStore,
    /// The dispatcher running this handler.
    pub events: &'a EventDispatcher<dyn ZoneEventHandler>,
}

/// A membership transition as a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneEvent {
    /// Player entered zone.
    Entered {
        /// The player.
        player: PlayerId,
        /// The zone.
        zone: ZoneId,
    },
    /// Player left zone.
    Left {
        /// The player.
        player: PlayerId,
        /// The zone.
        zone: ZoneId,
    },
}

impl ZoneEvent {
    /// The player this event is about.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        match self {
            Self::Entered { player, .. } | Self::Left { player, .. } => *player,
        }
    }

    /// The zone this event is about.
    #[must_use]
    pub const fn zone(&self) -> ZoneId {
        match self {
            Self::Entered { zone, .. } | Self::Left { zone, .. } => *zone,
        }
    }
}

/// Forwards transitions into a bounded channel.
///
/// Events that do not fit are dropped with a warning; the sweep never
/// blocks on a slow consumer.
#[derive(Debug)]
pub struct ZoneEventChannel {
    sender: Sender<ZoneEvent>,
}

impl ZoneEventChannel {
    /// Creates a forwarder and the receiving end of its channel.
    #[must_use]
    pub fn bounded(capacity: usize) -> (Self, Receiver<ZoneEvent>) {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        (Self { sender }, receiver)
    }

    fn forward(&self, event: ZoneEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(?event, "zone event channel full, event dropped");
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

impl ZoneEventHandler for ZoneEventChannel {
    fn on_player_enter_zone(&self, _ctx: &mut ZoneContext<'_>, player: PlayerId, zone: ZoneId) {
        self.forward(ZoneEvent::Entered { player, zone });
    }

    fn on_player_leave_zone(&self, _ctx: &mut ZoneContext<'_>, player: PlayerId, zone: ZoneId) {
        self.forward(ZoneEvent::Left { player, zone });
    }
}
