use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::{Positioning, Rectangle};

/// Why a zone callback fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerCause {
    /// The first snapshot ever seen was already inside the zone.
    InitialPosition,
    /// The viewport moved from outside the zone to inside it.
    Movement,
    /// The list length changed while the viewport stayed inside the zone.
    ListUpdate,
}

/// Whether the viewport is inside a zone's trigger band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Proximity {
    Inside,
    Outside,
}

pub type ZoneCallback = Arc<dyn Fn(TriggerCause) + Send + Sync>;

/// A predicate over `(list_rect, viewport_rect)`.
#[derive(Clone)]
pub enum ZoneCondition {
    /// Viewport top is within `threshold` px of the list top.
    NearTop(f64),
    /// Viewport bottom is within `threshold` px of the list bottom.
    NearBottom(f64),
    /// Like `NearTop`, with the threshold given as a multiple of viewport height.
    NearTopRatio(f64),
    /// Like `NearBottom`, with the threshold given as a multiple of viewport height.
    NearBottomRatio(f64),
    Custom(Arc<dyn Fn(Rectangle, Rectangle) -> bool + Send + Sync>),
}

impl ZoneCondition {
    pub fn is_inside(&self, list: Rectangle, viewport: Rectangle) -> bool {
        match self {
            Self::NearTop(threshold) => viewport.top() - list.top() <= *threshold,
            Self::NearBottom(threshold) => list.bottom() - viewport.bottom() <= *threshold,
            Self::NearTopRatio(ratio) => {
                viewport.top() - list.top() <= viewport.height() * ratio
            }
            Self::NearBottomRatio(ratio) => {
                list.bottom() - viewport.bottom() <= viewport.height() * ratio
            }
            Self::Custom(f) => f(list, viewport),
        }
    }
}

impl fmt::Debug for ZoneCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NearTop(v) => f.debug_tuple("NearTop").field(v).finish(),
            Self::NearBottom(v) => f.debug_tuple("NearBottom").field(v).finish(),
            Self::NearTopRatio(v) => f.debug_tuple("NearTopRatio").field(v).finish(),
            Self::NearBottomRatio(v) => f.debug_tuple("NearBottomRatio").field(v).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Clone)]
pub struct Zone {
    pub condition: ZoneCondition,
    pub callback: ZoneCallback,
}

impl Zone {
    pub fn new(
        condition: ZoneCondition,
        callback: impl Fn(TriggerCause) + Send + Sync + 'static,
    ) -> Self {
        Self {
            condition,
            callback: Arc::new(callback),
        }
    }
}

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Zone")
            .field("condition", &self.condition)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct ZoneState {
    proximity: Option<Proximity>,
    list_length: usize,
}

/// A bank of edge zones that turns positioning snapshots into edge-crossing events.
///
/// Per zone:
/// - unknown → inside fires [`TriggerCause::InitialPosition`]
/// - outside → inside fires [`TriggerCause::Movement`]
/// - inside → inside with a new list length fires [`TriggerCause::ListUpdate`]
/// - anything else is silent
#[derive(Clone, Debug, Default)]
pub struct EdgeProximity {
    zones: Vec<(Zone, ZoneState)>,
}

impl EdgeProximity {
    pub fn new(zones: impl IntoIterator<Item = Zone>) -> Self {
        Self {
            zones: zones
                .into_iter()
                .map(|zone| (zone, ZoneState::default()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Last known proximity of the zone at `index` (`None` before the first snapshot).
    pub fn proximity(&self, index: usize) -> Option<Proximity> {
        self.zones.get(index).and_then(|(_, state)| state.proximity)
    }

    /// Mutable access to a zone's condition and callback. Its proximity state is kept.
    pub fn zone_mut(&mut self, index: usize) -> Option<&mut Zone> {
        self.zones.get_mut(index).map(|(zone, _)| zone)
    }

    pub fn handle_positioning_update(&mut self, positioning: &Positioning) {
        let list = positioning.for_list();
        let viewport = positioning.for_viewport();
        let new_length = positioning.list_length();

        for (zone, state) in self.zones.iter_mut() {
            let next = if zone.condition.is_inside(list, viewport) {
                Proximity::Inside
            } else {
                Proximity::Outside
            };

            let cause = match (state.proximity, next) {
                (None, Proximity::Inside) => Some(TriggerCause::InitialPosition),
                (Some(Proximity::Outside), Proximity::Inside) => Some(TriggerCause::Movement),
                (Some(Proximity::Inside), Proximity::Inside) if state.list_length != new_length => {
                    Some(TriggerCause::ListUpdate)
                }
                _ => None,
            };

            state.proximity = Some(next);
            state.list_length = new_length;

            if let Some(cause) = cause {
                vtrace!(?cause, new_length, "edge zone triggered");
                (zone.callback)(cause);
            }
        }
    }
}
