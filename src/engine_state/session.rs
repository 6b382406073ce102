//! # Session
//!
//! The boundary to network peers and other observers. The engine publishes a
//! [`WorldEvent`] for every change it applies, and accepts [`WorldRequest`]s
//! which it validates against the Block Store before applying.
//!
//! Both types serialize to tagged JSON, e.g.
//! `{"type":"block_added","cell":{"x":0,"y":1,"z":2},"material":"brick"}`.

use std::sync::mpsc::{channel, Receiver, Sender};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::engine_state::voxels::{
    coords::{Cell, Sector},
    material::Material,
};

/// A change the engine has applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorldEvent {
    BlockAdded { cell: Cell, material: Material },
    BlockRemoved { cell: Cell },
    SectorChanged { old: Option<Sector>, new: Sector },
}

/// A change a peer asks the engine to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorldRequest {
    AddBlock { cell: Cell, material: Material },
    RemoveBlock { cell: Cell },
}

/// Fans [`WorldEvent`]s out to any number of subscribers.
#[derive(Debug, Default)]
pub struct Session {
    subscribers: Vec<Sender<WorldEvent>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<WorldEvent> {
        let (sender, receiver) = channel();
        self.subscribers.push(sender);
        receiver
    }

    /// Sends `event` to every live subscriber and forgets disconnected ones.
    pub fn publish(&mut self, event: WorldEvent) {
        let before = self.subscribers.len();
        self.subscribers.retain(|subscriber| subscriber.send(event).is_ok());
        if self.subscribers.len() < before {
            debug!(
                "Pruned {} disconnected session subscribers",
                before - self.subscribers.len()
            );
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    #[test]
    fn test_every_subscriber_receives_events() {
        let mut session = Session::new();
        let a = session.subscribe();
        let b = session.subscribe();
        let event = WorldEvent::BlockRemoved {
            cell: Point3::new(1, 2, 3),
        };
        session.publish(event);
        assert_eq!(a.try_recv(), Ok(event));
        assert_eq!(b.try_recv(), Ok(event));
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let mut session = Session::new();
        let kept = session.subscribe();
        drop(session.subscribe());
        session.publish(WorldEvent::SectorChanged {
            old: None,
            new: Point3::new(0, 0, 0),
        });
        assert_eq!(session.subscriber_count(), 1);
        assert!(kept.try_recv().is_ok());
    }

    #[test]
    fn test_request_json_shape() {
        let request: WorldRequest =
            serde_json::from_str(r#"{"type":"add_block","cell":{"x":4,"y":-1,"z":2},"material":"sand"}"#)
                .unwrap();
        assert_eq!(
            request,
            WorldRequest::AddBlock {
                cell: Point3::new(4, -1, 2),
                material: Material::Sand,
            }
        );
    }
}
