//! Typed event queues owned by the world.
//!
//! Systems that would otherwise observe each other directly communicate
//! through these queues instead: producers push during their update pass,
//! subscribers drain during theirs. Within one event type, drain order is
//! send order.

use std::any::{Any, TypeId};
use std::collections::VecDeque;

use hashbrown::HashMap;

/// Marker trait for event payloads.
///
/// Blanket-implemented: any `Send + Sync + 'static` type can be sent.
pub trait Event: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Event for T {}

trait ErasedQueue {
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn len(&self) -> usize;
    fn clear(&mut self);
}

struct TypedQueue<E> {
    events: VecDeque<E>,
}

impl<E: Event> ErasedQueue for TypedQueue<E> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn len(&self) -> usize {
        self.events.len()
    }

    fn clear(&mut self) {
        self.events.clear();
    }
}

/// One FIFO queue per event type.
#[derive(Default)]
pub struct EventQueues {
    queues: HashMap<TypeId, Box<dyn ErasedQueue>>,
}

impl EventQueues {
    /// Create an empty set of queues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to its type's queue.
    pub fn send<E: Event>(&mut self, event: E) {
        self.queues
            .entry(TypeId::of::<E>())
            .or_insert_with(|| {
                Box::new(TypedQueue::<E> {
                    events: VecDeque::new(),
                })
            })
            .as_any_mut()
            .downcast_mut::<TypedQueue<E>>()
            .expect("event queue stored under wrong type id")
            .events
            .push_back(event);
    }

    /// Take every pending event of type `E`, in send order.
    ///
    /// The returned iterator owns the events, so the caller is free to
    /// mutate the queues (or the world) while consuming it.
    pub fn drain<E: Event>(&mut self) -> impl Iterator<Item = E> + use<E> {
        self.queues
            .get_mut(&TypeId::of::<E>())
            .and_then(|queue| queue.as_any_mut().downcast_mut::<TypedQueue<E>>())
            .map(|queue| std::mem::take(&mut queue.events))
            .unwrap_or_default()
            .into_iter()
    }

    /// Number of pending events of type `E`.
    #[must_use]
    pub fn pending<E: Event>(&self) -> usize {
        self.queues.get(&TypeId::of::<E>()).map_or(0, |queue| queue.len())
    }

    /// Discard every pending event of every type.
    pub fn clear(&mut self) {
        for queue in self.queues.values_mut() {
            queue.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Hit {
        duration: f32,
    }

    #[derive(Debug, PartialEq)]
    struct Collision {
        other: u32,
    }

    #[test]
    fn test_drain_preserves_send_order() {
        let mut queues = EventQueues::new();

        queues.send(Hit { duration: 1.0 });
        queues.send(Hit { duration: 2.0 });
        queues.send(Hit { duration: 3.0 });

        let drained: Vec<Hit> = queues.drain().collect();
        assert_eq!(
            drained,
            vec![
                Hit { duration: 1.0 },
                Hit { duration: 2.0 },
                Hit { duration: 3.0 }
            ]
        );
        assert_eq!(queues.pending::<Hit>(), 0);
    }

    #[test]
    fn test_queues_are_independent_per_type() {
        let mut queues = EventQueues::new();

        queues.send(Hit { duration: 1.0 });
        queues.send(Collision { other: 9 });

        let hits: Vec<Hit> = queues.drain().collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(queues.pending::<Collision>(), 1);
    }

    #[test]
    fn test_drain_without_queue_is_empty() {
        let mut queues = EventQueues::new();

        assert_eq!(queues.drain::<Hit>().count(), 0);
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut queues = EventQueues::new();

        queues.send(Hit { duration: 1.0 });
        queues.send(Collision { other: 1 });
        queues.clear();

        assert_eq!(queues.pending::<Hit>(), 0);
        assert_eq!(queues.pending::<Collision>(), 0);
    }
}
