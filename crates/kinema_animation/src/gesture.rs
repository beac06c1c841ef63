//! Gesture bindings
//!
//! Native scroll events are mapped straight into value slots, so animations
//! reading those slots follow the scroll position without any glue code.

use kinema_core::{NodeGraph, Result, ValueNode};
use serde::{Deserialize, Serialize};

/// Value slots that receive the scroll content offset
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContentOffset {
    pub x: Option<ValueNode>,
    pub y: Option<ValueNode>,
}

impl ContentOffset {
    pub fn x(value: ValueNode) -> Self {
        Self {
            x: Some(value),
            y: None,
        }
    }

    pub fn y(value: ValueNode) -> Self {
        Self {
            x: None,
            y: Some(value),
        }
    }
}

/// Scroll position reported by the platform
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollEvent {
    pub content_offset_x: f64,
    pub content_offset_y: f64,
}

impl ScrollEvent {
    pub fn new(content_offset_x: f64, content_offset_y: f64) -> Self {
        Self {
            content_offset_x,
            content_offset_y,
        }
    }
}

/// Event handler produced by [`on_scroll`]
#[derive(Clone, Copy, Debug)]
pub struct ScrollHandler {
    offset: ContentOffset,
}

impl ScrollHandler {
    /// Write the event's content offset into the bound slots
    pub fn handle(&self, graph: &mut NodeGraph, event: &ScrollEvent) -> Result<()> {
        if let Some(x) = self.offset.x {
            graph.set_value(x, event.content_offset_x)?;
        }
        if let Some(y) = self.offset.y {
            graph.set_value(y, event.content_offset_y)?;
        }
        tracing::trace!(
            x = event.content_offset_x,
            y = event.content_offset_y,
            "scroll"
        );
        Ok(())
    }

    pub fn offset(&self) -> ContentOffset {
        self.offset
    }
}

/// Bind scroll content offsets to value slots
pub fn on_scroll(offset: ContentOffset) -> ScrollHandler {
    ScrollHandler { offset }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinema_core::GraphError;

    #[test]
    fn test_scroll_writes_bound_axes() {
        let mut graph = NodeGraph::new();
        let y = graph.value(0.0);
        let handler = on_scroll(ContentOffset::y(y));

        handler.handle(&mut graph, &ScrollEvent::new(12.0, 340.0)).unwrap();
        assert_eq!(graph.get_value(y), Ok(340.0));
        assert_eq!(handler.offset().x, None);
    }

    #[test]
    fn test_scroll_drives_dependent_nodes() {
        let mut graph = NodeGraph::new();
        let x = graph.value(0.0);
        let y = graph.value(0.0);
        let handler = on_scroll(ContentOffset {
            x: Some(x),
            y: Some(y),
        });
        let sum = graph.add(x, y);

        handler.handle(&mut graph, &ScrollEvent::new(5.0, 7.0)).unwrap();
        assert_eq!(graph.evaluate(sum), Ok(12.0));
    }

    #[test]
    fn test_scroll_into_removed_slot_fails() {
        let mut graph = NodeGraph::new();
        let y = graph.value(0.0);
        graph.remove(y.id());

        let handler = on_scroll(ContentOffset::y(y));
        assert_eq!(
            handler.handle(&mut graph, &ScrollEvent::default()),
            Err(GraphError::UnknownNode(y.id()))
        );
    }

    #[test]
    fn test_event_from_json() {
        let event: ScrollEvent =
            serde_json::from_str(r#"{"content_offset_x":0.0,"content_offset_y":88.5}"#).unwrap();
        assert_eq!(event, ScrollEvent::new(0.0, 88.5));
    }
}
