//! Bounded per-user navigation history

use std::collections::VecDeque;

use chat_core::config::DEFAULT_STACK_LIMIT;
use chat_core::NavigationFrame;

/// LIFO of previously shown screens. When full, the oldest frame is evicted
/// so the most recent history is always kept.
#[derive(Debug, Clone)]
pub struct NavigationStack {
    frames: VecDeque<NavigationFrame>,
    limit: usize,
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self::new(DEFAULT_STACK_LIMIT)
    }
}

impl NavigationStack {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            frames: VecDeque::with_capacity(limit + 1),
            limit,
        }
    }

    /// Push a frame, returning the evicted oldest frame if the bound was hit.
    pub fn push(&mut self, frame: NavigationFrame) -> Option<NavigationFrame> {
        tracing::debug!(location = %frame.location(), "navigation stack push");
        self.frames.push_back(frame);
        if self.frames.len() > self.limit {
            let evicted = self.frames.pop_front();
            if let Some(evicted) = &evicted {
                tracing::debug!(location = %evicted.location(), "navigation stack evicted oldest");
            }
            return evicted;
        }
        None
    }

    pub fn pop(&mut self) -> Option<NavigationFrame> {
        let frame = self.frames.pop_back();
        if let Some(frame) = &frame {
            tracing::debug!(location = %frame.location(), "navigation stack pop");
        }
        frame
    }

    pub fn peek(&self) -> Option<&NavigationFrame> {
        self.frames.back()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        tracing::debug!("navigation stack cleared");
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &NavigationFrame> {
        self.frames.iter()
    }

    /// `section:action -> section:action`, for logs.
    pub fn path(&self) -> String {
        if self.frames.is_empty() {
            return "(empty)".to_string();
        }
        self.frames
            .iter()
            .map(NavigationFrame::location)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::{CallbackToken, RenderSpec};

    fn frame(n: usize) -> NavigationFrame {
        NavigationFrame::from_token(
            &CallbackToken::new("recipes", "list").with_param("page", n),
            RenderSpec::text(format!("page {n}")),
        )
    }

    #[test]
    fn test_lifo_order() {
        let mut stack = NavigationStack::new(5);
        stack.push(frame(1));
        stack.push(frame(2));

        assert_eq!(stack.peek().unwrap().render.text, "page 2");
        assert_eq!(stack.pop().unwrap().render.text, "page 2");
        assert_eq!(stack.pop().unwrap().render.text, "page 1");
        assert!(stack.pop().is_none());
    }

    #[test]
    fn test_bound_evicts_oldest() {
        let limit = 10;
        let mut stack = NavigationStack::new(limit);
        for n in 0..limit {
            assert!(stack.push(frame(n)).is_none());
        }

        let evicted = stack.push(frame(limit)).unwrap();
        assert_eq!(evicted.render.text, "page 0");
        assert_eq!(stack.len(), limit);
        assert_eq!(stack.iter().next().unwrap().render.text, "page 1");
        assert_eq!(stack.peek().unwrap().render.text, format!("page {limit}"));
    }

    #[test]
    fn test_clear_and_empty() {
        let mut stack = NavigationStack::default();
        assert!(stack.is_empty());
        assert_eq!(stack.limit(), DEFAULT_STACK_LIMIT);
        assert_eq!(stack.path(), "(empty)");

        stack.push(frame(1));
        stack.push(frame(2));
        assert_eq!(stack.path(), "recipes:list -> recipes:list");

        stack.clear();
        assert!(stack.is_empty());
        assert!(stack.peek().is_none());
    }

    #[test]
    fn test_zero_limit_is_raised_to_one() {
        let mut stack = NavigationStack::new(0);
        stack.push(frame(1));
        stack.push(frame(2));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.peek().unwrap().render.text, "page 2");
    }
}
