//! Linear undo/redo over immutable snapshots.
//!
//! The history wraps an arbitrary value type `T` and keeps three pieces of
//! state: the `past` (oldest first), the `present`, and the `future` (nearest
//! redo first). Committing a new value pushes the present onto the past and
//! irrevocably discards the future: there is no redo after a fresh edit.
//!
//! Snapshots are stored by value and never touched again once committed, so
//! `T` should be cheap to clone (the tag tree shares its subtrees behind
//! `Arc`, which makes a snapshot clone a handful of pointer bumps). After any
//! sequence of undos and redos the exact committed values come back, not
//! re-derived equivalents.
//!
//! The log is optionally bounded: with a capacity set, committing past the
//! limit drops the oldest entry of `past`. An unbounded log would otherwise
//! grow for the whole editing session.

use std::collections::VecDeque;

/// Generic linear undo/redo container.
#[derive(Debug, Clone)]
pub struct History<T> {
  past:        Vec<T>,
  present:     T,
  future:      VecDeque<T>,
  last_action: Option<String>,
  capacity:    Option<usize>,
}

impl<T> History<T> {
  pub fn new(initial: T) -> Self {
    Self {
      past:        Vec::new(),
      present:     initial,
      future:      VecDeque::new(),
      last_action: None,
      capacity:    None,
    }
  }

  /// Bounds the undo log to at most `capacity` past entries.
  pub fn with_capacity(initial: T, capacity: usize) -> Self {
    Self {
      capacity: Some(capacity),
      ..Self::new(initial)
    }
  }

  #[inline]
  pub fn present(&self) -> &T {
    &self.present
  }

  /// Label of the most recent transition. Diagnostic only.
  #[inline]
  pub fn last_action(&self) -> Option<&str> {
    self.last_action.as_deref()
  }

  #[inline]
  pub fn can_undo(&self) -> bool {
    !self.past.is_empty()
  }

  #[inline]
  pub fn can_redo(&self) -> bool {
    !self.future.is_empty()
  }

  /// Records `value` as the new present state and clears the redo branch.
  pub fn commit(&mut self, value: T, label: impl Into<Option<String>>) {
    let previous = std::mem::replace(&mut self.present, value);
    self.past.push(previous);
    if let Some(capacity) = self.capacity
      && self.past.len() > capacity
    {
      self.past.remove(0);
    }
    self.future.clear();
    self.last_action = label.into();
  }

  /// Steps back one snapshot. No-op when there is nothing to undo.
  pub fn undo(&mut self) -> bool {
    let Some(previous) = self.past.pop() else {
      return false;
    };
    let current = std::mem::replace(&mut self.present, previous);
    self.future.push_front(current);
    self.last_action = Some("undo".into());
    true
  }

  /// Steps forward one snapshot. No-op when there is nothing to redo.
  pub fn redo(&mut self) -> bool {
    let Some(next) = self.future.pop_front() else {
      return false;
    };
    let current = std::mem::replace(&mut self.present, next);
    self.past.push(current);
    self.last_action = Some("redo".into());
    true
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;

  fn label(s: &str) -> Option<String> {
    Some(s.to_string())
  }

  #[test]
  fn undo_redo_round_trip_restores_identical_snapshots() {
    let v: Vec<Arc<u32>> = (0..=4).map(Arc::new).collect();
    let mut history = History::new(v[0].clone());
    for value in &v[1..] {
      history.commit(value.clone(), None);
    }

    for i in (0..4).rev() {
      assert!(history.undo());
      assert!(Arc::ptr_eq(history.present(), &v[i]));
    }
    assert!(!history.undo());

    for value in v.iter().skip(1) {
      assert!(history.redo());
      assert!(Arc::ptr_eq(history.present(), value));
    }
    assert!(!history.redo());
  }

  #[test]
  fn commit_after_undo_discards_future() {
    let mut history = History::new(1);
    history.commit(2, label("two"));
    history.commit(3, label("three"));
    history.undo();
    assert!(history.can_redo());

    history.commit(4, label("four"));
    assert!(!history.can_redo());
    assert!(!history.redo());
    assert_eq!(*history.present(), 4);

    // The discarded branch stays gone: undoing walks back to 2, then 1.
    history.undo();
    assert_eq!(*history.present(), 2);
    history.undo();
    assert_eq!(*history.present(), 1);
  }

  #[test]
  fn undo_at_root_and_redo_at_tip_are_noops() {
    let mut history = History::new("a");
    assert!(!history.can_undo());
    assert!(!history.undo());
    assert_eq!(*history.present(), "a");
    assert!(!history.can_redo());
    assert!(!history.redo());
  }

  #[test]
  fn capacity_drops_oldest_past_entry() {
    let mut history = History::with_capacity(0, 2);
    for i in 1..=5 {
      history.commit(i, None);
    }
    assert_eq!(*history.present(), 5);
    assert!(history.undo());
    assert!(history.undo());
    // Entries older than the cap are gone.
    assert!(!history.undo());
    assert_eq!(*history.present(), 3);
  }

  #[test]
  fn last_action_tracks_transitions() {
    let mut history = History::new(0);
    history.commit(1, label("edit"));
    assert_eq!(history.last_action(), Some("edit"));
    history.undo();
    assert_eq!(history.last_action(), Some("undo"));
    history.redo();
    assert_eq!(history.last_action(), Some("redo"));
  }

  quickcheck::quickcheck! {
    // For any committed sequence, k undos followed by k redos reproduce the
    // original snapshots by identity.
    fn undo_redo_is_lossless(values: Vec<u32>, k: usize) -> bool {
      let values: Vec<Arc<u32>> = values.into_iter().map(Arc::new).collect();
      let mut history = History::new(Arc::new(0));
      for value in &values {
        history.commit(value.clone(), None);
      }
      let k = k % (values.len() + 1);
      for _ in 0..k {
        if !history.undo() {
          return false;
        }
      }
      for _ in 0..k {
        if !history.redo() {
          return false;
        }
      }
      match values.last() {
        Some(last) => Arc::ptr_eq(history.present(), last),
        None => !history.can_undo() && !history.can_redo(),
      }
    }
  }
}
