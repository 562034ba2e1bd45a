//! The persisted editing session.
//!
//! Only the present snapshot survives a session: the undo history is
//! deliberately in-memory. The session is a flat record (tree, theme, panel
//! layout, converter text and output) serialized to a single JSON string;
//! where that string lives is the caller's choice via [`Storage`].

use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

use crate::{
  convert::TagPair,
  group::TagTree,
};

#[derive(Debug, Error)]
pub enum SessionError {
  #[error("failed to encode or decode session record: {0}")]
  Codec(#[from] serde_json::Error),
  #[error("storage failure: {0}")]
  Storage(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Where the serialized session record lives. The core never picks the
/// medium; browsers use local storage, tests use memory, tools use files.
pub trait Storage {
  fn load(&self) -> std::io::Result<Option<String>>;
  fn save(&self, record: &str) -> std::io::Result<()>;
}

/// Panel split percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Columns {
  pub left:  f32,
  pub right: f32,
}

impl Default for Columns {
  fn default() -> Self {
    Self {
      left:  25.0,
      right: 75.0,
    }
  }
}

/// The flat persisted record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub tags:    TagTree,
  #[serde(default = "default_theme")]
  pub theme:   String,
  #[serde(default)]
  pub columns: Columns,
  #[serde(default)]
  pub text:    String,
  #[serde(default)]
  pub output:  Vec<TagPair>,
}

fn default_theme() -> String {
  "dark".to_string()
}

impl Default for Session {
  fn default() -> Self {
    Self {
      tags:    TagTree::builtin(),
      theme:   default_theme(),
      columns: Columns::default(),
      text:    String::new(),
      output:  Vec::new(),
    }
  }
}

impl Session {
  pub fn to_json(&self) -> Result<String> {
    Ok(serde_json::to_string(self)?)
  }

  pub fn from_json(record: &str) -> Result<Self> {
    Ok(serde_json::from_str(record)?)
  }

  /// Loads the session from `storage`, falling back to the built-in default
  /// when nothing was persisted yet.
  pub fn restore(storage: &dyn Storage) -> Result<Self> {
    match storage.load()? {
      Some(record) => Self::from_json(&record),
      None => Ok(Self::default()),
    }
  }

  /// Persists the session. Called after every committed change.
  pub fn persist(&self, storage: &dyn Storage) -> Result<()> {
    Ok(storage.save(&self.to_json()?)?)
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use super::*;

  #[derive(Default)]
  struct MemoryStorage {
    record: RefCell<Option<String>>,
  }

  impl Storage for MemoryStorage {
    fn load(&self) -> std::io::Result<Option<String>> {
      Ok(self.record.borrow().clone())
    }

    fn save(&self, record: &str) -> std::io::Result<()> {
      *self.record.borrow_mut() = Some(record.to_string());
      Ok(())
    }
  }

  #[test]
  fn restore_from_empty_storage_is_the_builtin_session() {
    let storage = MemoryStorage::default();
    let session = Session::restore(&storage).unwrap();
    assert_eq!(session.theme, "dark");
    assert!(session.tags.find_by_path(&["人物", "キャラクター"]).is_some());
    assert!(session.text.is_empty());
  }

  #[test]
  fn persist_then_restore_round_trips() {
    let storage = MemoryStorage::default();
    let mut session = Session::default();
    session.text = "smile, 笑顔".to_string();
    session.output.push(TagPair {
      ja: "笑顔".to_string(),
      en: "smile".to_string(),
    });
    session.persist(&storage).unwrap();

    let restored = Session::restore(&storage).unwrap();
    assert_eq!(restored.text, session.text);
    assert_eq!(restored.output, session.output);
    assert_eq!(restored.tags.node_count(), session.tags.node_count());
  }

  #[test]
  fn missing_fields_take_defaults() {
    let session = Session::from_json(r#"{"tags": []}"#).unwrap();
    assert_eq!(session.theme, "dark");
    assert_eq!(session.columns, Columns::default());
    assert!(session.output.is_empty());
  }

  #[test]
  fn corrupt_records_are_reported() {
    assert!(Session::from_json("{not json").is_err());
  }
}
