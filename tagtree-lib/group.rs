//! The tag group tree: named, colored groups each holding an ordered tag map
//! and a list of child groups.
//!
//! Children are stored behind [`Arc`] so that snapshots share structure: a
//! mutation rebuilds only the spine from the root down to the edited node and
//! reuses every untouched subtree. A committed snapshot is never mutated in
//! place.
//!
//! Nodes are addressed two ways:
//! - by **path**, the chain of names from a top-level group down to the node.
//!   Paths are a display convenience and go stale the moment an ancestor is
//!   renamed; [`find_by_path`] therefore reports a missing node as `None`
//!   rather than an error.
//! - by **id**, an opaque identity minted at creation and preserved across
//!   every snapshot the node survives into (renames included). Callers that
//!   hold a selection across mutations should track the id and re-derive the
//!   path with [`path_of`].

use std::{
  num::NonZeroU64,
  sync::{
    Arc,
    atomic::{
      AtomicU64,
      Ordering,
    },
  },
};

use indexmap::IndexMap;
use serde::{
  Deserialize,
  Serialize,
};

/// Name of the reserved catch-all group. It always exists and is kept last
/// among the top-level groups.
pub const WILDCARD_NAME: &str = "ワイルドカード";

/// Stable identity of a group node, independent of its display name.
///
/// Ids are process-local: they are not serialized, and deserialization mints
/// fresh ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(NonZeroU64);

impl GroupId {
  pub fn next() -> Self {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    let id = COUNTER.fetch_add(1, Ordering::Relaxed);
    // Starts at 1 and only ever increments.
    Self(NonZeroU64::new(id).unwrap())
  }
}

/// One node of the tag tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagGroup {
  #[serde(skip, default = "GroupId::next")]
  pub id:     GroupId,
  pub name:   String,
  #[serde(default)]
  pub color:  String,
  /// Tag key -> display label. Insertion order is preserved; it drives both
  /// display and export order.
  #[serde(default)]
  pub tags:   IndexMap<String, String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub groups: Vec<Arc<TagGroup>>,
}

impl TagGroup {
  pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
    Self {
      id:     GroupId::next(),
      name:   name.into(),
      color:  color.into(),
      tags:   IndexMap::new(),
      groups: Vec::new(),
    }
  }

  /// Total number of nodes in this subtree, itself included.
  pub fn node_count(&self) -> usize {
    1 + self.groups.iter().map(|g| g.node_count()).sum::<usize>()
  }
}

/// A whole snapshot of the tree: the ordered list of top-level groups.
///
/// Cloning is cheap (the children are `Arc`-shared), which is what makes
/// keeping many snapshots in the undo history affordable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagTree {
  pub groups: Vec<Arc<TagGroup>>,
}

impl TagTree {
  /// The built-in starting tree: one ordinary group with a few seeded tags,
  /// followed by the wildcard group.
  pub fn builtin() -> Self {
    let mut character = TagGroup::new("キャラクター", "rgba(255, 123, 2, .4)");
    character.tags.insert("__character__".into(), "キャラクター".into());
    character.tags.insert("solo".into(), "ソロ".into());
    character.tags.insert("1girl".into(), "1人の女の子".into());

    let mut person = TagGroup::new("人物", "");
    person.groups.push(Arc::new(character));

    Self {
      groups: vec![Arc::new(person), Arc::new(wildcard_group())],
    }
  }

  pub fn find_by_path(&self, path: &[&str]) -> Option<&Arc<TagGroup>> {
    find_by_path(&self.groups, path)
  }

  pub fn find_by_id(&self, id: GroupId) -> Option<&Arc<TagGroup>> {
    find_by_id(&self.groups, id)
  }

  /// Re-derives the current name path of a node, e.g. after an ancestor was
  /// renamed.
  pub fn path_of(&self, id: GroupId) -> Option<Vec<String>> {
    let mut path = Vec::new();
    if path_of(&self.groups, id, &mut path) {
      Some(path)
    } else {
      None
    }
  }

  pub fn node_count(&self) -> usize {
    self.groups.iter().map(|g| g.node_count()).sum()
  }
}

/// The default wildcard group, with its single `WC` child.
pub fn wildcard_group() -> TagGroup {
  let mut wildcard = TagGroup::new(WILDCARD_NAME, "");
  wildcard
    .groups
    .push(Arc::new(TagGroup::new("WC", "rgba(167, 139, 250, 0.4)")));
  wildcard
}

/// Descends the tree level by level, matching names. Returns `None` if any
/// segment has no matching sibling; a stale path is an expected condition,
/// not an error.
pub fn find_by_path<'a>(groups: &'a [Arc<TagGroup>], path: &[&str]) -> Option<&'a Arc<TagGroup>> {
  let (first, rest) = path.split_first()?;
  let group = groups.iter().find(|g| g.name == *first)?;
  if rest.is_empty() {
    Some(group)
  } else {
    find_by_path(&group.groups, rest)
  }
}

pub fn find_by_id(groups: &[Arc<TagGroup>], id: GroupId) -> Option<&Arc<TagGroup>> {
  for group in groups {
    if group.id == id {
      return Some(group);
    }
    if let Some(found) = find_by_id(&group.groups, id) {
      return Some(found);
    }
  }
  None
}

fn path_of(groups: &[Arc<TagGroup>], id: GroupId, path: &mut Vec<String>) -> bool {
  for group in groups {
    path.push(group.name.clone());
    if group.id == id || path_of(&group.groups, id, path) {
      return true;
    }
    path.pop();
  }
  false
}

/// Returns `base` if no sibling carries that name already, otherwise `base`
/// suffixed with the smallest positive integer that makes it unique.
/// Deterministic; recomputed from the given siblings every time.
pub fn unique_name(base: &str, siblings: &[Arc<TagGroup>]) -> String {
  let taken = |name: &str| siblings.iter().any(|g| g.name == name);
  if !taken(base) {
    return base.to_string();
  }
  let mut counter = 1usize;
  loop {
    let candidate = format!("{base}{counter}");
    if !taken(&candidate) {
      return candidate;
    }
    counter += 1;
  }
}
