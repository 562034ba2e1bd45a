//! The editing session: a tag tree plus its undo history.
//!
//! [`Editor`] is the single writer of the tree. Every mutation validates
//! against the current snapshot, produces a new one through [`crate::ops`]
//! and commits it with a human-readable action label. Failed attempts never
//! touch the history; stale-path moves and same-position drops are swallowed
//! as silent no-ops because they are everyday occurrences when drag targets
//! go stale mid-gesture.

use indexmap::IndexMap;

use crate::{
  group::TagTree,
  history::History,
  ops::{
    self,
    Result,
    TreeError,
  },
  yaml,
};

/// Upper bound on undo depth; the oldest snapshots fall off first.
const HISTORY_LIMIT: usize = 100;

pub struct Editor {
  history: History<TagTree>,
}

impl Default for Editor {
  fn default() -> Self {
    Self::from_tree(TagTree::builtin())
  }
}

impl Editor {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_tree(tree: TagTree) -> Self {
    Self {
      history: History::with_capacity(tree, HISTORY_LIMIT),
    }
  }

  /// The current snapshot. Cloning it is cheap; holding the clone across
  /// further edits is safe because committed snapshots are never mutated.
  pub fn tree(&self) -> &TagTree {
    self.history.present()
  }

  pub fn last_action(&self) -> Option<&str> {
    self.history.last_action()
  }

  pub fn can_undo(&self) -> bool {
    self.history.can_undo()
  }

  pub fn can_redo(&self) -> bool {
    self.history.can_redo()
  }

  pub fn undo(&mut self) -> bool {
    self.history.undo()
  }

  pub fn redo(&mut self) -> bool {
    self.history.redo()
  }

  fn commit(&mut self, tree: TagTree, label: impl Into<String>) {
    self.history.commit(tree, Some(label.into()));
  }

  /// Commits `result` under `label`, treating stale paths and same-position
  /// drops as silent no-ops.
  fn commit_or_skip(&mut self, result: Result<TagTree>, label: &str) -> Result<()> {
    match result {
      Ok(tree) => {
        self.commit(tree, label);
        Ok(())
      },
      Err(TreeError::NotFound(path)) => {
        tracing::debug!(%path, action = label, "stale path, mutation skipped");
        Ok(())
      },
      Err(TreeError::SamePosition) => Ok(()),
      Err(err) => Err(err),
    }
  }

  pub fn add_top_level_group(&mut self) {
    let tree = ops::add_top_level_group(self.tree());
    self.commit(tree, "メイングループの追加");
  }

  pub fn add_subgroup(&mut self, parent_path: &[&str]) -> Result<()> {
    let tree = ops::add_subgroup(self.tree(), parent_path)?;
    self.commit(tree, "サブグループの追加");
    Ok(())
  }

  pub fn rename_group(&mut self, path: &[&str], new_name: &str) -> Result<()> {
    let tree = ops::rename_group(self.tree(), path, new_name)?;
    self.commit(tree, "グループ名の変更");
    Ok(())
  }

  pub fn set_color(&mut self, path: &[&str], color: &str) -> Result<()> {
    let tree = ops::set_color(self.tree(), path, color)?;
    self.commit(tree, "グループの色を変更");
    Ok(())
  }

  /// Deletes the subtree at `path`. Confirmation is the caller's concern.
  pub fn delete_group(&mut self, path: &[&str]) -> Result<()> {
    let tree = ops::delete_group(self.tree(), path)?;
    self.commit(tree, "グループの削除");
    Ok(())
  }

  pub fn update_tags(&mut self, path: &[&str], tags: IndexMap<String, String>) -> Result<()> {
    let tree = ops::update_tags(self.tree(), path, tags)?;
    self.commit(tree, "タグの更新");
    Ok(())
  }

  pub fn merge_tags(&mut self, path: &[&str], tags: &IndexMap<String, String>) -> Result<()> {
    let tree = ops::merge_tags(self.tree(), path, tags)?;
    self.commit(tree, "タグの追加");
    Ok(())
  }

  /// Moves tags between groups as one history entry, so a single undo
  /// reverts the whole move.
  pub fn move_tag(
    &mut self,
    source_path: &[&str],
    target_path: &[&str],
    tags: &IndexMap<String, String>,
  ) -> Result<()> {
    let label = format!(
      "タグを {} から {} に移動",
      source_path.join("/"),
      target_path.join("/")
    );
    let result = ops::move_tag(self.tree(), source_path, target_path, tags);
    self.commit_or_skip(result, &label)
  }

  pub fn move_subgroup(
    &mut self,
    source_parent: &[&str],
    source_index: usize,
    target_parent: &[&str],
  ) -> Result<()> {
    let result = ops::move_subgroup(self.tree(), source_parent, source_index, target_parent);
    self.commit_or_skip(result, "サブグループの移動")
  }

  pub fn reorder_siblings(&mut self, parent_path: &[&str], from: usize, to: usize) -> Result<()> {
    let result = ops::reorder_siblings(self.tree(), parent_path, from, to);
    self.commit_or_skip(result, "グループの順序変更")
  }

  /// Imports a nested group document, replacing the whole tree. Parse errors
  /// leave the current snapshot untouched.
  pub fn import_yaml(&mut self, doc: &str) -> yaml::Result<()> {
    let tree = yaml::import_yaml(doc)?;
    self.commit(tree, "YAMLファイルのインポート");
    Ok(())
  }

  pub fn export_yaml(&self) -> yaml::Result<String> {
    yaml::export_yaml(self.tree())
  }
}
