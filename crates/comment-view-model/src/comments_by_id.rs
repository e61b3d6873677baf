use std::collections::HashMap;

use crate::transformer::visit_ancestors;
use crate::{CommentId, CommentModel, CommentModelEnriched, Error, Result};

/// Keyed store of enriched comments, split into root and child partitions.
///
/// A comment's partition follows from `parent_id` when it is stored and never
/// changes afterwards.
pub trait CommentIndex {
    fn size(&self) -> usize;

    /// Look up a comment by id. The child partition is searched first.
    fn get_comment(&self, id: &CommentId) -> Result<Option<&CommentModelEnriched>>;

    fn get_comment_mut(&mut self, id: &CommentId) -> Result<Option<&mut CommentModelEnriched>>;

    /// Store a comment, replacing any comment with the same id.
    fn set_comment(&mut self, comment: CommentModelEnriched) -> Result<()>;

    /// Remove a comment from the partition implied by its `parent_id`.
    /// Returns whether a comment was removed.
    fn delete_comment(&mut self, comment: &CommentModel) -> Result<bool>;

    /// All root comments, in insertion order.
    fn root_comments(&self) -> Result<Vec<&CommentModelEnriched>>;

    /// Every descendant of `parent_id` at any depth, in creation order.
    /// Callers that want direct replies only filter on `parent_id`.
    fn child_comments(&self, parent_id: &CommentId) -> Result<Vec<&CommentModelEnriched>>;

    /// Combine this index with `other`. Comments from `other` win on id
    /// collisions.
    fn merge(self: Box<Self>, other: Box<dyn CommentIndex>) -> Result<Box<dyn CommentIndex>>;

    /// Hand back the map-backed representation, or the index itself when it
    /// is some other implementation.
    fn into_map(self: Box<Self>) -> std::result::Result<MapCommentsById, Box<dyn CommentIndex>>;
}

/// One partition: comments by id plus the order they were first stored in.
#[derive(Debug, Clone, Default)]
struct Partition {
    by_id: HashMap<CommentId, CommentModelEnriched>,
    order: Vec<CommentId>,
}

impl Partition {
    fn len(&self) -> usize {
        self.by_id.len()
    }

    fn contains(&self, id: &CommentId) -> bool {
        self.by_id.contains_key(id)
    }

    fn get(&self, id: &CommentId) -> Option<&CommentModelEnriched> {
        self.by_id.get(id)
    }

    fn get_mut(&mut self, id: &CommentId) -> Option<&mut CommentModelEnriched> {
        self.by_id.get_mut(id)
    }

    fn insert(&mut self, comment: CommentModelEnriched) {
        let id = comment.id().clone();
        if self.by_id.insert(id.clone(), comment).is_none() {
            self.order.push(id);
        }
    }

    fn remove(&mut self, id: &CommentId) -> Option<CommentModelEnriched> {
        let removed = self.by_id.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed)
    }

    fn values(&self) -> impl Iterator<Item = &CommentModelEnriched> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    fn extend(&mut self, mut other: Partition) {
        for id in other.order {
            if let Some(comment) = other.by_id.remove(&id) {
                self.insert(comment);
            }
        }
    }
}

/// The index used once comments are loaded.
#[derive(Debug, Clone, Default)]
pub struct MapCommentsById {
    root: Partition,
    child: Partition,
}

impl MapCommentsById {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root_count(&self) -> usize {
        self.root.len()
    }

    pub fn child_count(&self) -> usize {
        self.child.len()
    }

    pub fn get(&self, id: &CommentId) -> Option<&CommentModelEnriched> {
        self.child.get(id).or_else(|| self.root.get(id))
    }

    pub fn get_mut(&mut self, id: &CommentId) -> Option<&mut CommentModelEnriched> {
        if self.child.contains(id) {
            self.child.get_mut(id)
        } else {
            self.root.get_mut(id)
        }
    }

    pub fn insert(&mut self, comment: CommentModelEnriched) {
        if comment.is_root() {
            self.root.insert(comment);
        } else {
            self.child.insert(comment);
        }
    }

    /// Remove a comment and drop its id from every ancestor's relationships.
    pub fn remove(&mut self, comment: &CommentModel) -> Option<CommentModelEnriched> {
        let removed = if comment.is_root() {
            self.root.remove(&comment.id)
        } else {
            self.child.remove(&comment.id)
        }?;

        visit_ancestors(removed.id(), removed.parent_id(), self, |_, ancestor| {
            ancestor.detach(removed.id());
        });
        Some(removed)
    }

    /// Rebuild partitions from another index's public traversal.
    fn from_traversal(other: &dyn CommentIndex) -> Result<Self> {
        let mut comments_by_id = Self::new();
        for root in other.root_comments()? {
            comments_by_id.root.insert(root.clone());
            for child in other.child_comments(root.id())? {
                comments_by_id.child.insert(child.clone());
            }
        }
        Ok(comments_by_id)
    }
}

impl CommentIndex for MapCommentsById {
    fn size(&self) -> usize {
        self.root.len() + self.child.len()
    }

    fn get_comment(&self, id: &CommentId) -> Result<Option<&CommentModelEnriched>> {
        Ok(self.get(id))
    }

    fn get_comment_mut(&mut self, id: &CommentId) -> Result<Option<&mut CommentModelEnriched>> {
        Ok(self.get_mut(id))
    }

    fn set_comment(&mut self, comment: CommentModelEnriched) -> Result<()> {
        self.insert(comment);
        Ok(())
    }

    fn delete_comment(&mut self, comment: &CommentModel) -> Result<bool> {
        Ok(self.remove(comment).is_some())
    }

    fn root_comments(&self) -> Result<Vec<&CommentModelEnriched>> {
        Ok(self.root.values().collect())
    }

    fn child_comments(&self, parent_id: &CommentId) -> Result<Vec<&CommentModelEnriched>> {
        let parent = self.get(parent_id).ok_or_else(|| Error::CommentNotFound {
            comment_id: parent_id.clone(),
        })?;

        Ok(parent
            .all_child_ids()
            .iter()
            .filter_map(|child_id| self.get(child_id))
            .collect())
    }

    fn merge(self: Box<Self>, other: Box<dyn CommentIndex>) -> Result<Box<dyn CommentIndex>> {
        match other.into_map() {
            Ok(other) => {
                let mut merged = *self;
                merged.root.extend(other.root);
                merged.child.extend(other.child);
                Ok(Box::new(merged))
            }
            Err(other) => Ok(Box::new(Self::from_traversal(other.as_ref())?)),
        }
    }

    fn into_map(self: Box<Self>) -> std::result::Result<MapCommentsById, Box<dyn CommentIndex>> {
        Ok(*self)
    }
}

/// The index a view-model starts with. Only `merge` is supported; everything
/// else reports that comments have not been initialized yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCommentsById;

fn not_initialized(operation: &'static str) -> Error {
    Error::NotInitialized { operation }
}

impl CommentIndex for EmptyCommentsById {
    fn size(&self) -> usize {
        0
    }

    fn get_comment(&self, _id: &CommentId) -> Result<Option<&CommentModelEnriched>> {
        Err(not_initialized("get_comment"))
    }

    fn get_comment_mut(&mut self, _id: &CommentId) -> Result<Option<&mut CommentModelEnriched>> {
        Err(not_initialized("get_comment_mut"))
    }

    fn set_comment(&mut self, _comment: CommentModelEnriched) -> Result<()> {
        Err(not_initialized("set_comment"))
    }

    fn delete_comment(&mut self, _comment: &CommentModel) -> Result<bool> {
        Err(not_initialized("delete_comment"))
    }

    fn root_comments(&self) -> Result<Vec<&CommentModelEnriched>> {
        Err(not_initialized("root_comments"))
    }

    fn child_comments(&self, _parent_id: &CommentId) -> Result<Vec<&CommentModelEnriched>> {
        Err(not_initialized("child_comments"))
    }

    fn merge(self: Box<Self>, other: Box<dyn CommentIndex>) -> Result<Box<dyn CommentIndex>> {
        Ok(other)
    }

    fn into_map(self: Box<Self>) -> std::result::Result<MapCommentsById, Box<dyn CommentIndex>> {
        Err(self)
    }
}
