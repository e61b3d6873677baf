use std::cmp::Ordering;

use crate::comments_by_id::{CommentIndex, EmptyCommentsById};
use crate::events::{CommentViewModelEvent, EventListeners, Subscription};
use crate::{CommentId, CommentModel, CommentModelEnriched, CommentTransformer, Error, Result};

type SortFn<'a> = &'a dyn Fn(&CommentModelEnriched, &CommentModelEnriched) -> Ordering;

/// Owns the comment index for one comments section and notifies listeners of
/// every change made through it.
///
/// Lookups borrow from the view-model, so a comment returned by a query cannot
/// be held across a mutation; listeners receive ids and look comments up again.
pub struct CommentViewModel {
    listeners: EventListeners,
    transformer: CommentTransformer,
    comments_by_id: Box<dyn CommentIndex>,
}

impl Default for CommentViewModel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommentViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentViewModel")
            .field("size", &self.size())
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl CommentViewModel {
    pub fn new() -> Self {
        Self {
            listeners: EventListeners::default(),
            transformer: CommentTransformer::new(),
            comments_by_id: Box::new(EmptyCommentsById),
        }
    }

    /// Load the initial batch of comments.
    ///
    /// Does nothing but log a warning when comments are already loaded.
    pub fn init_comments(&mut self, comments: Vec<CommentModel>) -> Result<()> {
        if self.comments_by_id.size() > 0 {
            log::warn!(
                "view model already initialized with {} comments, ignoring {} more",
                self.comments_by_id.size(),
                comments.len()
            );
            return Ok(());
        }

        let enriched = self.transformer.enrich_many(comments);
        let current = std::mem::replace(&mut self.comments_by_id, Box::new(EmptyCommentsById));
        self.comments_by_id = current.merge(Box::new(enriched))?;
        log::info!("initialized view model with {} comments", self.size());
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.comments_by_id.size()
    }

    pub fn get_comment(&self, id: &CommentId) -> Result<Option<&CommentModelEnriched>> {
        self.comments_by_id.get_comment(id)
    }

    fn require_comment(&self, id: &CommentId) -> Result<&CommentModelEnriched> {
        self.get_comment(id)?.ok_or_else(|| Error::CommentNotFound {
            comment_id: id.clone(),
        })
    }

    /// Root comments, ordered by `sorter` when given. Sorting only affects the
    /// returned snapshot.
    pub fn get_root_comments(&self, sorter: Option<SortFn<'_>>) -> Result<Vec<&CommentModelEnriched>> {
        let mut comments = self.comments_by_id.root_comments()?;
        if let Some(sorter) = sorter {
            comments.sort_by(|a, b| sorter(a, b));
        }
        Ok(comments)
    }

    /// All descendants of `parent_id`, ordered by `sorter` when given.
    pub fn get_child_comments(
        &self,
        parent_id: &CommentId,
        sorter: Option<SortFn<'_>>,
    ) -> Result<Vec<&CommentModelEnriched>> {
        let mut children = self.comments_by_id.child_comments(parent_id)?;
        if let Some(sorter) = sorter {
            children.sort_by(|a, b| sorter(a, b));
        }
        Ok(children)
    }

    /// Only the replies whose `parent_id` is `parent_id`.
    pub fn get_direct_replies(
        &self,
        parent_id: &CommentId,
        sorter: Option<SortFn<'_>>,
    ) -> Result<Vec<&CommentModelEnriched>> {
        let mut replies = self.get_child_comments(parent_id, sorter)?;
        replies.retain(|reply| reply.parent_id() == Some(parent_id));
        Ok(replies)
    }

    pub fn subscribe(
        &self,
        event: CommentViewModelEvent,
        listener: impl Fn(&CommentId) + 'static,
    ) -> Subscription {
        self.listeners.subscribe(event, listener)
    }

    pub fn unsubscribe(&self, subscription: &Subscription) {
        self.listeners.unsubscribe(subscription);
    }

    /// Remove every listener of `event`, or of all events when `None`.
    pub fn unsubscribe_all(&self, event: Option<CommentViewModelEvent>) {
        self.listeners.unsubscribe_all(event);
    }

    pub fn listener_count(&self, event: CommentViewModelEvent) -> usize {
        self.listeners.listener_count(event)
    }

    /// Add a single new comment and link it into its thread.
    pub fn add_comment(&mut self, comment: CommentModel) -> Result<&CommentModelEnriched> {
        if self.comments_by_id.get_comment(&comment.id)?.is_some() {
            return Err(Error::DuplicateIdentity {
                comment_id: comment.id,
            });
        }

        let id = comment.id.clone();
        let enriched = self.transformer.enrich(comment, self.comments_by_id.as_mut());
        self.comments_by_id.set_comment(enriched)?;

        self.listeners.emit(CommentViewModelEvent::CommentAdded, &id);
        self.require_comment(&id)
    }

    /// Apply an edited version of an existing comment.
    ///
    /// Id, parent, creation time, creator and upvote state of the stored comment
    /// are kept regardless of what `comment` carries.
    pub fn update_comment(&mut self, comment: CommentModel) -> Result<&CommentModelEnriched> {
        let id = comment.id.clone();
        let existing = self
            .comments_by_id
            .get_comment_mut(&id)?
            .ok_or_else(|| Error::CommentNotFound {
                comment_id: id.clone(),
            })?;
        existing.apply_update(comment);

        self.listeners.emit(CommentViewModelEvent::CommentUpdated, &id);
        self.require_comment(&id)
    }

    /// Take over the upvote count and flag from `comment`; nothing else changes.
    pub fn upvote_comment(&mut self, comment: CommentModel) -> Result<&CommentModelEnriched> {
        let CommentModel {
            id,
            upvote_count,
            upvoted_by_current_user,
            ..
        } = comment;
        let existing = self
            .comments_by_id
            .get_comment_mut(&id)?
            .ok_or_else(|| Error::CommentNotFound {
                comment_id: id.clone(),
            })?;
        existing.apply_upvote(upvote_count, upvoted_by_current_user);

        self.listeners.emit(CommentViewModelEvent::CommentUpvoted, &id);
        self.require_comment(&id)
    }
}
