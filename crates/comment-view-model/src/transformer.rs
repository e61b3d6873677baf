use crate::comments_by_id::{CommentIndex, MapCommentsById};
use crate::{CommentId, CommentModel, CommentModelEnriched};

/// Upper bound on the number of ancestors visited from a single comment.
/// Only reachable when `parent_id` links form a cycle.
pub const MAX_ANCESTOR_DEPTH: usize = 1_000;

/// Resolves a parent id to the enriched parent so enrichment can record the
/// new relationship on it. Returning `None` ends the ancestor walk.
pub trait ParentResolver {
    fn parent_mut(&mut self, parent_id: &CommentId) -> Option<&mut CommentModelEnriched>;
}

impl<T: CommentIndex + ?Sized> ParentResolver for T {
    fn parent_mut(&mut self, parent_id: &CommentId) -> Option<&mut CommentModelEnriched> {
        self.get_comment_mut(parent_id).ok().flatten()
    }
}

/// Turns raw records into enriched ones, wiring up parent/child relationships.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommentTransformer;

impl CommentTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Enrich a whole batch and collect it into a populated index.
    ///
    /// The batch is stable-sorted by `created_at` first so that, in the usual
    /// case, a parent is already placed when its replies are enriched. Replies
    /// sharing a timestamp with their parent but listed before it are not
    /// linked.
    pub fn enrich_many(&self, mut comments: Vec<CommentModel>) -> MapCommentsById {
        comments.sort_by_key(|comment| comment.created_at);

        let mut comments_by_id = MapCommentsById::new();
        for comment in comments {
            let enriched = self.enrich(comment, &mut comments_by_id);
            comments_by_id.insert(enriched);
        }

        log::debug!(
            "enriched {} comments ({} root, {} child)",
            comments_by_id.size(),
            comments_by_id.root_count(),
            comments_by_id.child_count()
        );
        comments_by_id
    }

    /// Enrich a single comment, recording it on its parent's direct children
    /// and on every ancestor's descendants.
    ///
    /// An already enriched record keeps the relationships it has accumulated.
    /// A parent the resolver cannot find ends propagation at that point; the
    /// comment itself is still returned.
    pub fn enrich<R>(
        &self,
        comment: impl Into<CommentModelEnriched>,
        parents: &mut R,
    ) -> CommentModelEnriched
    where
        R: ParentResolver + ?Sized,
    {
        let enriched: CommentModelEnriched = comment.into();
        let id = enriched.id().clone();

        visit_ancestors(&id, enriched.parent_id(), parents, |depth, ancestor| {
            if depth == 0 {
                ancestor.add_direct_child(&id);
            }
            ancestor.add_descendant(&id);
        });

        enriched
    }
}

/// Walk from `first_parent` up to the root, calling `visitor` with the
/// distance from the origin (0 for the direct parent) and each ancestor.
pub(crate) fn visit_ancestors<R>(
    origin: &CommentId,
    first_parent: Option<&CommentId>,
    parents: &mut R,
    mut visitor: impl FnMut(usize, &mut CommentModelEnriched),
) where
    R: ParentResolver + ?Sized,
{
    let mut next = first_parent.cloned();
    let mut depth = 0;

    while let Some(ancestor_id) = next.take() {
        if ancestor_id == *origin || depth >= MAX_ANCESTOR_DEPTH {
            log::warn!(
                "stopped ancestor walk of comment {} at {}: parent chain is cyclic",
                origin,
                ancestor_id
            );
            break;
        }

        let Some(ancestor) = parents.parent_mut(&ancestor_id) else {
            log::debug!(
                "parent {} of comment {} is unknown, ancestor chain ends here",
                ancestor_id,
                origin
            );
            break;
        };

        visitor(depth, ancestor);
        next = ancestor.parent_id().cloned();
        depth += 1;
    }
}
