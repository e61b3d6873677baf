use std::collections::BTreeMap;

use crate::{AttachmentModel, CommentId, CommentModel, Timestamp, UserId};

/// A comment together with the thread relationships derived for it.
///
/// The relationship fields are only ever grown by enrichment and shrunk by
/// index deletion; the record itself is changed through the view-model,
/// which keeps identity fields fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentModelEnriched {
    comment: CommentModel,
    /// Ids whose `parent_id` is this comment, in enrichment order.
    direct_child_ids: Vec<CommentId>,
    /// Every descendant at any depth, in enrichment order.
    all_child_ids: Vec<CommentId>,
}

impl From<CommentModel> for CommentModelEnriched {
    fn from(comment: CommentModel) -> Self {
        Self {
            comment,
            direct_child_ids: Vec::new(),
            all_child_ids: Vec::new(),
        }
    }
}

impl CommentModelEnriched {
    pub fn comment(&self) -> &CommentModel {
        &self.comment
    }

    pub fn id(&self) -> &CommentId {
        &self.comment.id
    }

    pub fn parent_id(&self) -> Option<&CommentId> {
        self.comment.parent_id.as_ref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.comment.created_at
    }

    pub fn is_root(&self) -> bool {
        self.comment.parent_id.is_none()
    }

    pub fn direct_child_ids(&self) -> &[CommentId] {
        &self.direct_child_ids
    }

    pub fn all_child_ids(&self) -> &[CommentId] {
        &self.all_child_ids
    }

    pub(crate) fn add_direct_child(&mut self, child_id: &CommentId) {
        if !self.direct_child_ids.contains(child_id) {
            self.direct_child_ids.push(child_id.clone());
        }
    }

    pub(crate) fn add_descendant(&mut self, descendant_id: &CommentId) {
        if !self.all_child_ids.contains(descendant_id) {
            self.all_child_ids.push(descendant_id.clone());
        }
    }

    pub(crate) fn detach(&mut self, descendant_id: &CommentId) {
        self.direct_child_ids.retain(|id| id != descendant_id);
        self.all_child_ids.retain(|id| id != descendant_id);
    }

    /// Copy the editable fields of `update` onto this comment.
    ///
    /// Id, parent, creation time, creator and upvote state are kept as stored.
    pub(crate) fn apply_update(&mut self, update: CommentModel) {
        let CommentModel {
            modified_at,
            content,
            attachments,
            pings,
            is_new,
            is_deleted,
            created_by_admin,
            created_by_current_user,
            ..
        } = update;

        let comment = &mut self.comment;
        comment.modified_at = modified_at;
        comment.content = content;
        comment.attachments = attachments;
        comment.pings = pings;
        comment.is_new = is_new;
        comment.is_deleted = is_deleted;
        comment.created_by_admin = created_by_admin;
        comment.created_by_current_user = created_by_current_user;
    }

    pub(crate) fn apply_upvote(&mut self, upvote_count: u32, upvoted_by_current_user: bool) {
        self.comment.upvote_count = upvote_count;
        self.comment.upvoted_by_current_user = upvoted_by_current_user;
    }
}

/// Partial overlay applied by [`deplete`]. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentPatch {
    pub modified_at: Option<Timestamp>,
    pub content: Option<String>,
    pub attachments: Option<Vec<AttachmentModel>>,
    pub pings: Option<BTreeMap<UserId, String>>,
    pub is_new: Option<bool>,
    pub is_deleted: Option<bool>,
    pub created_by_admin: Option<bool>,
    pub created_by_current_user: Option<bool>,
    pub upvote_count: Option<u32>,
    pub upvoted_by_current_user: Option<bool>,
}

impl CommentPatch {
    pub fn apply_to(&self, comment: &mut CommentModel) {
        if let Some(modified_at) = self.modified_at {
            comment.modified_at = Some(modified_at);
        }
        if let Some(content) = &self.content {
            comment.content = content.clone();
        }
        if let Some(attachments) = &self.attachments {
            comment.attachments = Some(attachments.clone());
        }
        if let Some(pings) = &self.pings {
            comment.pings = Some(pings.clone());
        }
        if let Some(is_new) = self.is_new {
            comment.is_new = is_new;
        }
        if let Some(is_deleted) = self.is_deleted {
            comment.is_deleted = is_deleted;
        }
        if let Some(created_by_admin) = self.created_by_admin {
            comment.created_by_admin = created_by_admin;
        }
        if let Some(created_by_current_user) = self.created_by_current_user {
            comment.created_by_current_user = created_by_current_user;
        }
        if let Some(upvote_count) = self.upvote_count {
            comment.upvote_count = upvote_count;
        }
        if let Some(upvoted_by_current_user) = self.upvoted_by_current_user {
            comment.upvoted_by_current_user = upvoted_by_current_user;
        }
    }
}

pub fn has_attachments(comment: &CommentModelEnriched) -> bool {
    comment
        .comment
        .attachments
        .as_ref()
        .is_some_and(|attachments| !attachments.is_empty())
}

/// Strip the derived thread fields, optionally overlaying `patch`, to get a
/// record in the shape the host expects.
pub fn deplete(comment: &CommentModelEnriched, patch: Option<&CommentPatch>) -> CommentModel {
    let mut raw = comment.comment.clone();
    if let Some(patch) = patch {
        patch.apply_to(&mut raw);
    }
    raw
}

#[cfg(test)]
mod tests {
    use test_comments::{CommentBuilder, at};

    use super::*;

    #[test]
    fn test_from_raw_starts_without_relationships() {
        let enriched = CommentModelEnriched::from(CommentBuilder::root("c1").build());
        assert!(enriched.direct_child_ids().is_empty());
        assert!(enriched.all_child_ids().is_empty());
        assert!(enriched.is_root());
    }

    #[test]
    fn test_has_attachments() {
        let without = CommentModelEnriched::from(CommentBuilder::root("c1").build());
        assert!(!has_attachments(&without));

        let mut empty_list = CommentBuilder::root("c2").build();
        empty_list.attachments = Some(Vec::new());
        assert!(!has_attachments(&CommentModelEnriched::from(empty_list)));

        let with = CommentModelEnriched::from(
            CommentBuilder::root("c3")
                .attachment("a1", "image/png")
                .build(),
        );
        assert!(has_attachments(&with));
    }

    #[test]
    fn test_deplete_returns_original_record() {
        let raw = CommentBuilder::reply("c2", "c1")
            .created(3)
            .ping("u2", "Bob")
            .attachment("a1", "text/plain")
            .upvotes(2, true)
            .build();
        let mut enriched = CommentModelEnriched::from(raw.clone());
        enriched.add_direct_child(&CommentId::new("c3"));
        enriched.add_descendant(&CommentId::new("c3"));

        assert_eq!(deplete(&enriched, None), raw);
    }

    #[test]
    fn test_deplete_overlays_patch() {
        let raw = CommentBuilder::root("c1").upvotes(4, false).build();
        let enriched = CommentModelEnriched::from(raw.clone());

        let patch = CommentPatch {
            upvote_count: Some(5),
            upvoted_by_current_user: Some(true),
            ..Default::default()
        };
        let depleted = deplete(&enriched, Some(&patch));

        assert_eq!(depleted.upvote_count, 5);
        assert!(depleted.upvoted_by_current_user);
        assert_eq!(depleted.content, raw.content);
        // The enriched record itself is untouched.
        assert_eq!(enriched.comment().upvote_count, 4);
    }

    #[test]
    fn test_relationship_ids_are_not_duplicated() {
        let mut enriched = CommentModelEnriched::from(CommentBuilder::root("c1").build());
        let child = CommentId::new("c2");
        enriched.add_direct_child(&child);
        enriched.add_direct_child(&child);
        enriched.add_descendant(&child);
        enriched.add_descendant(&child);

        assert_eq!(enriched.direct_child_ids(), [child.clone()]);
        assert_eq!(enriched.all_child_ids(), [child.clone()]);

        enriched.detach(&child);
        assert!(enriched.direct_child_ids().is_empty());
        assert!(enriched.all_child_ids().is_empty());
    }

    #[test]
    fn test_apply_update_keeps_identity() {
        let mut enriched = CommentModelEnriched::from(
            CommentBuilder::reply("c2", "c1")
                .created(1)
                .creator("alice", "Alice")
                .upvotes(3, true)
                .build(),
        );

        let mut update = CommentBuilder::root("c2")
            .created(9)
            .creator("mallory", "Mallory")
            .content("edited")
            .modified(10)
            .build();
        update.is_deleted = true;
        enriched.apply_update(update);

        let comment = enriched.comment();
        assert_eq!(comment.content, "edited");
        assert_eq!(comment.modified_at, Some(at(10)));
        assert!(comment.is_deleted);
        assert_eq!(comment.parent_id.as_ref().unwrap(), "c1");
        assert_eq!(comment.created_at, at(1));
        assert_eq!(comment.creator_user_id, "alice");
        assert_eq!(comment.creator_display_name.as_deref(), Some("Alice"));
        assert_eq!(comment.upvote_count, 3);
    }
}
