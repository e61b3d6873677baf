//! Decisions and boundary records for the user actions a comments section
//! offers. Nothing here mutates the view-model: the records produced are
//! sent to the host and, once it confirms, fed back through
//! `update_comment` or `upvote_comment`.

use crate::{CommentModel, CommentModelEnriched, CommentPatch, ViewModelOptions, deplete};

fn is_own(comment: &CommentModel, options: &ViewModelOptions) -> bool {
    comment.created_by_current_user
        || options.current_user_id.as_ref() == Some(&comment.creator_user_id)
}

pub fn can_reply(options: &ViewModelOptions) -> bool {
    options.enable_replying && !options.read_only
}

pub fn can_edit(comment: &CommentModelEnriched, options: &ViewModelOptions) -> bool {
    let comment = comment.comment();
    options.enable_editing
        && !options.read_only
        && !comment.is_deleted
        && (options.current_user_is_admin || is_own(comment, options))
}

pub fn can_upvote(comment: &CommentModelEnriched, options: &ViewModelOptions) -> bool {
    let comment = comment.comment();
    options.enable_upvoting && !options.read_only && !comment.is_deleted && !is_own(comment, options)
}

/// Comments with direct replies can only be deleted when
/// `enable_deleting_comment_with_replies` is set.
pub fn can_delete(comment: &CommentModelEnriched, options: &ViewModelOptions) -> bool {
    options.enable_deleting
        && !options.read_only
        && (options.enable_deleting_comment_with_replies || comment.direct_child_ids().is_empty())
        && (options.current_user_is_admin || is_own(comment.comment(), options))
}

/// The record to send when the current user clicks upvote: the vote flips and
/// the count moves by one, never below zero.
pub fn toggle_upvote(comment: &CommentModelEnriched) -> CommentModel {
    let current = comment.comment();
    let upvote_count = if current.upvoted_by_current_user {
        current.upvote_count.saturating_sub(1)
    } else {
        current.upvote_count.saturating_add(1)
    };

    deplete(
        comment,
        Some(&CommentPatch {
            upvote_count: Some(upvote_count),
            upvoted_by_current_user: Some(!current.upvoted_by_current_user),
            ..Default::default()
        }),
    )
}

/// The record a deleted comment is replaced with. The comment stays in its
/// thread so replies keep their parent.
pub fn mark_deleted(comment: &CommentModelEnriched, options: &ViewModelOptions) -> CommentModel {
    deplete(
        comment,
        Some(&CommentPatch {
            content: Some(options.deleted_comment_text.clone()),
            is_deleted: Some(true),
            ..Default::default()
        }),
    )
}
