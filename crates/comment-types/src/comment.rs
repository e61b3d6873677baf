use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::{AttachmentId, CommentId, UserId};

pub type Timestamp = DateTime<Utc>;

/// A file attached to a comment. `file` is whatever the host uses to locate it (usually a URL).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AttachmentModel {
    pub id: AttachmentId,
    pub file: String,
    pub mime_type: String,
}

/// A comment as exchanged with the host application.
///
/// `parent_id` being `None` makes this a root comment. Every optional field is
/// omitted from the serialized form when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CommentModel {
    pub id: CommentId,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub parent_id: Option<CommentId>,
    pub created_at: Timestamp,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub modified_at: Option<Timestamp>,
    pub content: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub attachments: Option<Vec<AttachmentModel>>,
    /// Users mentioned in `content`, keyed by id with their display name.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub pings: Option<BTreeMap<UserId, String>>,
    pub creator_user_id: UserId,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub creator_display_name: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            rename = "creatorProfilePictureURL",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub creator_profile_picture_url: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_new: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_deleted: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub created_by_admin: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub created_by_current_user: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub upvote_count: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub upvoted_by_current_user: bool,
}

impl CommentModel {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
