use chrono::{Duration, TimeZone, Utc};
use comment_types::{AttachmentId, AttachmentModel, CommentId, CommentModel, Timestamp, UserId};

pub const DEFAULT_CREATOR: &str = "user-1";

/// Fixed base time used by every fixture, so tests can reason in minutes.
pub fn base_time() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

/// `base_time()` shifted by `minutes`.
pub fn at(minutes: i64) -> Timestamp {
    base_time() + Duration::minutes(minutes)
}

pub struct CommentBuilder {
    comment: CommentModel,
}

impl CommentBuilder {
    /// A root comment created at `base_time()`.
    pub fn root(id: &str) -> Self {
        Self {
            comment: CommentModel {
                id: CommentId::new(id),
                parent_id: None,
                created_at: base_time(),
                modified_at: None,
                content: format!("content of {id}"),
                attachments: None,
                pings: None,
                creator_user_id: UserId::new(DEFAULT_CREATOR),
                creator_display_name: None,
                creator_profile_picture_url: None,
                is_new: false,
                is_deleted: false,
                created_by_admin: false,
                created_by_current_user: false,
                upvote_count: 0,
                upvoted_by_current_user: false,
            },
        }
    }

    /// A reply to `parent_id` created at `base_time()`.
    pub fn reply(id: &str, parent_id: &str) -> Self {
        let mut builder = Self::root(id);
        builder.comment.parent_id = Some(CommentId::new(parent_id));
        builder
    }

    pub fn created(mut self, minutes: i64) -> Self {
        self.comment.created_at = at(minutes);
        self
    }

    pub fn modified(mut self, minutes: i64) -> Self {
        self.comment.modified_at = Some(at(minutes));
        self
    }

    pub fn content(mut self, content: &str) -> Self {
        self.comment.content = content.to_string();
        self
    }

    pub fn creator(mut self, user_id: &str, display_name: &str) -> Self {
        self.comment.creator_user_id = UserId::new(user_id);
        self.comment.creator_display_name = Some(display_name.to_string());
        self
    }

    pub fn by_current_user(mut self) -> Self {
        self.comment.created_by_current_user = true;
        self
    }

    pub fn upvotes(mut self, count: u32, by_current_user: bool) -> Self {
        self.comment.upvote_count = count;
        self.comment.upvoted_by_current_user = by_current_user;
        self
    }

    pub fn attachment(mut self, id: &str, mime_type: &str) -> Self {
        self.comment
            .attachments
            .get_or_insert_with(Vec::new)
            .push(AttachmentModel {
                id: AttachmentId::new(id),
                file: format!("https://files.example.com/{id}"),
                mime_type: mime_type.to_string(),
            });
        self
    }

    pub fn ping(mut self, user_id: &str, display_name: &str) -> Self {
        self.comment
            .pings
            .get_or_insert_with(Default::default)
            .insert(UserId::new(user_id), display_name.to_string());
        self
    }

    pub fn build(self) -> CommentModel {
        self.comment
    }
}

/// A root `a` with reply `b` and nested reply `c`, created one minute apart.
pub fn three_level_chain() -> Vec<CommentModel> {
    vec![
        CommentBuilder::root("a").created(0).build(),
        CommentBuilder::reply("b", "a").created(1).build(),
        CommentBuilder::reply("c", "b").created(2).build(),
    ]
}
