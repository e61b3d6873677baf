mod comment;
mod ids;

pub use comment::{AttachmentModel, CommentModel, Timestamp};
pub use ids::{AttachmentId, CommentId, UserId};
