pub mod actions;
mod comments_by_id;
mod enriched;
mod events;
mod options;
mod sorter;
mod transformer;
mod view_model;

pub use comment_types::{AttachmentId, AttachmentModel, CommentId, CommentModel, Timestamp, UserId};
pub use comments_by_id::{CommentIndex, EmptyCommentsById, MapCommentsById};
pub use enriched::{CommentModelEnriched, CommentPatch, deplete, has_attachments};
pub use events::{CommentViewModelEvent, Subscription};
pub use options::{ParseSortKeyError, SortKey, ViewModelOptions};
pub use sorter::{CommentSorter, Comparator};
pub use transformer::{CommentTransformer, MAX_ANCESTOR_DEPTH, ParentResolver};
pub use view_model::CommentViewModel;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Comment with id={comment_id} already exists")]
    DuplicateIdentity { comment_id: CommentId },
    #[error("Comment with id={comment_id} does not exist")]
    CommentNotFound { comment_id: CommentId },
    #[error("'{operation}' not supported before comments are initialized")]
    NotInitialized { operation: &'static str },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
