use std::cmp::Ordering;

use crate::{CommentModelEnriched, SortKey, ViewModelOptions};

pub type Comparator = Box<dyn Fn(&CommentModelEnriched, &CommentModelEnriched) -> Ordering>;

/// Builds comparators for the navigation sort keys.
#[derive(Debug, Clone, Copy)]
pub struct CommentSorter {
    enable_upvoting: bool,
}

impl CommentSorter {
    pub fn new(options: &ViewModelOptions) -> Self {
        Self {
            enable_upvoting: options.enable_upvoting,
        }
    }

    /// Comparator for `sort_key`. Scores are read from the comments on every
    /// call, so obtain a fresh comparator per query rather than caching results.
    pub fn get_sorter(&self, sort_key: SortKey) -> Comparator {
        match sort_key {
            SortKey::Popularity => {
                let enable_upvoting = self.enable_upvoting;
                Box::new(move |a: &CommentModelEnriched, b: &CommentModelEnriched| {
                    popularity(b, enable_upvoting)
                        .cmp(&popularity(a, enable_upvoting))
                        .then_with(|| newest_first(a, b))
                })
            }
            SortKey::Oldest => Box::new(oldest_first),
            SortKey::Newest => Box::new(newest_first),
        }
    }

    /// Popularity points of `comment`: every descendant counts once, and
    /// upvotes are added only when upvoting is enabled.
    pub fn score(&self, comment: &CommentModelEnriched) -> u64 {
        popularity(comment, self.enable_upvoting)
    }
}

fn popularity(comment: &CommentModelEnriched, enable_upvoting: bool) -> u64 {
    let mut points = comment.all_child_ids().len() as u64;
    if enable_upvoting {
        points += u64::from(comment.comment().upvote_count);
    }
    points
}

fn newest_first(a: &CommentModelEnriched, b: &CommentModelEnriched) -> Ordering {
    b.created_at().cmp(&a.created_at())
}

fn oldest_first(a: &CommentModelEnriched, b: &CommentModelEnriched) -> Ordering {
    a.created_at().cmp(&b.created_at())
}
