use std::collections::HashMap;

use comment_view_model::{
    CommentId, CommentModel, CommentModelEnriched, CommentSorter, CommentViewModel, SortKey,
    has_attachments,
};
use serde::Serialize;

/// One root comment and its flattened replies, ready for output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadView {
    pub comment: CommentModel,
    pub score: u64,
    pub replies: Vec<ReplyView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyView {
    pub depth: usize,
    pub comment: CommentModel,
}

/// Build the thread list: roots ordered by `sort_key`, replies oldest first.
pub fn build_threads(
    view_model: &CommentViewModel,
    sorter: &CommentSorter,
    sort_key: SortKey,
) -> comment_view_model::Result<Vec<ThreadView>> {
    let root_sorter = sorter.get_sorter(sort_key);
    let reply_sorter = sorter.get_sorter(SortKey::Oldest);

    let mut threads = Vec::new();
    for root in view_model.get_root_comments(Some(root_sorter.as_ref()))? {
        let replies = view_model.get_child_comments(root.id(), Some(reply_sorter.as_ref()))?;
        threads.push(ThreadView {
            comment: root.comment().clone(),
            score: sorter.score(root),
            replies: with_depths(root.id(), &replies),
        });
    }
    Ok(threads)
}

/// Depth of each reply below `root_id`. Replies are placed under their
/// parent when it has been seen, otherwise directly under the root.
fn with_depths(root_id: &CommentId, replies: &[&CommentModelEnriched]) -> Vec<ReplyView> {
    let mut depths: HashMap<&CommentId, usize> = HashMap::new();
    depths.insert(root_id, 0);

    replies
        .iter()
        .map(|reply| {
            let depth = reply
                .parent_id()
                .and_then(|parent_id| depths.get(parent_id))
                .map_or(1, |parent_depth| parent_depth + 1);
            depths.insert(reply.id(), depth);
            ReplyView {
                depth,
                comment: reply.comment().clone(),
            }
        })
        .collect()
}

pub fn render_text(view_model: &CommentViewModel, threads: &[ThreadView]) -> String {
    let mut out = String::new();
    for thread in threads {
        out.push_str(&render_line(view_model, &thread.comment, 0));
        for reply in &thread.replies {
            out.push_str(&render_line(view_model, &reply.comment, reply.depth));
        }
        out.push('\n');
    }
    out
}

fn render_line(view_model: &CommentViewModel, comment: &CommentModel, depth: usize) -> String {
    let author = comment
        .creator_display_name
        .as_deref()
        .unwrap_or(comment.creator_user_id.as_str());
    let mut flags = Vec::new();
    if comment.is_deleted {
        flags.push("deleted");
    }
    if comment
        .modified_at
        .is_some_and(|modified_at| modified_at != comment.created_at)
    {
        flags.push("edited");
    }
    if let Ok(Some(enriched)) = view_model.get_comment(&comment.id) {
        if has_attachments(enriched) {
            flags.push("attachments");
        }
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };

    format!(
        "{indent}{id} {author} {when} +{votes}{flags}\n{indent}  {content}\n",
        indent = "  ".repeat(depth),
        id = comment.id,
        when = comment.created_at.format("%Y-%m-%d %H:%M"),
        votes = comment.upvote_count,
        content = comment.content,
    )
}

#[cfg(test)]
mod tests {
    use comment_view_model::ViewModelOptions;
    use test_comments::CommentBuilder;

    use super::*;

    fn view_model() -> CommentViewModel {
        let mut view_model = CommentViewModel::new();
        view_model
            .init_comments(vec![
                CommentBuilder::root("a").created(0).build(),
                CommentBuilder::root("z").created(9).build(),
                CommentBuilder::reply("b", "a").created(1).build(),
                CommentBuilder::reply("c", "b").created(2).build(),
                CommentBuilder::reply("d", "a").created(3).build(),
            ])
            .unwrap();
        view_model
    }

    #[test]
    fn test_build_threads_orders_roots_and_nests_replies() {
        let view_model = view_model();
        let sorter = CommentSorter::new(&ViewModelOptions::default());

        let threads = build_threads(&view_model, &sorter, SortKey::Newest).unwrap();
        assert_eq!(threads[0].comment.id, "z");
        assert_eq!(threads[1].comment.id, "a");

        let depths: Vec<(String, usize)> = threads[1]
            .replies
            .iter()
            .map(|r| (r.comment.id.to_string(), r.depth))
            .collect();
        assert_eq!(
            depths,
            [
                ("b".to_string(), 1),
                ("c".to_string(), 2),
                ("d".to_string(), 1)
            ]
        );
        assert_eq!(threads[1].score, 3);
    }

    #[test]
    fn test_render_text_indents_by_depth() {
        let view_model = view_model();
        let sorter = CommentSorter::new(&ViewModelOptions::default());
        let threads = build_threads(&view_model, &sorter, SortKey::Oldest).unwrap();

        let text = render_text(&view_model, &threads);
        assert!(text.starts_with("a user-1 2025-01-01 00:00 +0\n"));
        assert!(text.contains("\n    c user-1 2025-01-01 00:02 +0\n"));
    }

    #[test]
    fn test_score_follows_upvoting_option() {
        let mut view_model = CommentViewModel::new();
        view_model
            .init_comments(vec![CommentBuilder::root("a").upvotes(5, false).build()])
            .unwrap();

        let disabled = CommentSorter::new(&ViewModelOptions {
            enable_upvoting: false,
            ..Default::default()
        });
        let threads = build_threads(&view_model, &disabled, SortKey::Popularity).unwrap();
        assert_eq!(threads[0].score, 0);

        let enabled = CommentSorter::new(&ViewModelOptions::default());
        let threads = build_threads(&view_model, &enabled, SortKey::Popularity).unwrap();
        assert_eq!(threads[0].score, 5);
    }

    #[test]
    fn test_edited_flag_only_after_modification() {
        let mut view_model = CommentViewModel::new();
        view_model
            .init_comments(vec![
                CommentBuilder::root("a").created(0).modified(0).build(),
                CommentBuilder::root("b").created(1).modified(4).build(),
            ])
            .unwrap();
        let sorter = CommentSorter::new(&ViewModelOptions::default());
        let threads = build_threads(&view_model, &sorter, SortKey::Oldest).unwrap();

        let text = render_text(&view_model, &threads[..1]);
        assert_eq!(text, "a user-1 2025-01-01 00:00 +0\n  content of a\n\n");

        let text = render_text(&view_model, &threads[1..]);
        assert!(text.starts_with("b user-1 2025-01-01 00:01 +0 [edited]\n"));
    }
}
