mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use comment_view_model::actions::{can_delete, can_reply, can_upvote, mark_deleted, toggle_upvote};
use comment_view_model::{
    CommentId, CommentModel, CommentSorter, CommentViewModel, CommentViewModelEvent, SortKey,
    UserId, ViewModelOptions,
};

#[derive(Parser)]
#[command(name = "ctc", about = "Inspect and edit threaded comments stored as JSON")]
struct Cli {
    /// View-model options as JSON (camelCase keys)
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    /// Log view-model activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every thread, roots ordered by the sort key and replies oldest first
    Show {
        /// JSON array of comment records
        file: PathBuf,
        /// popularity, oldest or newest (defaults to the options' sort key)
        #[arg(long)]
        sort: Option<SortKey>,
        /// Print threads as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Add a comment and print the updated records
    Reply {
        file: PathBuf,
        /// Comment to reply to; omit to start a new thread
        #[arg(long)]
        parent: Option<String>,
        #[arg(long)]
        author: String,
        #[arg(long)]
        body: String,
    },
    /// Toggle the current user's upvote on a comment and print the updated records
    Upvote { file: PathBuf, id: String },
    /// Replace a comment with the deleted placeholder and print the updated records
    Delete { file: PathBuf, id: String },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

fn load_comments(path: &Path) -> Result<Vec<CommentModel>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path.display()))
}

/// Loads `file` into a fresh view-model that logs every event it emits.
fn open_view_model(file: &Path) -> Result<(CommentViewModel, Vec<CommentModel>)> {
    let comments = load_comments(file)?;
    let mut view_model = CommentViewModel::new();
    for event in CommentViewModelEvent::ALL {
        view_model.subscribe(event, move |id| log::info!("{} {}", event, id));
    }
    view_model.init_comments(comments.clone())?;
    Ok((view_model, comments))
}

/// Replace (or append) `comment` in the exported records.
fn merge_record(records: &mut Vec<CommentModel>, comment: CommentModel) {
    match records.iter_mut().find(|existing| existing.id == comment.id) {
        Some(existing) => *existing = comment,
        None => records.push(comment),
    }
}

fn print_records(records: &[CommentModel]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(records)?);
    Ok(())
}

fn reply(
    file: &Path,
    parent: Option<String>,
    author: String,
    body: String,
    options: &ViewModelOptions,
) -> Result<Vec<CommentModel>> {
    if !can_reply(options) {
        bail!("replying is disabled");
    }
    let (mut view_model, mut records) = open_view_model(file)?;
    let now = Utc::now();
    let comment = CommentModel {
        id: CommentId::new(uuid::Uuid::new_v4().to_string()),
        parent_id: parent.map(CommentId::from),
        created_at: now,
        modified_at: Some(now),
        content: body,
        attachments: None,
        pings: None,
        creator_user_id: UserId::from(author),
        creator_display_name: None,
        creator_profile_picture_url: None,
        is_new: true,
        is_deleted: false,
        created_by_admin: options.current_user_is_admin,
        created_by_current_user: true,
        upvote_count: 0,
        upvoted_by_current_user: false,
    };
    let added = view_model.add_comment(comment)?.comment().clone();
    merge_record(&mut records, added);
    Ok(records)
}

fn upvote(file: &Path, id: String, options: &ViewModelOptions) -> Result<Vec<CommentModel>> {
    let (mut view_model, mut records) = open_view_model(file)?;
    let id = CommentId::from(id);
    let vote = {
        let comment = view_model
            .get_comment(&id)?
            .with_context(|| format!("no comment with id {id}"))?;
        if !can_upvote(comment, options) {
            bail!("comment {id} cannot be upvoted");
        }
        toggle_upvote(comment)
    };
    let upvoted = view_model.upvote_comment(vote)?.comment().clone();
    merge_record(&mut records, upvoted);
    Ok(records)
}

fn delete(file: &Path, id: String, options: &ViewModelOptions) -> Result<Vec<CommentModel>> {
    let (mut view_model, mut records) = open_view_model(file)?;
    let id = CommentId::from(id);
    let removal = {
        let comment = view_model
            .get_comment(&id)?
            .with_context(|| format!("no comment with id {id}"))?;
        if !can_delete(comment, options) {
            bail!("comment {id} cannot be deleted");
        }
        mark_deleted(comment, options)
    };
    let deleted = view_model.update_comment(removal)?.comment().clone();
    merge_record(&mut records, deleted);
    Ok(records)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = match &cli.options {
        Some(path) => ViewModelOptions::load(path)
            .with_context(|| format!("failed to load options from {}", path.display()))?,
        None => ViewModelOptions::default(),
    };

    match cli.command {
        Command::Show { file, sort, json } => {
            let (view_model, _) = open_view_model(&file)?;
            let sorter = CommentSorter::new(&options);
            let sort_key = sort.unwrap_or(options.default_navigation_sort_key);
            let threads = render::build_threads(&view_model, &sorter, sort_key)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&threads)?);
            } else {
                print!("{}", render::render_text(&view_model, &threads));
            }
        }
        Command::Reply {
            file,
            parent,
            author,
            body,
        } => print_records(&reply(&file, parent, author, body, &options)?)?,
        Command::Upvote { file, id } => print_records(&upvote(&file, id, &options)?)?,
        Command::Delete { file, id } => print_records(&delete(&file, id, &options)?)?,
    }

    Ok(())
}
