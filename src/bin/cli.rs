//! Novelly CLI
//!
//! Terminal client for the Novelly backend:
//! - Sign in and out, inspect the session
//! - Browse, search and read novels
//! - Manage library, progress, reviews and comments
//! - Admin content entry

use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use novelly::catalog::{
    chapter_count_label, excerpt, format_rating, initials, stars_text, time_ago, Paginator,
    ROW_EXCERPT_CHARS,
};
use novelly::client::{AddOutcome, ApiClient, ReqwestTransport};
use novelly::config::{generate_default_config, Config};
use novelly::logging::init_tracing;
use novelly::models::{Chapter, FileUpload, NovelForm, NovelId, ProgressUpdate};
use novelly::reader::{progress_update, readable_content, ChapterNav, TextPager, EMPTY_CHAPTER_MESSAGE};
use novelly::router::{resolve, AuthContext, Resolution};
use novelly::session::Session;
use novelly::store::{FileStorage, Store};
use novelly::validation::{
    validate_chapter_draft, validate_comment, validate_login, validate_new_novel,
    validate_registration, validate_review, validate_search_term, FieldError,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "novelly-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Read and manage Novelly novels from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend API base, e.g. http://localhost:8080/api
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with email or username
    Login {
        identifier: String,
        #[arg(short, long)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        username: String,
        email: String,
        #[arg(short, long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user (verified against the backend)
    Whoami,

    /// Browse novels
    Novels {
        #[command(subcommand)]
        command: NovelsCommand,
    },

    /// Read a chapter page by page and save progress
    Read {
        novel_id: NovelId,
        /// Chapter number (default: last read, else first)
        #[arg(short, long)]
        chapter: Option<u32>,
        /// Page of the chapter, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,
        #[arg(long, default_value = "80")]
        width: usize,
        #[arg(long, default_value = "30")]
        height: usize,
    },

    /// Your saved novels
    Library {
        #[command(subcommand)]
        command: LibraryCommand,
    },

    /// Your reading progress
    Progress {
        #[command(subcommand)]
        command: ProgressCommand,
    },

    /// Toggle a local bookmark on a novel
    Bookmark { novel_id: NovelId },

    /// Novel reviews
    Reviews {
        #[command(subcommand)]
        command: ReviewsCommand,
    },

    /// Novel comments
    Comments {
        #[command(subcommand)]
        command: CommentsCommand,
    },

    /// Content management (ADMIN role)
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },

    /// Resolve a route fragment against the current session
    Route { fragment: String },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum NovelsCommand {
    /// All novels, 12 per page
    List {
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
    Search { query: String },
    /// Details, chapters, rating and your progress
    Show { novel_id: NovelId },
}

#[derive(Subcommand)]
pub enum LibraryCommand {
    List,
    Add { novel_id: NovelId },
    Remove { novel_id: NovelId },
}

#[derive(Subcommand)]
pub enum ProgressCommand {
    List,
    Clear { novel_id: NovelId },
}

#[derive(Subcommand)]
pub enum ReviewsCommand {
    List { novel_id: NovelId },
    Add {
        novel_id: NovelId,
        /// 1 to 5
        rating: u8,
        #[arg(short, long, default_value = "")]
        comment: String,
    },
    Delete { review_id: i64 },
}

#[derive(Subcommand)]
pub enum CommentsCommand {
    List { novel_id: NovelId },
    Add { novel_id: NovelId, content: String },
    Edit { comment_id: i64, content: String },
    Delete { comment_id: i64 },
}

#[derive(Subcommand)]
pub enum AdminCommand {
    AddNovel {
        title: String,
        author: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(long)]
        cover: PathBuf,
    },
    UpdateNovel {
        novel_id: NovelId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        cover: Option<PathBuf>,
    },
    DeleteNovel { novel_id: NovelId },
    AddChapter {
        novel_id: NovelId,
        number: String,
        /// Plain-text file with the chapter body
        content: PathBuf,
        #[arg(short, long, default_value = "")]
        title: String,
    },
    UpdateChapter {
        novel_id: NovelId,
        chapter_id: i64,
        number: String,
        content: PathBuf,
        #[arg(short, long, default_value = "")]
        title: String,
    },
    DeleteChapter { novel_id: NovelId, chapter_id: i64 },
}

struct App {
    session: Session,
    json: bool,
}

impl App {
    fn api(&self) -> &ApiClient {
        self.session.api()
    }

    fn store(&self) -> &Store {
        self.session.store()
    }

    fn user_id(&self) -> anyhow::Result<i64> {
        Ok(self.session.require_user()?.user_id)
    }

    /// Print as JSON, or run the table printer
    fn emit<T: Serialize>(&self, value: &T, table: impl FnOnce(&T)) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            table(value);
        }
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        return write_config(output.as_deref());
    }

    let mut config = Config::resolve(cli.config.as_deref())?;
    if let Some(url) = cli.api_url.clone() {
        config.client.api_url = url;
    }
    if std::env::var("NOVELLY_LOG_LEVEL").is_err() {
        config.logging.level = "warn".to_string();
    }
    init_tracing(&config.logging)?;

    let store = Store::new(Rc::new(FileStorage::new(config.session.path())));
    store.initialize();
    let transport = Rc::new(ReqwestTransport::new(config.client.timeout())?);
    let api = ApiClient::new(config.client.api_url.clone(), transport, Rc::new(store.clone()));
    let ctx = App {
        session: Session::new(store, api),
        json: cli.format == "json",
    };

    if let Err(e) = run(&ctx, cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(ctx: &App, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Login { identifier, password } => {
            check_fields(validate_login(&identifier, &password))?;
            let user = ctx.session.login(&identifier, &password).await?;
            println!("Welcome back, {}!", user.username);
        }

        Commands::Register {
            username,
            email,
            password,
        } => {
            check_fields(validate_registration(&username, &email, &password, &password))?;
            let user = ctx.session.register(&username, &email, &password).await?;
            println!("Welcome to Novelly, {}!", user.username);
        }

        Commands::Logout => {
            ctx.session.logout();
            println!("Logged out successfully");
        }

        Commands::Whoami => {
            if !ctx.session.verify_token().await {
                bail!("Not signed in");
            }
            let user = ctx.session.require_user()?;
            ctx.emit(&user, |user| {
                println!("[{}] {}", initials(&user.username), user.username);
                println!("  Email: {}", user.email.as_deref().unwrap_or("-"));
                println!(
                    "  Role:  {}",
                    user.role.map(|r| r.to_string()).unwrap_or_else(|| "-".into())
                );
            })?;
        }

        Commands::Novels { command } => novels(ctx, command).await?,

        Commands::Read {
            novel_id,
            chapter,
            page,
            width,
            height,
        } => read(ctx, novel_id, chapter, page, width, height).await?,

        Commands::Library { command } => library(ctx, command).await?,

        Commands::Progress { command } => match command {
            ProgressCommand::List => {
                let entries = ctx.api().progress().list(ctx.user_id()?).await?;
                let now = Utc::now().naive_utc();
                ctx.emit(&entries, |entries| {
                    if entries.is_empty() {
                        println!("No reading history yet.");
                    }
                    for entry in entries {
                        println!(
                            "{:<30} {:<28} {:>4}%  {}",
                            entry.novel.as_ref().map(|n| n.title.as_str()).unwrap_or("-"),
                            entry.chapter.as_ref().map(|c| c.label()).unwrap_or_default(),
                            entry.reading_percentage.unwrap_or(0.0).round(),
                            entry.last_read_at.map(|t| time_ago(t, now)).unwrap_or_default()
                        );
                    }
                })?;
            }
            ProgressCommand::Clear { novel_id } => {
                ctx.api().progress().delete(ctx.user_id()?, novel_id).await?;
                println!("Progress cleared");
            }
        },

        Commands::Bookmark { novel_id } => {
            if ctx.store().toggle_bookmark(novel_id) {
                println!("Bookmarked novel {}", novel_id);
            } else {
                println!("Removed bookmark from novel {}", novel_id);
            }
        }

        Commands::Reviews { command } => reviews(ctx, command).await?,

        Commands::Comments { command } => comments(ctx, command).await?,

        Commands::Admin { command } => {
            let auth = AuthContext::from(&*ctx.store().state());
            if let Resolution::Redirect(_) = resolve("#/admin", &auth) {
                bail!("Admin access required");
            }
            admin(ctx, command).await?;
        }

        Commands::Route { fragment } => {
            let auth = AuthContext::from(&*ctx.store().state());
            match resolve(&fragment, &auth) {
                Resolution::Render { page, params, query } => {
                    println!("Render {}", page.title());
                    for (name, value) in params.iter().chain(query.iter()) {
                        println!("  {} = {}", name, value);
                    }
                }
                Resolution::Redirect(target) => println!("Redirect to {}", target),
                Resolution::NotFound { path, fallback, delay } => println!(
                    "404 {} (redirect to {} after {}s)",
                    path,
                    fallback,
                    delay.as_secs()
                ),
            }
        }

        Commands::Config { output } => write_config(output.as_deref())?,
    }

    Ok(())
}

async fn novels(ctx: &App, command: NovelsCommand) -> anyhow::Result<()> {
    match command {
        NovelsCommand::List { page } => {
            let novels = ctx.api().novels().list().await?;
            let mut paginator = Paginator::grid(novels.len());
            paginator.go_to(page);
            let shown = paginator.slice(&novels).to_vec();
            ctx.emit(&shown, |shown| {
                if novels.is_empty() {
                    println!("No novels available yet.");
                    return;
                }
                print_novel_rows(shown);
                println!();
                println!("{}", paginator.label());
            })?;
        }

        NovelsCommand::Search { query } => {
            let query = validate_search_term(&query)?;
            let results = ctx.api().novels().search(&query).await?;
            ctx.emit(&results, |results| {
                if results.is_empty() {
                    println!("No novels found for \"{}\"", query);
                } else {
                    println!("{} result(s) for \"{}\"", results.len(), query);
                    print_novel_rows(results);
                }
            })?;
        }

        NovelsCommand::Show { novel_id } => {
            let api = ctx.api();
            let novel = api.novels().get(novel_id).await?;
            let chapters = api.chapters().list(novel_id).await?;
            let stats = api.reviews().stats(novel_id).await.unwrap_or_default();
            let progress = match ctx.session.current_user() {
                Some(user) => api.progress().for_novel(user.user_id, novel_id).await?,
                None => None,
            };

            ctx.emit(&novel, |novel| {
                println!("{} by {}", novel.title, novel.author_or_unknown());
                if ctx.store().state().is_bookmarked(novel_id) {
                    println!("(bookmarked)");
                }
                println!(
                    "{} {} ({} reviews)",
                    stars_text(stats.average_rating),
                    format_rating(stats.average_rating),
                    stats.review_count
                );
                println!("{}", chapter_count_label(Some(chapters.len())));
                if !novel.description_or_empty().is_empty() {
                    println!();
                    println!("{}", novel.description_or_empty());
                }
                if let Some(chapter) = progress.as_ref().and_then(|p| p.chapter.as_ref()) {
                    println!();
                    println!("Continue Reading (Chapter {})", chapter.chapter_number);
                }
                println!();
                for chapter in &chapters {
                    println!("  {}", chapter.label());
                }
            })?;
        }
    }
    Ok(())
}

fn print_novel_rows(novels: &[novelly::Novel]) {
    println!("{:<6} {:<30} {:<20} {}", "ID", "Title", "Author", "Chapters");
    println!("{}", "-".repeat(72));
    for novel in novels {
        println!(
            "{:<6} {:<30} {:<20} {}",
            novel.novel_id,
            excerpt(&novel.title, 28),
            excerpt(novel.author_or_unknown(), 18),
            chapter_count_label(novel.chapter_count.map(|c| c as usize))
        );
        if !novel.description_or_empty().is_empty() {
            println!("       {}", excerpt(novel.description_or_empty(), ROW_EXCERPT_CHARS));
        }
    }
}

async fn read(
    ctx: &App,
    novel_id: NovelId,
    number: Option<u32>,
    page: usize,
    width: usize,
    height: usize,
) -> anyhow::Result<()> {
    let api = ctx.api();
    let novel = api.novels().get(novel_id).await?;
    let chapters = api.chapters().list(novel_id).await?;
    if chapters.is_empty() {
        bail!("This novel has no chapters yet");
    }

    let user = ctx.session.current_user();
    let last_read = match (&user, number) {
        (Some(user), None) => api
            .progress()
            .for_novel(user.user_id, novel_id)
            .await
            .ok()
            .flatten()
            .and_then(|p| p.chapter),
        _ => None,
    };

    let summary: &Chapter = match (number, &last_read) {
        (Some(n), _) => chapters
            .iter()
            .find(|c| c.chapter_number == n)
            .ok_or_else(|| anyhow!("Chapter {} not found", n))?,
        (None, Some(last)) => chapters
            .iter()
            .find(|c| c.chapter_id == last.chapter_id)
            .unwrap_or(&chapters[0]),
        (None, None) => &chapters[0],
    };

    let chapter = api.chapters().get(summary.chapter_id).await?;
    let Some(content) = readable_content(&chapter) else {
        bail!(EMPTY_CHAPTER_MESSAGE);
    };

    let pager = TextPager::new(content, width, height);
    let index = page.clamp(1, pager.page_count()) - 1;

    println!("{}", novel.title);
    println!("{}", chapter.label());
    println!("{}", "=".repeat(width.min(80)));
    for line in pager.page(index).unwrap_or(&[]) {
        println!("{}", line);
    }
    println!("{}", "-".repeat(width.min(80)));
    println!("Page {} of {}", index + 1, pager.page_count());

    let nav = ChapterNav::new(&chapters, chapter.chapter_id);
    if index + 1 < pager.page_count() {
        println!("Next page: --page {}", index + 2);
    } else if let Some(next) = nav.next() {
        println!("Next chapter: --chapter {}", next.chapter_number);
    } else {
        println!("This is the last chapter");
    }
    if let Some(previous) = nav.previous() {
        println!("Previous chapter: --chapter {}", previous.chapter_number);
    }

    if let Some(user) = user {
        let update: ProgressUpdate = progress_update(
            Some(&novel),
            &chapter,
            novel_id,
            index as i64,
            pager.percentage_at(index),
        );
        if let Err(e) = api.progress().save(user.user_id, &update).await {
            tracing::warn!("Failed to save progress: {}", e);
        }
    }
    Ok(())
}

async fn library(ctx: &App, command: LibraryCommand) -> anyhow::Result<()> {
    let user_id = ctx.user_id()?;
    let api = ctx.api().library();
    match command {
        LibraryCommand::List => {
            let items = api.list(user_id).await?;
            let now = Utc::now().naive_utc();
            ctx.emit(&items, |items| {
                if items.is_empty() {
                    println!("Your library is empty.");
                }
                for item in items {
                    println!(
                        "{:<6} {:<30} {:<20} {}",
                        item.novel.novel_id,
                        excerpt(&item.novel.title, 28),
                        excerpt(item.novel.author_or_unknown(), 18),
                        item.added_at.map(|t| time_ago(t, now)).unwrap_or_default()
                    );
                }
            })?;
        }
        LibraryCommand::Add { novel_id } => match api.add(user_id, novel_id).await? {
            AddOutcome::Added => println!("Novel added to library!"),
            AddOutcome::AlreadyPresent => println!("Novel is already in your library"),
        },
        LibraryCommand::Remove { novel_id } => {
            api.remove(user_id, novel_id).await?;
            println!("Removed from library");
        }
    }
    Ok(())
}

async fn reviews(ctx: &App, command: ReviewsCommand) -> anyhow::Result<()> {
    let api = ctx.api().reviews();
    match command {
        ReviewsCommand::List { novel_id } => {
            let reviews = api.list(novel_id).await?;
            let now = Utc::now().naive_utc();
            ctx.emit(&reviews, |reviews| {
                if reviews.is_empty() {
                    println!("No reviews yet. Be the first to review!");
                }
                for review in reviews {
                    println!(
                        "{} {}  {}",
                        stars_text(review.rating as f64),
                        review.username,
                        review.created_at.map(|t| time_ago(t, now)).unwrap_or_default()
                    );
                    if let Some(comment) = review.comment.as_deref().filter(|c| !c.is_empty()) {
                        println!("  {}", comment);
                    }
                }
            })?;
        }
        ReviewsCommand::Add {
            novel_id,
            rating,
            comment,
        } => {
            ctx.session.require_user()?;
            let review = validate_review(rating, &comment)?;
            api.add(novel_id, &review).await?;
            println!("Review submitted successfully!");
        }
        ReviewsCommand::Delete { review_id } => {
            api.delete(review_id).await?;
            println!("Review deleted");
        }
    }
    Ok(())
}

async fn comments(ctx: &App, command: CommentsCommand) -> anyhow::Result<()> {
    let api = ctx.api().comments();
    match command {
        CommentsCommand::List { novel_id } => {
            let comments = api.list(novel_id).await?;
            let now = Utc::now().naive_utc();
            ctx.emit(&comments, |comments| {
                if comments.is_empty() {
                    println!("No comments yet.");
                }
                for comment in comments {
                    println!(
                        "#{} {} {}",
                        comment.comment_id,
                        comment.username,
                        comment.created_at.map(|t| time_ago(t, now)).unwrap_or_default()
                    );
                    println!("  {}", comment.content);
                }
            })?;
        }
        CommentsCommand::Add { novel_id, content } => {
            ctx.session.require_user()?;
            let content = validate_comment(&content)?;
            api.add(novel_id, &content).await?;
            println!("Comment posted");
        }
        CommentsCommand::Edit {
            comment_id,
            content,
        } => {
            let content = validate_comment(&content)?;
            api.update(comment_id, &content).await?;
            println!("Comment updated");
        }
        CommentsCommand::Delete { comment_id } => {
            api.delete(comment_id).await?;
            println!("Comment deleted");
        }
    }
    Ok(())
}

async fn admin(ctx: &App, command: AdminCommand) -> anyhow::Result<()> {
    let api = ctx.api();
    match command {
        AdminCommand::AddNovel {
            title,
            author,
            description,
            cover,
        } => {
            let form = validate_new_novel(&title, &author, &description, Some(read_upload(&cover)?))?;
            let novel = api.novels().upload(&form).await?;
            println!("Novel \"{}\" created with id {}", novel.title, novel.novel_id);
        }
        AdminCommand::UpdateNovel {
            novel_id,
            title,
            author,
            description,
            cover,
        } => {
            let form = NovelForm {
                title,
                author,
                description,
                cover_image: cover.as_deref().map(read_upload).transpose()?,
            };
            let novel = api.novels().update(novel_id, &form).await?;
            println!("Novel \"{}\" updated", novel.title);
        }
        AdminCommand::DeleteNovel { novel_id } => {
            api.novels().delete(novel_id).await?;
            println!("Novel deleted");
        }
        AdminCommand::AddChapter {
            novel_id,
            number,
            content,
            title,
        } => {
            let text = read_text(&content)?;
            let draft = validate_chapter_draft(Some(novel_id), &number, &title, &text)?;
            let chapter = api.chapters().create(&draft).await?;
            println!("{} created", chapter.label());
        }
        AdminCommand::UpdateChapter {
            novel_id,
            chapter_id,
            number,
            content,
            title,
        } => {
            let text = read_text(&content)?;
            let draft = validate_chapter_draft(Some(novel_id), &number, &title, &text)?;
            let chapter = api.chapters().update(chapter_id, &draft).await?;
            println!("{} updated", chapter.label());
        }
        AdminCommand::DeleteChapter {
            novel_id,
            chapter_id,
        } => {
            api.chapters().delete(novel_id, chapter_id).await?;
            println!("Chapter deleted");
        }
    }
    Ok(())
}

fn check_fields(errors: Vec<FieldError>) -> anyhow::Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    let lines: Vec<String> = errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect();
    bail!(lines.join("\n"))
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
}

fn read_upload(path: &Path) -> anyhow::Result<FileUpload> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| anyhow!("Not a file: {:?}", path))?;
    Ok(FileUpload {
        content_type: image_content_type(&file_name).to_string(),
        file_name,
        bytes,
    })
}

fn image_content_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

fn write_config(output: Option<&Path>) -> anyhow::Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)?;
            println!("Config written to {:?}", path);
        }
        None => {
            print!("{}", config);
        }
    }
    Ok(())
}
