use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use campus_social::backend::simulated::EmailKind;
use campus_social::backend::{connect_with_retry, SimulatedBackend, SqliteDocumentStore};
use campus_social::config::{Cli, Command, Config};
use campus_social::models::Post;
use campus_social::persistence::{DynSnapshotStore, SqliteSnapshotStore};
use campus_social::polls::Poll;
use campus_social::stores::Reaction;
use campus_social::{db, share, validation, AppState};

const DEMO_PASSWORD: &str = "campus123";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli)?;
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Local storage
    let pool = db::create_pool(&config.db_path())?;
    db::run_migrations(&pool)?;
    let snapshots: DynSnapshotStore = Arc::new(SqliteSnapshotStore::new(pool.clone()));
    let documents = Arc::new(SqliteDocumentStore::new(pool));

    // Backend
    let latency = config.latency();
    let hash_cost = config.backend.hash_cost;
    let backend = connect_with_retry(config.backend.init_attempts, move |attempt| async move {
        tracing::debug!("Connecting to identity backend (attempt {})", attempt);
        Ok(Arc::new(SimulatedBackend::new(latency).with_hash_cost(hash_cost)))
    })
    .await?;

    let mut state = AppState::new(config, backend.clone(), documents, Some(snapshots));

    match cli.command.unwrap_or(Command::Whoami) {
        Command::Demo { email } => run_demo(&mut state, &backend, &email).await?,
        Command::Whoami => print_session(&state),
        Command::Notifications {
            read,
            read_all,
            clear,
        } => {
            if let Some(id) = read {
                state.notifications.mark_as_read(&id)?;
            }
            if read_all {
                state.notifications.mark_all_as_read();
            }
            if clear {
                state.notifications.clear_notifications();
            }
            print_notifications(&state);
        }
        Command::Hashtags { add, search } => {
            if let Some(raw) = add {
                let tag = state.add_custom_hashtag(&raw)?;
                println!("Added {}", tag);
            }
            match search {
                Some(term) => {
                    for tag in state.hashtags.suggestions(&term) {
                        println!("{}", tag);
                    }
                }
                None => print_hashtags(&state),
            }
        }
    }

    Ok(())
}

async fn run_demo(
    state: &mut AppState,
    backend: &SimulatedBackend,
    email: &str,
) -> anyhow::Result<()> {
    validation::validate_registration(
        email,
        DEMO_PASSWORD,
        DEMO_PASSWORD,
        &state.config.community,
    )?;

    state.auth.register(email, DEMO_PASSWORD).await?;
    let code = backend
        .latest_code(email, EmailKind::Verification)
        .await
        .ok_or_else(|| anyhow::anyhow!("No verification email was sent"))?;
    state.auth.verify_email(&code).await?;
    print_session(state);

    // Someone else's post to interact with
    state.posts.add_post(Post::new(
        "welcome",
        "KRC000001",
        "Welcome to the campus feed! #CampusLife",
        None,
        chrono::Utc::now(),
    ));

    let poll = Poll::new(
        "Best study spot?",
        vec!["Library".to_string(), "Canteen".to_string()],
        24,
    )?;
    let draft = state.tag_user("Study group tonight #StudyGroup", "KRC000001");
    let post_id = state.create_post(&draft, None, Some(&poll))?;

    state.react_to_post("welcome", Reaction::Like)?;
    let comment_id =
        state.comment_on_post("welcome", "Glad to be here, thanks for the warm welcome!")?;
    state.toggle_comment_like("welcome", &comment_id)?;

    println!();
    println!("Feed:");
    for post in state.feed() {
        println!(
            "  [{}] {}: {} (+{} / -{}, {} comments)",
            post.id,
            post.username,
            post.content.replace('\n', " | "),
            post.likes,
            post.dislikes,
            post.comments.len()
        );
    }

    for link in share::share_links(&state.config.community.share_base_url, &post_id)? {
        println!("  share via {}: {}", link.name, link.url);
    }

    println!();
    print_notifications(state);
    println!();
    print_hashtags(state);
    Ok(())
}

fn print_session(state: &AppState) {
    let view = state.auth.snapshot();
    match view.user() {
        Some(user) => println!(
            "{} <{}> verified={} authenticated={}",
            user.username,
            user.email,
            user.email_verified,
            view.is_authenticated()
        ),
        None => println!("Not signed in"),
    }
}

fn print_notifications(state: &AppState) {
    println!("Notifications ({} unread):", state.notifications.unread_count());
    for n in state.notifications.notifications() {
        let marker = if n.read { " " } else { "*" };
        println!("  {} [{}] {} {}", marker, n.kind, n.id, n.message);
    }
}

fn print_hashtags(state: &AppState) {
    println!("Trending:");
    for tag in state.hashtags.trending() {
        let rising = if tag.is_rising { " (rising)" } else { "" };
        println!("  {} {}{}", tag.tag, tag.count, rising);
    }
    if !state.hashtags.custom().is_empty() {
        println!("Custom: {}", state.hashtags.custom().join(" "));
    }
}
