use animalia_client::{
    AnimaliaClient, ClientConfig, ClientError,
    alert::Action,
    config::{ConfigError, DEFAULT_PAGE_SIZE, DEFAULT_TOKEN_PATH},
    like::LikeOutcome,
    timeline::FetchOutcome,
    upload::ImageUpload,
};
use animalia_common::model::{
    Id,
    post::{CreatePost, Post, PostMarker},
    user::{UserMarker, UserProfile},
};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::{path::PathBuf, process::ExitCode};
use thiserror::Error;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

fn default_token_path() -> PathBuf {
    PathBuf::from(DEFAULT_TOKEN_PATH)
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct Env {
    api_url: String,
    #[serde(default = "default_token_path")]
    token_path: PathBuf,
    #[serde(default = "default_page_size")]
    page_size: u32,
}

#[derive(Debug, Parser)]
#[command(name = "animalia", about = "Command-line client for the Animalia pet network")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(name = "signin")]
    SignIn {
        email: String,
        #[arg(long, env = "ANIMALIA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    #[command(name = "signup")]
    SignUp {
        name: String,
        email: String,
        #[arg(long, env = "ANIMALIA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    VerifyEmail {
        email: String,
        code: String,
    },
    #[command(name = "signout")]
    SignOut,
    /// Show the signed-in user.
    Me,
    /// Print the home timeline.
    Timeline {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    Like {
        post_id: Id<PostMarker>,
    },
    Unlike {
        post_id: Id<PostMarker>,
    },
    Comment {
        post_id: Id<PostMarker>,
        content: String,
    },
    /// Create a post from an image file.
    Post {
        image: PathBuf,
        #[arg(long, default_value = "")]
        caption: String,
    },
    Profile {
        email: String,
    },
    Follow {
        email: String,
    },
    Unfollow {
        email: String,
    },
    /// List pets, the signed-in user's by default.
    Pets {
        #[arg(long)]
        owner: Option<Id<UserMarker>>,
    },
}

impl Command {
    fn action(&self) -> Action {
        match self {
            Command::SignIn { .. } => Action::SignIn,
            Command::SignUp { .. } => Action::SignUp,
            Command::VerifyEmail { .. } => Action::VerifyEmail,
            Command::SignOut => Action::SignOut,
            Command::Me | Command::Profile { .. } => Action::LoadProfile,
            Command::Timeline { .. } => Action::LoadTimeline,
            Command::Like { .. } => Action::Like,
            Command::Unlike { .. } => Action::Unlike,
            Command::Comment { .. } => Action::Comment,
            Command::Post { .. } => Action::CreatePost,
            Command::Follow { .. } => Action::Follow,
            Command::Unfollow { .. } => Action::Unfollow,
            Command::Pets { .. } => Action::LoadPets,
        }
    }
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "animalia_client=debug,\
                animalia_cache=debug,\
                animalia_common=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

fn print_profile(user: &UserProfile) {
    println!("{} <{}> ({})", user.base.name, user.base.email, user.id());
    if !user.base.bio.is_empty() {
        println!("  {}", user.base.bio);
    }
    println!(
        "  {} followers, {} following, {} posts, {} pets",
        user.followers_count,
        user.follows_count,
        user.posts.len(),
        user.pets.len()
    );
    let task = &user.daily_task;
    println!(
        "  today's task: {} ({})",
        task.base.task_type,
        if task.is_done() { "done" } else { "open" }
    );
}

fn print_post(post: &Post) {
    println!(
        "{} {}: {} ({} likes, {} comments)",
        post.id, post.user.name, post.caption, post.likes_count, post.comments_count
    );
}

async fn set_liked(
    client: &AnimaliaClient,
    post_id: Id<PostMarker>,
    liked: bool,
) -> Result<(), ClientError> {
    let user_id = client.session().current_user_id().await?;
    if client.like_toggle(post_id, user_id).set_liked(liked).await? == LikeOutcome::Suppressed {
        println!("A request for this post is still pending");
    }
    Ok(())
}

async fn run(client: &AnimaliaClient, command: Command) -> Result<(), ClientError> {
    match command {
        Command::SignIn { email, password } => {
            let user = client.session().sign_in(&email, &password).await?;
            print_profile(&user);
        }
        Command::SignUp {
            name,
            email,
            password,
        } => {
            let response = client.session().sign_up(&name, &email, &password).await?;
            println!("{}", response.message);
        }
        Command::VerifyEmail { email, code } => {
            println!("{}", client.session().verify_email(&email, &code).await?);
        }
        Command::SignOut => client.session().sign_out().await?,
        Command::Me => print_profile(&client.session().current_user().await?),
        Command::Timeline { pages } => {
            let timeline = client.timeline();
            for _ in 0..pages {
                match timeline.fetch_next_page().await? {
                    FetchOutcome::Page(page) => page.posts.iter().for_each(print_post),
                    FetchOutcome::Exhausted => break,
                    FetchOutcome::Cancelled | FetchOutcome::Discarded => {}
                }
            }
        }
        Command::Like { post_id } => set_liked(client, post_id, true).await?,
        Command::Unlike { post_id } => set_liked(client, post_id, false).await?,
        Command::Comment { post_id, content } => {
            let comment = client.posts().create_comment(post_id, &content).await?;
            println!("{} {}: {}", comment.id, comment.user.name, comment.content);
        }
        Command::Post { image, caption } => {
            let image = ImageUpload::from_path(&image).await?;
            client
                .posts()
                .create_post(
                    CreatePost {
                        caption,
                        daily_task_id: None,
                    },
                    image,
                )
                .await?;
        }
        Command::Profile { email } => print_profile(&client.profiles().profile(&email).await?),
        Command::Follow { email } => {
            let profiles = client.profiles();
            profiles.follow(&profiles.profile(&email).await?).await?;
        }
        Command::Unfollow { email } => {
            let profiles = client.profiles();
            profiles.unfollow(&profiles.profile(&email).await?).await?;
        }
        Command::Pets { owner } => {
            let pets = match owner {
                Some(owner) => client.pets().pets_of(owner).await?,
                None => client.pets().mine().await?,
            };
            for pet in pets {
                println!(
                    "{} {} ({}, {}), born {}",
                    pet.id, pet.name, pet.pet_type, pet.species, pet.birth_day
                );
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode, InitError> {
    install_tracing();
    let cli = Cli::parse();
    let env = get_env()?;

    let config = ClientConfig::new(&env.api_url)?
        .with_token_path(env.token_path)
        .with_page_size(env.page_size)?;
    let client = AnimaliaClient::new(&config);

    if let Err(e) = client.session().restore().await {
        warn!(error = %e, "Could not restore the previous session");
    }

    let action = cli.command.action();
    match run(&client, cli.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("{}", e.alert(action));
            Ok(ExitCode::FAILURE)
        }
    }
}
