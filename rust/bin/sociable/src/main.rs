//! `sociable`: terminal client for the Sociable social feed.
//!
//! Every command drives the same Flux app core a graphical front end
//! would: it mounts a surface (which bootstraps the session), emits
//! requests, and prints the state they leave behind.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use sociable_client::{ReactionType, Visibility};

use commands::auth::ProfileArgs;
use commands::Session;

/// Sociable CLI.
#[derive(Parser, Debug)]
#[command(name = "sociable", about = "Sociable social feed client")]
struct Cli {
    /// Path to config file (default: ~/.sociable/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    /// API base URL; overrides the config file and SOCIABLE_API_URL.
    #[arg(long = "api-url", global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in with email and password.
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Password (not recommended, use the interactive prompt).
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account and log in.
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },

    /// Log out and forget the stored token.
    Logout,

    /// Show the logged-in user.
    Whoami,

    /// Update your profile. Omitted fields are kept.
    Profile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Prompt for a new password.
        #[arg(long)]
        change_password: bool,
        /// Avatar image file.
        #[arg(long)]
        avatar: Option<PathBuf>,
    },

    /// Show the feed.
    Feed {
        /// Number of pages to load.
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },

    /// Create a post.
    Post {
        /// Post text.
        #[arg(default_value = "")]
        content: String,
        /// Only visible to you.
        #[arg(long)]
        private: bool,
        /// Image file (jpg, png, gif, webp).
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Edit one of your posts.
    Edit {
        post_id: String,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, value_enum)]
        visibility: Option<VisibilityArg>,
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Delete one of your posts.
    Delete {
        post_id: String,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },

    /// React to a post or comment. Repeating your reaction removes it.
    React {
        post_id: String,
        /// like, love, haha, care, or angry.
        reaction: ReactionType,
        /// React to this comment of the post instead.
        #[arg(long)]
        comment: Option<String>,
    },

    /// List a post's comments.
    Comments {
        post_id: String,
        /// Load every page.
        #[arg(long)]
        all: bool,
    },

    /// Comment on a post.
    Comment { post_id: String, text: String },

    /// Reply to a comment.
    Reply {
        post_id: String,
        comment_id: String,
        text: String,
    },

    /// List the replies to a comment.
    Replies { post_id: String, comment_id: String },

    /// Show the route guard decision for a path.
    Guard {
        path: String,
        /// Also protect the bare feed root.
        #[arg(long)]
        strict: bool,
    },

    /// Show or change the client config.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective config.
    Show,
    /// Persist settings to the config file.
    Set {
        #[arg(long)]
        api_url: Option<String>,
        #[arg(long)]
        feed_page_size: Option<u32>,
        #[arg(long)]
        comment_page_size: Option<u32>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VisibilityArg {
    Public,
    Private,
}

impl From<VisibilityArg> for Visibility {
    fn from(v: VisibilityArg) -> Self {
        match v {
            VisibilityArg::Public => Visibility::Public,
            VisibilityArg::Private => Visibility::Private,
        }
    }
}

fn prompt_line(label: &str) -> anyhow::Result<String> {
    eprint!("{label}");
    let mut s = String::new();
    std::io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

fn new_password() -> anyhow::Result<String> {
    let pw = rpassword::prompt_password("New password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if pw != confirm {
        anyhow::bail!("Passwords do not match.");
    }
    Ok(pw)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let paths = config::Paths::new(cli.config);

    if let Commands::Version = cli.command {
        println!("sociable cli v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if let Commands::Config { action } = cli.command {
        let mut config = paths.load_config(cli.api_url)?;
        match action {
            ConfigAction::Show => {
                println!("config file:       {}", paths.config.display());
                println!("api_url:           {}", config.api_url);
                println!("timeout_secs:      {}", config.timeout_secs);
                println!("upload_timeout:    {}", config.upload_timeout_secs);
                println!("feed_page_size:    {}", config.feed_page_size);
                println!("comment_page_size: {}", config.comment_page_size);
            }
            ConfigAction::Set {
                api_url,
                feed_page_size,
                comment_page_size,
            } => {
                config = config.with_api_url_override(api_url);
                if let Some(n) = feed_page_size {
                    config.feed_page_size = n.max(1);
                }
                if let Some(n) = comment_page_size {
                    config.comment_page_size = n.max(1);
                }
                config.save(&paths.config)?;
                println!("Saved {}.", paths.config.display());
            }
        }
        return Ok(());
    }

    let session = Session::open(&paths, paths.load_config(cli.api_url)?)?;

    match cli.command {
        Commands::Login { email, password } => {
            let email = match email {
                Some(e) => e,
                None => prompt_line("Email: ")?,
            };
            let password = match password {
                Some(p) => p,
                None => rpassword::prompt_password("Password: ")?,
            };
            commands::auth::login(&session, &email, &password).await?;
        }

        Commands::Register {
            first_name,
            last_name,
            email,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => new_password()?,
            };
            commands::auth::register(&session, &first_name, &last_name, &email, &password)
                .await?;
        }

        Commands::Logout => commands::auth::logout(&session).await?,

        Commands::Whoami => commands::auth::whoami(&session).await?,

        Commands::Profile {
            first_name,
            last_name,
            email,
            change_password,
            avatar,
        } => {
            let password = if change_password {
                Some(new_password()?)
            } else {
                None
            };
            commands::auth::profile(
                &session,
                ProfileArgs {
                    first_name: first_name.as_deref(),
                    last_name: last_name.as_deref(),
                    email: email.as_deref(),
                    password: password.as_deref(),
                    avatar: avatar.as_deref(),
                },
            )
            .await?;
        }

        Commands::Feed { pages } => commands::posts::feed(&session, pages).await?,

        Commands::Post {
            content,
            private,
            image,
        } => commands::posts::create(&session, &content, private, image.as_deref()).await?,

        Commands::Edit {
            post_id,
            content,
            visibility,
            image,
        } => {
            commands::posts::edit(
                &session,
                &post_id,
                content.as_deref(),
                visibility.map(Visibility::from),
                image.as_deref(),
            )
            .await?;
        }

        Commands::Delete { post_id, yes } => {
            if !yes {
                let answer = prompt_line("Are you sure? [y/N]: ")?;
                if !answer.eq_ignore_ascii_case("y") {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            commands::posts::delete(&session, &post_id).await?;
        }

        Commands::React {
            post_id,
            reaction,
            comment,
        } => {
            commands::posts::react(&session, &post_id, comment.as_deref(), reaction).await?;
        }

        Commands::Comments { post_id, all } => {
            commands::posts::comments(&session, &post_id, all).await?
        }

        Commands::Comment { post_id, text } => {
            commands::posts::comment(&session, &post_id, &text).await?
        }

        Commands::Reply {
            post_id,
            comment_id,
            text,
        } => commands::posts::reply(&session, &post_id, &comment_id, &text).await?,

        Commands::Replies {
            post_id,
            comment_id,
        } => commands::posts::replies(&session, &post_id, &comment_id).await?,

        Commands::Guard { path, strict } => {
            commands::guard::check(&session.ctx.bridge, &path, strict)?;
        }

        Commands::Config { .. } | Commands::Version => {}
    }

    Ok(())
}
