use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use scratchcard_core::{use_session, Config, SessionState, StorageBackend, User};
use tracing::warn;

pub const USAGE: &str = "\
Usage: scratchcard [COMMAND]

Commands:
  status                     Show the current session (default)
  login <user.json> [token]  Store a user and token; prompts for the token if omitted
  update-user <user.json>    Replace the cached user, keeping the token
  logout                     Clear the session
  check-image <url>          Check a URL against the remote image allowlist
  config                     Print the effective configuration
  help                       Show this message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    Login { user_file: PathBuf, token: Option<String> },
    UpdateUser { user_file: PathBuf },
    Logout,
    CheckImage { url: String },
    Config,
}

impl Command {
    /// Parse arguments (without the program name). `None` means help.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Option<Self>> {
        let args: Vec<String> = args.into_iter().collect();
        let arg = |i: usize| args.get(i).cloned();

        let command = match args.first().map(String::as_str) {
            None | Some("status") => Command::Status,
            Some("login") => Command::Login {
                user_file: arg(1).context("login requires a user JSON file")?.into(),
                token: arg(2),
            },
            Some("update-user") => Command::UpdateUser {
                user_file: arg(1).context("update-user requires a user JSON file")?.into(),
            },
            Some("logout") => Command::Logout,
            Some("check-image") => Command::CheckImage {
                url: arg(1).context("check-image requires a URL")?,
            },
            Some("config") => Command::Config,
            Some("help" | "-h" | "--help") => return Ok(None),
            Some(other) => bail!("Unknown command: {}\n\n{}", other, USAGE),
        };
        Ok(Some(command))
    }

    /// Run against the session of the enclosing provider
    pub fn run(self, config: &Config) -> Result<()> {
        match self {
            Command::Status => print_status(),
            Command::Login { user_file, token } => {
                let user = read_user(&user_file)?;
                let token = match token {
                    Some(token) => token,
                    None => rpassword::prompt_password("Token: ")
                        .context("Failed to read token")?,
                };
                if token.trim().is_empty() {
                    bail!("Token must not be empty");
                }
                use_session().login(user, token.trim())?;
                warn_if_ephemeral(config);
                print_status()
            }
            Command::UpdateUser { user_file } => {
                let session = use_session();
                if !session.is_authenticated() {
                    bail!("Not logged in");
                }
                session.update_user(read_user(&user_file)?)?;
                warn_if_ephemeral(config);
                print_status()
            }
            Command::Logout => {
                use_session().logout()?;
                println!("Logged out");
                Ok(())
            }
            Command::CheckImage { url } => {
                if config.images.is_allowed(&url) {
                    println!("allowed: {}", url);
                } else {
                    println!("blocked: {}", url);
                }
                Ok(())
            }
            Command::Config => {
                println!("{}", serde_json::to_string_pretty(config)?);
                Ok(())
            }
        }
    }
}

fn read_user(path: &Path) -> Result<User> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read user file: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse user file: {}", path.display()))
}

fn warn_if_ephemeral(config: &Config) {
    if config.storage == StorageBackend::Memory {
        warn!("Memory storage selected; the session will not survive this process");
    }
}

fn print_status() -> Result<()> {
    let snapshot = use_session().snapshot();
    println!("Session: {}", snapshot.state());

    let user = match (snapshot.state(), snapshot.user) {
        (SessionState::Authenticated, Some(user)) => user,
        _ => return Ok(()),
    };

    let role = if user.is_admin { " [admin]" } else { "" };
    println!(
        "User:    {} <{}>{}",
        user.display_name(),
        user.email.as_deref().unwrap_or("no email"),
        role
    );
    if let Some(since) = user.member_since() {
        println!("Since:   {}", since.format("%b %d, %Y"));
    }
    println!(
        "Plays:   {} ({} wins, {} losses)",
        user.total_scratch_cards, user.total_wins, user.total_losses
    );
    println!("Totals:  deposited {}, withdrawn {}", user.total_deposits, user.total_withdrawals);
    for wallet in user.active_wallets() {
        println!("Wallet:  {} {}", wallet.currency, wallet.display_balance());
    }
    println!(
        "Invite:  {} ({} invites, {} commission)",
        user.invite_code.code, user.invite_code.total_invites, user.invite_code.total_commission
    );
    Ok(())
}
