use std::{io::Write, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    draft::{CharCountLevel, DraftGauge, MAX_MESSAGE_CHARS},
    Endpoints, HttpChatTransport, SessionController, View,
};
use shared::domain::UserType;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::Settings;

const HELP: &str = "Commands: /new (restart conversation), /logout, /status, /quit";

#[derive(Parser, Debug)]
#[command(name = "chat-desktop", version, about = "Terminal client for the trade chat assistant")]
struct Args {
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    user_type: Option<UserType>,
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(&args.config);
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(username) = args.username {
        settings.username = Some(username);
    }
    if let Some(user_type) = args.user_type {
        settings.user_type = user_type;
    }

    let base_url = config::parse_server_url(&settings.server_url)?;
    let endpoints = Endpoints {
        base_url: base_url.to_string(),
        chat_path: settings.chat_path.clone(),
        status_path: settings.status_path.clone(),
    };
    tracing::info!(server_url = %base_url, "starting chat client");

    let controller = SessionController::new(Arc::new(HttpChatTransport::new(endpoints)));
    tokio::spawn(render::print_events(controller.subscribe_events()));
    controller.spawn_engine_status_query();

    run(controller, settings).await
}

async fn run(controller: Arc<SessionController>, settings: Settings) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut quit_warned = false;

    if let Some(username) = settings.username.as_deref() {
        login(&controller, username, settings.user_type).await;
    }

    loop {
        let view = controller.snapshot().await.view;
        if view == View::Login {
            prompt("username [customer|tradesperson]> ")?;
        }

        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        let command = line.trim();

        if command == "/quit" {
            if controller.has_active_session().await && !quit_warned {
                println!("You have an active chat session. Type /quit again to leave.");
                quit_warned = true;
                continue;
            }
            break;
        }
        quit_warned = false;

        match (view, command) {
            (View::Login, _) => {
                let (username, user_type) = parse_login_line(&line, settings.user_type);
                login(&controller, &username, user_type).await;
            }
            (View::Chat, "/new") => {
                controller.new_session().await;
            }
            (View::Chat, "/logout") => controller.logout().await,
            (View::Chat, "/status") => {
                let snapshot = controller.snapshot().await;
                println!(
                    "{} | {} | {}",
                    snapshot.engine,
                    snapshot.user_display().unwrap_or_default(),
                    snapshot.session_id.unwrap_or_default()
                );
            }
            (View::Chat, "/help") => println!("{HELP}"),
            (View::Chat, _) => {
                let gauge = DraftGauge::measure(&line);
                if gauge.level != CharCountLevel::Normal {
                    println!("({}/{MAX_MESSAGE_CHARS})", gauge.chars);
                }
                controller.send_message(&line).await;
            }
        }
    }

    Ok(())
}

async fn login(controller: &SessionController, username: &str, user_type: UserType) {
    match controller.login(username, user_type).await {
        Ok(_) => {
            let snapshot = controller.snapshot().await;
            println!(
                "Signed in as {}. {HELP}",
                snapshot.user_display().unwrap_or_default()
            );
        }
        Err(err) => println!("{err}"),
    }
}

/// `name [user type]`; a trailing word that is not a user type stays part of
/// the name.
fn parse_login_line(line: &str, default_user_type: UserType) -> (String, UserType) {
    let line = line.trim();
    if let Some((name, last)) = line.rsplit_once(char::is_whitespace) {
        if let Ok(user_type) = last.parse() {
            return (name.trim().to_string(), user_type);
        }
    }
    (line.to_string(), default_user_type)
}

fn prompt(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_line_reads_trailing_user_type() {
        assert_eq!(
            parse_login_line("al tradesperson", UserType::Customer),
            ("al".to_string(), UserType::Tradesperson)
        );
    }

    #[test]
    fn login_line_keeps_multi_word_names() {
        assert_eq!(
            parse_login_line("  mary ann  ", UserType::Tradesperson),
            ("mary ann".to_string(), UserType::Tradesperson)
        );
    }

    #[test]
    fn args_accept_user_type() {
        let args = Args::try_parse_from([
            "chat-desktop",
            "--username",
            "al",
            "--user-type",
            "tradesperson",
        ])
        .expect("parse");
        assert_eq!(args.user_type, Some(UserType::Tradesperson));
        assert_eq!(args.config, PathBuf::from(config::DEFAULT_CONFIG_PATH));
    }
}
