//! Notification boundary and concrete transports
//!
//! The poll loop only knows the [`Notifier`] trait; which transport actually
//! carries the message is wiring decided at startup. Two transports ship
//! here: a Telegram bot call and a log-only fallback for running without
//! credentials.

use async_trait::async_trait;
use log::info;
use protocol::{PlayerRecord, ServerInfo};
use thiserror::Error;

/// Literal used in place of the roster listing when nobody is connected.
pub const EMPTY_ROSTER_PLACEHOLDER: &str = "(no players online)";

/// Failure to deliver one notification. Never fatal to the poll loop.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Everything a transport needs to announce one join.
#[derive(Debug, Clone)]
pub struct JoinEvent {
    pub player: String,
    pub server_name: String,
    pub map: String,
    pub players: u8,
    pub max_players: u8,
    pub roster: Vec<PlayerRecord>,
}

impl JoinEvent {
    pub fn new(player: &str, info: &ServerInfo, roster: &[PlayerRecord]) -> Self {
        Self {
            player: player.to_string(),
            server_name: info.name.clone(),
            map: info.map.clone(),
            players: info.players,
            max_players: info.max_players,
            roster: roster.to_vec(),
        }
    }

    /// Human-readable message body shared by every transport.
    pub fn render(&self) -> String {
        format!(
            "Player joined: {}\nServer: {}\nMap: {}\nPlayers: {}/{}\n\nCurrent roster:\n{}",
            self.player,
            self.server_name,
            self.map,
            self.players,
            self.max_players,
            format_roster(&self.roster)
        )
    }
}

/// Formats the roster as one line per player, or the empty placeholder.
pub fn format_roster(players: &[PlayerRecord]) -> String {
    if players.is_empty() {
        return EMPTY_ROSTER_PLACEHOLDER.to_string();
    }
    players
        .iter()
        .map(|p| format!("- {} (score={}, time={:.0}s)", p.name, p.score, p.duration))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Outbound notification channel. Implementations must be safe to share
/// across await points but are only called from one poll loop at a time.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &JoinEvent) -> Result<(), NotifyError>;
}

/// Fallback transport that writes the rendered message to the log. Used
/// when no chat credentials are configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &JoinEvent) -> Result<(), NotifyError> {
        info!("join notification (dry run):\n{}", event.render());
        Ok(())
    }
}

/// Sends the rendered message through the Telegram bot API.
pub struct TelegramNotifier {
    http: reqwest::Client,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: String, chat_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            chat_id,
        }
    }

    fn endpoint(&self) -> String {
        format!("https://api.telegram.org/bot{}/sendMessage", self.token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, event: &JoinEvent) -> Result<(), NotifyError> {
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": event.render(),
        });

        let response = self.http.post(self.endpoint()).json(&payload).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected(format!("{}: {}", status, body)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: u8, name: &str, score: i32, duration: f32) -> PlayerRecord {
        PlayerRecord {
            index,
            name: name.to_string(),
            score,
            duration,
        }
    }

    fn info() -> ServerInfo {
        ServerInfo {
            name: "Fun House".to_string(),
            map: "de_dust2".to_string(),
            folder: "cstrike".to_string(),
            game: "Counter-Strike".to_string(),
            app_id: 10,
            players: 2,
            max_players: 32,
            bots: 0,
        }
    }

    #[test]
    fn test_format_roster_lines() {
        let roster = vec![record(0, "alpha", 12, 61.4), record(1, "beta", -3, 900.0)];
        let formatted = format_roster(&roster);

        assert_eq!(
            formatted,
            "- alpha (score=12, time=61s)\n- beta (score=-3, time=900s)"
        );
    }

    #[test]
    fn test_format_empty_roster() {
        assert_eq!(format_roster(&[]), EMPTY_ROSTER_PLACEHOLDER);
    }

    #[test]
    fn test_render_event() {
        let roster = vec![record(0, "alpha", 12, 61.4)];
        let event = JoinEvent::new("alpha", &info(), &roster);
        let message = event.render();

        assert!(message.starts_with("Player joined: alpha\n"));
        assert!(message.contains("Server: Fun House\n"));
        assert!(message.contains("Map: de_dust2\n"));
        assert!(message.contains("Players: 2/32\n"));
        assert!(message.ends_with("- alpha (score=12, time=61s)"));
    }

    #[test]
    fn test_render_event_empty_roster() {
        let event = JoinEvent::new("alpha", &info(), &[]);
        assert!(event.render().ends_with(EMPTY_ROSTER_PLACEHOLDER));
    }

    #[test]
    fn test_telegram_endpoint() {
        let notifier = TelegramNotifier::new("123:abc".to_string(), "-100123".to_string());
        assert_eq!(
            notifier.endpoint(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }
}
