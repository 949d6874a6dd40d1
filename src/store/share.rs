use base64::prelude::*;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{QuizError, Result};

pub const SHARE_PARAM: &str = "share";
pub const ANONYMOUS_PLAYER: &str = "Anonymous Player";

/// Summary a player hands to a friend as a challenge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePayload {
    #[serde(default)]
    pub user_name: Option<String>,
    pub total_quizzes: u32,
    pub avg_score: u32,
    pub best_score: u32,
    pub mastered_tables: u32,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl SharePayload {
    pub fn display_name(&self) -> &str {
        self.user_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Someone")
    }

    pub fn shared_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(BASE64_STANDARD.encode(json.as_bytes()))
    }

    /// Decode either a bare base64 payload or a full link carrying one in
    /// its `share` query parameter.
    pub fn decode(input: &str) -> Result<Self> {
        let input = input.trim();
        let encoded = match Url::parse(input) {
            Ok(url) => url
                .query_pairs()
                .find(|(k, _)| k == SHARE_PARAM)
                // Unescaped '+' in hand-built links arrives as a space.
                .map(|(_, v)| v.replace(' ', "+"))
                .ok_or_else(|| QuizError::InvalidShare("link has no share parameter".into()))?,
            Err(_) => input.to_string(),
        };
        let bytes = BASE64_STANDARD
            .decode(encoded.trim())
            .map_err(|e| QuizError::InvalidShare(format!("not base64: {e}")))?;
        serde_json::from_slice(&bytes).map_err(|e| QuizError::InvalidShare(e.to_string()))
    }

    pub fn to_url(&self, base_url: &str) -> Result<String> {
        let mut url = Url::parse(base_url)
            .map_err(|e| QuizError::InvalidShare(format!("bad base url '{base_url}': {e}")))?;
        url.query_pairs_mut()
            .append_pair(SHARE_PARAM, &self.encode()?);
        Ok(url.into())
    }

    /// Challenge message shown to whoever opens a share link.
    pub fn challenge_text(&self) -> String {
        let name = self.display_name();
        let date = self
            .shared_at()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "an unknown date".to_string());
        format!(
            "{name} challenged you to beat their score!\n\n\
             {name}'s Performance Summary:\n\
             \u{2022} Total Quizzes: {}\n\
             \u{2022} Average Score: {}%\n\
             \u{2022} Best Score: {}%\n\
             \u{2022} Tables Mastered: {}\n\n\
             Shared on: {date}\n\n\
             Can you beat {name}'s scores? Start a quiz to find out!",
            self.total_quizzes, self.avg_score, self.best_score, self.mastered_tables
        )
    }
}
