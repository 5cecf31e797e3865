//! HTTP implementation of the authoritative service boundary.
//!
//! Maps each operation to a REST call under the configured base URL. A 409
//! response is a conflict; any other failure (connect, timeout, non-2xx) is a
//! transport error and triggers rollback upstream.

use crate::models::{CourtId, MatchId, MatchStatus, Side};
use crate::sync::service::{ScoreService, ServePatch, ServiceError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;

pub struct HttpScoreService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpScoreService {
    /// A trailing slash on `base_url` is tolerated.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, match_id: MatchId, tail: &str) -> String {
        format!("{}/api/matches/{}/{}", self.base_url, match_id, tail)
    }

    async fn check(resp: reqwest::Response) -> Result<(), ServiceError> {
        if resp.status() == StatusCode::CONFLICT {
            let msg = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Conflict(msg));
        }
        resp.error_for_status()
            .map(|_| ())
            .map_err(|e| ServiceError::Transport(e.to_string()))
    }

    async fn post<B: Serialize>(&self, url: String, body: &B) -> Result<(), ServiceError> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Self::check(resp).await
    }

    async fn put<B: Serialize>(&self, url: String, body: &B) -> Result<(), ServiceError> {
        let resp = self
            .client
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Self::check(resp).await
    }
}

#[derive(Serialize)]
struct IncrementBody {
    side: Side,
    delta: i32,
    auto_next: bool,
}

#[derive(Serialize)]
struct GameScoreBody {
    a: u32,
    b: u32,
    auto_next: bool,
}

#[derive(Serialize)]
struct StatusBody {
    status: MatchStatus,
}

#[derive(Serialize)]
struct WinnerBody {
    winner: Option<Side>,
}

#[derive(Serialize)]
struct NextGameBody {
    auto_next: bool,
}

#[derive(Serialize)]
struct CourtBody {
    court_id: Option<CourtId>,
}

#[async_trait]
impl ScoreService for HttpScoreService {
    async fn increment_point(
        &self,
        match_id: MatchId,
        side: Side,
        delta: i32,
        auto_next: bool,
    ) -> Result<(), ServiceError> {
        let body = IncrementBody {
            side,
            delta,
            auto_next,
        };
        self.post(self.url(match_id, "score/inc"), &body).await
    }

    async fn set_game_score(
        &self,
        match_id: MatchId,
        game_index: usize,
        a: u32,
        b: u32,
        auto_next: bool,
    ) -> Result<(), ServiceError> {
        let body = GameScoreBody { a, b, auto_next };
        self.put(self.url(match_id, &format!("games/{game_index}")), &body)
            .await
    }

    async fn set_status(&self, match_id: MatchId, status: MatchStatus) -> Result<(), ServiceError> {
        self.put(self.url(match_id, "status"), &StatusBody { status })
            .await
    }

    async fn set_winner(
        &self,
        match_id: MatchId,
        winner: Option<Side>,
    ) -> Result<(), ServiceError> {
        self.put(self.url(match_id, "winner"), &WinnerBody { winner })
            .await
    }

    async fn next_game(&self, match_id: MatchId, auto_next: bool) -> Result<(), ServiceError> {
        self.post(self.url(match_id, "games/next"), &NextGameBody { auto_next })
            .await
    }

    async fn set_serve(&self, match_id: MatchId, patch: ServePatch) -> Result<(), ServiceError> {
        self.put(self.url(match_id, "serve"), &patch).await
    }

    async fn assign_court(&self, match_id: MatchId, court_id: CourtId) -> Result<(), ServiceError> {
        let body = CourtBody {
            court_id: Some(court_id),
        };
        self.put(self.url(match_id, "court"), &body).await
    }

    async fn unassign_court(
        &self,
        match_id: MatchId,
        court_id: Option<CourtId>,
    ) -> Result<(), ServiceError> {
        let resp = self
            .client
            .delete(self.url(match_id, "court"))
            .json(&CourtBody { court_id })
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Self::check(resp).await
    }
}
