use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

use super::{FetchError, TrackHandle, TranscriptCandidate, TranscriptCue, TranscriptLister};
use crate::config::FetchConfig;
use crate::resolver::VideoId;

const PLAYER_API_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

static API_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("api key pattern must compile")
});

static CUE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<text\s+start="([^"]*)"(?:\s+dur="([^"]*)")?[^>]*>(.*?)</text>"#)
        .expect("cue pattern must compile")
});

static TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern must compile"));

/// Transcript lister backed by YouTube's watch page and InnerTube player API
pub struct YoutubeLister {
    client: Client,
}

impl YoutubeLister {
    pub fn new(settings: &FetchConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&settings.accept_language)?,
        );

        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self { client })
    }

    /// Fetch the watch page HTML
    async fn fetch_watch_page(&self, id: &VideoId) -> Result<String, FetchError> {
        tracing::debug!("Fetching watch page for {}", id);

        let response = self.client.get(id.watch_url()).send().await?;
        let response = check_status(response)?;

        Ok(response.text().await?)
    }

    /// Ask the player endpoint for the video's caption tracks
    async fn fetch_player_response(&self, id: &VideoId, api_key: &str) -> Result<Value, FetchError> {
        tracing::debug!("Requesting player response for {}", id);

        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": id.as_str(),
        });

        let response = self
            .client
            .post(PLAYER_API_URL)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;
        let response = check_status(response)?;

        response
            .json()
            .await
            .map_err(|e| FetchError::Unparsable(format!("player response: {}", e)))
    }
}

#[async_trait]
impl TranscriptLister for YoutubeLister {
    async fn list_candidates(&self, id: &VideoId) -> Result<Vec<TranscriptCandidate>, FetchError> {
        let html = self.fetch_watch_page(id).await?;
        let api_key = extract_api_key(&html)?;
        let player = self.fetch_player_response(id, &api_key).await?;

        check_playability(&player)?;
        Ok(parse_caption_tracks(&player))
    }

    async fn fetch_cues(&self, candidate: &TranscriptCandidate) -> Result<Vec<TranscriptCue>, FetchError> {
        let url = candidate.handle.as_str();

        // tracks flagged with exp=xpe need a proof-of-origin token we cannot mint
        if url.contains("&exp=xpe") {
            return Err(FetchError::TrackUnavailable);
        }

        tracing::debug!("Fetching {} cues", candidate.language_code);

        let response = self.client.get(url).send().await?;
        let response = check_status(response)?;
        let body = response.text().await?;

        parse_timedtext(&body)
    }
}

fn check_status(response: Response) -> Result<Response, FetchError> {
    match response.status() {
        StatusCode::TOO_MANY_REQUESTS => Err(FetchError::RateLimited),
        status if !status.is_success() => Err(FetchError::HttpStatus(status.as_u16())),
        _ => Ok(response),
    }
}

/// Scrape the InnerTube API key out of the watch page
pub fn extract_api_key(html: &str) -> Result<String, FetchError> {
    if html.contains("class=\"g-recaptcha\"") {
        return Err(FetchError::RateLimited);
    }

    API_KEY_REGEX
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| FetchError::Unparsable("INNERTUBE_API_KEY not found in watch page".to_string()))
}

/// Map a non-OK `playabilityStatus` to an error
pub fn check_playability(player: &Value) -> Result<(), FetchError> {
    let Some(status) = player.get("playabilityStatus") else {
        return Ok(());
    };

    let reason = status
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match status.get("status").and_then(Value::as_str).unwrap_or("OK") {
        "OK" => Ok(()),
        "LOGIN_REQUIRED" => Err(FetchError::LoginRequired),
        "ERROR" => Err(FetchError::VideoUnavailable),
        _ => Err(FetchError::Unplayable(reason)),
    }
}

/// Caption tracks from a player response, in upstream order
///
/// A response without a captions renderer means the video has no transcripts.
pub fn parse_caption_tracks(player: &Value) -> Vec<TranscriptCandidate> {
    let Some(tracks) = player
        .pointer("/captions/playerCaptionsTracklistRenderer/captionTracks")
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    tracks
        .iter()
        .filter_map(|track| {
            let language_code = track.get("languageCode")?.as_str()?;
            let base_url = track.get("baseUrl")?.as_str()?.replace("&fmt=srv3", "");

            let language = track
                .pointer("/name/runs/0/text")
                .or_else(|| track.pointer("/name/simpleText"))
                .and_then(Value::as_str)
                .unwrap_or(language_code);

            let is_generated = track.get("kind").and_then(Value::as_str) == Some("asr");

            Some(TranscriptCandidate::new(
                language_code,
                language,
                is_generated,
                TrackHandle::new(base_url),
            ))
        })
        .collect()
}

/// Parse the timedtext XML body of a caption track
pub fn parse_timedtext(body: &str) -> Result<Vec<TranscriptCue>, FetchError> {
    if body.trim().is_empty() {
        return Err(FetchError::TrackUnavailable);
    }

    if !body.contains("<transcript") {
        return Err(FetchError::Unparsable("caption track is not timedtext XML".to_string()));
    }

    let cues = CUE_REGEX
        .captures_iter(body)
        .filter_map(|caps| {
            let start = caps.get(1)?.as_str().parse::<f64>().ok()?;
            let duration = caps
                .get(2)
                .and_then(|d| d.as_str().parse::<f64>().ok())
                .unwrap_or(0.0);

            // text is entity-encoded twice: once for XML, once for HTML
            let once = html_escape::decode_html_entities(&caps[3]).into_owned();
            let twice = html_escape::decode_html_entities(&once);
            let text = TAG_REGEX.replace_all(&twice, "").into_owned();

            Some(TranscriptCue::new(text, start, duration))
        })
        .collect();

    Ok(cues)
}
