//! Ollama API client.
//!
//! Used as the AI fallback for filenames the local parser cannot handle.
//! Configured through `[ollama]` in the config file or the `OLLAMA_HOST`,
//! `OLLAMA_MODEL` and `OLLAMA_TIMEOUT` environment variables.

use crate::models::config::OllamaConfig;
use crate::models::media::ParsedTitle;
use crate::services::AiTitleParser;
use crate::Result;
use async_trait::async_trait;
use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Ollama API client.
pub struct OllamaClient {
    config: OllamaConfig,
    client: reqwest::Client,
}

/// Options for generation.
#[derive(Debug, Serialize)]
struct GenerateOptions {
    /// Temperature for sampling (0 = deterministic, 1 = creative)
    temperature: f32,
    /// Random seed for reproducibility
    seed: u32,
}

/// Generate request payload.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    options: GenerateOptions,
}

/// Generate response.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    pub model: String,
    pub done: bool,
}

/// Models list response.
#[derive(Debug, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

/// Model information.
#[derive(Debug, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub size: u64,
}

/// Raw answer expected from the model.
#[derive(Debug, Deserialize)]
struct AiAnswer {
    #[serde(rename = "type")]
    kind: Option<String>,
    title: Option<String>,
    year: Option<u16>,
    season: Option<u16>,
    episode: Option<u16>,
}

impl OllamaClient {
    /// Create a new Ollama client.
    pub fn with_config(config: OllamaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self { config, client })
    }

    /// Configured model name.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Check if Ollama service is available.
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.config.host);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// List available models.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/api/tags", self.config.host);
        let resp: ModelsResponse = self.client.get(&url).send().await?.json().await?;
        Ok(resp.models)
    }

    /// Generate text with specified format (e.g., "json").
    pub async fn generate_with_format(
        &self,
        prompt: &str,
        format: Option<&str>,
    ) -> Result<GenerateResponse> {
        let url = format!("{}/api/generate", self.config.host);

        let request = GenerateRequest {
            model: &self.config.model,
            prompt: prompt.to_string(),
            stream: false,
            format,
            // Same input, same output
            options: GenerateOptions {
                temperature: 0.0,
                seed: 42,
            },
        };

        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| crate::Error::AiParse(e.to_string()))?
            .json()
            .await?;

        Ok(resp)
    }
}

#[async_trait]
impl AiTitleParser for OllamaClient {
    async fn parse_with_ai(&self, filename: &str) -> Result<Option<ParsedTitle>> {
        tracing::info!("Using AI fallback for filename: \"{}\"", filename);
        let prompt = build_prompt(filename);
        let resp = self.generate_with_format(&prompt, Some("json")).await?;
        tracing::debug!("AI response for {}: {}", filename, resp.response);
        parse_answer(&resp.response)
    }
}

fn build_prompt(filename: &str) -> String {
    format!(
        r#"You are an expert media file name parser. Extract structured information from the filename below.
Return a JSON object with the media type, title, and year (for movies) or season/episode (for TV shows).

RULES:
1. Output a single valid JSON object and nothing else.
2. "type" is "movie" or "tv".
3. For a movie give "title" and "year". If no year is present, set "year" to null.
4. For a TV show give "title", "season" and "episode".
5. Remove junk from the title: quality (1080p), source (BluRay), release groups (YIFY), websites (MoviesMod).
6. Do not invent information. Unknown values are null.

EXAMPLE 1:
Input: "Master.And.Commander.The.Far.Side.Of.The.World.2003.1080p.BluRay.x264.mkv"
Output: {{"type": "movie", "title": "Master and Commander The Far Side of the World", "year": 2003, "season": null, "episode": null}}

EXAMPLE 2:
Input: "DAN.DA.DAN.Season.2.S02E09.Episode.21.-.I.Want.to.Rebuild.the.House.1080p.AMZN.WEB-DL.mkv"
Output: {{"type": "tv", "title": "Dan Da Dan", "year": null, "season": 2, "episode": 9}}

FILENAME TO PARSE:
Input: "{}"
Output:"#,
        filename
    )
}

/// Parse the model's answer into a title.
///
/// Markdown code fences are tolerated. Answers without a title, and series
/// answers without a positive season and episode, yield `None`.
pub fn parse_answer(text: &str) -> Result<Option<ParsedTitle>> {
    let json = text.replace("```json", "").replace("```", "");
    let answer: AiAnswer = serde_json::from_str(json.trim())
        .map_err(|e| crate::Error::AiParse(format!("invalid AI response: {}", e)))?;
    Ok(validate_answer(answer))
}

fn validate_answer(answer: AiAnswer) -> Option<ParsedTitle> {
    let title = answer.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;

    if answer.kind.as_deref() == Some("tv") {
        let parsed = answer
            .season
            .zip(answer.episode)
            .and_then(|(s, e)| ParsedTitle::episode(title.clone(), s, e));
        if parsed.is_none() {
            tracing::warn!("AI returned a series without season/episode: {}", title);
        }
        return parsed;
    }

    let max_year = chrono::Utc::now().year() as u16 + 5;
    let year = answer.year.filter(|y| (1900..=max_year).contains(y));
    Some(ParsedTitle::movie(title, year))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_movie_answer() {
        let parsed = parse_answer(
            r#"{"type": "movie", "title": "The Matrix", "year": 1999, "season": null, "episode": null}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(parsed, ParsedTitle::movie("The Matrix", Some(1999)));
    }

    #[test]
    fn test_parse_answer_with_fences() {
        let text = "```json\n{\"type\": \"tv\", \"title\": \"Dan Da Dan\", \"season\": 2, \"episode\": 9}\n```";
        let parsed = parse_answer(text).unwrap().unwrap();
        assert_eq!(parsed, ParsedTitle::episode("Dan Da Dan", 2, 9).unwrap());
    }

    #[test]
    fn test_series_without_episode_is_rejected() {
        let parsed = parse_answer(r#"{"type": "tv", "title": "Show", "season": 1}"#).unwrap();
        assert!(parsed.is_none());

        let parsed =
            parse_answer(r#"{"type": "tv", "title": "Show", "season": 0, "episode": 3}"#).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn test_missing_title_is_rejected() {
        let parsed = parse_answer(r#"{"type": "movie", "title": "  ", "year": 2003}"#).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn test_out_of_range_year_is_dropped() {
        let parsed = parse_answer(r#"{"type": "movie", "title": "Old", "year": 1200}"#)
            .unwrap()
            .unwrap();
        assert_eq!(parsed.year(), None);
    }

    #[test]
    fn test_garbage_answer_is_error() {
        assert!(matches!(parse_answer("not json"), Err(crate::Error::AiParse(_))));
    }

    #[test]
    fn test_prompt_contains_filename() {
        assert!(build_prompt("Some.File.mkv").contains("Input: \"Some.File.mkv\""));
    }
}
