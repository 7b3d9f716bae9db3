//! Ollama preflight check.

use super::CheckResult;
use crate::models::config::OllamaConfig;
use crate::services::ollama::OllamaClient;

/// Check that Ollama is running and has the configured model.
pub async fn check(config: &OllamaConfig) -> CheckResult {
    let client = match OllamaClient::with_config(config.clone()) {
        Ok(client) => client,
        Err(e) => return CheckResult::fail("Ollama", &e.to_string(), "Check the [ollama] config"),
    };

    match client.health_check().await {
        Ok(true) => match client.list_models().await {
            Ok(models) => {
                let wanted = client.model();
                // Tags are optional in model names ("qwen2.5" == "qwen2.5:latest")
                let found = models.iter().any(|m| {
                    m.name == wanted || m.name.split(':').next() == Some(wanted)
                });
                if found {
                    CheckResult::ok("Ollama", &format!("running (model: {})", wanted))
                } else {
                    CheckResult::fail(
                        "Ollama",
                        &format!("model {} not available", wanted),
                        &format!("Pull the model: ollama pull {}", wanted),
                    )
                }
            }
            Err(_) => CheckResult::ok("Ollama", "running"),
        },
        Ok(false) | Err(_) => CheckResult::fail(
            "Ollama",
            "not running",
            "Start Ollama: ollama serve, or pass --no-ai",
        ),
    }
}
