//! Bot configuration, loaded from environment variables with file fallbacks
//! for the credential and the instruction preamble.

use anyhow::{Context, Result};
use std::env;

pub struct BotConfig {
    pub bot_token: String,
    /// System preamble seeded into every new conversation context. Empty when
    /// the instructions file is absent.
    pub instructions: String,
    pub ollama_base_url: String,
    pub text_model: String,
    pub vision_model: String,
    pub context_store_path: String,
    pub tmp_media_dir: String,
    pub interaction_log_file: String,
    pub log_file: String,
}

impl BotConfig {
    /// Loads configuration. Token resolution order: explicit override,
    /// `BOT_TOKEN`, then the token file.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => match env::var("BOT_TOKEN") {
                Ok(token) => token,
                Err(_) => {
                    let path =
                        env::var("TOKEN_FILE").unwrap_or_else(|_| "token.txt".to_string());
                    read_token_file(&path)?
                }
            },
        };

        let instructions_path =
            env::var("INSTRUCTIONS_FILE").unwrap_or_else(|_| "instructions.txt".to_string());
        let instructions = load_instructions(&instructions_path);

        let ollama_base_url = env::var("OLLAMA_BASE_URL")
            .unwrap_or_else(|_| llm_client::OLLAMA_BASE_URL.to_string());
        let text_model = env::var("AI_TEXT_MODEL").unwrap_or_else(|_| "gemma3:4b".to_string());
        let vision_model = env::var("AI_VISION_MODEL").unwrap_or_else(|_| "llava:7b".to_string());
        let context_store_path =
            env::var("CONTEXT_STORE_PATH").unwrap_or_else(|_| "./data/contexts.json".to_string());
        let tmp_media_dir = env::var("TMP_MEDIA_DIR").unwrap_or_else(|_| "./tmp".to_string());
        let interaction_log_file = env::var("INTERACTION_LOG_FILE")
            .unwrap_or_else(|_| "bot_interactions.log".to_string());
        let log_file = "logs/gbot.log".to_string();

        Ok(Self {
            bot_token,
            instructions,
            ollama_base_url,
            text_model,
            vision_model,
            context_store_path,
            tmp_media_dir,
            interaction_log_file,
            log_file,
        })
    }
}

fn read_token_file(path: &str) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read bot token from {path}"))?;
    Ok(raw.trim().to_string())
}

/// Instruction preamble from a plain-text file; absent file means no preamble.
pub fn load_instructions(path: &str) -> String {
    std::fs::read_to_string(path)
        .map(|raw| raw.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        env::remove_var("BOT_TOKEN");
        env::remove_var("TOKEN_FILE");
        env::remove_var("INSTRUCTIONS_FILE");
        env::remove_var("OLLAMA_BASE_URL");
        env::remove_var("AI_TEXT_MODEL");
        env::remove_var("AI_VISION_MODEL");
        env::remove_var("CONTEXT_STORE_PATH");
        env::remove_var("TMP_MEDIA_DIR");
        env::remove_var("INTERACTION_LOG_FILE");
    }

    #[test]
    #[serial]
    fn test_load_config_with_defaults() {
        clear_env();
        env::set_var("BOT_TOKEN", "test_token");

        let config = BotConfig::load(None).unwrap();

        assert_eq!(config.bot_token, "test_token");
        assert_eq!(config.ollama_base_url, "http://localhost:11434");
        assert_eq!(config.text_model, "gemma3:4b");
        assert_eq!(config.vision_model, "llava:7b");
        assert_eq!(config.context_store_path, "./data/contexts.json");
        assert_eq!(config.tmp_media_dir, "./tmp");
        assert_eq!(config.interaction_log_file, "bot_interactions.log");
        assert_eq!(config.log_file, "logs/gbot.log");
    }

    #[test]
    #[serial]
    fn test_load_config_with_custom_values() {
        clear_env();
        env::set_var("BOT_TOKEN", "custom_token");
        env::set_var("OLLAMA_BASE_URL", "http://10.0.0.2:11434");
        env::set_var("AI_TEXT_MODEL", "qwen2.5");
        env::set_var("AI_VISION_MODEL", "llava:13b");
        env::set_var("CONTEXT_STORE_PATH", "/tmp/ctx.json");

        let config = BotConfig::load(None).unwrap();

        assert_eq!(config.bot_token, "custom_token");
        assert_eq!(config.ollama_base_url, "http://10.0.0.2:11434");
        assert_eq!(config.text_model, "qwen2.5");
        assert_eq!(config.vision_model, "llava:13b");
        assert_eq!(config.context_store_path, "/tmp/ctx.json");
    }

    #[test]
    #[serial]
    fn test_load_config_with_override_token() {
        clear_env();
        env::set_var("BOT_TOKEN", "env_token");

        let config = BotConfig::load(Some("override_token".to_string())).unwrap();

        assert_eq!(config.bot_token, "override_token");
    }

    #[test]
    #[serial]
    fn test_token_read_from_file_and_trimmed() {
        clear_env();
        let dir = tempfile::TempDir::new().unwrap();
        let token_path = dir.path().join("token.txt");
        let mut file = std::fs::File::create(&token_path).unwrap();
        writeln!(file, "  file_token  ").unwrap();
        env::set_var("TOKEN_FILE", token_path.to_str().unwrap());

        let config = BotConfig::load(None).unwrap();

        assert_eq!(config.bot_token, "file_token");
    }

    #[test]
    #[serial]
    fn test_missing_token_everywhere_is_an_error() {
        clear_env();
        env::set_var("TOKEN_FILE", "/nonexistent/token.txt");

        assert!(BotConfig::load(None).is_err());
    }

    #[test]
    #[serial]
    fn test_instructions_default_to_empty_when_absent() {
        assert_eq!(load_instructions("/nonexistent/instructions.txt"), "");
    }

    #[test]
    #[serial]
    fn test_instructions_loaded_and_trimmed() {
        clear_env();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("instructions.txt");
        std::fs::write(&path, "Be concise.\n").unwrap();
        env::set_var("BOT_TOKEN", "t");
        env::set_var("INSTRUCTIONS_FILE", path.to_str().unwrap());

        let config = BotConfig::load(None).unwrap();

        assert_eq!(config.instructions, "Be concise.");
    }
}
