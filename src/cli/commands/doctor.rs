//! Doctor command - verify API keys and configuration.

use crate::cli::Output;
use crate::config::Settings;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Breeze Doctor");
    println!();
    println!("Checking API keys and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("Model").bold());
    let model_checks = vec![check_model_key(settings), check_model(settings)];
    for check in &model_checks {
        check.print();
    }
    checks.extend(model_checks);

    println!();

    println!("{}", style("Weather").bold());
    let weather_check = check_weather_key(settings);
    weather_check.print();
    checks.push(weather_check);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Breeze.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Breeze is ready to use.");
    }

    Ok(())
}

/// Check the model provider's API key.
fn check_model_key(settings: &Settings) -> CheckResult {
    let var = settings.model.provider.api_key_var();
    match settings.model.api_key.as_deref() {
        Some(key) if !key.is_empty() => {
            CheckResult::ok(var, &format!("configured ({})", mask_key(key)))
        }
        _ => CheckResult::error(var, "not set", &format!("Set with: export {}='...'", var)),
    }
}

/// Describe the configured model and endpoint.
fn check_model(settings: &Settings) -> CheckResult {
    let endpoint = settings
        .model
        .effective_base_url()
        .unwrap_or_else(|| "https://api.openai.com/v1".to_string());
    let message = format!("{} at {}", settings.model.name, endpoint);

    match (&settings.model.info, settings.model.provider.default_base_url()) {
        (None, Some(_)) => CheckResult::warning(
            "Model",
            &message,
            "Add a [model.info] section describing vision and function calling support",
        ),
        _ => CheckResult::ok("Model", &message),
    }
}

/// Check the OpenWeatherMap key. Weather tools are optional.
fn check_weather_key(settings: &Settings) -> CheckResult {
    match settings.weather.api_key.as_deref() {
        Some(key) if !key.is_empty() => CheckResult::ok(
            "OPENWEATHERMAP_API_KEY",
            &format!("configured ({}, {})", mask_key(key), settings.weather.units),
        ),
        _ => CheckResult::warning(
            "OPENWEATHERMAP_API_KEY",
            "not set, weather tools unavailable",
            "Get a key at https://openweathermap.org/api",
        ),
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: breeze config init",
        )
    }
}

/// Show only the ends of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelProvider;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("short"), "****");
        assert_eq!(mask_key("sk-proj-abcdefghijkl1234"), "sk-proj...1234");
    }

    #[test]
    fn test_key_checks() {
        let mut settings = Settings::default();
        assert_eq!(check_model_key(&settings).status, CheckStatus::Error);
        assert_eq!(check_weather_key(&settings).status, CheckStatus::Warning);

        settings.model.api_key = Some("sk-proj-abcdefghijkl1234".to_string());
        assert_eq!(check_model_key(&settings).status, CheckStatus::Ok);
    }

    #[test]
    fn test_openrouter_model_without_info_warns() {
        let mut settings = Settings::default();
        assert_eq!(check_model(&settings).status, CheckStatus::Ok);

        settings.model.provider = ModelProvider::OpenRouter;
        let check = check_model(&settings);
        assert_eq!(check.status, CheckStatus::Warning);
        assert!(check.message.contains("openrouter.ai"));
    }
}
