//! Configuration validation.

use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_browser(config, &mut result);
        Self::validate_resolver(config, &mut result);

        if config.orchestrator.frame_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "orchestrator.frame_timeout_ms",
                "frame_timeout_ms must be greater than 0",
            ));
        } else if config.orchestrator.frame_timeout_ms > 60_000 {
            result.add_warning(ValidationWarning::new(
                "orchestrator.frame_timeout_ms",
                "frame timeout is over a minute, a stuck frame will stall every fill",
            ));
        }

        result
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        if config.browser.endpoint.is_empty() {
            result.add_error(ValidationError::new(
                "browser.endpoint",
                "Browser endpoint cannot be empty",
            ));
        } else if url::Url::parse(&config.browser.endpoint).is_err() {
            result.add_error(ValidationError::new(
                "browser.endpoint",
                "Invalid URL format",
            ));
        }
    }

    fn validate_resolver(config: &Config, result: &mut ValidationResult) {
        let resolver = &config.resolver;

        if resolver.base_url.is_empty() {
            result.add_error(ValidationError::new(
                "resolver.base_url",
                "Resolver base URL cannot be empty",
            ));
        } else if url::Url::parse(&resolver.base_url).is_err() {
            result.add_error(ValidationError::new(
                "resolver.base_url",
                "Invalid URL format",
            ));
        }

        if resolver.model.is_empty() {
            result.add_error(ValidationError::new(
                "resolver.model",
                "Model cannot be empty",
            ));
        }

        if resolver.max_tokens == 0 {
            result.add_error(ValidationError::new(
                "resolver.max_tokens",
                "max_tokens must be greater than 0",
            ));
        }

        if resolver.timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "resolver.timeout_seconds",
                "timeout_seconds must be greater than 0",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
