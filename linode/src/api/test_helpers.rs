//! Test helpers for the Linode API

#[cfg(test)]
pub fn create_test_client(url: &str) -> super::Client {
    super::Client::new(url, "test-key", true).unwrap()
}

/// Client whose retries finish in milliseconds
#[cfg(test)]
pub fn fast_retry_client(url: &str) -> super::Client {
    let retry_config = super::RetryConfig {
        max_retries: 2,
        initial_backoff_ms: 1,
        max_backoff_ms: 5,
        timeout_seconds: 5,
    };
    super::Client::with_config(url, "test-key", true, retry_config).unwrap()
}

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_retry_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_backoff_ms, 100);
        assert_eq!(config.max_backoff_ms, 10000);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_api_error_formatting() {
        let error = ApiError::ApiError {
            action: "linode.disk.create".to_string(),
            errors: vec![
                ApiErrorEntry {
                    code: 8,
                    message: "A required property is missing: Size".to_string(),
                },
                ApiErrorEntry {
                    code: 11,
                    message: "Label too long".to_string(),
                },
            ],
        };

        let error_str = error.to_string();
        assert!(error_str.contains("linode.disk.create"));
        assert!(error_str.contains("[8] A required property is missing: Size"));
        assert!(error_str.contains("; [11] Label too long"));
        assert_eq!(error.codes(), vec![8, 11]);
    }

    #[test]
    fn test_api_params() {
        let params = ApiParams::new()
            .add("foo", "bar")
            .add("baz", 123)
            .add_optional("opt", Some("value"))
            .add_optional("none", None::<String>);

        let form = params.as_form();
        assert_eq!(form.len(), 3);
        assert_eq!(form[1], ("baz".to_string(), "123".to_string()));
    }
}
