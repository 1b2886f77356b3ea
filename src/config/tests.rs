#[cfg(test)]
mod config_tests {
    use crate::config::{
        default_drinks_table, default_host, default_log_level, default_meals_table,
        default_metrics_port, default_port, default_region, default_service_name,
        default_timeout, Config, ConfigError, DatabaseConfig, ServerConfig,
    };
    use std::time::Duration;

    fn settings(overrides: &[(&str, &str)]) -> config::Config {
        overrides
            .iter()
            .fold(config::Config::builder(), |builder, (key, value)| {
                builder.set_override(*key, *value).unwrap()
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = Config::from_settings(&settings(&[])).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.meals_table_name, "menuItems");
        assert_eq!(config.database.drinks_table_name, "drinks");
        assert_eq!(config.database.endpoint_url, None);
        assert!(!config.database.create_tables);
        assert_eq!(config.observability.otlp_endpoint, None);
        assert!(!config.observability.enable_json_logging);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = Config::from_settings(&settings(&[
            ("port", "9000"),
            ("meals_table_name", "TestMeals"),
            ("drinks_table_name", "TestDrinks"),
            ("endpoint_url", "http://localhost:8000"),
            ("create_tables", "true"),
            ("otlp_endpoint", "http://collector:4317"),
            ("enable_json_logging", "true"),
            ("log_level", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.meals_table_name, "TestMeals");
        assert_eq!(
            config.database.endpoint_url.as_deref(),
            Some("http://localhost:8000")
        );
        assert!(config.database.create_tables);
        assert_eq!(
            config.observability.otlp_endpoint.as_deref(),
            Some("http://collector:4317")
        );
        assert!(config.observability.enable_json_logging);
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_invalid_port_fails_to_load() {
        let result = Config::from_settings(&settings(&[("port", "not-a-port")]));

        match result {
            Err(ConfigError::LoadError { message }) => assert!(message.contains("server")),
            other => panic!("Expected LoadError, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_validation_rejects_shared_table() {
        let config = Config::from_settings(&settings(&[
            ("meals_table_name", "catalog"),
            ("drinks_table_name", "catalog"),
        ]))
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_zero_timeout_and_bad_endpoint() {
        let mut config = Config::from_settings(&settings(&[])).unwrap();
        config.server.request_timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::from_settings(&settings(&[])).unwrap();
        config.observability.otlp_endpoint = Some("collector:4317".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_checks_metrics_listener_and_log_level() {
        let config = Config::from_settings(&settings(&[
            ("metrics_port", "9464"),
            ("log_level", "warn"),
        ]))
        .unwrap();
        assert_eq!(config.observability.metrics_port, 9464);
        assert!(config.validate().is_ok());

        let config = Config::from_settings(&settings(&[("metrics_port", "8080")])).unwrap();
        match config.validate() {
            Err(ConfigError::ValidationError { message }) => {
                assert!(message.contains("Metrics port"))
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }

        let mut config = Config::from_settings(&settings(&[])).unwrap();
        config.observability.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_server_config_request_timeout() {
        let config = ServerConfig {
            host: "localhost".to_string(),
            port: 8080,
            request_timeout_seconds: 45,
        };

        assert_eq!(config.request_timeout(), Duration::from_secs(45));
    }

    #[tokio::test]
    async fn test_dynamodb_client_uses_region() {
        let database = DatabaseConfig {
            meals_table_name: default_meals_table(),
            drinks_table_name: default_drinks_table(),
            region: "eu-west-1".to_string(),
            endpoint_url: Some("http://localhost:8000".to_string()),
            create_tables: false,
        };

        let client = database.dynamodb_client().await;
        assert_eq!(
            client.config().region().map(|r| r.as_ref()),
            Some("eu-west-1")
        );
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::ValidationError {
            message: "Invalid configuration".to_string(),
        };
        assert_eq!(error.to_string(), "Validation error: Invalid configuration");
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_host(), "0.0.0.0");
        assert_eq!(default_port(), 8080);
        assert_eq!(default_timeout(), 30);
        assert_eq!(default_meals_table(), "menuItems");
        assert_eq!(default_drinks_table(), "drinks");
        assert_eq!(default_region(), "us-east-1");
        assert_eq!(default_service_name(), "menucatalog-rs");
        assert_eq!(default_metrics_port(), 9090);
        assert_eq!(default_log_level(), "info");
    }
}
