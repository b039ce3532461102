#[cfg(test)]
mod tests {
    use rocket::figment::Figment;
    use serial_test::serial;

    use crate::Error;
    use crate::config::{
        AppConfig, DEFAULT_AUTH_REALM, DEFAULT_CORS_ORIGIN, DEFAULT_DATABASE_URL, load_environment,
    };
    use crate::telemetry::parse_otlp_headers;

    const CONFIG_VARS: [&str; 3] = [
        "ROCKET_DATABASE_URL",
        "ROCKET_CORS_ALLOW_ORIGIN",
        "ROCKET_AUTH_REALM",
    ];

    #[test]
    #[serial]
    fn test_defaults_without_overrides() {
        temp_env::with_vars_unset(CONFIG_VARS, || {
            let config = AppConfig::from_figment().unwrap();
            assert_eq!(config, AppConfig::default());
            assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
            assert_eq!(config.cors_allow_origin, DEFAULT_CORS_ORIGIN);
            assert_eq!(config.auth_realm, DEFAULT_AUTH_REALM);
        });
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        temp_env::with_vars(
            [
                ("ROCKET_DATABASE_URL", Some("sqlite://school.db")),
                ("ROCKET_CORS_ALLOW_ORIGIN", Some("https://school.example")),
                ("ROCKET_AUTH_REALM", None),
            ],
            || {
                let config = AppConfig::from_figment().unwrap();
                assert_eq!(config.database_url, "sqlite://school.db");
                assert_eq!(config.cors_allow_origin, "https://school.example");
                assert_eq!(config.auth_realm, DEFAULT_AUTH_REALM);
            },
        );
    }

    #[test]
    fn test_extract_from_figment() {
        let figment = Figment::new().merge(("auth_realm", "Staff only"));
        let config = AppConfig::extract(&figment).unwrap();

        assert_eq!(config.auth_realm, "Staff only");
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn test_invalid_settings_surface_as_figment_errors() {
        let figment = Figment::new().merge(("auth_realm", vec![1, 2]));

        assert!(matches!(AppConfig::extract(&figment), Err(Error::Figment(_))));
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    #[serial]
    fn test_environment_loading_result_can_cross_awaits() {
        // Held across awaits by the launch future.
        let result = load_environment();
        assert_send(&result);
        assert!(result.is_ok());
    }

    #[test]
    fn test_otlp_header_parsing() {
        let metadata = parse_otlp_headers("X-Api-Key=abc123, tenant = school ,broken,=empty");

        assert_eq!(
            metadata.get("x-api-key").and_then(|v| v.to_str().ok()),
            Some("abc123")
        );
        assert_eq!(
            metadata.get("tenant").and_then(|v| v.to_str().ok()),
            Some("school")
        );
        assert_eq!(metadata.len(), 2);
    }
}
