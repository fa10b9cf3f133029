use std::io::Write;
use std::time::Duration;

use stockwire::{Config, StockwireBuilder, StockwireError};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn loads_explicit_file() {
    let file = write_config(
        r#"
        [cache]
        capacity = 50
        ttl_secs = 30

        [retry]
        max_attempts = 5
        backoff_factor_ms = 250
        max_delay_secs = 4

        [pool]
        max_workers = 3

        [provider]
        base_url = "http://127.0.0.1:9999"
        timeout_secs = 2

        [backend]
        url = "http://news.local"
        "#,
    );

    let config = Config::load_from_file(file.path()).unwrap();

    assert_eq!(config.cache.capacity, 50);
    assert_eq!(config.cache.ttl_secs, 30);
    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.pool.max_workers, 3);
    assert_eq!(config.provider_timeout(), Duration::from_secs(2));
    assert_eq!(config.backend.url.as_deref(), Some("http://news.local"));
    assert_eq!(config.backend_timeout(), Duration::from_secs(10));
    assert_eq!(config.logging.level, "info");
}

#[test]
fn invalid_toml_is_a_configuration_error() {
    let file = write_config("[cache\ncapacity = ");
    let err = Config::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, StockwireError::Configuration(_)));
}

#[test]
fn load_validates_limits() {
    let file = write_config("[pool]\nmax_workers = 0\n");
    let err = Config::load(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("max_workers"));
}

#[test]
fn builder_from_config_applies_sections() {
    let file = write_config(
        r#"
        [cache]
        capacity = 7
        ttl_secs = 15

        [pool]
        max_workers = 4
        "#,
    );
    let config = Config::load_from_file(file.path()).unwrap();

    let gateway = StockwireBuilder::from_config(&config).unwrap().build().unwrap();

    assert_eq!(gateway.cache().capacity(), 7);
    assert_eq!(gateway.cache().ttl(), Duration::from_secs(15));
    assert_eq!(gateway.max_workers(), 4);

    let health = gateway.health();
    assert_eq!(health.config.max_workers, 4);
    assert_eq!(health.config.cache_ttl_secs, 15);
}
