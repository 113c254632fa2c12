use std::time::Duration;

use super::ClientConfig;

#[test]
fn test_client_config_default_values() {
    let config = ClientConfig::default();

    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, 8500);
    assert!(!config.ssl);
    assert!(config.acl_token.is_none());
    assert!(config.dc.is_none());
    assert_eq!(config.request_timeout(), None);
    assert_eq!(config.connect_timeout(), Duration::from_secs(1));
    assert!(config.user_agent.starts_with("consul-watch/"));
}

#[test]
fn test_from_uri_reads_dc_and_token() {
    let config =
        ClientConfig::from_uri("consul://consul.example.com/?dc=dc1&acl=00000000-0000-0000-0000-000000000000")
            .unwrap();

    assert_eq!(config.host, "consul.example.com");
    assert_eq!(config.port, 8500);
    assert_eq!(config.dc.as_deref(), Some("dc1"));
    assert_eq!(
        config.acl_token.as_deref(),
        Some("00000000-0000-0000-0000-000000000000")
    );
}

#[test]
fn test_from_uri_accepts_acl_token_alias_and_port() {
    let config = ClientConfig::from_uri("consul://10.0.0.7:8501/?aclToken=topsecret").unwrap();

    assert_eq!(config.host, "10.0.0.7");
    assert_eq!(config.port, 8501);
    assert!(config.dc.is_none());
    assert_eq!(config.acl_token.as_deref(), Some("topsecret"));
}

#[test]
fn test_from_uri_rejects_garbage() {
    assert!(ClientConfig::from_uri("not a uri").is_err());
}

#[test]
fn test_base_url_follows_ssl_flag() {
    let mut config = ClientConfig {
        host: "agent".into(),
        port: 8443,
        ..ClientConfig::default()
    };
    assert_eq!(config.base_url(), "http://agent:8443");

    config.ssl = true;
    assert_eq!(config.base_url(), "https://agent:8443");
}

#[test]
fn test_request_timeout_only_when_positive() {
    let config = ClientConfig {
        timeout_ms: 250,
        ..ClientConfig::default()
    };
    assert_eq!(config.request_timeout(), Some(Duration::from_millis(250)));
}

#[test]
fn test_validate_rejects_empty_host() {
    let config = ClientConfig {
        host: "  ".into(),
        ..ClientConfig::default()
    };
    assert!(config.validate().is_err());
}
