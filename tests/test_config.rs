use relay::config::{CONFIG_PATH_ENV, Config, LISTEN_ENV};
use std::sync::Mutex;

// Tests touching process environment must not interleave.
static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn test_config_default_address() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    unsafe {
        std::env::remove_var(LISTEN_ENV);
        std::env::remove_var(CONFIG_PATH_ENV);
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.listen_addr, "127.0.0.1:8081");
    assert_eq!(cfg.server.read_chunk_size, 1024);
    assert_eq!(cfg.server.max_request_bytes, 1024 * 1024);
}

#[test]
fn test_config_custom_address_from_env() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    unsafe {
        std::env::remove_var(CONFIG_PATH_ENV);
        std::env::set_var(LISTEN_ENV, "0.0.0.0:3000");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.listen_addr, "0.0.0.0:3000");
    unsafe {
        std::env::remove_var(LISTEN_ENV);
    }
}

#[test]
fn test_config_from_yaml_file_with_env_override() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let path = std::env::temp_dir().join(format!("relay-config-{}.yaml", std::process::id()));
    std::fs::write(
        &path,
        "server:\n  listen_addr: 127.0.0.1:9000\n  read_chunk_size: 64\n",
    )
    .unwrap();

    unsafe {
        std::env::set_var(CONFIG_PATH_ENV, &path);
        std::env::remove_var(LISTEN_ENV);
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.listen_addr, "127.0.0.1:9000");
    assert_eq!(cfg.server.read_chunk_size, 64);
    assert_eq!(cfg.server.max_request_bytes, 1024 * 1024);

    unsafe {
        std::env::set_var(LISTEN_ENV, "127.0.0.1:9001");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.listen_addr, "127.0.0.1:9001");

    unsafe {
        std::env::remove_var(CONFIG_PATH_ENV);
        std::env::remove_var(LISTEN_ENV);
    }
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_config_missing_file_is_an_error() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    unsafe {
        std::env::set_var(CONFIG_PATH_ENV, "/definitely/not/here/relay.yaml");
    }
    let result = Config::load();
    unsafe {
        std::env::remove_var(CONFIG_PATH_ENV);
    }
    assert!(result.is_err());
}

#[test]
fn test_config_yaml_partial_sections_use_defaults() {
    let cfg = Config::from_yaml_str("server:\n  max_request_bytes: 2048\n").unwrap();
    assert_eq!(cfg.server.listen_addr, "127.0.0.1:8081");
    assert_eq!(cfg.server.max_request_bytes, 2048);

    let cfg = Config::from_yaml_str("{}").unwrap();
    assert_eq!(cfg.server.read_chunk_size, 1024);
}

#[test]
fn test_config_rejects_zero_limits() {
    assert!(Config::from_yaml_str("server:\n  read_chunk_size: 0\n").is_err());
    assert!(Config::from_yaml_str("server:\n  max_request_bytes: 0\n").is_err());
}

#[test]
fn test_config_limits() {
    let cfg = Config::from_yaml_str("server:\n  read_chunk_size: 16\n  max_request_bytes: 100\n")
        .unwrap();
    let limits = cfg.limits();
    assert_eq!(limits.read_chunk_size, 16);
    assert_eq!(limits.max_request_bytes, 100);
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1.server.listen_addr, cfg2.server.listen_addr);
}

#[test]
fn test_config_file_with_zero_limit_fails_to_load() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let path = std::env::temp_dir().join(format!("relay-zero-{}.yaml", std::process::id()));
    std::fs::write(&path, "server:\n  read_chunk_size: 0\n").unwrap();

    unsafe {
        std::env::set_var(CONFIG_PATH_ENV, &path);
        std::env::set_var(LISTEN_ENV, "127.0.0.1:9002");
    }
    let result = Config::load();
    unsafe {
        std::env::remove_var(CONFIG_PATH_ENV);
        std::env::remove_var(LISTEN_ENV);
    }
    let _ = std::fs::remove_file(&path);

    let err = result.unwrap_err();
    assert!(err.to_string().contains("read_chunk_size"));
}
