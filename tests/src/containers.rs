//! ClickHouse server for store tests: a throwaway container, or an existing
//! server when `DASHBOARD_TEST_CLICKHOUSE_URL` is set.

use clickhouse_client::ClickHouseConfig;
use std::time::{Duration, Instant};
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

const HTTP_PORT: u16 = 8123;
const TEST_DATABASE: &str = "dashboard_test";

/// Running server plus the config that reaches it. The container, if any,
/// stops when this is dropped.
pub struct ClickHouseServer {
    _container: Option<ContainerAsync<GenericImage>>,
    pub config: ClickHouseConfig,
}

impl ClickHouseServer {
    pub async fn start() -> Self {
        let external = std::env::var("DASHBOARD_TEST_CLICKHOUSE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        match external {
            Some(url) => Self {
                _container: None,
                config: external_config(url),
            },
            None => {
                let (container, url) = start_container().await;
                let mut config = ClickHouseConfig::default()
                    .with_url(url)
                    .with_database(TEST_DATABASE);
                config.username = Some("default".to_string());
                Self {
                    _container: Some(container),
                    config,
                }
            }
        }
    }
}

fn external_config(url: String) -> ClickHouseConfig {
    let database =
        std::env::var("DASHBOARD_TEST_CLICKHOUSE_DB").unwrap_or_else(|_| TEST_DATABASE.into());
    let mut config = ClickHouseConfig::default()
        .with_url(url)
        .with_database(database);
    config.username = std::env::var("DASHBOARD_TEST_CLICKHOUSE_USER").ok();
    config.password = std::env::var("DASHBOARD_TEST_CLICKHOUSE_PASSWORD").ok();
    config
}

async fn start_container() -> (ContainerAsync<GenericImage>, String) {
    // Lightweight DELETE needs 23.3+
    let container = GenericImage::new("clickhouse/clickhouse-server", "24.3")
        .with_wait_for(WaitFor::seconds(5))
        .with_exposed_port(HTTP_PORT.tcp())
        .with_env_var("CLICKHOUSE_DEFAULT_ACCESS_MANAGEMENT", "1")
        .with_env_var("CLICKHOUSE_USER", "default")
        .with_env_var("CLICKHOUSE_PASSWORD", "")
        .start()
        .await
        .expect("Failed to start ClickHouse");

    let port = container
        .get_host_port_ipv4(HTTP_PORT)
        .await
        .expect("ClickHouse port not mapped");
    let url = format!("http://127.0.0.1:{}", port);

    wait_for_ping(&url, Duration::from_secs(30)).await;
    (container, url)
}

/// Polls the `/ping` endpoint until the server answers.
async fn wait_for_ping(url: &str, timeout: Duration) {
    let client = reqwest::Client::new();
    let ping = format!("{}/ping", url);
    let deadline = Instant::now() + timeout;

    while Instant::now() < deadline {
        let ready = client
            .get(&ping)
            .send()
            .await
            .is_ok_and(|resp| resp.status().is_success());
        if ready {
            return;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    panic!("ClickHouse at {} not ready after {:?}", url, timeout);
}
