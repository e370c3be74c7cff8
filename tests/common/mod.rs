// tests/common/mod.rs
#![allow(dead_code)]

use distro_proxy::config::Config;
use distro_proxy::proxy::DistroProxy;
use distro_proxy::upstream::ReqwestUpstream;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use url::Url;

pub const API_PATH: &str = "/wp-json/wp/v2";

/// Config pointing both the content API and the monitor at `origin`.
pub fn config_for(origin: &str) -> Config {
    let mut config = Config::new(Url::parse(&format!("{}{}", origin, API_PATH)).unwrap());
    config.monitor_site = origin.to_string();
    config.monitor_site_url = Url::parse(origin).unwrap();
    config.content_timeout = Duration::from_millis(300);
    config.monitor_timeout = Duration::from_millis(300);
    config
}

pub fn proxy_for(config: &Config) -> DistroProxy {
    DistroProxy::new(config, Arc::new(ReqwestUpstream::new().unwrap()), None)
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Accepts connections and never answers.
pub async fn silent_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    addr
}
