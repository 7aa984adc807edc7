use std::net::SocketAddr;

const DEFAULT_PORT: u16 = 8080;

pub fn get_default_port() -> u16 {
    DEFAULT_PORT
}

const BIND_ADDR: &str = "UPTIME_BIND_ADDR";

/// Bind address override from the environment, ignored when unparsable
pub fn get_bind_addr() -> Option<SocketAddr> {
    std::env::var(BIND_ADDR).ok().and_then(|res| res.parse().ok())
}

const API_TOKEN: &str = "UPTIME_API_TOKEN";

pub fn get_api_token() -> Option<String> {
    std::env::var(API_TOKEN).ok().filter(|token| !token.is_empty())
}
