//! HTTP surface: the latest reading plus host temperatures as JSON.
//!
//! Handlers only ever take a store snapshot; the serial port belongs to the
//! poll supervisor.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::net::SocketAddr;

use crate::error::{AppError, AppResult};
use crate::store::{ReadingStore, Status, METRIC_NAME};
use crate::thermal::{Temperatures, ThermalProbe, ERROR_KEY};

#[derive(Debug, Clone)]
pub struct RestContext {
    pub store: ReadingStore,
    pub thermal: ThermalProbe,
}

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct ReadingResponse {
    pub metric: &'static str,
    pub value: u32,
    pub status: Status,
    pub temp: Temperatures,
}

pub fn build_router(ctx: RestContext) -> Router {
    Router::new()
        .route("/", get(current_reading))
        .route("/health", get(health))
        .with_state(ctx)
}

/// Resolve the listen address. Accepts IP literals (bracketed or bare IPv6
/// included) and host names.
pub async fn resolve_bind_addr(host: &str, port: u16) -> AppResult<SocketAddr> {
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    let invalid = |detail: String| AppError::InvalidAddress(format!("{host} port {port}: {detail}"));

    tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| invalid(e.to_string()))?
        .next()
        .ok_or_else(|| invalid("no addresses".into()))
}

async fn health() -> &'static str {
    "ok"
}

async fn current_reading(State(ctx): State<RestContext>) -> Json<ReadingResponse> {
    let reading = ctx.store.snapshot();

    let probe = ctx.thermal.clone();
    let temp = tokio::task::spawn_blocking(move || probe.temperatures())
        .await
        .unwrap_or_else(|_| Temperatures::from([(ERROR_KEY.to_string(), -1.0)]));

    Json(ReadingResponse {
        metric: METRIC_NAME,
        value: reading.value(),
        status: reading.status(),
        temp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    #[tokio::test]
    async fn test_bind_addr_ipv4() {
        let addr = resolve_bind_addr("0.0.0.0", 8080).await.unwrap();
        assert_eq!(addr, SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080));
    }

    #[tokio::test]
    async fn test_bind_addr_bare_ipv6() {
        let addr = resolve_bind_addr("::", 8080).await.unwrap();
        assert_eq!(addr, SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 8080));

        let addr = resolve_bind_addr("::1", 9000).await.unwrap();
        assert_eq!(addr, SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 9000));
    }

    #[tokio::test]
    async fn test_bind_addr_bracketed_ipv6() {
        let addr = resolve_bind_addr("[::1]", 9000).await.unwrap();
        assert_eq!(addr, SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 9000));
    }
}
