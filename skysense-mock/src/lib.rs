use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::settings::Settings;
use crate::state::MockState;

pub mod settings;
pub mod state;

mod error;
mod handles;
mod simulate;

pub use handles::create_router;

/// Runs the standalone mock: demo fixture, background readings and the
/// HTTP endpoint from `configs/default.toml`.
pub async fn run(settings: &Arc<Settings>) {
    let state = MockState::new(settings.simulation.clone());
    seed_demo_fixture(&state).await;

    let tick = Duration::from_secs(settings.simulation.tick_seconds);
    let ticker_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        loop {
            interval.tick().await;
            ticker_state.record_tick(OffsetDateTime::now_utc()).await;
        }
    });

    let ip_addr = settings.server.host.parse::<IpAddr>().unwrap();
    let address = SocketAddr::from((ip_addr, settings.server.port));
    let listener = TcpListener::bind(&address).await.unwrap();

    tracing::info!("listening on {:?}", address);

    axum::serve(listener, create_router(state)).await.unwrap();
}

/// One operator with three stations and a couple of hours of backfilled
/// readings, so every endpoint answers from the first request.
async fn seed_demo_fixture(state: &MockState) {
    let user = state
        .seed_user(1, "Demo Operator", "demo@skysense.dev", "password")
        .await;

    state
        .seed_station(1, user.id, "Harbor Station", Some((-6.2088, 106.8456)))
        .await;
    state
        .seed_station(2, user.id, "Hillside Station", Some((-6.9175, 107.6191)))
        .await;
    state
        .seed_station(3, user.id, "Airfield Station", None)
        .await;

    let now = OffsetDateTime::now_utc();
    for step in (0..12i64).rev() {
        state
            .record_tick(now - time::Duration::minutes(step * 10))
            .await;
    }
}

/// Same telemetry API on an ephemeral port, for tests that want real HTTP
/// in front of the client.
pub struct MockServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(state: MockState) -> Self {
        let router = create_router(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
