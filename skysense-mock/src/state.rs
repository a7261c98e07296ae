use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use skysense_api::models::{DeviceMeta, DeviceStatus, Id, Reading, UserProfile, UserRole};
use skysense_api::restful::{DeviceSummary, PageCursor, RainObservation};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::settings::Simulation;
use crate::simulate;

/// One simulated weather station and everything it has reported so far,
/// oldest reading first.
#[derive(Debug, Clone)]
pub struct Station {
    pub meta: DeviceMeta,
    pub owner: Id,
    /// Offset into the diurnal curves so stations do not move in lockstep.
    pub phase: f64,
    pub readings: Vec<Reading>,
}

impl Station {
    pub fn latest_reading(&self) -> Option<&Reading> {
        self.readings.last()
    }
}

#[derive(Debug, Clone)]
struct SeededUser {
    profile: UserProfile,
    password: String,
}

#[derive(Debug, Default)]
struct Inner {
    users: Vec<SeededUser>,
    tokens: HashMap<String, Id>,
    stations: HashMap<Id, Station>,
    telemetry_requests: u64,
}

/// Shared fixture behind the handlers. Tests seed users and stations, mint
/// or revoke tokens, and push readings while the server runs.
#[derive(Debug, Clone)]
pub struct MockState {
    simulation: Arc<Simulation>,
    inner: Arc<RwLock<Inner>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self::new(Simulation::default())
    }
}

impl MockState {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            simulation: Arc::new(simulation),
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub async fn seed_user(&self, id: Id, name: &str, email: &str, password: &str) -> UserProfile {
        let profile = UserProfile {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role: UserRole::User,
        };

        let mut inner = self.inner.write().await;
        inner.users.push(SeededUser {
            profile: profile.clone(),
            password: password.to_string(),
        });

        profile
    }

    pub async fn seed_station(
        &self,
        id: Id,
        owner: Id,
        place_name: &str,
        position: Option<(f64, f64)>,
    ) {
        let meta = DeviceMeta {
            id,
            place_name: place_name.to_string(),
            status: DeviceStatus::Online,
            latitude: position.map(|(lat, _)| lat),
            longitude: position.map(|(_, lng)| lng),
        };

        let mut inner = self.inner.write().await;
        inner.stations.insert(
            id,
            Station {
                meta,
                owner,
                phase: id as f64 * 0.17,
                readings: Vec::new(),
            },
        );
    }

    pub async fn set_station_status(&self, id: Id, status: DeviceStatus) {
        if let Some(station) = self.inner.write().await.stations.get_mut(&id) {
            station.meta.status = status;
        }
    }

    pub async fn push_reading(&self, device_id: Id, reading: Reading) {
        if let Some(station) = self.inner.write().await.stations.get_mut(&device_id) {
            station.readings.push(reading);
        }
    }

    /// Appends one simulated reading per station, as the background tick
    /// does while the binary runs.
    pub async fn record_tick(&self, now: OffsetDateTime) {
        let mut inner = self.inner.write().await;
        for station in inner.stations.values_mut() {
            let reading = simulate::station_reading(&station.meta, station.phase, now);
            station.readings.push(reading);
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Option<(String, UserProfile)> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .iter()
            .find(|user| user.profile.email == email && user.password == password)?
            .profile
            .clone();

        let token = Uuid::new_v4().to_string();
        inner.tokens.insert(token.clone(), user.id);

        Some((token, user))
    }

    pub async fn authorize(&self, token: &str) -> Option<Id> {
        self.inner.read().await.tokens.get(token).copied()
    }

    /// Invalidates a minted token so tests can provoke a 401 mid-poll.
    pub async fn revoke_token(&self, token: &str) -> bool {
        self.inner.write().await.tokens.remove(token).is_some()
    }

    pub async fn devices_for(&self, user_id: Id) -> Vec<DeviceSummary> {
        let inner = self.inner.read().await;
        let mut summaries: Vec<_> = inner
            .stations
            .values()
            .filter(|station| station.owner == user_id)
            .map(|station| DeviceSummary {
                id: station.meta.id,
                place_name: station.meta.place_name.clone(),
                status: station.meta.status,
                latest_reading: station.latest_reading().cloned(),
            })
            .collect();
        summaries.sort_by_key(|summary| summary.id);

        summaries
    }

    pub async fn station(&self, device_id: Id) -> Option<Station> {
        self.inner.read().await.stations.get(&device_id).cloned()
    }

    /// Newest-first page of a station's archive. Pages past the end come
    /// back empty with the cursor echoing the requested page.
    pub async fn history_page(
        &self,
        device_id: Id,
        page: u32,
    ) -> Option<(Vec<Reading>, PageCursor)> {
        let page = page.max(1);
        let page_size = self.simulation.history_page_size;
        let inner = self.inner.read().await;
        let station = inner.stations.get(&device_id)?;

        let total = station.readings.len();
        let last_page = (total as u32).div_ceil(page_size).max(1);
        let skip = (page - 1) as usize * page_size as usize;
        let entries: Vec<_> = station
            .readings
            .iter()
            .rev()
            .skip(skip)
            .take(page_size as usize)
            .cloned()
            .collect();

        Some((
            entries,
            PageCursor {
                current_page: page,
                last_page,
                total_items: total as u64,
            },
        ))
    }

    /// Stations whose freshest reading is at rain-grade humidity, keyed by
    /// device id the way the wire format wants them.
    pub async fn rainy_conditions(&self) -> BTreeMap<String, RainObservation> {
        let inner = self.inner.read().await;
        inner
            .stations
            .values()
            .filter_map(|station| {
                let reading = station.latest_reading()?;
                (reading.humidity_pct >= 90.0).then(|| {
                    (
                        station.meta.id.to_string(),
                        RainObservation {
                            device_id: station.meta.id,
                            place_name: station.meta.place_name.clone(),
                            reading: reading.clone(),
                        },
                    )
                })
            })
            .collect()
    }

    pub async fn count_telemetry_request(&self) {
        self.inner.write().await.telemetry_requests += 1;
    }

    /// How many telemetry fetches the handlers have served; polling tests
    /// assert exact counts against this.
    pub async fn telemetry_requests(&self) -> u64 {
        self.inner.read().await.telemetry_requests
    }
}
