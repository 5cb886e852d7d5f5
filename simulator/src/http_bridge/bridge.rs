use crate::http_bridge::model::{BridgeModel, TickRequest};
use anyhow::Context;
use hazardcore::interface::{InboundEvent, OutboundEvent};
use hazardcore::prelude::SensorCore;
use log::{debug, info};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use warp::Filter;

pub type SharedCore = Arc<Mutex<SensorCore>>;
pub type SharedModel = Arc<RwLock<BridgeModel>>;

pub fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

fn lock_core(core: &SharedCore) -> MutexGuard<'_, SensorCore> {
    core.lock().unwrap_or_else(PoisonError::into_inner)
}

fn record(model: &SharedModel, time: f64, events: &[OutboundEvent]) {
    model
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .record(time, events);
}

/// `GET /status`, `GET /outbound`, `POST /event` and `POST /tick`.
pub fn routes(
    core: SharedCore,
    model: SharedModel,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let core_filter = warp::any().map(move || core.clone());
    let model_filter = warp::any().map(move || model.clone());

    let status_route = warp::path("status")
        .and(warp::path::end())
        .and(warp::get())
        .and(core_filter.clone())
        .map(|core: SharedCore| warp::reply::json(&lock_core(&core).status()));

    let outbound_route = warp::path("outbound")
        .and(warp::path::end())
        .and(warp::get())
        .and(model_filter.clone())
        .map(|model: SharedModel| {
            let snapshot = model
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            warp::reply::json(&snapshot)
        });

    let event_route = warp::path("event")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(core_filter.clone())
        .and(model_filter.clone())
        .map(|event: InboundEvent, core: SharedCore, model: SharedModel| {
            let kind = event.name();
            let (now, events) = {
                let mut guard = lock_core(&core);
                let events = guard.handle_event(event);
                (guard.now(), events)
            };
            debug!("{} -> {} outbound events", kind, events.len());
            record(&model, now, &events);
            warp::reply::json(&events)
        });

    let tick_route = warp::path("tick")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(core_filter)
        .and(model_filter)
        .map(|tick: TickRequest, core: SharedCore, model: SharedModel| {
            let events = lock_core(&core).tick(tick.now);
            record(&model, tick.now, &events);
            warp::reply::json(&events)
        });

    status_route
        .or(outbound_route)
        .or(event_route)
        .or(tick_route)
}

/// HTTP front end for a sensor core shared with the host process.
pub struct HttpBridge {
    core: SharedCore,
    model: SharedModel,
}

impl HttpBridge {
    pub fn new(core: SensorCore) -> Self {
        Self {
            core: Arc::new(Mutex::new(core)),
            model: Arc::new(RwLock::new(BridgeModel::new())),
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        routes(self.core.clone(), self.model.clone())
    }

    /// Serves until `shutdown` resolves.
    pub async fn serve<S>(&self, addr: SocketAddr, shutdown: S) -> anyhow::Result<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let (bound, server) = warp::serve(self.routes())
            .try_bind_with_graceful_shutdown(addr, shutdown)
            .with_context(|| format!("binding HTTP bridge to {}", addr))?;
        info!("HTTP bridge listening on {}", bound);
        server.await;
        info!("HTTP bridge stopped");
        Ok(())
    }

    /// Seeds the outbound view with events produced outside the bridge,
    /// such as an offline run.
    pub fn publish(&self, time: f64, events: &[OutboundEvent]) {
        record(&self.model, time, events);
        info!(
            "published {} events, {} detections so far",
            events.len(),
            self.snapshot().detection_count
        );
    }

    pub fn snapshot(&self) -> BridgeModel {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hazardcore::interface::NodeReport;
    use hazardcore::prelude::SensorConfig;

    fn bridge() -> HttpBridge {
        let config = SensorConfig {
            seed_random: false,
            seed: 3,
            sensor_configs: vec!["width=20,exp=2,class=0.9".into()],
            hazards: vec!["x=0,y=2,type=hazard,label=mine".into()],
            ..Default::default()
        };
        HttpBridge::new(SensorCore::from_config(&config))
    }

    async fn post(
        bridge: &HttpBridge,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Vec<OutboundEvent> {
        let response = warp::test::request()
            .method("POST")
            .path(path)
            .json(body)
            .reply(&bridge.routes())
            .await;
        assert_eq!(response.status(), 200);
        serde_json::from_slice(response.body()).unwrap()
    }

    #[tokio::test]
    async fn status_route_reports_snapshot() {
        let bridge = bridge();
        let filter = bridge.routes();
        let response = warp::test::request()
            .method("GET")
            .path("/status")
            .reply(&filter)
            .await;
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["hazard_count"], 1);
        assert_eq!(body["operating_points"][0]["width"], 20.0);
    }

    #[tokio::test]
    async fn event_route_drives_the_core() {
        let bridge = bridge();

        let summary = post(&bridge, "/tick", &TickRequest { now: 1.0 }).await;
        assert!(matches!(
            summary.as_slice(),
            [OutboundEvent::OptionsSummary { .. }]
        ));

        let configure = InboundEvent::ConfigRequest {
            source: "alpha".into(),
            vname: "alpha".into(),
            width: 20.0,
            pd: 1.0,
        };
        let ack = post(&bridge, "/event", &configure).await;
        assert!(matches!(ack.as_slice(), [OutboundEvent::ConfigAck(_)]));

        let position = InboundEvent::PositionUpdate(NodeReport {
            name: "alpha".into(),
            x: 0.0,
            y: 0.0,
            heading: 0.0,
            timestamp: 1.0,
        });
        assert!(post(&bridge, "/event", &position).await.is_empty());

        let sweep = InboundEvent::SensorRequest {
            vname: "alpha".into(),
        };
        let detections = post(&bridge, "/event", &sweep).await;
        assert_eq!(detections.len(), 2);

        let snapshot = bridge.snapshot();
        assert_eq!(snapshot.detection_count, 1);
        assert_eq!(snapshot.time, 1.0);
    }

    #[tokio::test]
    async fn malformed_event_is_rejected() {
        let bridge = bridge();
        let response = warp::test::request()
            .method("POST")
            .path("/event")
            .header("content-type", "application/json")
            .body("{\"event\":\"launch\"}")
            .reply(&bridge.routes())
            .await;
        assert_eq!(response.status(), 400);
    }

    #[test]
    fn publish_updates_outbound_view() {
        let bridge = bridge();
        bridge.publish(
            5.0,
            &[OutboundEvent::OptionsSummary {
                summary: "width=20,exp=2,class=0.9".into(),
            }],
        );
        let snapshot = bridge.snapshot();
        assert_eq!(snapshot.time, 5.0);
        assert_eq!(snapshot.last_events.len(), 1);
        assert_eq!(snapshot.detection_count, 0);
    }
}
