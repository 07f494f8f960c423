//! Statistics module: system telemetry over HTTP and the heartbeat.
//!
//! Contributes `GET /api/stats`, `/api/stats/load`, `/api/stats/memory`,
//! and a heartbeat provider that writes `cpu` and `memory` into every
//! tick's sample.

use std::sync::{Arc, Mutex, PoisonError};

use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use sysinfo::{Networks, System};

use crate::domain::{HeartbeatSample, HttpVerb, ProviderError};
use crate::registry::{HandlerSpec, Route, RouteHandler, ServerModule};

/// Shared sampler behind the module's routes and heartbeat provider.
struct Sampler {
    system: Mutex<System>,
}

impl Sampler {
    fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }

    fn memory(&self) -> Value {
        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        system.refresh_memory();
        let total = system.total_memory();
        let used = system.used_memory();
        let percent = if total == 0 {
            0.0
        } else {
            used as f64 / total as f64
        };
        json!({
            "used": used,
            "total": total,
            "usagePercent": percent,
        })
    }

    fn cpu(&self) -> Value {
        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        system.refresh_cpu_usage();
        // cpu_usage() is a percentage over all cores; reported as a 0..1
        // fraction like the rest of the usagePercent fields
        let percent = system.global_cpu_info().cpu_usage() as f64 / 100.0;
        json!({ "usagePercent": percent })
    }

    fn load(&self) -> Value {
        let load = System::load_average();
        json!([load.one, load.five, load.fifteen])
    }

    fn network(&self) -> Value {
        let networks = Networks::new_with_refreshed_list();
        let mut interfaces = serde_json::Map::new();
        for (name, data) in &networks {
            interfaces.insert(
                name.clone(),
                json!({
                    "mac": data.mac_address().to_string(),
                    "received": data.total_received(),
                    "transmitted": data.total_transmitted(),
                }),
            );
        }
        Value::Object(interfaces)
    }

    fn stats(&self) -> Value {
        json!({
            "uptime": System::uptime(),
            "memory": self.memory(),
            "load": self.load(),
            "network": self.network(),
            "hostname": System::host_name(),
        })
    }
}

/// The Statistics server module unit.
pub struct Statistics {
    sampler: Arc<Sampler>,
}

impl Statistics {
    pub fn new() -> Self {
        Self {
            sampler: Arc::new(Sampler::new()),
        }
    }
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}

fn timed_body(body: Value) -> Value {
    json!({
        "status": 0,
        "time": Utc::now().timestamp_millis(),
        "body": body,
    })
}

impl ServerModule for Statistics {
    fn routes(&self) -> Vec<Route> {
        let load_sampler = self.sampler.clone();
        let memory_sampler = self.sampler.clone();
        vec![
            Route {
                method: HttpVerb::Get,
                path: "/api/stats".to_string(),
                handler: HandlerSpec::named("getStats"),
            },
            Route {
                method: HttpVerb::Get,
                path: "/api/stats/load".to_string(),
                handler: HandlerSpec::handler(move |_req| {
                    let sampler = load_sampler.clone();
                    async move { Json(timed_body(sampler.cpu())).into_response() }
                }),
            },
            Route {
                method: HttpVerb::Get,
                path: "/api/stats/memory".to_string(),
                handler: HandlerSpec::handler(move |_req| {
                    let sampler = memory_sampler.clone();
                    async move { Json(timed_body(sampler.memory())).into_response() }
                }),
            },
        ]
    }

    fn named_handler(&self, name: &str) -> Option<RouteHandler> {
        match name {
            "getStats" => {
                let sampler = self.sampler.clone();
                Some(RouteHandler::new(move |_req| {
                    let sampler = sampler.clone();
                    async move {
                        Json(json!({"status": 0, "body": sampler.stats()})).into_response()
                    }
                }))
            }
            _ => None,
        }
    }

    fn has_heartbeat(&self) -> bool {
        true
    }

    fn heartbeat(&self, beat: &mut HeartbeatSample) -> Result<(), ProviderError> {
        beat.set("cpu", self.sampler.cpu());
        beat.set("memory", self.sampler.memory());
        Ok(())
    }
}
