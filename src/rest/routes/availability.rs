// rest/routes/availability.rs — port availability between two pops.
//
// Four upstream calls fan out concurrently (availability + zones, per pop)
// and join all-or-nothing: a single failure fails the whole operation so the
// UI never renders a partial comparison.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use crate::upstream::PortAvailability;
use crate::AppContext;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct AvailabilityRequest {
    pub from_pop: String,
    pub to_pop: String,
}

#[derive(Serialize)]
pub struct PopAvailability {
    pub pop: String,
    pub availability: Vec<PortAvailability>,
    pub zones: Vec<String>,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub from: PopAvailability,
    pub to: PopAvailability,
}

pub async fn availability(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<AvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, (StatusCode, Json<Value>)> {
    if body.from_pop.trim().is_empty() || body.to_pop.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "from_pop and to_pop are required" })),
        ));
    }

    let Some(api_key) = ctx.config.api_key.as_deref() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "Provisioning API key is not configured" })),
        ));
    };

    let upstream = &ctx.upstream;
    let joined = tokio::try_join!(
        upstream.port_availability(api_key, &body.from_pop),
        upstream.zones(api_key, &body.from_pop),
        upstream.port_availability(api_key, &body.to_pop),
        upstream.zones(api_key, &body.to_pop),
    );

    match joined {
        Ok((from_availability, from_zones, to_availability, to_zones)) => {
            Ok(Json(AvailabilityResponse {
                from: PopAvailability {
                    pop: body.from_pop,
                    availability: from_availability,
                    zones: from_zones,
                },
                to: PopAvailability {
                    pop: body.to_pop,
                    availability: to_availability,
                    zones: to_zones,
                },
            }))
        }
        Err(e) => {
            error!(err = %e, "availability fan-out failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch availability data from upstream" })),
            ))
        }
    }
}
