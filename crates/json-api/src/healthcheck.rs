//! Liveness check for the load balancer.

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{extensions::*, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `ok` while the process is serving
    pub status: String,

    /// Document store behind the ledger, `memory` or `postgres`
    pub store: String,
}

/// Report that the API is up and which document store it writes to.
#[endpoint(tags("health"), summary = "Health check")]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<HealthResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    Ok(Json(HealthResponse {
        status: "ok".to_owned(),
        store: state.app.store_kind.as_str().to_owned(),
    }))
}
