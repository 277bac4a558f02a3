use crate::harvests::models::HarvestPolicy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Runtime settings a client needs to mirror the server's rules
#[derive(ToSchema, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AppInfo {
    pub app_name: String,
    pub deployment: String,
    pub harvest_policy: HarvestPolicy,
}

#[derive(ToSchema, Deserialize, Serialize)]
pub struct HealthCheck {
    pub status: String,
}
