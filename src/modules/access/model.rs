use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use workhub_core::access::{self, AccessLevel, ModuleAccess, ModuleId};
use workhub_models::User;

/// Which path produced a user's effective access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccessSource {
    /// The user references a role
    Assigned,
    /// The user still carries a legacy role value, mapped through the migration table
    LegacyFallback,
    /// No role applies; every module is `none`
    None,
}

/// Resolved per-module access of one user.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EffectiveAccess {
    pub source: AccessSource,
    /// Role the access was read from, if any
    pub role_id: Option<String>,
    pub role_name: Option<String>,
    /// Granted modules; absent modules are `none`
    #[schema(value_type = Object)]
    pub modules: ModuleAccess,
}

impl EffectiveAccess {
    pub fn none() -> Self {
        Self {
            source: AccessSource::None,
            role_id: None,
            role_name: None,
            modules: ModuleAccess::new(),
        }
    }

    pub fn level(&self, module: ModuleId) -> AccessLevel {
        access::module_access(&self.modules, module)
    }

    pub fn allows(&self, module: ModuleId, required: AccessLevel) -> bool {
        self.level(module).satisfies(required)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: User,
    pub access: EffectiveAccess,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleLevel {
    pub module: ModuleId,
    pub label: String,
    pub level: AccessLevel,
}

/// The caller's row of the access matrix, one entry per module.
#[derive(Debug, Serialize, ToSchema)]
pub struct MyAccessResponse {
    pub source: AccessSource,
    pub role_id: Option<String>,
    pub modules: Vec<ModuleLevel>,
}

impl From<&EffectiveAccess> for MyAccessResponse {
    fn from(effective: &EffectiveAccess) -> Self {
        Self {
            source: effective.source,
            role_id: effective.role_id.clone(),
            modules: access::MODULES
                .iter()
                .map(|info| ModuleLevel {
                    module: info.id,
                    label: info.label.to_string(),
                    level: effective.level(info.id),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModuleCheckParams {
    /// Level to check against; defaults to `view`
    pub required: Option<AccessLevel>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModuleCheckResponse {
    pub module: ModuleId,
    pub level: AccessLevel,
    pub required: AccessLevel,
    pub allowed: bool,
}
