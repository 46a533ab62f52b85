//! Access levels and the module table.
//!
//! Every role grants exactly one [`AccessLevel`] per [`ModuleId`]. Levels are
//! totally ordered by their position in [`AccessLevel::ORDER`]; a level satisfies
//! a requirement when it sits at or after the required level.
//!
//! # Example
//!
//! ```ignore
//! use workhub_core::access::{AccessLevel, ModuleAccess, ModuleId, module_access};
//!
//! let mut modules = ModuleAccess::new();
//! modules.insert(ModuleId::Tasks, AccessLevel::Edit);
//!
//! assert_eq!(module_access(&modules, ModuleId::Tasks), AccessLevel::Edit);
//! assert_eq!(module_access(&modules, ModuleId::Roles), AccessLevel::None);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Level of access a role grants on a module.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    #[default]
    None,
    View,
    Edit,
    Admin,
}

impl AccessLevel {
    /// Fixed ordering used for every comparison.
    pub const ORDER: [AccessLevel; 4] = [
        AccessLevel::None,
        AccessLevel::View,
        AccessLevel::Edit,
        AccessLevel::Admin,
    ];

    /// Position of this level in [`AccessLevel::ORDER`].
    pub fn rank(self) -> usize {
        Self::ORDER
            .iter()
            .position(|level| *level == self)
            .unwrap_or(0)
    }

    /// Returns true if this level is at least `required`.
    pub fn satisfies(self, required: AccessLevel) -> bool {
        self.rank() >= required.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::None => "none",
            AccessLevel::View => "view",
            AccessLevel::Edit => "edit",
            AccessLevel::Admin => "admin",
        }
    }
}

impl PartialOrd for AccessLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AccessLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ORDER
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| format!("Unknown access level: {}", s))
    }
}

/// Returns true if `level` grants at least `required`.
pub fn has_access(level: AccessLevel, required: AccessLevel) -> bool {
    level.satisfies(required)
}

/// Feature area of the application an access level is granted on.
///
/// The set is closed; new modules require a code change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ModuleId {
    Dashboard,
    Tasks,
    Boards,
    Sprints,
    News,
    Learning,
    Feedback,
    Users,
    Roles,
    Analytics,
    Settings,
}

/// Static description of a module, served to the matrix editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    pub id: ModuleId,
    pub label: &'static str,
    pub description: &'static str,
}

pub const MODULES: [ModuleInfo; 11] = [
    ModuleInfo {
        id: ModuleId::Dashboard,
        label: "Dashboard",
        description: "Personal overview and activity summary",
    },
    ModuleInfo {
        id: ModuleId::Tasks,
        label: "Tasks",
        description: "Task creation, assignment and tracking",
    },
    ModuleInfo {
        id: ModuleId::Boards,
        label: "Boards",
        description: "Kanban boards and columns",
    },
    ModuleInfo {
        id: ModuleId::Sprints,
        label: "Sprints",
        description: "Sprint planning and review",
    },
    ModuleInfo {
        id: ModuleId::News,
        label: "News",
        description: "News feed, announcements and polls",
    },
    ModuleInfo {
        id: ModuleId::Learning,
        label: "Learning",
        description: "Courses, lessons and practice assignments",
    },
    ModuleInfo {
        id: ModuleId::Feedback,
        label: "Feedback",
        description: "Feedback submissions and responses",
    },
    ModuleInfo {
        id: ModuleId::Users,
        label: "Users",
        description: "User directory and role assignment",
    },
    ModuleInfo {
        id: ModuleId::Roles,
        label: "Roles",
        description: "Role definitions and the access matrix",
    },
    ModuleInfo {
        id: ModuleId::Analytics,
        label: "Analytics",
        description: "Reports and usage statistics",
    },
    ModuleInfo {
        id: ModuleId::Settings,
        label: "Settings",
        description: "Workspace-wide configuration",
    },
];

impl ModuleId {
    pub fn all() -> impl Iterator<Item = ModuleId> {
        MODULES.iter().map(|info| info.id)
    }

    pub fn info(self) -> &'static ModuleInfo {
        MODULES
            .iter()
            .find(|info| info.id == self)
            .unwrap_or(&MODULES[0])
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModuleId::Dashboard => "dashboard",
            ModuleId::Tasks => "tasks",
            ModuleId::Boards => "boards",
            ModuleId::Sprints => "sprints",
            ModuleId::News => "news",
            ModuleId::Learning => "learning",
            ModuleId::Feedback => "feedback",
            ModuleId::Users => "users",
            ModuleId::Roles => "roles",
            ModuleId::Analytics => "analytics",
            ModuleId::Settings => "settings",
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleId::all()
            .find(|module| module.as_str() == s)
            .ok_or_else(|| format!("Unknown module: {}", s))
    }
}

/// Per-module levels granted by a role. Absent entries mean [`AccessLevel::None`].
pub type ModuleAccess = BTreeMap<ModuleId, AccessLevel>;

/// Looks up the level for `module`, defaulting to [`AccessLevel::None`].
pub fn module_access(modules: &ModuleAccess, module: ModuleId) -> AccessLevel {
    modules.get(&module).copied().unwrap_or_default()
}

/// Drops `none` entries so stored maps only list granted modules.
pub fn normalize_modules(modules: ModuleAccess) -> ModuleAccess {
    modules
        .into_iter()
        .filter(|(_, level)| *level != AccessLevel::None)
        .collect()
}

/// Builds a map granting `level` on every module.
pub fn uniform_access(level: AccessLevel) -> ModuleAccess {
    normalize_modules(ModuleId::all().map(|module| (module, level)).collect())
}
