// ── Static translation tables ──
//
// Domain → service group, domain → action override, and
// action → assumed terminal state. Built once, never mutated.

use std::collections::HashMap;
use std::sync::LazyLock;

use strum::{AsRefStr, Display, EnumIter, EnumString};

/// State reported for executables in place of whatever the server holds.
pub const EXECUTABLE_STATE: &str = "executable";

/// Service namespace shared by every executable domain.
pub const SHARED_CONTROL_GROUP: &str = "homeassistant";

/// Domains whose entities are one-shot triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ExecutableDomain {
    Script,
    Automation,
    Button,
}

impl ExecutableDomain {
    pub fn from_domain(domain: &str) -> Option<Self> {
        domain.parse().ok()
    }

    /// The only action these entities accept; replaces whatever the caller asked for.
    pub fn override_action(self) -> &'static str {
        match self {
            Self::Script => "activate",
            Self::Automation => "trigger",
            Self::Button => "press",
        }
    }
}

static SERVICE_GROUPS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("switch", "switch"),
        ("light", "light"),
        ("cover", "cover"),
        ("fan", "fan"),
        ("input_boolean", "input_boolean"),
        ("lock", "lock"),
        ("script", SHARED_CONTROL_GROUP),
        ("automation", SHARED_CONTROL_GROUP),
        ("button", SHARED_CONTROL_GROUP),
    ])
});

static FORCED_STATES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("turn_on", "on"),
        ("turn_off", "off"),
        ("open_cover", "open"),
        ("close_cover", "closed"),
        ("lock", "locked"),
        ("unlock", "unlocked"),
    ])
});

/// Remote service namespace used to act on `domain`.
pub fn service_group(domain: &str) -> Option<&'static str> {
    SERVICE_GROUPS.get(domain).copied()
}

/// Fixed action for executable domains.
pub fn action_override(domain: &str) -> Option<&'static str> {
    ExecutableDomain::from_domain(domain).map(ExecutableDomain::override_action)
}

/// The action actually sent for `requested` on `domain`.
pub fn resolve_action<'a>(domain: &str, requested: &'a str) -> &'a str {
    action_override(domain).unwrap_or(requested)
}

/// State assumed after `action` succeeds; the action name itself when unmapped.
pub fn forced_state(action: &str) -> &str {
    FORCED_STATES.get(action).copied().unwrap_or(action)
}
