// ── API-to-domain conversions ──
//
// Bridges raw `hassbridge_api` response types into the uniform `Entity`
// record. Executables report a fixed sentinel state.

use hassbridge_api::{ChangedState, StateObject};

use crate::model::{EXECUTABLE_STATE, Entity, EntityId};

impl From<StateObject> for Entity {
    fn from(raw: StateObject) -> Self {
        let name = raw.friendly_name().map(str::to_owned);
        let id = EntityId::new(raw.entity_id);
        let state = if id.is_executable() {
            EXECUTABLE_STATE.to_owned()
        } else {
            raw.state
        };
        Entity::new(id, name, state)
    }
}

/// Pick the server-reported state for `target` out of a service-call result.
pub(crate) fn states_for<'a>(
    changed: &'a [ChangedState],
    target: &'a EntityId,
) -> impl Iterator<Item = &'a str> + 'a {
    changed
        .iter()
        .filter(move |c| c.entity_id == target.as_str())
        .map(|c| c.state.as_str())
}
