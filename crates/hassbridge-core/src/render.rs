// ── List rendering ──
//
// Turns the store's entity list into display rows and maps a row back
// to the change request it triggers. Rendering never mutates entities.

use serde::Serialize;

use crate::model::{Entity, EntityId, EntityStatus};
use crate::protocol::Message;

/// One display row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub id: EntityId,
    pub title: String,
    pub subtitle: String,
    /// Category label, present only on the first row of each category.
    pub category: Option<String>,
    pub executable: bool,
}

/// Result of tapping a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Reveal { index: usize, id: EntityId },
    Conceal { index: usize },
}

/// Build rows in list order, labelling each category once.
pub fn rows(entities: &[Entity]) -> Vec<Row> {
    let mut seen: Vec<&str> = Vec::new();
    entities
        .iter()
        .map(|entity| {
            let category = entity.category();
            let label = if seen.contains(&category) {
                None
            } else {
                seen.push(category);
                Some(category.to_owned())
            };
            Row {
                id: entity.id.clone(),
                title: entity.name.clone(),
                subtitle: subtitle(entity),
                category: label,
                executable: entity.executable,
            }
        })
        .collect()
}

fn subtitle(entity: &Entity) -> String {
    match entity.status() {
        EntityStatus::Executable => "tap to run".to_owned(),
        EntityStatus::Stateful(state) => state.to_owned(),
    }
}

#[derive(Debug, Default)]
pub struct Renderer {
    rows: Vec<Row>,
    revealed: Option<usize>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild rows from `entities`. A reveal survives if its row still exists.
    pub fn render(&mut self, entities: &[Entity]) -> &[Row] {
        let revealed_id = self.revealed_id().cloned();
        self.rows = rows(entities);
        self.revealed = revealed_id.and_then(|id| self.rows.iter().position(|r| r.id == id));
        &self.rows
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Tap a row: reveal it, or conceal it if it was already revealed.
    pub fn select(&mut self, index: usize) -> Option<Selection> {
        let row = self.rows.get(index)?;
        if self.revealed == Some(index) {
            self.revealed = None;
            return Some(Selection::Conceal { index });
        }
        self.revealed = Some(index);
        Some(Selection::Reveal {
            index,
            id: row.id.clone(),
        })
    }

    pub fn revealed(&self) -> Option<usize> {
        self.revealed
    }

    fn revealed_id(&self) -> Option<&EntityId> {
        self.revealed
            .and_then(|i| self.rows.get(i))
            .map(|row| &row.id)
    }

    /// The change request a tap on `entity` sends.
    ///
    /// Executables always ask for `turn_on`; the gateway substitutes the
    /// domain's own action.
    pub fn action_for(entity: &Entity) -> Message {
        Message::ChangeRequest {
            id: entity.id.clone(),
            action: toggle_action(entity).to_owned(),
        }
    }
}

fn toggle_action(entity: &Entity) -> &'static str {
    if entity.executable {
        return "turn_on";
    }
    match (entity.domain.as_str(), entity.state.as_str()) {
        ("cover", "open" | "opening") => "close_cover",
        ("cover", _) => "open_cover",
        ("lock", "locked") => "unlock",
        ("lock", _) => "lock",
        (_, "on") => "turn_off",
        _ => "turn_on",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entity(id: &str, state: &str) -> Entity {
        Entity::new(id.into(), None, state)
    }

    fn action(entity: &Entity) -> String {
        match Renderer::action_for(entity) {
            Message::ChangeRequest { action, .. } => action,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn category_label_only_on_first_of_each() {
        let list = [
            entity("light.a", "on"),
            entity("light.b", "off"),
            entity("switch.c", "off"),
        ];
        let labels: Vec<_> = rows(&list).into_iter().map(|r| r.category).collect();
        assert_eq!(labels, vec![Some("light".to_owned()), None, Some("switch".to_owned())]);
    }

    #[test]
    fn label_follows_list_order_not_grouping() {
        let list = [
            entity("light.a", "on"),
            entity("switch.b", "off"),
            entity("light.c", "off"),
        ];
        let labels: Vec<_> = rows(&list).into_iter().map(|r| r.category).collect();
        assert_eq!(labels, vec![Some("light".to_owned()), Some("switch".to_owned()), None]);
    }

    #[test]
    fn executable_rows_hide_state() {
        let list = [Entity::new("button.bell".into(), Some("Bell".into()), "executable")];
        let row = &rows(&list)[0];
        assert!(row.executable);
        assert_eq!(row.title, "Bell");
        assert_eq!(row.subtitle, "tap to run");
    }

    #[test]
    fn select_toggles_reveal_without_touching_rows() {
        let mut renderer = Renderer::new();
        let list = [entity("light.a", "on"), entity("light.b", "off")];
        renderer.render(&list);
        let before = renderer.rows().to_vec();

        assert_eq!(
            renderer.select(1),
            Some(Selection::Reveal {
                index: 1,
                id: "light.b".into()
            })
        );
        assert_eq!(renderer.select(1), Some(Selection::Conceal { index: 1 }));
        assert_eq!(renderer.select(9), None);
        assert_eq!(renderer.rows(), before.as_slice());
    }

    #[test]
    fn reveal_follows_entity_across_renders() {
        let mut renderer = Renderer::new();
        renderer.render(&[entity("light.b", "off")]);
        renderer.select(0);

        renderer.render(&[entity("light.a", "on"), entity("light.b", "off")]);
        assert_eq!(renderer.revealed(), Some(1));

        renderer.render(&[entity("light.a", "on")]);
        assert_eq!(renderer.revealed(), None);
    }

    #[test]
    fn actions_toggle_by_domain_and_state() {
        assert_eq!(action(&entity("switch.lamp", "on")), "turn_off");
        assert_eq!(action(&entity("switch.lamp", "off")), "turn_on");
        assert_eq!(action(&entity("light.a", "unavailable")), "turn_on");
        assert_eq!(action(&entity("cover.blinds", "open")), "close_cover");
        assert_eq!(action(&entity("cover.blinds", "closed")), "open_cover");
        assert_eq!(action(&entity("lock.door", "locked")), "unlock");
        assert_eq!(action(&entity("lock.door", "unlocked")), "lock");
        assert_eq!(action(&entity("script.morning", "executable")), "turn_on");
    }
}
