//! ToolGroups und ihr prozessweiter Manager.

mod binding_resolver;
mod config;
mod tool_group;

pub use binding_resolver::{resolve, Resolution};
pub use config::{ActivationOptions, ToolConfig, ToolMode, ToolOptions};
pub use tool_group::ToolGroup;

use super::input_bus::InputEventBus;
use super::tools::ToolRegistry;
use crate::core::ViewportRef;
use crate::error::{CoordinationError, Result};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::rc::Rc;

/// Registry aller ToolGroups nach ID.
pub struct ToolGroupManager {
    groups: IndexMap<String, ToolGroup>,
    registry: Rc<ToolRegistry>,
    bus: InputEventBus,
    warn_shared_viewports: bool,
}

impl ToolGroupManager {
    pub fn new(registry: Rc<ToolRegistry>, bus: InputEventBus, warn_shared_viewports: bool) -> Self {
        Self {
            groups: IndexMap::new(),
            registry,
            bus,
            warn_shared_viewports,
        }
    }

    /// Legt eine leere ToolGroup an.
    pub fn create_tool_group(&mut self, id: &str) -> Result<&mut ToolGroup> {
        if self.groups.contains_key(id) {
            return Err(CoordinationError::DuplicateToolGroup { id: id.to_string() });
        }
        log::info!("ToolGroup '{}' erstellt", id);
        let group = ToolGroup::new(
            id,
            Rc::clone(&self.registry),
            self.bus.clone(),
            self.warn_shared_viewports,
        );
        Ok(self.groups.entry(id.to_string()).or_insert(group))
    }

    pub fn get_tool_group(&self, id: &str) -> Option<&ToolGroup> {
        self.groups.get(id)
    }

    pub fn get_tool_group_mut(&mut self, id: &str) -> Option<&mut ToolGroup> {
        self.groups.get_mut(id)
    }

    /// Wie [`ToolGroupManager::get_tool_group`], unbekannt → `UnknownToolGroup`.
    pub fn require(&self, id: &str) -> Result<&ToolGroup> {
        self.groups
            .get(id)
            .ok_or_else(|| CoordinationError::UnknownToolGroup { id: id.to_string() })
    }

    /// Löst alle Viewports (kündigt deren Abos) und verwirft die Gruppe.
    pub fn destroy_tool_group(&mut self, id: &str) -> bool {
        match self.groups.shift_remove(id) {
            Some(mut group) => {
                group.detach_all();
                log::info!("ToolGroup '{}' entfernt", id);
                true
            }
            None => false,
        }
    }

    /// Erste Gruppe, die den Viewport enthält.
    pub fn tool_group_for_viewport(&self, viewport: &ViewportRef) -> Option<&ToolGroup> {
        self.groups.values().find(|g| g.contains_viewport(viewport))
    }

    /// Alle Gruppen, die den Viewport enthalten.
    pub fn tool_groups_for_viewport(&self, viewport: &ViewportRef) -> Vec<&ToolGroup> {
        self.groups
            .values()
            .filter(|g| g.contains_viewport(viewport))
            .collect()
    }

    /// Viewports, die in mehr als einer Gruppe liegen (Konfigurationsrisiko).
    pub fn shared_viewports(&self) -> Vec<ViewportRef> {
        let mut counts: HashMap<ViewportRef, usize> = HashMap::new();
        for group in self.groups.values() {
            for viewport in group.viewports() {
                *counts.entry(viewport).or_default() += 1;
            }
        }
        let mut shared: Vec<ViewportRef> = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(viewport, _)| viewport)
            .collect();
        shared.sort();
        shared
    }

    /// Entfernt alle Gruppen.
    pub fn destroy(&mut self) {
        for (_, mut group) in self.groups.drain(..) {
            group.detach_all();
        }
        log::info!("Alle ToolGroups entfernt");
    }

    pub fn ids(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolGroup> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (ToolGroupManager, InputEventBus) {
        let bus = InputEventBus::new();
        let manager =
            ToolGroupManager::new(Rc::new(ToolRegistry::with_default_tools()), bus.clone(), true);
        (manager, bus)
    }

    #[test]
    fn test_duplicate_tool_group_is_rejected() {
        let (mut manager, _bus) = manager();
        manager.create_tool_group("CT").expect("CT sollte angelegt werden");
        assert!(matches!(
            manager.create_tool_group("CT"),
            Err(CoordinationError::DuplicateToolGroup { .. })
        ));
    }

    #[test]
    fn test_destroy_cancels_subscriptions() {
        let (mut manager, bus) = manager();
        let vp = ViewportRef::new("engine", "CT_AXIAL");
        manager
            .create_tool_group("CT")
            .expect("CT sollte angelegt werden")
            .add_viewport(vp.clone());
        assert_eq!(bus.subscribers(&vp), vec!["CT".to_string()]);

        assert!(manager.destroy_tool_group("CT"));
        assert!(!manager.destroy_tool_group("CT"));
        assert!(bus.subscribers(&vp).is_empty());
        assert!(manager.tool_group_for_viewport(&vp).is_none());
    }

    #[test]
    fn test_shared_viewports_are_reported() {
        let (mut manager, _bus) = manager();
        let shared = ViewportRef::new("engine", "FUSION");
        let only_ct = ViewportRef::new("engine", "CT_AXIAL");
        {
            let ct = manager.create_tool_group("CT").expect("CT");
            ct.add_viewport(only_ct);
            ct.add_viewport(shared.clone());
        }
        manager
            .create_tool_group("PT")
            .expect("PT")
            .add_viewport(shared.clone());

        assert_eq!(manager.shared_viewports(), vec![shared.clone()]);
        assert_eq!(
            manager.tool_group_for_viewport(&shared).map(ToolGroup::id),
            Some("CT")
        );
        assert_eq!(manager.tool_groups_for_viewport(&shared).len(), 2);
    }

    #[test]
    fn test_destroy_removes_all_groups() {
        let (mut manager, bus) = manager();
        manager
            .create_tool_group("CT")
            .expect("CT")
            .add_viewport(ViewportRef::new("engine", "CT_AXIAL"));
        manager.create_tool_group("PT").expect("PT");
        manager.destroy();
        assert!(manager.is_empty());
        assert_eq!(bus.subscription_count(), 0);
    }
}
