//! Eine ToolGroup: Viewport-Menge plus Tool-Konfigurationen mit Modus-Automat.

use super::binding_resolver::{self, Resolution};
use super::{ActivationOptions, ToolConfig, ToolMode, ToolOptions};
use crate::app::input_bus::{InputEventBus, InputSubscription};
use crate::app::tools::ToolRegistry;
use crate::core::{Binding, InputEvent, ViewportRef};
use crate::error::{CoordinationError, Result};
use indexmap::IndexMap;
use std::rc::Rc;

/// Viewport-Menge mit gemeinsamer Tool-Konfiguration.
///
/// Invariante: Höchstens ein `Active`-Tool beansprucht ein exaktes
/// `(button, modifiers)`-Binding. Ein zweites verdrängt das erste nach `Passive`.
pub struct ToolGroup {
    id: String,
    /// Viewport → Input-Abo (Drop kündigt das Abo)
    viewports: IndexMap<ViewportRef, InputSubscription>,
    /// Registrierungsreihenfolge = Tie-Break-Reihenfolge
    tools: IndexMap<String, ToolConfig>,
    registry: Rc<ToolRegistry>,
    bus: InputEventBus,
    warn_shared_viewports: bool,
}

impl ToolGroup {
    pub(crate) fn new(
        id: &str,
        registry: Rc<ToolRegistry>,
        bus: InputEventBus,
        warn_shared_viewports: bool,
    ) -> Self {
        Self {
            id: id.to_string(),
            viewports: IndexMap::new(),
            tools: IndexMap::new(),
            registry,
            bus,
            warn_shared_viewports,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    // ── Viewports ────────────────────────────────────────────────

    /// Nimmt einen Viewport auf und abonniert dessen Eingaben.
    /// Gibt `false` zurück, wenn er bereits enthalten war.
    pub fn add_viewport(&mut self, viewport: ViewportRef) -> bool {
        if self.viewports.contains_key(&viewport) {
            return false;
        }
        if self.warn_shared_viewports {
            let others = self.bus.subscribers(&viewport);
            if !others.is_empty() {
                log::warn!(
                    "Konfigurationsrisiko: {} gehört bereits zu ToolGroup(s) {:?}, jetzt auch zu '{}'",
                    viewport,
                    others,
                    self.id
                );
            }
        }
        let subscription = self.bus.subscribe(viewport.clone(), &self.id);
        self.viewports.insert(viewport, subscription);
        true
    }

    /// Entfernt einen Viewport und kündigt dessen Abo.
    /// Gibt `false` zurück, wenn er nicht enthalten war.
    pub fn remove_viewport(&mut self, viewport: &ViewportRef) -> bool {
        match self.viewports.shift_remove(viewport) {
            Some(subscription) => {
                subscription.cancel();
                true
            }
            None => false,
        }
    }

    pub fn contains_viewport(&self, viewport: &ViewportRef) -> bool {
        self.viewports.contains_key(viewport)
    }

    /// Alle Viewports in Aufnahme-Reihenfolge.
    pub fn viewports(&self) -> Vec<ViewportRef> {
        self.viewports.keys().cloned().collect()
    }

    /// Kündigt alle Abos und leert die Viewport-Menge.
    pub(crate) fn detach_all(&mut self) {
        let count = self.viewports.len();
        self.viewports.clear();
        if count > 0 {
            log::debug!("ToolGroup '{}': {} Viewports gelöst", self.id, count);
        }
    }

    // ── Tools ────────────────────────────────────────────────────

    /// Fügt ein Tool im Modus `Disabled` hinzu.
    pub fn add_tool(&mut self, name: &str, options: ToolOptions) -> Result<()> {
        self.registry.require(name)?;
        if self.tools.contains_key(name) {
            return Err(CoordinationError::DuplicateTool {
                tool_group_id: self.id.clone(),
                tool: name.to_string(),
            });
        }
        self.tools
            .insert(name.to_string(), ToolConfig::new(name, options));
        log::debug!("ToolGroup '{}': Tool '{}' hinzugefügt", self.id, name);
        Ok(())
    }

    /// Schaltet ein Tool `Active`.
    ///
    /// `bindings = Some(..)` ersetzt die gespeicherten Bindings; sonst gelten
    /// die gespeicherten bzw. die Standard-Bindings des Tools. Aktive Tools
    /// mit überlappendem Binding werden vorher nach `Passive` verdrängt.
    pub fn set_tool_active(&mut self, name: &str, options: ActivationOptions) -> Result<()> {
        let default_bindings = self.registry.require(name)?.default_bindings();
        let stored = self.config(name)?.bindings.clone();

        let bindings: Vec<Binding> = match options.bindings {
            Some(bindings) if !bindings.is_empty() => bindings,
            _ if !stored.is_empty() => stored,
            _ => default_bindings,
        }
        .into_iter()
        .map(Binding::normalized)
        .collect();

        for (other_name, other) in self.tools.iter_mut() {
            if other_name != name
                && other.mode == ToolMode::Active
                && other.shares_binding(&bindings)
            {
                log::debug!(
                    "ToolGroup '{}': '{}' verdrängt '{}' nach Passive",
                    self.id,
                    name,
                    other_name
                );
                other.mode = ToolMode::Passive;
            }
        }

        let config = self.config_mut(name)?;
        config.bindings = bindings;
        config.mode = ToolMode::Active;
        Ok(())
    }

    pub fn set_tool_passive(&mut self, name: &str) -> Result<()> {
        self.set_mode(name, ToolMode::Passive)
    }

    pub fn set_tool_enabled(&mut self, name: &str) -> Result<()> {
        self.set_mode(name, ToolMode::Enabled)
    }

    pub fn set_tool_disabled(&mut self, name: &str) -> Result<()> {
        self.set_mode(name, ToolMode::Disabled)
    }

    /// Ersetzt die Optionen eines Tools.
    pub fn set_tool_configuration(&mut self, name: &str, options: ToolOptions) -> Result<()> {
        self.config_mut(name)?.options = options;
        Ok(())
    }

    pub fn tool_options(&self, name: &str) -> Option<&ToolOptions> {
        self.tools.get(name).map(|c| &c.options)
    }

    pub fn tool_mode(&self, name: &str) -> Option<ToolMode> {
        self.tools.get(name).map(|c| c.mode)
    }

    pub fn tool_config(&self, name: &str) -> Option<&ToolConfig> {
        self.tools.get(name)
    }

    /// Alle Tool-Konfigurationen in Registrierungsreihenfolge.
    pub fn tools(&self) -> impl Iterator<Item = &ToolConfig> {
        self.tools.values()
    }

    /// Namen aller `Active`-Tools in Registrierungsreihenfolge.
    pub fn active_tools(&self) -> Vec<&str> {
        self.tools
            .values()
            .filter(|c| c.mode == ToolMode::Active)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Binding-Auflösung für ein Event auf einem Viewport dieser Gruppe.
    pub fn resolve(&self, event: &InputEvent) -> Resolution {
        binding_resolver::resolve(&self.tools, event)
    }

    fn set_mode(&mut self, name: &str, mode: ToolMode) -> Result<()> {
        let id = self.id.clone();
        let config = self.config_mut(name)?;
        if config.mode != mode {
            log::debug!("ToolGroup '{}': '{}' {:?} → {:?}", id, name, config.mode, mode);
            config.mode = mode;
        }
        Ok(())
    }

    /// Unbekannt in der Registry → `ToolNotFound`, nicht in der Gruppe → `ToolNotInGroup`.
    fn config(&self, name: &str) -> Result<&ToolConfig> {
        self.registry.require(name)?;
        self.tools
            .get(name)
            .ok_or_else(|| CoordinationError::ToolNotInGroup {
                tool_group_id: self.id.clone(),
                tool: name.to_string(),
            })
    }

    fn config_mut(&mut self, name: &str) -> Result<&mut ToolConfig> {
        self.registry.require(name)?;
        self.tools
            .get_mut(name)
            .ok_or_else(|| CoordinationError::ToolNotInGroup {
                tool_group_id: self.id.clone(),
                tool: name.to_string(),
            })
    }
}

impl std::fmt::Debug for ToolGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolGroup")
            .field("id", &self.id)
            .field("viewports", &self.viewports.keys().collect::<Vec<_>>())
            .field("tools", &self.tools)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InputButton, ModifierKey};

    fn group() -> (ToolGroup, InputEventBus) {
        let bus = InputEventBus::new();
        let group = ToolGroup::new(
            "CT",
            Rc::new(ToolRegistry::with_default_tools()),
            bus.clone(),
            true,
        );
        (group, bus)
    }

    #[test]
    fn test_add_and_remove_viewport_are_idempotent() {
        let (mut group, bus) = group();
        let vp = ViewportRef::new("engine", "CT_AXIAL");
        assert!(group.add_viewport(vp.clone()));
        assert!(!group.add_viewport(vp.clone()));
        assert_eq!(bus.subscription_count(), 1);

        assert!(group.remove_viewport(&vp));
        assert!(!group.remove_viewport(&vp));
        assert_eq!(bus.subscription_count(), 0);
    }

    #[test]
    fn test_add_tool_errors() {
        let (mut group, _bus) = group();
        group
            .add_tool("Pan", ToolOptions::new())
            .expect("Pan sollte hinzugefügt werden");
        assert_eq!(group.tool_mode("Pan"), Some(ToolMode::Disabled));
        assert!(matches!(
            group.add_tool("Pan", ToolOptions::new()),
            Err(CoordinationError::DuplicateTool { .. })
        ));
        assert!(matches!(
            group.add_tool("Probe", ToolOptions::new()),
            Err(CoordinationError::ToolNotFound { .. })
        ));
    }

    #[test]
    fn test_mode_change_on_unknown_or_missing_tool() {
        let (mut group, _bus) = group();
        assert!(matches!(
            group.set_tool_passive("Probe"),
            Err(CoordinationError::ToolNotFound { .. })
        ));
        assert!(matches!(
            group.set_tool_passive("Zoom"),
            Err(CoordinationError::ToolNotInGroup { .. })
        ));
    }

    #[test]
    fn test_activation_falls_back_to_default_bindings() {
        let (mut group, _bus) = group();
        group
            .add_tool("StackScrollMouseWheel", ToolOptions::new())
            .expect("Tool sollte hinzugefügt werden");
        group
            .set_tool_active("StackScrollMouseWheel", ActivationOptions::default())
            .expect("Aktivierung sollte funktionieren");
        assert_eq!(
            group.tool_config("StackScrollMouseWheel").map(|c| c.bindings.clone()),
            Some(vec![Binding::new(InputButton::Wheel)])
        );
    }

    #[test]
    fn test_activation_reuses_stored_bindings() {
        let (mut group, _bus) = group();
        group.add_tool("Zoom", ToolOptions::new()).expect("Zoom fehlt");
        let custom = Binding::with_modifiers(InputButton::Primary, ModifierKey::Shift);
        group
            .set_tool_active("Zoom", ActivationOptions::with_bindings([custom]))
            .expect("Aktivierung sollte funktionieren");
        group.set_tool_passive("Zoom").expect("Passive sollte gehen");
        group
            .set_tool_active("Zoom", ActivationOptions { bindings: Some(vec![]) })
            .expect("Reaktivierung sollte gehen");
        assert_eq!(
            group.tool_config("Zoom").map(|c| c.bindings.clone()),
            Some(vec![custom])
        );
    }

    #[test]
    fn test_colliding_activation_demotes_previous_holder() {
        let (mut group, _bus) = group();
        group.add_tool("WindowLevel", ToolOptions::new()).expect("WL fehlt");
        group.add_tool("Crosshairs", ToolOptions::new()).expect("Crosshairs fehlt");
        let primary = ActivationOptions::with_bindings([Binding::new(InputButton::Primary)]);

        group
            .set_tool_active("WindowLevel", primary.clone())
            .expect("WL aktiv");
        group
            .set_tool_active("Crosshairs", primary)
            .expect("Crosshairs aktiv");

        assert_eq!(group.tool_mode("WindowLevel"), Some(ToolMode::Passive));
        assert_eq!(group.active_tools(), vec!["Crosshairs"]);
    }

    #[test]
    fn test_any_transition_is_allowed() {
        let (mut group, _bus) = group();
        group.add_tool("Pan", ToolOptions::new()).expect("Pan fehlt");
        group
            .set_tool_active("Pan", ActivationOptions::default())
            .expect("Disabled → Active");
        group.set_tool_disabled("Pan").expect("Active → Disabled");
        group.set_tool_enabled("Pan").expect("Disabled → Enabled");
        assert_eq!(group.tool_mode("Pan"), Some(ToolMode::Enabled));
        assert!(group.active_tools().is_empty());
    }
}
