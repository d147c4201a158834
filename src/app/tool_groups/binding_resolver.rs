//! Binding-Auflösung: wählt für ein Eingabe-Event höchstens ein Tool.

use super::{ToolConfig, ToolMode};
use crate::core::{BindingMatch, InputEvent};
use indexmap::IndexMap;

/// Ergebnis der Binding-Auflösung.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Aktives Tool mit passendem Binding übernimmt das Event
    Active { tool: String, quality: BindingMatch },
    /// Kein aktiver Treffer: Passive Tools erhalten das Event als Hover
    Hover { tools: Vec<String> },
    /// Niemand interessiert sich für das Event
    Dropped,
}

impl Resolution {
    pub fn active_tool(&self) -> Option<&str> {
        match self {
            Resolution::Active { tool, .. } => Some(tool),
            _ => None,
        }
    }
}

/// Löst ein Event gegen die Tools einer Gruppe auf.
///
/// Exakte Modifier-Treffer schlagen reine Tasten-Treffer, bei Gleichstand
/// gewinnt das zuerst registrierte Tool. Events ohne Taste gehen direkt an
/// die Passive-Tools.
pub fn resolve(tools: &IndexMap<String, ToolConfig>, event: &InputEvent) -> Resolution {
    if let Some(button) = event.button {
        let mut best: Option<(&str, BindingMatch)> = None;
        for (name, config) in tools {
            if config.mode != ToolMode::Active {
                continue;
            }
            let quality = config
                .bindings
                .iter()
                .filter_map(|binding| binding.match_quality(button, event.modifiers))
                .max();
            if let Some(quality) = quality {
                // strikt größer: frühere Registrierung gewinnt bei Gleichstand
                if best.is_none_or(|(_, q)| quality > q) {
                    best = Some((name.as_str(), quality));
                }
            }
        }
        if let Some((tool, quality)) = best {
            return Resolution::Active {
                tool: tool.to_string(),
                quality,
            };
        }
    }

    let passive: Vec<String> = tools
        .values()
        .filter(|config| config.mode == ToolMode::Passive)
        .map(|config| config.name.clone())
        .collect();
    if passive.is_empty() {
        Resolution::Dropped
    } else {
        Resolution::Hover { tools: passive }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tool_groups::ToolOptions;
    use crate::core::{Binding, InputButton, ModifierKey, ViewportRef};
    use glam::{Vec2, Vec3};

    fn tool(name: &str, mode: ToolMode, bindings: Vec<Binding>) -> (String, ToolConfig) {
        let mut config = ToolConfig::new(name, ToolOptions::new());
        config.mode = mode;
        config.bindings = bindings;
        (name.to_string(), config)
    }

    fn viewport() -> ViewportRef {
        ViewportRef::new("engine", "CT_AXIAL")
    }

    #[test]
    fn test_exact_modifier_match_beats_button_only() {
        let tools: IndexMap<_, _> = [
            tool("Pan", ToolMode::Active, vec![Binding::new(InputButton::Primary)]),
            tool(
                "Zoom",
                ToolMode::Active,
                vec![Binding::with_modifiers(InputButton::Primary, ModifierKey::Shift)],
            ),
        ]
        .into_iter()
        .collect();

        let event = InputEvent::drag(viewport(), InputButton::Primary, Vec2::ONE)
            .with_modifiers(ModifierKey::Shift);
        assert_eq!(resolve(&tools, &event).active_tool(), Some("Zoom"));

        let plain = InputEvent::drag(viewport(), InputButton::Primary, Vec2::ONE);
        assert_eq!(resolve(&tools, &plain).active_tool(), Some("Pan"));
    }

    #[test]
    fn test_earliest_registration_breaks_ties() {
        let tools: IndexMap<_, _> = [
            tool("First", ToolMode::Active, vec![Binding::new(InputButton::Secondary)]),
            tool("Second", ToolMode::Active, vec![Binding::new(InputButton::Secondary)]),
        ]
        .into_iter()
        .collect();
        let event = InputEvent::drag(viewport(), InputButton::Secondary, Vec2::ONE)
            .with_modifiers(ModifierKey::Alt);
        assert_eq!(resolve(&tools, &event).active_tool(), Some("First"));
    }

    #[test]
    fn test_unmatched_event_goes_to_passive_tools() {
        let tools: IndexMap<_, _> = [
            tool("WindowLevel", ToolMode::Active, vec![Binding::new(InputButton::Primary)]),
            tool("Crosshairs", ToolMode::Passive, vec![Binding::new(InputButton::Primary)]),
            tool("Probe", ToolMode::Enabled, vec![]),
        ]
        .into_iter()
        .collect();

        let wheel = InputEvent::wheel(viewport(), 1.0);
        assert_eq!(
            resolve(&tools, &wheel),
            Resolution::Hover {
                tools: vec!["Crosshairs".to_string()]
            }
        );

        let hover = InputEvent::pointer_move(viewport(), Vec3::ZERO);
        assert!(matches!(resolve(&tools, &hover), Resolution::Hover { .. }));
    }

    #[test]
    fn test_no_candidates_drops_event() {
        let tools: IndexMap<_, _> =
            [tool("Zoom", ToolMode::Disabled, vec![Binding::new(InputButton::Secondary)])]
                .into_iter()
                .collect();
        let event = InputEvent::drag(viewport(), InputButton::Secondary, Vec2::ONE);
        assert_eq!(resolve(&tools, &event), Resolution::Dropped);
    }
}
