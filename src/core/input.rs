//! Normalisierte Eingabe-Events und Bindings (Maustaste + Modifier).
//!
//! Die Koordinationsschicht kennt kein UI-Framework: Die Anwendung übersetzt
//! ihre Plattform-Events in [`InputEvent`] und reicht sie an den Controller.

use super::ViewportRef;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Eingabe-Taste, auf die ein Tool gebunden werden kann.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputButton {
    /// Linke Maustaste
    Primary,
    /// Rechte Maustaste
    Secondary,
    /// Mittlere Maustaste
    Auxiliary,
    /// Mausrad
    Wheel,
    /// Touch-Geste
    Touch,
}

/// Einzelne Modifier-Taste.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKey {
    Shift,
    Ctrl,
    Alt,
    Meta,
}

impl ModifierKey {
    const fn bit(self) -> u8 {
        match self {
            ModifierKey::Shift => 1,
            ModifierKey::Ctrl => 1 << 1,
            ModifierKey::Alt => 1 << 2,
            ModifierKey::Meta => 1 << 3,
        }
    }
}

/// Menge gedrückter Modifier-Tasten (Bitset, Vergleich ist exakte Mengengleichheit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ModifierKeys(u8);

impl ModifierKeys {
    /// Keine Modifier gedrückt.
    pub const NONE: ModifierKeys = ModifierKeys(0);

    /// Baut die Menge aus einzelnen Tasten.
    pub fn from_keys(keys: &[ModifierKey]) -> Self {
        keys.iter().copied().collect()
    }

    /// Gibt eine Kopie mit zusätzlicher Taste zurück.
    pub fn with(self, key: ModifierKey) -> Self {
        Self(self.0 | key.bit())
    }

    /// Prüft ob die Taste enthalten ist.
    pub fn contains(self, key: ModifierKey) -> bool {
        self.0 & key.bit() != 0
    }

    /// `true` wenn kein Modifier gedrückt ist.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<ModifierKey> for ModifierKeys {
    fn from_iter<I: IntoIterator<Item = ModifierKey>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, ModifierKeys::with)
    }
}

impl From<ModifierKey> for ModifierKeys {
    fn from(key: ModifierKey) -> Self {
        Self::NONE.with(key)
    }
}

/// Güte eines Binding-Treffers. `Exact` schlägt `ButtonOnly`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BindingMatch {
    /// Taste passt, Binding hat keine Modifier-Vorgabe
    ButtonOnly,
    /// Taste und Modifier-Menge passen exakt
    Exact,
}

/// Taste plus optionale Modifier-Menge.
///
/// `modifiers = None` bedeutet „nur die Taste“ und passt auf jede
/// Modifier-Kombination. Eine leere Menge wird beim Normalisieren zu `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    pub button: InputButton,
    #[serde(default)]
    pub modifiers: Option<ModifierKeys>,
}

impl Binding {
    /// Binding auf eine Taste ohne Modifier-Vorgabe.
    pub fn new(button: InputButton) -> Self {
        Self {
            button,
            modifiers: None,
        }
    }

    /// Binding auf Taste plus exakte Modifier-Menge.
    pub fn with_modifiers(button: InputButton, modifiers: impl Into<ModifierKeys>) -> Self {
        Self {
            button,
            modifiers: Some(modifiers.into()),
        }
        .normalized()
    }

    /// Kanonische Form: `Some(NONE)` → `None`.
    pub fn normalized(self) -> Self {
        match self.modifiers {
            Some(m) if m.is_empty() => Self::new(self.button),
            _ => self,
        }
    }

    /// Bewertet, wie gut das Binding auf eine Eingabe passt.
    ///
    /// Ein Binding ohne Modifier-Vorgabe gilt als exakter Treffer, wenn auch
    /// die Eingabe keine Modifier trägt, sonst als reiner Tasten-Treffer.
    pub fn match_quality(&self, button: InputButton, modifiers: ModifierKeys) -> Option<BindingMatch> {
        if self.button != button {
            return None;
        }
        match self.normalized().modifiers {
            Some(required) if required == modifiers => Some(BindingMatch::Exact),
            Some(_) => None,
            None if modifiers.is_empty() => Some(BindingMatch::Exact),
            None => Some(BindingMatch::ButtonOnly),
        }
    }
}

/// Phase bzw. Art eines Eingabe-Events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEventKind {
    /// Taste gedrückt
    PointerDown,
    /// Bewegung bei gedrückter Taste
    PointerDrag,
    /// Taste losgelassen
    PointerUp,
    /// Bewegung ohne Taste (Hover)
    PointerMove,
    /// Mausrad
    Wheel,
}

/// Normalisierter Eingabe-Datensatz `{button, modifierKeys, viewportRef}`.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub kind: InputEventKind,
    /// Viewport, auf dem das Event entstanden ist
    pub viewport: ViewportRef,
    /// Gedrückte Taste (`None` bei reinem Hover)
    pub button: Option<InputButton>,
    pub modifiers: ModifierKeys,
    /// Weltposition unter dem Zeiger (falls vom Host berechnet)
    pub world_position: Option<Vec3>,
    /// Canvas-Delta in Pixeln seit dem letzten Event (Rad: `y` = Schritte)
    pub delta: Vec2,
    /// Welt-Delta seit dem letzten Event (falls vom Host berechnet)
    pub world_delta: Option<Vec3>,
}

impl InputEvent {
    fn base(kind: InputEventKind, viewport: ViewportRef, button: Option<InputButton>) -> Self {
        Self {
            kind,
            viewport,
            button,
            modifiers: ModifierKeys::NONE,
            world_position: None,
            delta: Vec2::ZERO,
            world_delta: None,
        }
    }

    /// Tastendruck an einer Weltposition.
    pub fn pointer_down(viewport: ViewportRef, button: InputButton, world_position: Vec3) -> Self {
        Self::base(InputEventKind::PointerDown, viewport, Some(button)).with_world_position(world_position)
    }

    /// Drag mit gedrückter Taste um ein Canvas-Delta.
    pub fn drag(viewport: ViewportRef, button: InputButton, delta: Vec2) -> Self {
        let mut event = Self::base(InputEventKind::PointerDrag, viewport, Some(button));
        event.delta = delta;
        event
    }

    /// Taste losgelassen.
    pub fn pointer_up(viewport: ViewportRef, button: InputButton) -> Self {
        Self::base(InputEventKind::PointerUp, viewport, Some(button))
    }

    /// Hover ohne gedrückte Taste.
    pub fn pointer_move(viewport: ViewportRef, world_position: Vec3) -> Self {
        Self::base(InputEventKind::PointerMove, viewport, None).with_world_position(world_position)
    }

    /// Mausrad um `steps` Rasterschritte (positiv = vom Benutzer weg).
    pub fn wheel(viewport: ViewportRef, steps: f32) -> Self {
        let mut event = Self::base(InputEventKind::Wheel, viewport, Some(InputButton::Wheel));
        event.delta = Vec2::new(0.0, steps);
        event
    }

    /// Setzt die Modifier-Menge.
    pub fn with_modifiers(mut self, modifiers: impl Into<ModifierKeys>) -> Self {
        self.modifiers = modifiers.into();
        self
    }

    /// Setzt die Weltposition unter dem Zeiger.
    pub fn with_world_position(mut self, world_position: Vec3) -> Self {
        self.world_position = Some(world_position);
        self
    }

    /// Setzt das Welt-Delta.
    pub fn with_world_delta(mut self, world_delta: Vec3) -> Self {
        self.world_delta = Some(world_delta);
        self
    }

    /// `true` für Events, die eine Manipulation auslösen können.
    pub fn is_manipulation(&self) -> bool {
        self.button.is_some() && self.kind != InputEventKind::PointerMove
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_only_binding_matches_any_modifier() {
        let binding = Binding::new(InputButton::Primary);
        assert_eq!(
            binding.match_quality(InputButton::Primary, ModifierKeys::NONE),
            Some(BindingMatch::Exact)
        );
        assert_eq!(
            binding.match_quality(InputButton::Primary, ModifierKey::Shift.into()),
            Some(BindingMatch::ButtonOnly)
        );
        assert_eq!(binding.match_quality(InputButton::Secondary, ModifierKeys::NONE), None);
    }

    #[test]
    fn test_modifier_binding_requires_exact_set() {
        let binding = Binding::with_modifiers(InputButton::Primary, ModifierKey::Shift);
        let shift_ctrl = ModifierKeys::from_keys(&[ModifierKey::Shift, ModifierKey::Ctrl]);
        assert_eq!(
            binding.match_quality(InputButton::Primary, ModifierKey::Shift.into()),
            Some(BindingMatch::Exact)
        );
        assert_eq!(binding.match_quality(InputButton::Primary, shift_ctrl), None);
        assert_eq!(binding.match_quality(InputButton::Primary, ModifierKeys::NONE), None);
    }

    #[test]
    fn test_empty_modifier_set_normalizes_to_button_only() {
        let explicit = Binding {
            button: InputButton::Primary,
            modifiers: Some(ModifierKeys::NONE),
        };
        assert_eq!(explicit.normalized(), Binding::new(InputButton::Primary));
    }

    #[test]
    fn test_hover_is_no_manipulation() {
        let vp = ViewportRef::new("engine", "CT_AXIAL");
        assert!(!InputEvent::pointer_move(vp.clone(), Vec3::ZERO).is_manipulation());
        assert!(InputEvent::wheel(vp, 1.0).is_manipulation());
    }
}
