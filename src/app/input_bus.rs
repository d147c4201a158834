//! Input-Event-Bus: explizite Abos von ToolGroups auf Viewports.
//!
//! Jedes Abo liefert ein [`InputSubscription`]-Handle. Wird das Handle
//! gekündigt oder gedroppt, verschwindet das Abo aus dem Bus.

use crate::core::ViewportRef;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Default)]
struct BusInner {
    next_id: u64,
    /// Abo-ID → (Viewport, ToolGroup-ID), in Abo-Reihenfolge
    subscriptions: IndexMap<u64, (ViewportRef, String)>,
}

/// Geteilter Bus; Klone zeigen auf dieselbe Abo-Tabelle.
#[derive(Debug, Clone, Default)]
pub struct InputEventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl InputEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abonniert `tool_group_id` auf Eingaben von `viewport`.
    pub fn subscribe(&self, viewport: ViewportRef, tool_group_id: &str) -> InputSubscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner
            .subscriptions
            .insert(id, (viewport.clone(), tool_group_id.to_string()));
        log::debug!("ToolGroup '{}' abonniert {}", tool_group_id, viewport);
        InputSubscription {
            id,
            viewport,
            bus: Rc::downgrade(&self.inner),
        }
    }

    /// ToolGroups, die `viewport` abonniert haben (älteste zuerst).
    pub fn subscribers(&self, viewport: &ViewportRef) -> Vec<String> {
        self.inner
            .borrow()
            .subscriptions
            .values()
            .filter(|(vp, _)| vp == viewport)
            .map(|(_, group)| group.clone())
            .collect()
    }

    /// Anzahl aktiver Abos.
    pub fn subscription_count(&self) -> usize {
        self.inner.borrow().subscriptions.len()
    }
}

/// Kündigungs-Handle eines Abos. Drop kündigt ebenfalls.
#[derive(Debug)]
pub struct InputSubscription {
    id: u64,
    viewport: ViewportRef,
    bus: Weak<RefCell<BusInner>>,
}

impl InputSubscription {
    pub fn viewport(&self) -> &ViewportRef {
        &self.viewport
    }

    /// Kündigt das Abo sofort.
    pub fn cancel(self) {
        drop(self);
    }

    fn unsubscribe(&self) {
        if let Some(bus) = self.bus.upgrade() {
            if bus.borrow_mut().subscriptions.shift_remove(&self.id).is_some() {
                log::debug!("Abo auf {} gekündigt", self.viewport);
            }
        }
    }
}

impl Drop for InputSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
