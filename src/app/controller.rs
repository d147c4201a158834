//! Coordination-Controller: führt genau einen Event-Turn aus.
//!
//! Ablauf: Eingabe → abonnierte ToolGroup → Binding-Auflösung → Tool →
//! Viewport-Events → Synchronizer → Labelmap-Dispatcher → Render aller im
//! Turn geänderten Viewports.

use super::context::CoordinationContext;
use super::segmentation::{self, LabelmapUpdate};
use super::tool_groups::{Resolution, ToolGroup, ToolOptions};
use super::tools::{Annotation, RenderContext, ToolAction, ToolContext};
use super::turn_log::{TurnReport, TurnTrigger};
use crate::core::{EventKind, InputEvent, ViewportEvent, ViewportRef};
use crate::error::Result;
use std::rc::Rc;

/// Orchestriert Eingaben und Viewport-Events auf dem Kontext.
#[derive(Default)]
pub struct CoordinationController;

impl CoordinationController {
    /// Obergrenze für Event-Runden innerhalb eines Turns.
    const MAX_EVENT_ROUNDS: usize = 16;

    /// Erstellt einen neuen Controller.
    pub fn new() -> Self {
        Self
    }

    /// Verarbeitet ein Eingabe-Event als vollständigen Turn.
    ///
    /// Auch ein fehlgeschlagener Turn rendert seine bis dahin geänderten
    /// Viewports und landet im Turn-Log, bevor der Fehler zurückkommt.
    pub fn handle_input(
        &mut self,
        ctx: &mut CoordinationContext,
        event: InputEvent,
    ) -> Result<TurnReport> {
        let mut report = TurnReport::new(TurnTrigger::Input {
            viewport: event.viewport.clone(),
            kind: event.kind,
        });
        let outcome = self.run_input(ctx, &event, &mut report);
        self.finish_turn(ctx, report, outcome)
    }

    /// Verarbeitet Events, die außerhalb eines Tools entstanden sind
    /// (z.B. direkte Kamera-Änderungen der Anwendung).
    pub fn process_pending_events(&mut self, ctx: &mut CoordinationContext) -> Result<TurnReport> {
        let mut report = TurnReport::new(TurnTrigger::PendingEvents);
        let outcome = self.drain_events(ctx, &mut report);
        self.finish_turn(ctx, report, outcome)
    }

    /// Direkter Labelmap-Update-Aufruf der Anwendung.
    ///
    /// `UnsupportedOperation` für Viewports ohne Scene wird sofort zurückgegeben.
    pub fn handle_labelmap_updated(
        &mut self,
        ctx: &mut CoordinationContext,
        update: LabelmapUpdate,
    ) -> Result<TurnReport> {
        let mut report = TurnReport::new(TurnTrigger::LabelmapUpdated {
            viewport: update.viewport(),
        });
        let outcome = match segmentation::on_labelmap_updated(
            &ctx.tool_groups,
            &ctx.segmentation,
            &mut ctx.viewports,
            ctx.volumes.as_ref(),
            &update,
            &mut report,
        ) {
            Ok(_) => self.drain_events(ctx, &mut report),
            Err(err) => Err(err),
        };
        self.finish_turn(ctx, report, outcome)
    }

    /// Sammelt die Overlays aller Tools der Gruppe, die `viewport` enthält.
    pub fn render_annotations(
        &self,
        ctx: &CoordinationContext,
        viewport: &ViewportRef,
    ) -> Result<Vec<Annotation>> {
        ctx.viewports.resolve(viewport)?;
        let Some(group) = ctx.tool_groups.tool_group_for_viewport(viewport) else {
            return Ok(Vec::new());
        };
        let group_viewports = group.viewports();
        let mut annotations = Vec::new();
        for config in group.tools().filter(|c| c.mode.renders_overlays()) {
            let tool = ctx.tool_registry.require(&config.name)?;
            let render_ctx = RenderContext {
                tool_group_id: group.id(),
                viewport,
                group_viewports: &group_viewports,
                options: &config.options,
                mode: config.mode,
                settings: &ctx.options,
                viewports: &ctx.viewports,
                segmentation: &ctx.segmentation,
            };
            match tool.render(&render_ctx) {
                Ok(mut tool_annotations) => annotations.append(&mut tool_annotations),
                Err(err) if err.is_lookup_miss() => {
                    log::warn!("Tool '{}' beim Zeichnen von {}: {}", config.name, viewport, err)
                }
                Err(err) => return Err(err),
            }
        }
        Ok(annotations)
    }

    fn run_input(
        &mut self,
        ctx: &mut CoordinationContext,
        event: &InputEvent,
        report: &mut TurnReport,
    ) -> Result<()> {
        let subscribers = ctx.input_bus.subscribers(&event.viewport);
        let Some(tool_group_id) = subscribers.first().cloned() else {
            log::debug!("Eingabe auf {} ohne ToolGroup verworfen", event.viewport);
            return Ok(());
        };
        if subscribers.len() > 1 && ctx.options.warn_shared_viewports {
            log::warn!(
                "Viewport {} gehört zu {} ToolGroups, '{}' erhält die Eingabe",
                event.viewport,
                subscribers.len(),
                tool_group_id
            );
        }
        report.tool_group_id = Some(tool_group_id.clone());

        let group = ctx.tool_groups.require(&tool_group_id)?;
        let resolution = group.resolve(event);
        let group_viewports = group.viewports();
        let candidates: Vec<(String, ToolOptions)> = match &resolution {
            Resolution::Active { tool, .. } => vec![(tool.clone(), options_of(group, tool))],
            Resolution::Hover { tools } => tools
                .iter()
                .map(|tool| (tool.clone(), options_of(group, tool)))
                .collect(),
            Resolution::Dropped => Vec::new(),
        };
        log::debug!(
            "Turn {:?} auf {} → {:?}",
            event.kind,
            event.viewport,
            resolution
        );
        report.resolution = Some(resolution.clone());

        let registry = Rc::clone(&ctx.tool_registry);
        let mut repaint_hover = false;
        for (name, options) in &candidates {
            let tool = registry.require(name)?;
            let mut tool_ctx = ToolContext {
                tool_group_id: &tool_group_id,
                viewport: &event.viewport,
                group_viewports: &group_viewports,
                options,
                settings: &ctx.options,
                viewports: &mut ctx.viewports,
                volumes: ctx.volumes.as_mut(),
                segmentation: &ctx.segmentation,
            };
            let outcome = match resolution {
                Resolution::Active { .. } => tool
                    .on_input(&mut tool_ctx, event)
                    .map(|action| action == ToolAction::Handled),
                _ => tool.on_hover(&mut tool_ctx, event),
            };
            match outcome {
                Ok(true) if matches!(resolution, Resolution::Active { .. }) => {
                    report.tool_handled = true
                }
                Ok(true) => repaint_hover = true,
                Ok(false) => {}
                Err(err) if err.is_lookup_miss() => {
                    report.record_lookup_miss(format!("Tool '{}'", name), err)
                }
                Err(err) => {
                    log::warn!("Tool '{}' auf {}: {}", name, event.viewport, err);
                    return Err(err);
                }
            }
        }

        self.drain_events(ctx, report)?;
        if repaint_hover {
            report.mark_mutated(&event.viewport);
        }
        Ok(())
    }

    /// Rendert die geänderten Viewports und protokolliert den Turn, auch im Fehlerfall.
    fn finish_turn(
        &mut self,
        ctx: &mut CoordinationContext,
        mut report: TurnReport,
        outcome: Result<()>,
    ) -> Result<TurnReport> {
        self.render_mutated(ctx, &mut report);
        ctx.turn_log.record(report.clone());
        outcome.map(|()| report)
    }

    /// Leitet alle anstehenden Viewport-Events an Synchronizer und Dispatcher.
    fn drain_events(&mut self, ctx: &mut CoordinationContext, report: &mut TurnReport) -> Result<()> {
        for _ in 0..Self::MAX_EVENT_ROUNDS {
            let events = ctx.viewports.take_events();
            if events.is_empty() {
                return Ok(());
            }

            let mut labelmap_events: Vec<ViewportEvent> = Vec::new();
            for event in &events {
                report.mark_mutated(&event.viewport);
                if event.kind() == EventKind::LabelmapUpdated {
                    labelmap_events.push(event.clone());
                    continue;
                }
                let mut deferred = Vec::new();
                ctx.synchronizers
                    .dispatch(&mut ctx.viewports, event, report, &mut deferred);
                labelmap_events.append(&mut deferred);
            }

            let mut first_error = None;
            for event in &labelmap_events {
                let outcome = segmentation::on_labelmap_updated(
                    &ctx.tool_groups,
                    &ctx.segmentation,
                    &mut ctx.viewports,
                    ctx.volumes.as_ref(),
                    &LabelmapUpdate::from(event),
                    report,
                );
                if let Err(err) = outcome {
                    log::warn!("Labelmap-Update von {}: {}", event.viewport, err);
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
            if let Some(err) = first_error {
                return Err(err);
            }
        }
        log::warn!(
            "Event-Verarbeitung nach {} Runden abgebrochen",
            Self::MAX_EVENT_ROUNDS
        );
        Ok(())
    }

    /// Fordert einen Render für jeden geänderten, noch nicht gerenderten Viewport an.
    fn render_mutated(&self, ctx: &mut CoordinationContext, report: &mut TurnReport) {
        let pending: Vec<ViewportRef> = report
            .mutated
            .iter()
            .filter(|vp| !report.rendered.contains(vp))
            .cloned()
            .collect();
        if pending.is_empty() {
            return;
        }
        ctx.viewports.render_viewports(&pending);
        report.rendered.extend(pending);
    }
}

fn options_of(group: &ToolGroup, tool: &str) -> ToolOptions {
    group.tool_options(tool).cloned().unwrap_or_default()
}

