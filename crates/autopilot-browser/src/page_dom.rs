//! CDP-backed implementations of the agent's page traits.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace};

use autopilot_core::dom::{ElementHandle, ElementInfo, PageDom};
use autopilot_core::error::AgentError;
use autopilot_core::overlay::{OverlaySurface, SlotStatus};

use crate::error::CdpError;
use crate::helper;
use crate::session::PageSession;

fn status_name(status: SlotStatus) -> &'static str {
    match status {
        SlotStatus::Waiting => "waiting",
        SlotStatus::Working => "working",
        SlotStatus::Done => "done",
    }
}

/// One workbench page as seen by the agent, both DOM and overlay.
///
/// Every operation funnels through `Runtime.evaluate` against the injected
/// helper. A reloaded page silently loses the helper; [`CdpDom::ensure_injected`]
/// restores it and is cheap when nothing changed.
pub struct CdpDom {
    session: Arc<PageSession>,
}

impl CdpDom {
    pub fn new(session: Arc<PageSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<PageSession> {
        &self.session
    }

    /// Install the page helper if it is missing or outdated.
    pub async fn ensure_injected(&self) -> Result<(), CdpError> {
        let installed = self
            .session
            .evaluate(helper::installed_version_expression())
            .await?
            .as_u64()
            .unwrap_or(0);

        if installed == u64::from(helper::HELPER_VERSION) {
            return Ok(());
        }

        debug!(
            target_id = self.session.target_id(),
            installed, "installing page helper"
        );
        let version = self
            .session
            .evaluate(&helper::install_expression())
            .await?;
        if version.as_u64() != Some(u64::from(helper::HELPER_VERSION)) {
            return Err(CdpError::JavaScript(format!(
                "helper install returned {version:?}"
            )));
        }
        Ok(())
    }

    /// Whether the page's window currently has input focus.
    pub async fn page_has_focus(&self) -> Result<bool, CdpError> {
        let value = self.session.evaluate("document.hasFocus()").await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn overlay_eval(&self, expression: &str) -> Result<(), AgentError> {
        self.session
            .evaluate(expression)
            .await
            .map(|_| ())
            .map_err(|e| match e {
                CdpError::SessionClosed => AgentError::PageDetached,
                other => AgentError::Overlay(other.to_string()),
            })
    }
}

#[async_trait]
impl PageDom for CdpDom {
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementInfo>, AgentError> {
        let value: Value = self
            .session
            .evaluate(&helper::scan_expression(selector))
            .await
            .map_err(AgentError::from)?;
        trace!("scan {selector}: {} candidates", value.as_array().map_or(0, Vec::len));
        let elements: Vec<ElementInfo> = serde_json::from_value(value)?;
        Ok(elements)
    }

    async fn click(&self, handle: ElementHandle) -> Result<bool, AgentError> {
        let value = self
            .session
            .evaluate(&helper::click_expression(handle.0))
            .await
            .map_err(AgentError::from)?;
        Ok(value.as_bool().unwrap_or(false))
    }
}

#[async_trait]
impl OverlaySurface for CdpDom {
    async fn show(&self, panel_selector: &str) -> Result<(), AgentError> {
        self.overlay_eval(&helper::overlay_show_expression(panel_selector))
            .await
    }

    async fn set_waiting(&self) -> Result<(), AgentError> {
        self.overlay_eval(helper::overlay_set_waiting_expression())
            .await
    }

    async fn upsert_slot(
        &self,
        label: &str,
        status: SlotStatus,
        elapsed_secs: u64,
    ) -> Result<(), AgentError> {
        self.overlay_eval(&helper::overlay_upsert_expression(
            label,
            status_name(status),
            elapsed_secs,
        ))
        .await
    }

    async fn remove_slot(&self, label: &str) -> Result<(), AgentError> {
        self.overlay_eval(&helper::overlay_remove_expression(label))
            .await
    }

    async fn hide(&self) -> Result<(), AgentError> {
        self.overlay_eval(helper::overlay_hide_expression()).await
    }
}
