//! Injected page helper.
//!
//! All DOM work happens inside the page through a small JavaScript helper
//! installed under `window.__autopilot`. The helper keeps a token registry so
//! the Rust side can refer to elements across a scan/click pair without
//! holding CDP object handles, and owns the status overlay DOM. Everything
//! stateful stays on the Rust side; the helper is a thin, restartable shim.

use serde_json::json;

/// Bumped whenever the helper script changes shape. A page holding an older
/// helper gets re-injected on the next ensure pass.
pub const HELPER_VERSION: u32 = 1;

/// The helper script. Idempotent: re-evaluating it replaces the previous
/// installation wholesale.
const HELPER_JS: &str = r#"
(() => {
  const VERSION = __VERSION__;

  // Same-origin frame flattening. Cross-origin frames throw on access and
  // are skipped.
  function documents(root, acc) {
    acc.push(root);
    const frames = root.querySelectorAll('iframe, webview');
    for (const frame of frames) {
      try {
        const doc = frame.contentDocument;
        if (doc) documents(doc, acc);
      } catch (_) {}
    }
    return acc;
  }

  function queryAll(selector) {
    const out = [];
    for (const doc of documents(document, [])) {
      let found;
      try {
        found = doc.querySelectorAll(selector);
      } catch (_) {
        continue;
      }
      for (const el of found) out.push(el);
    }
    return out;
  }

  function commandText(el) {
    const container = el.closest('[class*="code-block"], [class*="command"], [class*="terminal"]');
    if (!container) return null;
    const text = (container.innerText || '').trim();
    return text ? text.slice(0, 500) : null;
  }

  const state = {
    version: VERSION,
    nextToken: 1,
    tokens: new Map(),
    byElement: new WeakMap(),

    tokenFor(el) {
      let token = this.byElement.get(el);
      if (token === undefined) {
        token = this.nextToken++;
        this.byElement.set(el, token);
      }
      this.tokens.set(token, el);
      return token;
    },

    scan(selector) {
      // Dropping dead entries keeps the strong-ref map bounded.
      for (const [token, el] of this.tokens) {
        if (!el.isConnected) this.tokens.delete(token);
      }
      return queryAll(selector).map((el) => {
        const style = el.ownerDocument.defaultView.getComputedStyle(el);
        const rect = el.getBoundingClientRect();
        return {
          token: this.tokenFor(el),
          text: (el.textContent || '').trim(),
          command_text: commandText(el),
          display_none: style.display === 'none',
          width: rect.width,
          pointer_events_none: style.pointerEvents === 'none',
          disabled: el.disabled === true || el.getAttribute('aria-disabled') === 'true',
        };
      });
    },

    click(token) {
      const el = this.tokens.get(token);
      if (!el || !el.isConnected) return false;
      el.click();
      return true;
    },

    overlayRoot() {
      return document.getElementById('__autopilot_overlay');
    },

    overlayShow(panelSelector) {
      if (this.overlayRoot()) return;
      let host = null;
      try {
        host = document.querySelector(panelSelector);
      } catch (_) {}
      const root = document.createElement('div');
      root.id = '__autopilot_overlay';
      root.style.cssText =
        'position:absolute;top:4px;right:8px;z-index:9999;padding:6px 10px;' +
        'font-size:11px;font-family:monospace;border-radius:6px;' +
        'background:rgba(30,30,30,0.92);color:#ccc;pointer-events:none;max-width:280px;';
      const title = document.createElement('div');
      title.className = '__ap-title';
      title.textContent = 'autopilot';
      title.style.cssText = 'opacity:0.6;margin-bottom:2px;';
      root.appendChild(title);
      (host || document.body).appendChild(root);
    },

    overlaySetWaiting() {
      const root = this.overlayRoot();
      if (!root) return;
      let waiting = root.querySelector('.__ap-waiting');
      if (!waiting) {
        waiting = document.createElement('div');
        waiting.className = '__ap-waiting';
        waiting.textContent = 'waiting for conversations';
        root.appendChild(waiting);
      }
    },

    overlayUpsert(label, status, elapsedSecs) {
      const root = this.overlayRoot();
      if (!root) return;
      const waiting = root.querySelector('.__ap-waiting');
      if (waiting) waiting.remove();
      let slot = null;
      for (const candidate of root.querySelectorAll('[data-slot]')) {
        if (candidate.getAttribute('data-slot') === label) {
          slot = candidate;
          break;
        }
      }
      if (!slot) {
        slot = document.createElement('div');
        slot.setAttribute('data-slot', label);
        root.appendChild(slot);
      }
      const mins = Math.floor(elapsedSecs / 60);
      const glyph = status === 'done' ? '✓' : status === 'working' ? '▶' : '○';
      slot.textContent = glyph + ' ' + label + ' (' + mins + 'm)';
      slot.style.color = status === 'done' ? '#8c8' : '#ccc';
    },

    overlayRemove(label) {
      const root = this.overlayRoot();
      if (!root) return;
      for (const slot of root.querySelectorAll('[data-slot]')) {
        if (slot.getAttribute('data-slot') === label) slot.remove();
      }
    },

    overlayHide() {
      const root = this.overlayRoot();
      if (!root) return;
      root.style.transition = 'opacity 200ms';
      root.style.opacity = '0';
      setTimeout(() => root.remove(), 250);
    },
  };

  window.__autopilot = state;
  return VERSION;
})()
"#;

/// Expression that installs (or reinstalls) the helper and yields its version.
pub fn install_expression() -> String {
    HELPER_JS.replace("__VERSION__", &HELPER_VERSION.to_string())
}

/// Expression that yields the installed helper version, or 0 when absent.
pub fn installed_version_expression() -> &'static str {
    "(window.__autopilot && window.__autopilot.version) || 0"
}

/// Expression that scans for `selector` and yields an array of element
/// snapshots.
pub fn scan_expression(selector: &str) -> String {
    format!(
        "window.__autopilot ? window.__autopilot.scan({}) : []",
        json!(selector)
    )
}

/// Expression that clicks the element behind `token`; yields a boolean.
pub fn click_expression(token: u64) -> String {
    format!(
        "window.__autopilot ? window.__autopilot.click({token}) : false"
    )
}

pub fn overlay_show_expression(panel_selector: &str) -> String {
    format!(
        "window.__autopilot && window.__autopilot.overlayShow({})",
        json!(panel_selector)
    )
}

pub fn overlay_set_waiting_expression() -> &'static str {
    "window.__autopilot && window.__autopilot.overlaySetWaiting()"
}

pub fn overlay_upsert_expression(label: &str, status: &str, elapsed_secs: u64) -> String {
    format!(
        "window.__autopilot && window.__autopilot.overlayUpsert({}, {}, {})",
        json!(label),
        json!(status),
        elapsed_secs
    )
}

pub fn overlay_remove_expression(label: &str) -> String {
    format!(
        "window.__autopilot && window.__autopilot.overlayRemove({})",
        json!(label)
    )
}

pub fn overlay_hide_expression() -> &'static str {
    "window.__autopilot && window.__autopilot.overlayHide()"
}
