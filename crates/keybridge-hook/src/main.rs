//! KeyBridge entry point.
//!
//! Installs the global keyboard and mouse hooks and logs every key and
//! button transition until the stop key or Ctrl-C is pressed.  If the config
//! names a script, it runs alongside and sees every transition the consumer
//! takes.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  ├─ load_config()              -- bindings + log level
//!  ├─ "keybridge-pump" thread    -- InputBridge::start(): install hooks, pump messages
//!  ├─ "keybridge-script" thread  -- ScriptRunner::run(): optional, fed by the consumer
//!  ├─ blocking task              -- ConsumerLoop::run(): take_next() until shutdown
//!  └─ Ctrl-C task                -- InputBridge::stop()
//! ```

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use keybridge_hook::application::bridge::{CaptureError, InputBridge};
use keybridge_hook::application::consume::{Consumed, ConsumerLoop};
use keybridge_hook::application::script::ScriptRunner;
use keybridge_hook::infrastructure::clipboard::SystemClipboard;
use keybridge_hook::infrastructure::input_capture::platform_host;
use keybridge_hook::infrastructure::input_emulation::platform_sender;
use keybridge_hook::infrastructure::storage::config::{config_dir, load_config};
use keybridge_hook::infrastructure::storage::script::load_script;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config();

    // Level is overridden by `RUST_LOG`; otherwise the configured level applies.
    let fallback_level = config
        .as_ref()
        .map(|c| c.bridge.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_level)),
        )
        .init();

    let config = config.context("failed to load configuration")?;
    let bindings = config
        .bridge
        .bindings()
        .context("invalid key binding in configuration")?;

    info!("KeyBridge starting");

    // Loaded before any hook is installed so a bad script fails fast.
    let runner = match &config.bridge.script {
        Some(path) => {
            let script = load_script(path, &config_dir()?)
                .with_context(|| format!("failed to load script {path}"))?;
            let sender = platform_sender().context("input emulation is not available")?;
            Some(Arc::new(ScriptRunner::new(script, sender)))
        }
        None => None,
    };

    let host = platform_host().context("input hooks are not available")?;
    let bridge = Arc::new(InputBridge::new(host));

    // ── Pump thread ────────────────────────────────────────────────────────────
    let pump = {
        let bridge = Arc::clone(&bridge);
        std::thread::Builder::new()
            .name("keybridge-pump".into())
            .spawn(move || bridge.start())
            .context("failed to spawn pump thread")?
    };

    // ── Ctrl-C handler ─────────────────────────────────────────────────────────
    let signal_task = {
        let bridge = Arc::clone(&bridge);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received");
                bridge.stop();
            }
        })
    };

    // ── Script thread ──────────────────────────────────────────────────────────
    let script = match &runner {
        Some(runner) => {
            let runner = Arc::clone(runner);
            let handle = std::thread::Builder::new()
                .name("keybridge-script".into())
                .spawn(move || runner.run())
                .context("failed to spawn script thread")?;
            Some(handle)
        }
        None => None,
    };
    let script_inbox = runner.as_ref().map(|r| r.inbox());

    info!(
        stop = %config.bridge.stop_key,
        clipboard = %config.bridge.clipboard_key,
        "KeyBridge ready.  Press the stop key or Ctrl-C to exit."
    );

    // ── Consumer ───────────────────────────────────────────────────────────────
    let stats = {
        let bridge = Arc::clone(&bridge);
        let script_inbox = script_inbox.clone();
        tokio::task::spawn_blocking(move || {
            ConsumerLoop::new(&bridge, bindings, Arc::new(SystemClipboard)).run(
                |consumed| match consumed {
                    Consumed::Input(event) => {
                        info!(code = event.code, action = ?event.action, "input");
                        if let Some(inbox) = &script_inbox {
                            inbox.deposit(event);
                        }
                    }
                    Consumed::Clipboard(text) => info!(%text, "clipboard"),
                },
            )
        })
        .await
        .context("consumer task failed")?
    };

    // The consumer only ends once the bridge has shut down; make sure the pump follows.
    bridge.stop();
    signal_task.abort();

    if let Some(inbox) = &script_inbox {
        inbox.signal_shutdown();
    }
    if let Some(handle) = script {
        let run = tokio::task::spawn_blocking(move || handle.join())
            .await
            .context("failed to join script thread")?
            .map_err(|_| anyhow::anyhow!("script thread panicked"))?;
        info!(
            triggered = run.triggered,
            sent = run.sent,
            failures = run.failures,
            "script finished"
        );
    }

    let pump_result = tokio::task::spawn_blocking(move || pump.join())
        .await
        .context("failed to join pump thread")?
        .map_err(|_| anyhow::anyhow!("pump thread panicked"))?;

    if stats.dropped > 0 {
        warn!(dropped = stats.dropped, "events were overwritten before they were read");
    }
    info!(
        events = stats.events,
        stopped_by_key = stats.stopped_by_binding,
        "KeyBridge stopped"
    );

    match pump_result {
        // Ctrl-C arrived before the pump thread got to install anything.
        Err(CaptureError::AlreadyStopped) => Ok(()),
        other => other.context("hook host failed"),
    }
}
