//! YTDesktop RPC Server: newline-delimited JSON over stdin/stdout for the
//! host shell.
//!
//! Request:  {"id":1, "method":"tab.add", "params":{"url":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! The host owns the web views. It reports on them with `view.event` and
//! `view.script_result`, and receives `{"event":"view.command", ...}` lines
//! telling it what to create, navigate, zoom, evaluate or destroy.
//!
//! Logs go to stderr; stdout carries protocol lines only.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};

use ytdesktop::app::App;
use ytdesktop::rpc_handler::{handle_method, handle_view_method};
use ytdesktop::view::remote_surface::{RemoteSurfaceFactory, ViewCommand};

use serde_json::{json, Value};

/// Fixed-window rate limiter over all methods.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self {
            window_start: Instant::now(),
            request_count: 0,
            max_per_second,
        }
    }

    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn emit(line: &Value) {
    let mut out = std::io::stdout().lock();
    if writeln!(out, "{}", line).and_then(|_| out.flush()).is_err() {
        log::error!("stdout closed");
    }
}

fn emit_command(command: &ViewCommand) {
    let mut line = json!({"event": "view.command"});
    match (line.as_object_mut(), serde_json::to_value(command)) {
        (Some(obj), Ok(Value::Object(fields))) => obj.extend(fields),
        (_, Err(e)) => log::error!("Failed to serialize view command: {}", e),
        _ => {}
    }
    emit(&line);
}

/// Work for the main loop, which owns the view host.
enum Inbound {
    Call {
        id: Value,
        method: String,
        params: Value,
    },
    ViewsChanged,
}

/// Reads stdin. `view.*` calls are answered here so a view waiting on a
/// script result never blocks the reader; everything else goes to the main
/// loop in order.
async fn read_requests(views: Arc<RemoteSurfaceFactory>, inbound: UnboundedSender<Inbound>) {
    let mut rate_limiter = RateLimiter::new(200);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                log::warn!("stdin read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                emit(&json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };
        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            emit(&json!({"id": id, "error": "rate limit exceeded"}));
            continue;
        }

        let method = req
            .get("method")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let params = req.get("params").cloned().unwrap_or(json!({}));

        if method.starts_with("view.") {
            let response = match handle_view_method(&views, &method, &params) {
                Ok(val) => json!({"id": id, "result": val}),
                Err(err) => json!({"id": id, "error": err}),
            };
            emit(&response);
            if method == "view.event" && inbound.send(Inbound::ViewsChanged).is_err() {
                break;
            }
            continue;
        }
        if inbound.send(Inbound::Call { id, method, params }).is_err() {
            break;
        }
    }
    log::info!("stdin closed, shutting down");
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let db_path = std::env::var("YTDESKTOP_DATA_DIR")
        .ok()
        .map(|dir| std::path::PathBuf::from(dir).join("ytdesktop.db"))
        .map(|p| p.to_string_lossy().to_string());
    let settings_path = std::env::var("YTDESKTOP_SETTINGS").ok();

    let app = match App::new(db_path.as_deref(), settings_path) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Failed to initialize YTDesktop: {}", e);
            std::process::exit(1);
        }
    };

    emit(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));

    let (command_tx, mut commands) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(command) = commands.recv().await {
            emit_command(&command);
        }
    });

    let views = Arc::new(RemoteSurfaceFactory::new(command_tx));
    let mut host = app.view_host(Arc::clone(&views));

    let (inbound_tx, mut inbound) = mpsc::unbounded_channel();
    tokio::spawn(read_requests(views, inbound_tx));

    while let Some(message) = inbound.recv().await {
        if let Inbound::Call { id, method, params } = message {
            let response = match handle_method(&app, &method, &params).await {
                Ok(val) => json!({"id": id, "result": val}),
                Err(err) => {
                    log::debug!("{} failed: {}", method, err);
                    json!({"id": id, "error": err})
                }
            };
            emit(&response);

            let key = params.get("key").and_then(|v| v.as_str()).unwrap_or("");
            if method == "settings.set" && key.starts_with("navigation") {
                host.set_navigation_settings(app.settings().navigation);
            }
        }
        host.sync();
        host.dispatch_navigation();
        host.pump_events().await;
    }
}
