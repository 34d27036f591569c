use anyhow::{Context, Result, anyhow, bail};
use reqwest::header::HeaderMap;
use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use time::OffsetDateTime;
use time::macros::format_description;

const TRACE_DIR_NAME: &str = "course-assistant/traces";
const KIND_WIDTH: usize = 11;
const EMPTY_MARKER: &str = "<empty>";

/// Category tag written in the second column of every trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    ChatIn,
    ChatOut,
    ChatErr,
    CmdIn,
    CmdOut,
    SysInfo,
    SysErr,
    HttpReq,
    HttpRes,
    HttpErr,
}

impl TraceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChatIn => "chat.in",
            Self::ChatOut => "chat.out",
            Self::ChatErr => "chat.err",
            Self::CmdIn => "cmd.in",
            Self::CmdOut => "cmd.out",
            Self::SysInfo => "sys.info",
            Self::SysErr => "sys.err",
            Self::HttpReq => "http.req",
            Self::HttpRes => "http.res",
            Self::HttpErr => "http.err",
        }
    }
}

/// Per-session trace file. Clones append to the same file.
#[derive(Clone)]
pub struct SessionTrace {
    shared: Arc<TraceFile>,
}

struct TraceFile {
    path: PathBuf,
    file: Mutex<File>,
    warned: AtomicBool,
}

impl SessionTrace {
    pub fn create(session_id: &str) -> Result<Self> {
        Self::create_in_dir(session_id, &resolve_trace_dir_from_env()?)
    }

    pub fn create_in_dir(session_id: &str, trace_dir: &Path) -> Result<Self> {
        fs::create_dir_all(trace_dir).with_context(|| {
            format!("Failed to create trace directory {}", trace_dir.display())
        })?;

        let started = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        let path = trace_dir.join(format!("session-{session_id}-{started}.log"));
        let file = open_owner_only(&path)
            .with_context(|| format!("Failed to create trace file {}", path.display()))?;

        Ok(Self {
            shared: Arc::new(TraceFile {
                path,
                file: Mutex::new(file),
                warned: AtomicBool::new(false),
            }),
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.shared.path
    }

    /// Writes one trace line per line of `text`.
    pub fn record(&self, kind: TraceKind, text: &str) {
        let stamp = timestamp();
        let mut entry = String::new();
        let mut lines = text.lines().peekable();
        if lines.peek().is_none() {
            push_line(&mut entry, &stamp, kind, EMPTY_MARKER);
        }
        for line in lines {
            push_line(&mut entry, &stamp, kind, line);
        }
        self.append(&entry);
    }

    /// Writes a raw HTTP message: the start line, each header, then the body.
    /// Secrets are kept; the file is owner-only.
    pub fn record_http(&self, kind: TraceKind, start_line: &str, headers: &HeaderMap, body: &str) {
        let mut text = start_line.to_string();
        for (name, value) in headers {
            text.push('\n');
            text.push_str(name.as_str());
            text.push_str(": ");
            text.push_str(value.to_str().unwrap_or("<non-utf8>"));
        }
        text.push('\n');
        text.push_str(if body.is_empty() { EMPTY_MARKER } else { body });
        self.record(kind, &text);
    }

    fn append(&self, entry: &str) {
        let written = match self.shared.file.lock() {
            Ok(mut file) => file.write_all(entry.as_bytes()).map_err(|err| err.to_string()),
            Err(_) => Err("trace file lock poisoned".to_string()),
        };

        if let Err(reason) = written
            && !self.shared.warned.swap(true, Ordering::Relaxed)
        {
            eprintln!(
                "course-assistant: could not write trace {}: {reason}",
                self.shared.path.display()
            );
        }
    }
}

fn push_line(entry: &mut String, stamp: &str, kind: TraceKind, text: &str) {
    entry.push_str(&format!(
        "[{stamp}] [{:<width$}] {text}\n",
        kind.as_str(),
        width = KIND_WIDTH
    ));
}

fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        ))
        .unwrap_or_default()
}

#[cfg(unix)]
fn open_owner_only(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_owner_only(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

pub fn resolve_trace_dir_from_env() -> Result<PathBuf> {
    let state_home = env::var("XDG_STATE_HOME").ok();
    resolve_trace_dir(state_home.as_deref(), dirs::home_dir().as_deref())
}

fn resolve_trace_dir(state_home: Option<&str>, home_dir: Option<&Path>) -> Result<PathBuf> {
    let base = match state_home.map(str::trim) {
        Some("") => bail!("Failed to resolve trace path: XDG_STATE_HOME is set but empty"),
        Some(state_home) => PathBuf::from(state_home),
        None => home_dir
            .map(|home| home.join(".local").join("state"))
            .ok_or_else(|| anyhow!("Failed to resolve trace path: HOME directory is unavailable"))?,
    };
    Ok(base.join(TRACE_DIR_NAME))
}
