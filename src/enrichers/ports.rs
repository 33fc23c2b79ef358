//! Port discovery from Dockerfiles, compose files and sources

use crate::detection::{DetectionSettings, PortDetectionStrategy};
use crate::fs::FileSystem;
use regex::Regex;
use serde_yaml::Value;
use std::path::{Component as PathPart, Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

const DOCKERFILE_NAMES: &[&str] = &["Dockerfile", "Containerfile", "dockerfile", "containerfile"];
const COMPOSE_NAMES: &[&str] = &[
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

pub fn is_valid_port(port: u32) -> bool {
    port > 0 && port < 65535
}

pub(crate) fn dedup(ports: Vec<u16>) -> Vec<u16> {
    let mut out = Vec::with_capacity(ports.len());
    for port in ports {
        if !out.contains(&port) {
            out.push(port);
        }
    }
    out
}

fn parse_port(text: &str) -> Option<u16> {
    text.trim()
        .parse::<u32>()
        .ok()
        .filter(|p| is_valid_port(*p))
        .map(|p| p as u16)
}

pub(crate) fn ports_from_captures(pattern: &Regex, content: &str) -> Vec<u16> {
    pattern
        .captures_iter(content)
        .filter_map(|cap| cap.get(1).and_then(|m| parse_port(m.as_str())))
        .collect()
}

/// Runs the configured strategies in order and keeps the first non-empty result
pub fn detect_ports<F>(fs: &dyn FileSystem, dir: &Path, settings: &DetectionSettings, source: F) -> Vec<u16>
where
    F: FnOnce() -> Vec<u16>,
{
    let mut source = Some(source);
    for strategy in &settings.port_detection_strategy {
        let ports = match strategy {
            PortDetectionStrategy::DockerFile => dockerfile_ports(fs, dir),
            PortDetectionStrategy::Compose => compose_ports(fs, &settings.base_path, dir),
            PortDetectionStrategy::Source => source.take().map(|f| f()).unwrap_or_default(),
        };
        if !ports.is_empty() {
            debug!(path = %dir.display(), ?strategy, ?ports, "Detected component ports");
            return ports;
        }
    }
    Vec::new()
}

fn expose_regex() -> &'static Regex {
    static EXPOSE: OnceLock<Regex> = OnceLock::new();
    EXPOSE.get_or_init(|| Regex::new(r"(?mi)^\s*EXPOSE\s+(.+)$").expect("valid regex"))
}

/// Ports declared by `EXPOSE` in the first Dockerfile found at `dir` or one level below
pub fn dockerfile_ports(fs: &dyn FileSystem, dir: &Path) -> Vec<u16> {
    let Some(dockerfile) = locate_dockerfile(fs, dir) else {
        return Vec::new();
    };
    let content = match fs.read_to_string(&dockerfile) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %dockerfile.display(), error = %e, "Failed to read Dockerfile");
            return Vec::new();
        }
    };

    let mut ports = Vec::new();
    for cap in expose_regex().captures_iter(&content) {
        let Some(args) = cap.get(1) else { continue };
        for token in args.as_str().split_whitespace() {
            let number = token.split('/').next().unwrap_or(token);
            if let Some(port) = parse_port(number) {
                ports.push(port);
            }
        }
    }
    dedup(ports)
}

fn locate_dockerfile(fs: &dyn FileSystem, dir: &Path) -> Option<PathBuf> {
    let direct = DOCKERFILE_NAMES.iter().map(|n| dir.join(n)).find(|p| fs.is_file(p));
    if direct.is_some() {
        return direct;
    }

    let entries = fs.read_dir(dir).ok()?;
    entries
        .iter()
        .filter(|e| e.is_dir() && !e.file_name().starts_with('.'))
        .flat_map(|e| DOCKERFILE_NAMES.iter().map(move |n| e.path().join(n)))
        .find(|p| fs.is_file(p))
}

/// Ports of the compose service whose build context is `dir`.
///
/// Compose files are looked up at `base_path` first, then at `dir`.
pub fn compose_ports(fs: &dyn FileSystem, base_path: &Path, dir: &Path) -> Vec<u16> {
    for location in [base_path, dir] {
        let Some(compose) = COMPOSE_NAMES.iter().map(|n| location.join(n)).find(|p| fs.is_file(p)) else {
            continue;
        };
        let content = match fs.read_to_string(&compose) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %compose.display(), error = %e, "Failed to read compose file");
                continue;
            }
        };
        let document: Value = match serde_yaml::from_str(&content) {
            Ok(v) => v,
            Err(e) => {
                warn!(path = %compose.display(), error = %e, "Failed to parse compose file");
                continue;
            }
        };

        let ports = service_ports(&document, location, dir);
        if !ports.is_empty() {
            return ports;
        }
    }
    Vec::new()
}

fn service_ports(document: &Value, compose_dir: &Path, dir: &Path) -> Vec<u16> {
    let Some(services) = document.get("services").and_then(Value::as_mapping) else {
        return Vec::new();
    };

    let target = normalize(dir);
    let mut ports = Vec::new();
    for service in services.values() {
        let build = match service.get("build") {
            Some(Value::String(context)) => Some(context.as_str()),
            Some(b) => b.get("context").and_then(Value::as_str),
            None => None,
        };
        let Some(build) = build else { continue };
        if normalize(&compose_dir.join(build)) != target {
            continue;
        }

        if let Some(entries) = service.get("ports").and_then(Value::as_sequence) {
            ports.extend(entries.iter().filter_map(published_target));
        }
        if let Some(entries) = service.get("expose").and_then(Value::as_sequence) {
            ports.extend(entries.iter().filter_map(scalar_port));
        }
    }
    dedup(ports)
}

fn short_syntax_regex() -> &'static Regex {
    static SHORT: OnceLock<Regex> = OnceLock::new();
    SHORT.get_or_init(|| Regex::new(r"(\d+)/*\w*$").expect("valid regex"))
}

/// Container-side port of a `ports` entry in short or long syntax
fn published_target(entry: &Value) -> Option<u16> {
    match entry {
        Value::String(s) => short_syntax_regex()
            .captures(s)
            .and_then(|c| c.get(1))
            .and_then(|m| parse_port(m.as_str())),
        Value::Number(_) => scalar_port(entry),
        Value::Mapping(_) => entry.get("target").and_then(scalar_port),
        _ => None,
    }
}

fn scalar_port(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .filter(|p| *p < u64::from(u32::MAX) && is_valid_port(*p as u32))
            .map(|p| p as u16),
        Value::String(s) => parse_port(s.split('/').next().unwrap_or(s)),
        _ => None,
    }
}

/// Lexical cleanup of `.` and `..` segments
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for part in path.components() {
        match part {
            PathPart::CurDir => {}
            PathPart::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
