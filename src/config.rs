use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_yaml_bw::Value;

fn default_tool() -> String {
    "wget".to_string()
}

fn default_true() -> bool {
    true
}

/// Top-level configuration document, read once at startup and immutable for
/// the rest of the run. Deliberately not `Debug`: the raw host entries carry
/// plaintext passwords.
#[derive(Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub debug: bool,
    /// External mirroring tool, resolved via PATH or given as an absolute
    /// path.
    #[serde(default = "default_tool")]
    pub tool: String,
    // Host entries stay loosely typed; each one is converted on its own so a
    // malformed host fails alone instead of sinking the whole document.
    #[serde(default)]
    pub hosts: Vec<Value>,
}

impl GlobalConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::parse_str(&text)
            .with_context(|| format!("cannot parse config file {}", path.display()))
    }

    pub fn parse_str(text: &str) -> Result<Self> {
        Ok(serde_yaml_bw::from_str(text)?)
    }

    /// Whether any flag, global or per-host, asks for DEBUG-level logging.
    pub fn wants_debug(&self) -> bool {
        self.verbose
            || self.debug
            || self
                .hosts
                .iter()
                .any(|h| host_flag(h, "verbose") || host_flag(h, "debug"))
    }

    /// Convert every host entry, pairing each with a label usable in error
    /// messages even when the entry itself is malformed.
    pub fn parse_hosts(&self) -> Vec<(String, Result<HostJob>)> {
        self.hosts
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let label = value
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("host #{}", i + 1));
                (label, HostJob::from_value(value, self))
            })
            .collect()
    }
}

fn host_flag(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

// Wire shape of one host entry. Absent per-host flags mean "inherit the
// global value", which is why they are Option here and plain bool on HostJob.
#[derive(Deserialize)]
struct HostDoc {
    name: String,
    host: String,
    username: String,
    password: String,
    remote_dir: String,
    local_dir: PathBuf,
    #[serde(default = "default_true")]
    recursive: bool,
    #[serde(default)]
    exclude: Vec<String>,
    verbose: Option<bool>,
    debug: Option<bool>,
}

/// One configured mirroring task: a single remote endpoint and its local
/// target, read-only once built.
#[derive(Clone)]
pub struct HostJob {
    pub name: String,
    pub host: String,
    pub username: String,
    pub password: String,
    pub remote_dir: String,
    pub local_dir: PathBuf,
    pub recursive: bool,
    pub exclude: Vec<String>,
    pub verbose: bool,
    pub debug: bool,
}

impl HostJob {
    /// Build a job from a loosely typed host entry. A missing required field
    /// is an error for this host only; the caller logs it and moves on.
    pub fn from_value(value: &Value, global: &GlobalConfig) -> Result<Self> {
        let doc: HostDoc = serde_yaml_bw::from_value(value.clone())
            .context("host entry is missing a required field or has a wrong type")?;
        Ok(HostJob {
            verbose: doc.verbose.unwrap_or(global.verbose),
            debug: doc.debug.unwrap_or(global.debug),
            name: doc.name,
            host: doc.host,
            username: doc.username,
            password: doc.password,
            remote_dir: doc.remote_dir,
            local_dir: doc.local_dir,
            recursive: doc.recursive,
            exclude: doc.exclude,
        })
    }
}

// The password must never leak through a Debug rendering.
impl std::fmt::Debug for HostJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostJob")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &crate::mirror::MASK)
            .field("remote_dir", &self.remote_dir)
            .field("local_dir", &self.local_dir)
            .field("recursive", &self.recursive)
            .field("exclude", &self.exclude)
            .field("verbose", &self.verbose)
            .field("debug", &self.debug)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_HOST: &str = r#"
hosts:
  - name: acme
    host: ftp.acme.example
    username: sync
    password: s3cret
    remote_dir: /outbound
    local_dir: /srv/mirror/acme
"#;

    #[test]
    fn optional_fields_take_defaults() {
        let cfg = GlobalConfig::parse_str(MINIMAL_HOST).unwrap();
        assert!(!cfg.verbose);
        assert!(!cfg.debug);
        assert_eq!(cfg.tool, "wget");
        let hosts = cfg.parse_hosts();
        assert_eq!(hosts.len(), 1);
        let job = hosts[0].1.as_ref().unwrap();
        assert!(job.recursive);
        assert!(job.exclude.is_empty());
        assert!(!job.verbose);
        assert!(!job.debug);
    }

    #[test]
    fn per_host_flags_override_global() {
        let text = r#"
verbose: true
hosts:
  - name: quiet
    host: h1
    username: u
    password: p
    remote_dir: /d
    local_dir: /tmp/q
    verbose: false
  - name: inherits
    host: h2
    username: u
    password: p
    remote_dir: /d
    local_dir: /tmp/i
"#;
        let cfg = GlobalConfig::parse_str(text).unwrap();
        let hosts = cfg.parse_hosts();
        assert!(!hosts[0].1.as_ref().unwrap().verbose);
        assert!(hosts[1].1.as_ref().unwrap().verbose);
    }

    #[test]
    fn wants_debug_sees_per_host_flags() {
        let text = r#"
hosts:
  - name: noisy
    host: h
    username: u
    password: p
    remote_dir: /d
    local_dir: /tmp/n
    debug: true
"#;
        let cfg = GlobalConfig::parse_str(text).unwrap();
        assert!(cfg.wants_debug());
        let quiet = GlobalConfig::parse_str(MINIMAL_HOST).unwrap();
        assert!(!quiet.wants_debug());
    }

    #[test]
    fn debug_rendering_masks_password() {
        let cfg = GlobalConfig::parse_str(MINIMAL_HOST).unwrap();
        let job = cfg.parse_hosts().remove(0).1.unwrap();
        let rendered = format!("{:?}", job);
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains(crate::mirror::MASK));
    }
}
