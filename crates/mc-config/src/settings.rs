use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use std::net::IpAddr;

/// Istio's multicluster gateway port.
const DEFAULT_GATEWAY_PORT: u16 = 15443;

/// What the CLI does when a deletion finds targets the store never held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingRealizationPolicy {
    #[default]
    Warn,
    Fail,
}

impl MissingRealizationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingRealizationPolicy::Warn => "warn",
            MissingRealizationPolicy::Fail => "fail",
        }
    }

    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "fail" => Ok(Self::Fail),
            other => bail!("reconcile.missing_realization must be 'warn' or 'fail', got '{other}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSettings {
    pub name: String,
    pub gateway_ip: IpAddr,
    pub gateway_port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerSettings {
    pub cluster: ClusterSettings,
    pub missing_realization: MissingRealizationPolicy,
    /// `EnvFilter` directive used when RUST_LOG is unset.
    pub log_filter: Option<String>,
}

impl ReconcilerSettings {
    /// Extract typed settings from a merged config. Every pointer read here is
    /// listed in `CONSUMED_POINTERS`.
    pub fn from_config_json(config: &Value) -> Result<Self> {
        let name = required_str(config, "/cluster/name")?;
        if name.trim().is_empty() {
            bail!("cluster.name must not be empty");
        }

        let gateway_ip: IpAddr = required_str(config, "/cluster/gateway_ip")?
            .parse()
            .context("cluster.gateway_ip is not an IP address")?;

        let gateway_port = match config.pointer("/cluster/gateway_port") {
            None | Some(Value::Null) => DEFAULT_GATEWAY_PORT,
            Some(v) => {
                let n = v
                    .as_u64()
                    .ok_or_else(|| anyhow!("cluster.gateway_port must be an integer"))?;
                let port = u16::try_from(n)
                    .map_err(|_| anyhow!("cluster.gateway_port out of range: {n}"))?;
                if port == 0 {
                    bail!("cluster.gateway_port must be nonzero");
                }
                port
            }
        };

        let missing_realization = match optional_str(config, "/reconcile/missing_realization")? {
            Some(raw) => MissingRealizationPolicy::parse(raw)?,
            None => MissingRealizationPolicy::default(),
        };

        let log_filter = optional_str(config, "/log/filter")?
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            cluster: ClusterSettings {
                name: name.to_string(),
                gateway_ip,
                gateway_port,
            },
            missing_realization,
            log_filter,
        })
    }
}

fn required_str<'a>(config: &'a Value, ptr: &str) -> Result<&'a str> {
    optional_str(config, ptr)?.ok_or_else(|| anyhow!("missing required config key {ptr}"))
}

fn optional_str<'a>(config: &'a Value, ptr: &str) -> Result<Option<&'a str>> {
    match config.pointer(ptr) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => bail!("config key {ptr} must be a string, got {other}"),
    }
}
