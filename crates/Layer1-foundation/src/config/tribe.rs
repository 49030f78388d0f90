//! Tribe Config - 클러스터 멤버십 설정
//!
//! Catalog는 이 설정을 읽지 않는다. 멤버십 계층이 사용.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::sync::OnceLock;
use tracing::debug;

const DEFAULT_BIND_PORT: u16 = 6000;
const DEFAULT_PUSH_PULL_INTERVAL_SECS: u64 = 300;
const DEFAULT_REST_API_PROTO: &str = "http";
const DEFAULT_REST_API_PORT: u16 = 8181;
const LOOPBACK: &str = "127.0.0.1";

/// 클러스터 멤버십 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TribeConfig {
    /// 노드 이름 (기본: hostname, 실패 시 UUID)
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub enable: bool,

    /// 바인드 주소 (기본: 첫 번째 non-loopback IPv4)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// 합류할 기존 멤버 주소
    #[serde(default)]
    pub seed: String,

    #[serde(default = "default_push_pull_interval")]
    pub push_pull_interval_secs: u64,

    #[serde(default = "default_rest_api_proto")]
    pub rest_api_proto: String,

    #[serde(default = "default_rest_api_port")]
    pub rest_api_port: u16,

    #[serde(default, skip_serializing)]
    pub rest_api_password: String,

    #[serde(default = "default_true")]
    pub rest_api_insecure_skip_verify: bool,
}

impl Default for TribeConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            enable: false,
            bind_addr: default_bind_addr(),
            bind_port: DEFAULT_BIND_PORT,
            seed: String::new(),
            push_pull_interval_secs: DEFAULT_PUSH_PULL_INTERVAL_SECS,
            rest_api_proto: default_rest_api_proto(),
            rest_api_port: DEFAULT_REST_API_PORT,
            rest_api_password: String::new(),
            rest_api_insecure_skip_verify: true,
        }
    }
}

impl TribeConfig {
    pub(crate) fn merge(&mut self, other: TribeConfig) {
        let host = host_defaults();

        if other.name != host.name {
            self.name = other.name;
        }
        if other.enable {
            self.enable = true;
        }
        if other.bind_addr != host.bind_addr {
            self.bind_addr = other.bind_addr;
        }
        if other.bind_port != DEFAULT_BIND_PORT {
            self.bind_port = other.bind_port;
        }
        if !other.seed.is_empty() {
            self.seed = other.seed;
        }
        if other.push_pull_interval_secs != DEFAULT_PUSH_PULL_INTERVAL_SECS {
            self.push_pull_interval_secs = other.push_pull_interval_secs;
        }
        if other.rest_api_proto != DEFAULT_REST_API_PROTO {
            self.rest_api_proto = other.rest_api_proto;
        }
        if other.rest_api_port != DEFAULT_REST_API_PORT {
            self.rest_api_port = other.rest_api_port;
        }
        if !other.rest_api_password.is_empty() {
            self.rest_api_password = other.rest_api_password;
        }
        if !other.rest_api_insecure_skip_verify {
            self.rest_api_insecure_skip_verify = false;
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// 호스트에서 얻는 기본값 (프로세스당 한 번 계산)
struct HostDefaults {
    name: String,
    bind_addr: String,
}

static HOST_DEFAULTS: OnceLock<HostDefaults> = OnceLock::new();

fn host_defaults() -> &'static HostDefaults {
    HOST_DEFAULTS.get_or_init(|| HostDefaults {
        name: lookup_name(),
        bind_addr: lookup_bind_addr(),
    })
}

fn default_name() -> String {
    host_defaults().name.clone()
}

fn default_bind_addr() -> String {
    host_defaults().bind_addr.clone()
}

fn lookup_name() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            debug!("hostname lookup failed, using random name: {}", e);
            uuid::Uuid::new_v4().to_string()
        }
    }
}

/// 외부로 나가는 IPv4 주소 탐색 (UDP connect는 패킷을 보내지 않음)
fn lookup_bind_addr() -> String {
    let probe = || -> std::io::Result<IpAddr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect((Ipv4Addr::new(192, 0, 2, 1), 9))?;
        Ok(socket.local_addr()?.ip())
    };

    match probe() {
        Ok(IpAddr::V4(ip)) if !ip.is_loopback() && !ip.is_unspecified() => ip.to_string(),
        Ok(_) => LOOPBACK.to_string(),
        Err(e) => {
            debug!("bind address lookup failed, using loopback: {}", e);
            LOOPBACK.to_string()
        }
    }
}

fn default_bind_port() -> u16 {
    DEFAULT_BIND_PORT
}

fn default_push_pull_interval() -> u64 {
    DEFAULT_PUSH_PULL_INTERVAL_SECS
}

fn default_rest_api_proto() -> String {
    DEFAULT_REST_API_PROTO.to_string()
}

fn default_rest_api_port() -> u16 {
    DEFAULT_REST_API_PORT
}

fn default_true() -> bool {
    true
}
