//! Client connection configuration and its textual sources.
//!
//! Two textual sources are supported: hub connection strings
//! (`HostName=...;DeviceId=...;SharedAccessKey=...`) and the edge-module
//! environment. Both resolve into a [`ClientConfig`] that a
//! transport provider turns into a live lower-layer engine.

use std::env;

use thiserror::Error;

const HOST_NAME_KEY: &str = "HostName";
const DEVICE_ID_KEY: &str = "DeviceId";
const MODULE_ID_KEY: &str = "ModuleId";
const SHARED_ACCESS_KEY_KEY: &str = "SharedAccessKey";
const SHARED_ACCESS_SIGNATURE_KEY: &str = "SharedAccessSignature";
const GATEWAY_HOST_NAME_KEY: &str = "GatewayHostName";
const X509_KEY: &str = "x509";

const ENV_CONNECTION_STRING: &str = "HUBLINK_CONNECTION_STRING";
const ENV_HOST_NAME: &str = "HUBLINK_HUB_HOSTNAME";
const ENV_DEVICE_ID: &str = "HUBLINK_DEVICE_ID";
const ENV_MODULE_ID: &str = "HUBLINK_MODULE_ID";
const ENV_GATEWAY_HOST_NAME: &str = "HUBLINK_GATEWAY_HOSTNAME";
const ENV_AUTH_SCHEME: &str = "HUBLINK_AUTH_SCHEME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("connection string is missing the `{0}` key")]
    MissingKey(&'static str),
    #[error("connection string key `{0}` appears more than once")]
    DuplicateKey(String),
    #[error("connection string segment `{0}` is not a key=value pair")]
    MalformedSegment(String),
    #[error("no authentication material (shared access key, signature or x509)")]
    MissingAuthentication,
    #[error("environment variable `{0}` is not set")]
    MissingEnvironment(&'static str),
    #[error("unsupported environment auth scheme `{0}`")]
    UnsupportedAuthScheme(String),
}

/// How the client authenticates against the hub.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthMethod {
    SharedAccessKey(String),
    SharedAccessSignature(String),
    X509,
    /// Workload-issued tokens resolved by the edge runtime; the transport
    /// provider obtains the material out of band.
    EdgeWorkload,
}

/// Resolved connection configuration for one logical device or module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub host_name: String,
    pub device_id: String,
    pub module_id: Option<String>,
    pub auth: AuthMethod,
    /// Edge gateway to connect through instead of the hub itself.
    pub gateway_host_name: Option<String>,
}

/// Per-device configuration used when attaching a client to an already
/// connected shared transport, which knows the hub on its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceConfig {
    pub device_id: String,
    pub auth: AuthMethod,
}

impl ClientConfig {
    /// Parses a `Key=Value;Key=Value` hub connection string.
    ///
    /// Values may contain `=` (shared access keys are base64); only the
    /// first `=` of a segment splits key from value.
    pub fn from_connection_string(connection_string: &str) -> Result<Self, ConfigError> {
        let mut host_name = None;
        let mut device_id = None;
        let mut module_id = None;
        let mut shared_access_key = None;
        let mut shared_access_signature = None;
        let mut gateway_host_name = None;
        let mut x509 = false;

        for segment in connection_string.split(';') {
            if segment.is_empty() {
                continue;
            }
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| ConfigError::MalformedSegment(segment.to_owned()))?;
            let slot = match key {
                HOST_NAME_KEY => &mut host_name,
                DEVICE_ID_KEY => &mut device_id,
                MODULE_ID_KEY => &mut module_id,
                SHARED_ACCESS_KEY_KEY => &mut shared_access_key,
                SHARED_ACCESS_SIGNATURE_KEY => &mut shared_access_signature,
                GATEWAY_HOST_NAME_KEY => &mut gateway_host_name,
                X509_KEY => {
                    x509 = value.eq_ignore_ascii_case("true");
                    continue;
                }
                _ => {
                    // Unknown keys are carried by some tooling; tolerated.
                    log::debug!("ignoring unknown connection string key `{key}`");
                    continue;
                }
            };
            if slot.replace(value.to_owned()).is_some() {
                return Err(ConfigError::DuplicateKey(key.to_owned()));
            }
        }

        let auth = if let Some(key) = shared_access_key {
            AuthMethod::SharedAccessKey(key)
        } else if let Some(sig) = shared_access_signature {
            AuthMethod::SharedAccessSignature(sig)
        } else if x509 {
            AuthMethod::X509
        } else {
            return Err(ConfigError::MissingAuthentication);
        };

        Ok(ClientConfig {
            host_name: host_name.ok_or(ConfigError::MissingKey(HOST_NAME_KEY))?,
            device_id: device_id.ok_or(ConfigError::MissingKey(DEVICE_ID_KEY))?,
            module_id,
            auth,
            gateway_host_name,
        })
    }

    /// Resolves the configuration of the module this process runs as, from
    /// the edge runtime's environment.
    ///
    /// A populated `HUBLINK_CONNECTION_STRING` wins (local development);
    /// the `HUBLINK_*` variable set with the `sasToken` auth scheme is the
    /// production path.
    pub fn from_environment() -> Result<Self, ConfigError> {
        if let Ok(connection_string) = env::var(ENV_CONNECTION_STRING) {
            return Self::from_connection_string(&connection_string);
        }

        let require = |name: &'static str| env::var(name).map_err(|_| ConfigError::MissingEnvironment(name));

        let scheme = require(ENV_AUTH_SCHEME)?;
        if !scheme.eq_ignore_ascii_case("sasToken") {
            return Err(ConfigError::UnsupportedAuthScheme(scheme));
        }

        Ok(ClientConfig {
            host_name: require(ENV_HOST_NAME)?,
            device_id: require(ENV_DEVICE_ID)?,
            module_id: Some(require(ENV_MODULE_ID)?),
            auth: AuthMethod::EdgeWorkload,
            gateway_host_name: env::var(ENV_GATEWAY_HOST_NAME).ok(),
        })
    }
}
