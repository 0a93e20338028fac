use std::{
    env,
    fmt::Display,
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
    str::FromStr,
};

use waypoints::controller::ControllerSettings;

pub const BIND_ADDRESS: &str = "WAYPOINTS_BIND_ADDRESS";
pub const STATIC_DIR: &str = "WAYPOINTS_STATIC_DIR";
pub const DUPLICATE_POLICY: &str = "WAYPOINTS_DUPLICATE_POLICY";
pub const REQUIRE_CATEGORY: &str = "WAYPOINTS_REQUIRE_CATEGORY";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub static_dir: PathBuf,
    pub controller: ControllerSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)),
            static_dir: PathBuf::from("./resources/www/"),
            controller: ControllerSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the server configuration from the environment. Unset variables
    /// keep their defaults, invalid ones are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            bind_address: parse_or(&lookup, BIND_ADDRESS, defaults.bind_address),
            static_dir: lookup(STATIC_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            controller: ControllerSettings {
                policy: parse_or(&lookup, DUPLICATE_POLICY, defaults.controller.policy),
                require_category: lookup(REQUIRE_CATEGORY)
                    .map(|value| match parse_flag(&value) {
                        Some(flag) => flag,
                        None => {
                            log::warn!(
                                "ignoring {}={:?}, expected true or false",
                                REQUIRE_CATEGORY,
                                value
                            );
                            defaults.controller.require_category
                        }
                    })
                    .unwrap_or(defaults.controller.require_category),
            },
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => value.trim().parse().unwrap_or_else(|why| {
            log::warn!("ignoring {}={:?}: {}", key, value, why);
            default
        }),
        None => default,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
