use std::net::{IpAddr, Ipv4Addr};

pub const DEFAULT_PORT: u16 = 13579;

pub fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

pub fn default_port() -> u16 {
    DEFAULT_PORT
}

pub fn default_debounce_ms() -> u64 {
    100
}

pub fn default_keep_alive_secs() -> u64 {
    15
}

pub fn default_shutdown_timeout_ms() -> u64 {
    2000
}

pub fn default_preferred_interfaces() -> Vec<String> {
    ["en0", "eth0", "wlan0"].map(String::from).to_vec()
}
