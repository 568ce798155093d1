use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct HttpConfig
{
	/// The IP address the server should listen on.
	#[serde(default = "default_ip_addr")]
	pub ip_addr: IpAddr,

	/// The port the server should listen on.
	#[serde(default = "default_port")]
	pub port: u16,

	/// How long in-flight requests get to finish after we were told to shut
	/// down (in seconds).
	#[serde(default = "default_shutdown_timeout", deserialize_with = "deserialize_duration")]
	pub shutdown_timeout: Duration,
}

impl HttpConfig
{
	pub fn socket_addr(&self) -> SocketAddr
	{
		SocketAddr::new(self.ip_addr, self.port)
	}
}

impl Default for HttpConfig
{
	fn default() -> Self
	{
		Self {
			ip_addr: default_ip_addr(),
			port: default_port(),
			shutdown_timeout: default_shutdown_timeout(),
		}
	}
}

fn default_ip_addr() -> IpAddr
{
	IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16
{
	3000
}

fn default_shutdown_timeout() -> Duration
{
	Duration::from_secs(10)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
	D: Deserializer<'de>,
{
	f64::deserialize(deserializer).map(Duration::from_secs_f64)
}
