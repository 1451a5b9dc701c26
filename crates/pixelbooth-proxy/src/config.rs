use std::net::{IpAddr, Ipv4Addr};

use clap::Parser;
use pixelbooth_core::BoothVariant;
use pixelbooth_core::types::DEFAULT_ENDPOINT;

/// Forward pixelbooth detect/convert requests to the conversion service.
///
/// Every option can also be set through the environment variable shown
/// in its help text.
#[derive(Debug, Clone, Parser)]
#[command(name = "pixelbooth-proxy", version)]
pub struct Config {
    /// Address to bind.
    #[arg(long, env = "PIXELBOOTH_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "PIXELBOOTH_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Base URL of the conversion service. `detect` and `convert` are
    /// appended to it.
    #[arg(long, env = "PIXELME_API_URL")]
    pub upstream: String,

    /// Route prefix the web app posts to.
    #[arg(long, env = "PIXELBOOTH_ROUTE_PREFIX", default_value = DEFAULT_ENDPOINT)]
    pub prefix: String,

    /// Booth flavour being served; picks the default body limit.
    #[arg(long, env = "PIXELBOOTH_VARIANT", default_value_t = BoothVariant::Passport)]
    pub variant: BoothVariant,

    /// Maximum request body size in bytes, overriding the variant's
    /// default. 0 disables the limit.
    #[arg(long, env = "PIXELBOOTH_BODY_LIMIT")]
    pub body_limit: Option<usize>,
}

impl Config {
    /// The body ceiling, or `None` when unlimited.
    #[must_use]
    pub const fn body_limit(&self) -> Option<usize> {
        match self.body_limit {
            Some(0) => None,
            Some(limit) => Some(limit),
            None => self.variant.body_limit(),
        }
    }
}
