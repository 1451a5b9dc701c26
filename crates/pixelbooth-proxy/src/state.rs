use std::sync::Arc;

use super::{config::Config, upstream::PixelMeClient};

pub struct AppState {
    pub client: PixelMeClient,
}

impl AppState {
    pub fn new(config: &Config) -> Arc<Self> {
        Arc::new(Self {
            client: PixelMeClient::new(&config.upstream),
        })
    }
}
