use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{
    config::Config,
    rate_limiter::RateLimiter,
    store::{Store, StoreError},
};

pub struct State {
    pub config: Config,
    pub store: Store,
    pub limiter: RateLimiter,
    pub started_at: DateTime<Utc>,
}

impl State {
    pub async fn new(config: Config) -> Result<Arc<Self>, StoreError> {
        let store = Store::connect(&config).await?;
        let limiter = RateLimiter::new(&config.rate_limit);

        Ok(Arc::new(Self {
            config,
            store,
            limiter,
            started_at: Utc::now(),
        }))
    }
}
