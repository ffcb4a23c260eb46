//! Pageview and unique-visitor counters.

use std::sync::Arc;

use booth_models::{VisitStats, STATS_PV_KEY, STATS_UV_KEY};

use crate::error::KvResult;
use crate::store::KvStore;

#[derive(Clone)]
pub struct VisitCounter {
    kv: Arc<dyn KvStore>,
}

impl VisitCounter {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Count one pageview from `visitor_id` and return fresh readings.
    pub async fn record(&self, visitor_id: &str) -> KvResult<VisitStats> {
        let pv = self.kv.incr(STATS_PV_KEY).await?;
        self.kv.pfadd(STATS_UV_KEY, visitor_id).await?;
        let uv = self.kv.pfcount(STATS_UV_KEY).await?;
        Ok(VisitStats { pv, uv })
    }

    /// Current readings without counting anything.
    pub async fn read(&self) -> KvResult<VisitStats> {
        let (pv, uv) = tokio::try_join!(self.kv.get_u64(STATS_PV_KEY), self.kv.pfcount(STATS_UV_KEY))?;
        Ok(VisitStats {
            pv: pv.unwrap_or(0),
            uv,
        })
    }
}
