//! Cached area labels for hotspots

use crate::constants::cache::LABEL_COORD_PRECISION;
use crate::coord::Coordinates;
use crate::engine::Hotspot;
use crate::error::Result;
use crate::geo::AreaNamer;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Coordinates rounded to the label precision, as hashable integers
type LabelKey = (i64, i64);

fn label_key(center: Coordinates) -> LabelKey {
    let factor = 10f64.powi(LABEL_COORD_PRECISION);
    let rounded = center.rounded(LABEL_COORD_PRECISION);
    (
        (rounded.lat * factor).round() as i64,
        (rounded.lng * factor).round() as i64,
    )
}

/// Memoizes another namer by rounded coordinates
///
/// Successful lookups are cached, including "no name"; failures are not, so
/// they are retried on the next call.
pub struct CachedAreaNamer<N> {
    inner: N,
    cache: RwLock<HashMap<LabelKey, Option<String>>>,
}

impl<N: AreaNamer> CachedAreaNamer<N> {
    pub fn new(inner: N) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of cached lookups
    pub async fn cached(&self) -> usize {
        self.cache.read().await.len()
    }
}

impl<N: AreaNamer> AreaNamer for CachedAreaNamer<N> {
    async fn area_name(&self, center: Coordinates) -> Result<Option<String>> {
        let key = label_key(center);
        if let Some(name) = self.cache.read().await.get(&key) {
            return Ok(name.clone());
        }

        let name = self.inner.area_name(center.rounded(LABEL_COORD_PRECISION)).await?;
        self.cache.write().await.insert(key, name.clone());
        Ok(name)
    }
}

/// Fill in `label` on each hotspot
///
/// A failed lookup leaves that hotspot unlabeled and is logged. Returns the
/// number of hotspots that received a label.
pub async fn label_hotspots<N: AreaNamer>(hotspots: &mut [Hotspot], namer: &N) -> usize {
    let mut labeled = 0;

    for hotspot in hotspots.iter_mut() {
        match namer.area_name(hotspot.center).await {
            Ok(Some(name)) => {
                hotspot.label = Some(name);
                labeled += 1;
            }
            Ok(None) => debug!(id = %hotspot.id, "No area name for hotspot"),
            Err(e) => warn!(id = %hotspot.id, error = %e, "Failed to label hotspot"),
        }
    }

    labeled
}
