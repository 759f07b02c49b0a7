//! Season lookups and listings. Seasons exist only in the search index
//! and the local override store; no partner feed serves them.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::adapter::SourceAdapter;
use crate::cache::RecordCache;
use crate::config::{AggregatorConfig, PagingConfig};
use crate::error::{Error, Result};
use crate::filter::{Order, SeasonFilter, SeasonOrderField};
use crate::ident::decode_id;
use crate::model::{OpaqueId, Season, SeasonKey};
use crate::paginate::Connection;

use super::{degrade, find_one_with_retry, list_reconciled, reconcile_layers, LOCAL_STORE, SEARCH_INDEX};

pub struct SeasonRepository {
    index: Arc<dyn SourceAdapter<Season>>,
    local: Arc<dyn SourceAdapter<Season>>,
    cache: RecordCache<OpaqueId, Season>,
    retries: u32,
    paging: PagingConfig,
}

impl SeasonRepository {
    pub fn new(
        config: &AggregatorConfig,
        index: Arc<dyn SourceAdapter<Season>>,
        local: Arc<dyn SourceAdapter<Season>>,
    ) -> Self {
        Self {
            index,
            local,
            cache: RecordCache::new(
                config.cache.capacity,
                Duration::from_secs(config.cache.ttl_secs),
            ),
            retries: config.lookup.retries,
            paging: config.paging.clone(),
        }
    }

    pub async fn get(&self, id: &OpaqueId) -> Result<Season> {
        let key: SeasonKey = decode_id(id)?;
        if let Some(hit) = self.cache.get(id) {
            debug!(%id, "season served from cache");
            return Ok(hit);
        }

        let (primary, local) = tokio::join!(
            find_one_with_retry(self.index.as_ref(), &key, self.retries),
            self.local.find_one(&key),
        );
        let primary = primary.map_err(|err| Error::upstream(SEARCH_INDEX, err))?;
        let local = degrade(LOCAL_STORE, local);

        let layers: Vec<Season> = [primary, local].into_iter().flatten().collect();
        let merged = reconcile_layers(layers).ok_or_else(|| Error::not_found(id.as_str()))?;
        self.cache.put(id.clone(), merged.clone());
        Ok(merged)
    }

    pub async fn list(
        &self,
        filter: &SeasonFilter,
        order: &[Order<SeasonOrderField>],
        page_size: Option<u64>,
        after: Option<&str>,
    ) -> Result<Connection<Season>> {
        let page_size = self.paging.effective_page_size(page_size);
        list_reconciled(
            self.index.as_ref(),
            self.local.as_ref(),
            filter,
            order,
            page_size,
            after,
        )
        .await
    }
}
