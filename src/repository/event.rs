//! Event lookups and listings.
//!
//! Unlike teams, an event id does not carry its program; the partner
//! feed for an event is only known once the search index has answered,
//! so the partner read is sequenced behind the primary one.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::adapter::SourceAdapter;
use crate::cache::RecordCache;
use crate::config::{AggregatorConfig, PagingConfig};
use crate::error::{Error, Result};
use crate::filter::{EventFilter, EventOrderField, Order};
use crate::ident::decode_id;
use crate::model::{Event, EventKey, OpaqueId, Program};
use crate::paginate::Connection;

use super::{
    degrade, find_one_with_retry, list_reconciled, reconcile_layers, LOCAL_STORE, PARTNER_A,
    PARTNER_B, SEARCH_INDEX,
};

pub struct EventRepository {
    index: Arc<dyn SourceAdapter<Event>>,
    partner_a: Arc<dyn SourceAdapter<Event>>,
    partner_b: Arc<dyn SourceAdapter<Event>>,
    local: Arc<dyn SourceAdapter<Event>>,
    cache: RecordCache<OpaqueId, Event>,
    retries: u32,
    paging: PagingConfig,
}

impl EventRepository {
    pub fn new(
        config: &AggregatorConfig,
        index: Arc<dyn SourceAdapter<Event>>,
        partner_a: Arc<dyn SourceAdapter<Event>>,
        partner_b: Arc<dyn SourceAdapter<Event>>,
        local: Arc<dyn SourceAdapter<Event>>,
    ) -> Self {
        Self {
            index,
            partner_a,
            partner_b,
            local,
            cache: RecordCache::new(
                config.cache.capacity,
                Duration::from_secs(config.cache.ttl_secs),
            ),
            retries: config.lookup.retries,
            paging: config.paging.clone(),
        }
    }

    fn partner_for(
        &self,
        program: Program,
    ) -> Option<(&Arc<dyn SourceAdapter<Event>>, &'static str)> {
        match program {
            Program::Frc => Some((&self.partner_a, PARTNER_A)),
            Program::Ftc => Some((&self.partner_b, PARTNER_B)),
            Program::Jfll | Program::Fll => None,
        }
    }

    /// Resolves one event by opaque id. The index and local reads join;
    /// the partner read follows once the indexed program is known.
    pub async fn get(&self, id: &OpaqueId) -> Result<Event> {
        let key: EventKey = decode_id(id)?;
        if let Some(hit) = self.cache.get(id) {
            debug!(%id, "event served from cache");
            return Ok(hit);
        }

        let (primary, local) = tokio::join!(
            find_one_with_retry(self.index.as_ref(), &key, self.retries),
            self.local.find_one(&key),
        );
        let primary = primary.map_err(|err| Error::upstream(SEARCH_INDEX, err))?;
        let local = degrade(LOCAL_STORE, local);

        let partner = match primary.as_ref().and_then(|event| event.program.value()) {
            Some(&program) => match self.partner_for(program) {
                Some((partner, partner_name)) => {
                    degrade(partner_name, partner.find_one(&key).await)
                }
                None => None,
            },
            None => None,
        };

        let layers: Vec<Event> = [primary, partner, local].into_iter().flatten().collect();
        let merged = reconcile_layers(layers).ok_or_else(|| Error::not_found(id.as_str()))?;
        self.cache.put(id.clone(), merged.clone());
        Ok(merged)
    }

    /// Lists events from the search index, amended by local overrides.
    pub async fn list(
        &self,
        filter: &EventFilter,
        order: &[Order<EventOrderField>],
        page_size: Option<u64>,
        after: Option<&str>,
    ) -> Result<Connection<Event>> {
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
