//! Match lookups and listings.
//!
//! A match id embeds its parent event id, and the partner feed serving
//! the match is the one serving that event's program. Resolving a match
//! therefore sequences a parent-event read before the partner read; the
//! index and local reads stay independent and join.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::adapter::SourceAdapter;
use crate::cache::RecordCache;
use crate::config::{AggregatorConfig, PagingConfig};
use crate::error::{Error, Result};
use crate::filter::{MatchFilter, MatchOrderField, Order};
use crate::ident::decode_id;
use crate::model::{Event, EventKey, Match, MatchKey, OpaqueId, Program};
use crate::paginate::Connection;

use super::{
    degrade, find_one_with_retry, list_reconciled, reconcile_layers, LOCAL_STORE, PARTNER_A,
    PARTNER_B, SEARCH_INDEX,
};

pub struct MatchRepository {
    index: Arc<dyn SourceAdapter<Match>>,
    partner_a: Arc<dyn SourceAdapter<Match>>,
    partner_b: Arc<dyn SourceAdapter<Match>>,
    local: Arc<dyn SourceAdapter<Match>>,
    events: Arc<dyn SourceAdapter<Event>>,
    cache: RecordCache<OpaqueId, Match>,
    retries: u32,
    paging: PagingConfig,
}

impl MatchRepository {
    pub fn new(
        config: &AggregatorConfig,
        index: Arc<dyn SourceAdapter<Match>>,
        partner_a: Arc<dyn SourceAdapter<Match>>,
        partner_b: Arc<dyn SourceAdapter<Match>>,
        local: Arc<dyn SourceAdapter<Match>>,
        events: Arc<dyn SourceAdapter<Event>>,
    ) -> Self {
        Self {
            index,
            partner_a,
            partner_b,
            local,
            events,
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
    ) -> Option<(&Arc<dyn SourceAdapter<Match>>, &'static str)> {
        match program {
            Program::Frc => Some((&self.partner_a, PARTNER_A)),
            Program::Ftc => Some((&self.partner_b, PARTNER_B)),
            Program::Jfll | Program::Fll => None,
        }
    }

    /// Resolves one match by opaque id, routing the partner read through
    /// the parent event's program.
    pub async fn get(&self, id: &OpaqueId) -> Result<Match> {
        let key: MatchKey = decode_id(id)?;
        let event_key: EventKey = decode_id(&key.event)?;
        if let Some(hit) = self.cache.get(id) {
            debug!(%id, "match served from cache");
            return Ok(hit);
        }

        let (primary, local) = tokio::join!(
            find_one_with_retry(self.index.as_ref(), &key, self.retries),
            self.local.find_one(&key),
        );
        let primary = primary.map_err(|err| Error::upstream(SEARCH_INDEX, err))?;
        let local = degrade(LOCAL_STORE, local);

        // Parent-event resolution is enrichment, not record-defining, so
        // its failures degrade like any other secondary read.
        let partner = match degrade(SEARCH_INDEX, self.events.find_one(&event_key).await)
            .and_then(|event| event.program.into_value())
        {
            Some(program) => match self.partner_for(program) {
                Some((partner, partner_name)) => {
                    degrade(partner_name, partner.find_one(&key).await)
                }
                None => None,
            },
            None => None,
        };

        let layers: Vec<Match> = [primary, partner, local].into_iter().flatten().collect();
        let merged = reconcile_layers(layers).ok_or_else(|| Error::not_found(id.as_str()))?;
        self.cache.put(id.clone(), merged.clone());
        Ok(merged)
    }

    /// Lists matches from the search index, amended by local overrides.
    pub async fn list(
        &self,
        filter: &MatchFilter,
        order: &[Order<MatchOrderField>],
        page_size: Option<u64>,
        after: Option<&str>,
    ) -> Result<Connection<Match>> {
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
