//! Team lookups and listings.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::adapter::SourceAdapter;
use crate::cache::RecordCache;
use crate::config::{AggregatorConfig, PagingConfig};
use crate::error::{Error, Result};
use crate::filter::{Order, TeamFilter, TeamOrderField};
use crate::ident::decode_id;
use crate::model::{OpaqueId, Program, Team, TeamKey};
use crate::paginate::Connection;

use super::{
    degrade, find_one_with_retry, list_reconciled, reconcile_layers, LOCAL_STORE, PARTNER_A,
    PARTNER_B, SEARCH_INDEX,
};

pub struct TeamRepository {
    index: Arc<dyn SourceAdapter<Team>>,
    partner_a: Arc<dyn SourceAdapter<Team>>,
    partner_b: Arc<dyn SourceAdapter<Team>>,
    local: Arc<dyn SourceAdapter<Team>>,
    cache: RecordCache<OpaqueId, Team>,
    retries: u32,
    paging: PagingConfig,
}

impl TeamRepository {
    pub fn new(
        config: &AggregatorConfig,
        index: Arc<dyn SourceAdapter<Team>>,
        partner_a: Arc<dyn SourceAdapter<Team>>,
        partner_b: Arc<dyn SourceAdapter<Team>>,
        local: Arc<dyn SourceAdapter<Team>>,
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

    /// The partner feed serving a program, when one exists. Total over
    /// the program enum: the junior programs have no partner feed.
    fn partner_for(
        &self,
        program: Program,
    ) -> Option<(&Arc<dyn SourceAdapter<Team>>, &'static str)> {
        match program {
            Program::Frc => Some((&self.partner_a, PARTNER_A)),
            Program::Ftc => Some((&self.partner_b, PARTNER_B)),
            Program::Jfll | Program::Fll => None,
        }
    }

    /// Resolves one team by opaque id, reconciling every source that
    /// serves its program.
    pub async fn get(&self, id: &OpaqueId) -> Result<Team> {
        let key: TeamKey = decode_id(id)?;
        if let Some(hit) = self.cache.get(id) {
            debug!(%id, "team served from cache");
            return Ok(hit);
        }

        let (primary, partner, local) = match self.partner_for(key.program) {
            Some((partner, partner_name)) => {
                let (p, q, l) = tokio::join!(
                    find_one_with_retry(self.index.as_ref(), &key, self.retries),
                    partner.find_one(&key),
                    self.local.find_one(&key),
                );
                (p, degrade(partner_name, q), degrade(LOCAL_STORE, l))
            }
            None => {
                let (p, l) = tokio::join!(
                    find_one_with_retry(self.index.as_ref(), &key, self.retries),
                    self.local.find_one(&key),
                );
                (p, None, degrade(LOCAL_STORE, l))
            }
        };
        let primary = primary.map_err(|err| Error::upstream(SEARCH_INDEX, err))?;

        let layers: Vec<Team> = [primary, partner, local].into_iter().flatten().collect();
        let merged = reconcile_layers(layers).ok_or_else(|| Error::not_found(id.as_str()))?;
        self.cache.put(id.clone(), merged.clone());
        Ok(merged)
    }

    /// Lists teams from the search index, amended by local overrides.
    pub async fn list(
        &self,
        filter: &TeamFilter,
        order: &[Order<TeamOrderField>],
        page_size: Option<u64>,
        after: Option<&str>,
    ) -> Result<Connection<Team>> {
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
