//! Generative sources that mimic the listing style of large job boards.
//! Nothing is fetched; postings come from [`crate::templates`].

use async_trait::async_trait;
use jobagg_core::{ProviderSchema, RawListing};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::templates::ListingTemplateGenerator;
use crate::{AdapterContext, AdapterError, FetchQuery, SourceAdapter, SourceDescriptor, SourceKind};

pub const LINKEDIN_SOURCE_ID: &str = "linkedin-style";
pub const INDEED_SOURCE_ID: &str = "indeed-style";

pub const LINKEDIN_DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    source_id: LINKEDIN_SOURCE_ID,
    kind: SourceKind::Generative,
    default_priority: 90,
    expected_yield: 10,
};

pub const INDEED_DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    source_id: INDEED_SOURCE_ID,
    kind: SourceKind::Generative,
    default_priority: 95,
    expected_yield: 10,
};

pub struct StyleGeneratorAdapter {
    descriptor: SourceDescriptor,
    search_url: &'static str,
    seed: Option<u64>,
}

impl StyleGeneratorAdapter {
    pub fn linkedin(seed: Option<u64>) -> Self {
        Self {
            descriptor: LINKEDIN_DESCRIPTOR,
            search_url: "https://www.linkedin.com/jobs/search/",
            seed: seed.map(|s| s ^ 0x4c49_4e4b),
        }
    }

    pub fn indeed(seed: Option<u64>) -> Self {
        Self {
            descriptor: INDEED_DESCRIPTOR,
            search_url: "https://www.indeed.com/jobs",
            seed: seed.map(|s| s ^ 0x494e_4445),
        }
    }

    fn apply_url(&self, query: &FetchQuery) -> String {
        let keywords = query.keywords.split_whitespace().collect::<Vec<_>>().join("+");
        match self.descriptor.source_id {
            INDEED_SOURCE_ID => format!("{}?q={keywords}", self.search_url),
            _ => format!("{}?keywords={keywords}", self.search_url),
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[async_trait]
impl SourceAdapter for StyleGeneratorAdapter {
    fn descriptor(&self) -> SourceDescriptor {
        self.descriptor
    }

    async fn fetch(&self, ctx: &AdapterContext, query: &FetchQuery) -> Result<Vec<RawListing>, AdapterError> {
        let count = query.limit.min(self.descriptor.expected_yield);
        let mut generator = ListingTemplateGenerator::new(
            self.rng(),
            &query.keywords,
            &query.location,
            ctx.requested_at,
            self.apply_url(query),
        );
        let listings: Vec<RawListing> = (0..count)
            .map(|n| {
                RawListing::new(
                    self.descriptor.source_id,
                    ProviderSchema::Generated,
                    ctx.requested_at,
                    generator.payload(n),
                )
            })
            .collect();
        debug!(source_id = self.descriptor.source_id, count = listings.len(), "generated listings");
        Ok(listings)
    }
}
