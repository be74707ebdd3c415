//! Synthetic filler jobs for runs where real providers fall short.

use chrono::{DateTime, Utc};
use jobagg_adapters::templates::ListingTemplateGenerator;
use jobagg_core::{Job, ProviderSchema, RawListing, DEFAULT_APPLY_URL, SYNTHETIC_SOURCE};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::dedup::Deduplicator;
use crate::normalize::{normalize, NormalizeContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct BackfillGenerator {
    seed: Option<u64>,
}

impl BackfillGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    /// Produces exactly `count` jobs tagged `synthetic`, skipping any title and
    /// company pair already recorded in `taken`. New keys are recorded there.
    pub fn generate(
        &self,
        keywords: &str,
        location: &str,
        count: usize,
        taken: &mut Deduplicator,
        now: DateTime<Utc>,
    ) -> Vec<Job> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut templates = ListingTemplateGenerator::new(rng, keywords, location, now, DEFAULT_APPLY_URL);
        let ctx = NormalizeContext {
            requested_location: location,
            now,
        };

        let mut out = Vec::with_capacity(count);
        let mut skipped = 0usize;
        // Template pairs are unique per sequence number, so each taken key
        // can cost at most one extra attempt.
        let attempts = count + taken.len();
        for n in 0..attempts {
            if out.len() == count {
                break;
            }
            let raw = RawListing::new(SYNTHETIC_SOURCE, ProviderSchema::Generated, now, templates.payload(n));
            let job = normalize(&raw, &ctx);
            if taken.insert(&job) {
                out.push(job);
            } else {
                skipped += 1;
            }
        }
        debug!(requested = count, generated = out.len(), skipped, "backfill");
        out
    }
}
