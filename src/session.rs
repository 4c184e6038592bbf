use crate::comparator::Comparator;
use crate::model::{Catalog, ComparisonRequest, ComparisonResult, SessionError, FEATURE_KEY};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub const MIN_COMPARE: usize = 2;
pub const DEFAULT_MAX_COMPARE: usize = 3;

/// Guards the comparator the way the product page does: a bounded selection
/// and a single comparison in flight.
pub struct ComparisonSession {
    catalog: Arc<Catalog>,
    comparator: Comparator,
    max_compare: usize,
    in_flight: Mutex<()>,
}

impl ComparisonSession {
    pub fn new(catalog: Arc<Catalog>, comparator: Comparator, max_compare: usize) -> Self {
        Self {
            catalog,
            comparator,
            max_compare: max_compare.max(MIN_COMPARE),
            in_flight: Mutex::new(()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn max_compare(&self) -> usize {
        self.max_compare
    }

    pub fn validate(&self, request: &ComparisonRequest) -> Result<(), SessionError> {
        let selected = request.ids.len();
        if selected < MIN_COMPARE {
            return Err(SessionError::TooFewProducts { selected, min: MIN_COMPARE });
        }
        if selected > self.max_compare {
            return Err(SessionError::TooManyProducts { selected, max: self.max_compare });
        }
        if let Some(id) = request.ids.iter().find(|id| id.as_str() == FEATURE_KEY) {
            return Err(SessionError::ReservedId { id: id.clone() });
        }
        Ok(())
    }

    /// Runs one comparison; rejects the request while another is still running.
    pub async fn submit(&self, request: &ComparisonRequest) -> Result<ComparisonResult, SessionError> {
        if let Err(e) = self.validate(request) {
            warn!("Rejected comparison: {}", e);
            return Err(e);
        }

        let _guard = match self.in_flight.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("Rejected comparison: {}", SessionError::Busy);
                return Err(SessionError::Busy);
            }
        };

        info!("Submitting comparison of {:?}", request.ids);
        Ok(self.comparator.compare(request, &self.catalog).await)
    }
}
