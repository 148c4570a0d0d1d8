use proximity_core::error::Result;
use proximity_core::models::{Coordinate, FeatureRecord};
use proximity_core::ports::{Notification, Severity};
use proximity_query::NearbyOutcome;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::state::HostState;

/// Title of plain notices about a click
pub const CLICK_TITLE: &str = "Map Click";

/// Title of the summary of matched features
pub const POPUP_TITLE: &str = "Nearby Features";

/// Answers map clicks with the features around them
///
/// Clicks are numbered. When a newer click has started by the time a query
/// finishes, its records are still returned but nothing is displayed.
#[derive(Debug)]
pub struct NearbyFeaturesService {
    state: HostState,
    latest_click: AtomicU64,
}

impl NearbyFeaturesService {
    pub fn new(state: HostState) -> Self {
        Self { state, latest_click: AtomicU64::new(0) }
    }

    pub fn state(&self) -> &HostState {
        &self.state
    }

    /// Find the features around a click given in the map's reference
    pub async fn find_nearby(&self, x: f64, y: f64) -> Result<Vec<FeatureRecord>> {
        let click = self.latest_click.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(map) = self.state.map.clone() else {
            tracing::error!("Map not available");
            self.notify(Notification::error(CLICK_TITLE, "Map extension not available"));
            return Ok(Vec::new());
        };

        let point = Coordinate::new(x, y, map.reference());
        tracing::info!(click, x, y, wkid = map.reference().wkid(), "Finding nearby features");

        let result = self.state.query.find_nearby(&point, map.layers()).await;

        let superseded = self.latest_click.load(Ordering::SeqCst) != click;
        if superseded {
            tracing::debug!(click, "Newer click in progress, not displaying result");
        }

        match result {
            Ok(NearbyOutcome::NoQueryableLayers) => {
                if !superseded {
                    self.notify(Notification::info(CLICK_TITLE, "No queryable feature layers found"));
                }
                Ok(Vec::new())
            }
            Ok(NearbyOutcome::NoFeatures(_)) => {
                if !superseded {
                    self.notify(Notification::info(
                        CLICK_TITLE,
                        format!(
                            "No features found within {} meters of the clicked location",
                            self.state.query.settings().radius_meters
                        ),
                    ));
                }
                Ok(Vec::new())
            }
            Ok(NearbyOutcome::Found(outcome)) => {
                if !superseded {
                    self.show_feature_popup(&outcome.records);
                }
                Ok(outcome.records)
            }
            Err(e) => {
                tracing::error!(error = %e, "Error in find nearby features");
                if !superseded {
                    self.notify(Notification::error(CLICK_TITLE, "Error finding nearby features"));
                }
                Err(e)
            }
        }
    }

    /// Display a bounded summary of the given records
    pub fn show_feature_popup(&self, records: &[FeatureRecord]) {
        let settings = self.state.query.settings();
        let message = self.state.query.reporter().summarize_records(records, settings.summary_max_items);
        self.notify(Notification::new(POPUP_TITLE, message, Severity::Info));
    }

    fn notify(&self, notification: Notification) {
        self.state.sink.notify(notification);
    }
}
