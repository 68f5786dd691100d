//! The dashboard's live chart: a fixed-capacity window of the most recent readings, filled by a
//! background poller.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use heapless::Deque;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::resample::Sample;
use crate::store::ReadingStore;

/// Readings kept on the live chart.
pub const LIVE_CAPACITY: usize = 60;

pub type DashboardWindow = LiveWindow<LIVE_CAPACITY>;

/// Rolling window over the last `N` readings.
///
/// Timestamps must be strictly increasing. Pushing into a full window drops the oldest reading.
///
/// # Examples
///
/// ```rust
/// use chrono::{Duration, TimeZone, Utc};
/// use thermoview::live::LiveWindow;
/// use thermoview::resample::Sample;
///
/// let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let mut window: LiveWindow<2> = LiveWindow::new();
///
/// assert!(window.push(Sample::new(t0, 20.0)));
/// assert!(window.push(Sample::new(t0 + Duration::seconds(10), 20.5)));
/// assert!(window.push(Sample::new(t0 + Duration::seconds(20), 21.0))); // evicts t0
/// assert!(!window.push(Sample::new(t0, 19.0)));                        // not monotonic
///
/// assert_eq!(window.oldest().map(|s| s.temperature), Some(20.5));
/// ```
pub struct LiveWindow<const N: usize> {
    readings: Deque<Sample, N>,
}

impl<const N: usize> fmt::Debug for LiveWindow<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.readings.iter()).finish()
    }
}

impl<const N: usize> Default for LiveWindow<N> {
    fn default() -> Self {
        LiveWindow::new()
    }
}

impl<const N: usize> LiveWindow<N> {
    /// An empty window holding at most `N` readings.
    pub fn new() -> LiveWindow<N> {
        LiveWindow {
            readings: Deque::new(),
        }
    }

    /// Appends `sample`, evicting the oldest reading when full.
    ///
    /// # Returns
    ///
    /// `true` when the reading was stored. `false`, leaving the window untouched, when `sample`
    /// is not newer than the latest stored reading.
    pub fn push(&mut self, sample: Sample) -> bool {
        if let Some(latest) = self.readings.back() {
            if sample.timestamp <= latest.timestamp {
                return false;
            }
        }
        if self.readings.is_full() {
            let _ = self.readings.pop_front();
        }
        self.readings.push_back(sample).is_ok()
    }

    /// Most recent reading, the one the current-temperature card shows.
    pub fn latest(&self) -> Option<&Sample> {
        self.readings.back()
    }

    pub fn oldest(&self) -> Option<&Sample> {
        self.readings.front()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Whether the next accepted push evicts the oldest reading.
    pub fn is_full(&self) -> bool {
        self.readings.is_full()
    }

    /// Readings from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.readings.iter()
    }

    /// First and last timestamps, the live chart's x-axis bounds.
    pub fn range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.readings.front(), self.readings.back()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }

    /// Copies the readings out, oldest first, for serving to the live chart.
    pub fn to_vec(&self) -> Vec<Sample> {
        self.readings.iter().copied().collect()
    }
}

/// Periodically copies the current temperature from `store` into `window`.
///
/// Each tick records the latest stored temperature stamped with the poll time. Ticks with no
/// stored reading are skipped. The task ends when `cancel` fires.
pub fn spawn_poller(
    store: Arc<dyn ReadingStore>,
    window: Arc<Mutex<DashboardWindow>>,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = every.as_millis() as u64, "live poller started");
        let mut ticker = tokio::time::interval(every);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let Some(current) = store.latest() else {
                        debug!("no reading stored yet");
                        continue;
                    };
                    let accepted = window
                        .lock()
                        .push(Sample::new(Utc::now(), current.temperature));
                    debug!(temperature = current.temperature, accepted, "live reading");
                }
            }
        }
        info!("live poller stopped");
    })
}
