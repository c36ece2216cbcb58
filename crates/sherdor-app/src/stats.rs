//! Report page statistics: four row counts shown as cards.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use sherdor_core::error::SherdorResult;
use sherdor_core::platform::CountSource;
use sherdor_core::types::Collection;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Counts for every collection, replaced as a whole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub tovarlar: u64,
    pub zakazlar: u64,
    pub mebel: u64,
    pub kronka: u64,
}

impl StatsSnapshot {
    pub fn get(&self, collection: Collection) -> u64 {
        match collection {
            Collection::Tovarlar => self.tovarlar,
            Collection::Zakazlar => self.zakazlar,
            Collection::Mebel => self.mebel,
            Collection::Kronka => self.kronka,
        }
    }

    /// Cards in display order.
    pub fn cards(&self) -> Vec<StatCard> {
        Collection::ALL
            .iter()
            .map(|&collection| StatCard::new(collection, self.get(collection)))
            .collect()
    }
}

/// One card on the report page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: u64,
    pub description: &'static str,
}

impl StatCard {
    fn new(collection: Collection, value: u64) -> Self {
        let (title, description) = match collection {
            Collection::Tovarlar => ("Tovarlar", "Jami tovarlar soni"),
            Collection::Zakazlar => ("Zakazlar", "Jami zakazlar soni"),
            Collection::Mebel => ("Mebel", "Mebel ishlab chiqarish"),
            Collection::Kronka => ("Kronka", "Lenta ishlab chiqarish"),
        };
        Self {
            title,
            value,
            description,
        }
    }
}

impl fmt::Display for StatCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<10} {:>6}  {}", self.title, self.value, self.description)
    }
}

/// What the report page renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsView {
    pub snapshot: StatsSnapshot,
    pub loading: bool,
}

/// Refreshes the snapshot from a [`CountSource`].
#[derive(Clone)]
pub struct StatsAggregator {
    source: Arc<dyn CountSource>,
    view: Arc<RwLock<StatsView>>,
}

impl StatsAggregator {
    /// Starts empty and loading, as before the first refresh completes.
    pub fn new(source: Arc<dyn CountSource>) -> Self {
        Self {
            source,
            view: Arc::new(RwLock::new(StatsView {
                snapshot: StatsSnapshot::default(),
                loading: true,
            })),
        }
    }

    pub async fn view(&self) -> StatsView {
        *self.view.read().await
    }

    /// Count all four collections concurrently.
    pub async fn fetch_snapshot(&self) -> SherdorResult<StatsSnapshot> {
        let source = &self.source;
        let (tovarlar, zakazlar, mebel, kronka) = tokio::try_join!(
            source.count(Collection::Tovarlar),
            source.count(Collection::Zakazlar),
            source.count(Collection::Mebel),
            source.count(Collection::Kronka),
        )?;

        Ok(StatsSnapshot {
            tovarlar,
            zakazlar,
            mebel,
            kronka,
        })
    }

    /// Recount and publish.
    ///
    /// On failure the error is logged and returned, and the previous
    /// snapshot stays in place. Loading is cleared either way.
    pub async fn refresh(&self) -> SherdorResult<StatsSnapshot> {
        self.view.write().await.loading = true;

        let result = self.fetch_snapshot().await;

        let mut view = self.view.write().await;
        match &result {
            Ok(snapshot) => {
                debug!(?snapshot, "Stats refreshed");
                view.snapshot = *snapshot;
            }
            Err(e) => {
                error!(error = %e, category = e.category(), "Error fetching stats");
            }
        }
        view.loading = false;
        result
    }

    /// Refresh now, then again every time `trigger` changes.
    ///
    /// Stops when the sender is dropped.
    pub fn watch(&self, mut trigger: watch::Receiver<u64>) -> JoinHandle<()> {
        let aggregator = self.clone();
        tokio::spawn(async move {
            let _ = aggregator.refresh().await;
            while trigger.changed().await.is_ok() {
                let _ = aggregator.refresh().await;
            }
            debug!("Stats refresh trigger closed");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sherdor_core::error::SherdorError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Barrier;

    struct FakeCounts {
        counts: Mutex<HashMap<Collection, u64>>,
        failing: Mutex<Option<Collection>>,
        calls: AtomicUsize,
    }

    impl FakeCounts {
        fn new(counts: [(Collection, u64); 4]) -> Arc<Self> {
            Arc::new(Self {
                counts: Mutex::new(counts.into_iter().collect()),
                failing: Mutex::new(None),
                calls: AtomicUsize::new(0),
            })
        }

        fn fail(&self, collection: Collection) {
            *self.failing.lock().unwrap() = Some(collection);
        }

        fn set(&self, collection: Collection, value: u64) {
            self.counts.lock().unwrap().insert(collection, value);
        }
    }

    #[async_trait]
    impl CountSource for FakeCounts {
        async fn count(&self, collection: Collection) -> SherdorResult<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if *self.failing.lock().unwrap() == Some(collection) {
                return Err(SherdorError::data_store(format!("{collection} unavailable")));
            }
            Ok(self.counts.lock().unwrap()[&collection])
        }
    }

    fn sample() -> Arc<FakeCounts> {
        FakeCounts::new([
            (Collection::Tovarlar, 5),
            (Collection::Zakazlar, 3),
            (Collection::Mebel, 7),
            (Collection::Kronka, 2),
        ])
    }

    #[tokio::test]
    async fn test_refresh_publishes_all_counts() {
        let stats = StatsAggregator::new(sample());
        assert!(stats.view().await.loading);

        stats.refresh().await.unwrap();

        let view = stats.view().await;
        assert!(!view.loading);
        assert_eq!(
            view.snapshot,
            StatsSnapshot {
                tovarlar: 5,
                zakazlar: 3,
                mebel: 7,
                kronka: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let source = sample();
        let stats = StatsAggregator::new(source.clone());
        let before = stats.refresh().await.unwrap();

        source.set(Collection::Tovarlar, 50);
        source.fail(Collection::Mebel);
        assert!(stats.refresh().await.is_err());

        let view = stats.view().await;
        assert_eq!(view.snapshot, before);
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn test_first_refresh_failure_clears_loading() {
        let source = sample();
        source.fail(Collection::Kronka);
        let stats = StatsAggregator::new(source);

        assert!(stats.refresh().await.is_err());
        let view = stats.view().await;
        assert_eq!(view.snapshot, StatsSnapshot::default());
        assert!(!view.loading);
    }

    struct BarrierCounts {
        barrier: Barrier,
    }

    #[async_trait]
    impl CountSource for BarrierCounts {
        async fn count(&self, _collection: Collection) -> SherdorResult<u64> {
            // Completes only once all four queries are in flight together.
            self.barrier.wait().await;
            Ok(1)
        }
    }

    #[tokio::test]
    async fn test_queries_run_concurrently() {
        let stats = StatsAggregator::new(Arc::new(BarrierCounts {
            barrier: Barrier::new(4),
        }));

        let snapshot = tokio::time::timeout(Duration::from_secs(5), stats.refresh())
            .await
            .expect("queries were issued sequentially")
            .unwrap();
        assert_eq!(snapshot.cards().iter().map(|c| c.value).sum::<u64>(), 4);
    }

    #[tokio::test]
    async fn test_watch_refreshes_on_trigger() {
        let source = sample();
        let stats = StatsAggregator::new(source.clone());
        let (tx, rx) = watch::channel(0u64);

        let handle = stats.watch(rx);
        tokio::time::timeout(Duration::from_secs(5), async {
            while source.calls.load(Ordering::SeqCst) < 4 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        source.set(Collection::Zakazlar, 4);
        tx.send(1).unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while stats.view().await.snapshot.zakazlar != 4 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        drop(tx);
        handle.await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn test_cards() {
        let snapshot = StatsSnapshot {
            tovarlar: 5,
            zakazlar: 3,
            mebel: 7,
            kronka: 2,
        };
        let cards = snapshot.cards();
        let titles: Vec<&str> = cards.iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["Tovarlar", "Zakazlar", "Mebel", "Kronka"]);
        assert_eq!(cards[3].description, "Lenta ishlab chiqarish");
        assert_eq!(cards[2].value, 7);
        assert!(cards[0].to_string().starts_with("Tovarlar"));
    }
}
