use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument};

use super::{
    client::CatalogSource,
    dto::{CatalogView, CategorySelection, MenuState, Phase, Product, ProductCard},
    offers::{enrich, OfferSource},
    sort::{sort_products, SortDirective},
};

/// Result of one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The fetched list replaced the displayed one.
    Applied(usize),
    /// A newer refresh was issued while this one was in flight.
    Stale,
    /// Fetch failed; the previous list is still displayed.
    Failed,
}

#[derive(Debug, Default)]
struct ViewState {
    category: CategorySelection,
    sort: SortDirective,
    menus: MenuState,
    categories: Vec<String>,
    products: Vec<Product>,
}

/// Counts one in-flight refresh; released on drop so a cancelled refresh
/// still returns the controller to idle.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Owns the storefront selection state and drives fetch, enrich and sort.
///
/// Locks are never held across a call to the catalog source, so
/// overlapping refreshes can run concurrently. Each refresh takes a
/// generation number and only the most recently issued one may replace
/// the product list.
pub struct CatalogController {
    source: Arc<dyn CatalogSource>,
    offers: Mutex<Box<dyn OfferSource>>,
    state: RwLock<ViewState>,
    generation: AtomicU64,
    in_flight: AtomicUsize,
}

impl CatalogController {
    pub fn new(source: Arc<dyn CatalogSource>, offers: Box<dyn OfferSource>) -> Self {
        Self {
            source,
            offers: Mutex::new(offers),
            state: RwLock::new(ViewState::default()),
            generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Initial load: categories and the default product list.
    pub async fn mount(&self) {
        let (categories, products) = tokio::join!(self.load_categories(), self.refresh());
        info!(?categories, ?products, "catalog mounted");
    }

    #[instrument(skip(self))]
    pub async fn select_category(&self, name: String) -> RefreshOutcome {
        {
            let mut st = self.state.write().await;
            st.category = CategorySelection::parse(name);
            st.menus.categories_open = false;
        }
        self.refresh().await
    }

    #[instrument(skip(self), fields(sort = %directive))]
    pub async fn select_sort(&self, directive: SortDirective) -> RefreshOutcome {
        {
            let mut st = self.state.write().await;
            st.sort = directive;
            st.menus.sort_open = false;
        }
        self.refresh().await
    }

    pub async fn toggle_category_menu(&self) -> bool {
        let mut st = self.state.write().await;
        st.menus.categories_open = !st.menus.categories_open;
        st.menus.categories_open
    }

    pub async fn toggle_sort_menu(&self) -> bool {
        let mut st = self.state.write().await;
        st.menus.sort_open = !st.menus.sort_open;
        st.menus.sort_open
    }

    /// Fetches, enriches and sorts the current selection.
    pub async fn refresh(&self) -> RefreshOutcome {
        let _in_flight = InFlight::enter(&self.in_flight);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (category, sort) = {
            let st = self.state.read().await;
            (st.category.clone(), st.sort)
        };

        let fetched = match self.source.products(&category).await {
            Ok(records) => {
                let mut products = {
                    let mut offers = self.offers.lock().await;
                    enrich(records, &mut **offers)
                };
                sort_products(&mut products, sort);
                Some(products)
            }
            Err(e) => {
                error!(error = %e, url = e.url(), category = %category.as_str(), "product fetch failed");
                None
            }
        };

        let Some(products) = fetched else {
            return RefreshOutcome::Failed;
        };
        let mut st = self.state.write().await;
        if generation != self.generation.load(Ordering::SeqCst) {
            debug!(generation, category = %category.as_str(), "discarding stale product list");
            return RefreshOutcome::Stale;
        }
        let count = products.len();
        st.products = products;
        debug!(generation, count, category = %category.as_str(), %sort, "product list updated");
        RefreshOutcome::Applied(count)
    }

    /// Loads the category catalog. Returns the number of categories, or
    /// `None` when the fetch failed and the catalog was left untouched.
    pub async fn load_categories(&self) -> Option<usize> {
        match self.source.categories().await {
            Ok(categories) => {
                let count = categories.len();
                self.state.write().await.categories = categories;
                Some(count)
            }
            Err(e) => {
                error!(error = %e, url = e.url(), "category fetch failed");
                None
            }
        }
    }

    #[cfg(test)]
    pub async fn products(&self) -> Vec<Product> {
        self.state.read().await.products.clone()
    }

    pub async fn cards(&self) -> Vec<ProductCard> {
        self.state.read().await.products.iter().map(ProductCard::from).collect()
    }

    pub async fn categories(&self) -> Vec<String> {
        self.state.read().await.categories.clone()
    }

    pub async fn snapshot(&self) -> CatalogView {
        let st = self.state.read().await;
        CatalogView {
            category: st.category.clone(),
            sort: st.sort,
            menus: st.menus,
            phase: if self.in_flight.load(Ordering::SeqCst) > 0 {
                Phase::Fetching
            } else {
                Phase::Idle
            },
            categories: st.categories.clone(),
            products: st.products.iter().map(ProductCard::from).collect(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::{
        client::FetchError,
        dto::{Offer, ProductRecord, Rating},
        offers::FixedOffers,
        sort::{SortField, SortOrder},
    };
    use async_trait::async_trait;
    use std::{
        collections::HashMap,
        io::Write,
        sync::{atomic::AtomicBool, Mutex as StdMutex},
    };
    use tokio::sync::Notify;

    pub(crate) fn record(id: i64, title: &str, price: f64, rate: f64, category: &str) -> ProductRecord {
        ProductRecord {
            id,
            title: title.into(),
            price,
            description: format!("{title} description"),
            category: category.into(),
            image: format!("https://img.local/{id}.jpg"),
            rating: Rating { rate, count: 10 },
        }
    }

    /// In-memory catalog keyed by category name.
    #[derive(Default)]
    pub(crate) struct FakeCatalog {
        pub by_category: HashMap<String, Vec<ProductRecord>>,
        pub categories: Vec<String>,
        pub fail: AtomicBool,
        pub requests: StdMutex<Vec<String>>,
        pub gate: Option<(String, Arc<Notify>, Arc<Notify>)>,
    }

    impl FakeCatalog {
        pub(crate) fn sample() -> Self {
            let men = vec![
                record(1, "Fjallraven Backpack", 109.95, 3.9, "men's clothing"),
                record(2, "Mens Casual T-Shirt", 22.3, 4.1, "men's clothing"),
            ];
            let jewelery = vec![
                record(5, "john hardy bracelet", 695.0, 4.6, "jewelery"),
                record(6, "Solid Gold Petite", 168.0, 3.9, "jewelery"),
            ];
            let all: Vec<_> = men.iter().chain(jewelery.iter()).cloned().collect();
            let mut by_category = HashMap::new();
            by_category.insert("all".to_string(), all);
            by_category.insert("men's clothing".to_string(), men);
            by_category.insert("jewelery".to_string(), jewelery);
            Self {
                by_category,
                categories: vec!["jewelery".into(), "men's clothing".into()],
                ..Default::default()
            }
        }

        fn failure(&self, what: &str) -> FetchError {
            FetchError::Parse {
                url: format!("fake://{what}"),
                source: serde_json::from_str::<Vec<ProductRecord>>("<html>").unwrap_err(),
            }
        }
    }

    #[async_trait]
    impl CatalogSource for FakeCatalog {
        async fn products(
            &self,
            category: &CategorySelection,
        ) -> Result<Vec<ProductRecord>, FetchError> {
            let name = category.as_str().to_string();
            self.requests.lock().unwrap().push(name.clone());
            if let Some((gated, started, release)) = &self.gate {
                if *gated == name {
                    started.notify_one();
                    release.notified().await;
                }
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(self.failure(&name));
            }
            Ok(self.by_category.get(&name).cloned().unwrap_or_default())
        }

        async fn categories(&self) -> Result<Vec<String>, FetchError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(self.failure("categories"));
            }
            Ok(self.categories.clone())
        }
    }

    fn controller(source: Arc<FakeCatalog>) -> CatalogController {
        CatalogController::new(source, Box::new(FixedOffers::none()))
    }

    fn ids(products: &[Product]) -> Vec<i64> {
        products.iter().map(|p| p.id).collect()
    }

    #[tokio::test]
    async fn mount_loads_categories_and_all_products_by_price() {
        let source = Arc::new(FakeCatalog::sample());
        let c = controller(source.clone());
        c.mount().await;

        assert_eq!(c.categories().await, vec!["jewelery", "men's clothing"]);
        assert_eq!(ids(&c.products().await), vec![2, 1, 6, 5]);
        assert_eq!(*source.requests.lock().unwrap(), vec!["all"]);

        let view = c.snapshot().await;
        assert_eq!(view.category, CategorySelection::All);
        assert_eq!(view.sort, SortDirective::default());
        assert_eq!(view.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn category_change_refetches_scoped_endpoint() {
        let source = Arc::new(FakeCatalog::sample());
        let c = controller(source.clone());
        c.mount().await;

        assert!(c.toggle_category_menu().await);
        let outcome = c.select_category("jewelery".into()).await;
        assert_eq!(outcome, RefreshOutcome::Applied(2));
        assert_eq!(ids(&c.products().await), vec![6, 5]);
        assert!(!c.snapshot().await.menus.categories_open);

        let outcome = c.select_category("all".into()).await;
        assert_eq!(outcome, RefreshOutcome::Applied(4));
        assert_eq!(
            *source.requests.lock().unwrap(),
            vec!["all", "jewelery", "all"]
        );
    }

    #[tokio::test]
    async fn unknown_category_yields_empty_list() {
        let c = controller(Arc::new(FakeCatalog::sample()));
        c.mount().await;
        assert_eq!(
            c.select_category("furniture".into()).await,
            RefreshOutcome::Applied(0)
        );
        assert!(c.products().await.is_empty());
    }

    #[tokio::test]
    async fn sort_change_refetches_and_reorders() {
        let source = Arc::new(FakeCatalog::sample());
        let c = controller(source.clone());
        c.mount().await;
        c.toggle_sort_menu().await;

        c.select_sort(SortDirective::new(SortField::Rating, SortOrder::Desc))
            .await;
        assert_eq!(ids(&c.products().await), vec![5, 2, 1, 6]);
        assert!(!c.snapshot().await.menus.sort_open);

        c.select_sort(SortDirective::new(SortField::Name, SortOrder::Asc))
            .await;
        let titles: Vec<_> = c.products().await.into_iter().map(|p| p.title).collect();
        assert_eq!(
            titles,
            vec![
                "Fjallraven Backpack",
                "john hardy bracelet",
                "Mens Casual T-Shirt",
                "Solid Gold Petite"
            ]
        );
        assert_eq!(source.requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn offers_are_attached_before_sorting() {
        let source = Arc::new(FakeCatalog::sample());
        let offers = FixedOffers::new([Offer::percent(10), Offer::NONE, Offer::percent(5)]);
        let c = CatalogController::new(source, Box::new(offers));
        c.refresh().await;

        // fetch order is 1, 2, 5, 6; displayed order is by price
        let cards = c.cards().await;
        let by_id: HashMap<_, _> = cards.iter().map(|card| (card.id, card)).collect();
        assert_eq!(by_id[&1].discount_percent, 10);
        assert!(!by_id[&2].has_offer);
        assert_eq!(by_id[&2].discounted_price, None);
        assert_eq!(by_id[&5].discount_percent, 5);
        assert_eq!(by_id[&5].discounted_price, Some(660.25));
        assert!(!by_id[&6].has_offer);
        assert_eq!(cards[0].id, 2);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<StdMutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_category_switch_keeps_previous_list_and_logs() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let source = Arc::new(FakeCatalog::sample());
        let c = controller(source.clone());
        c.mount().await;
        let before = c.products().await;

        source.fail.store(true, Ordering::SeqCst);
        let outcome = c.select_category("jewelery".into()).await;

        assert_eq!(outcome, RefreshOutcome::Failed);
        assert_eq!(c.products().await, before);
        assert_eq!(c.snapshot().await.phase, Phase::Idle);
        // selection still moves; only the list is left stale
        assert_eq!(
            c.snapshot().await.category,
            CategorySelection::Named("jewelery".into())
        );

        let out = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("product fetch failed"), "{out}");
        assert!(out.contains("fake://jewelery"), "{out}");
    }

    #[tokio::test]
    async fn failed_category_load_leaves_catalog_empty() {
        let source = Arc::new(FakeCatalog::sample());
        source.fail.store(true, Ordering::SeqCst);
        let c = controller(source);
        assert_eq!(c.load_categories().await, None);
        assert!(c.categories().await.is_empty());
    }

    #[tokio::test]
    async fn stale_response_is_discarded() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let mut fake = FakeCatalog::sample();
        fake.gate = Some(("jewelery".into(), started.clone(), release.clone()));
        let c = Arc::new(controller(Arc::new(fake)));

        let slow = {
            let c = c.clone();
            tokio::spawn(async move { c.select_category("jewelery".into()).await })
        };
        started.notified().await;
        assert_eq!(c.snapshot().await.phase, Phase::Fetching);

        let fast = c.select_category("men's clothing".into()).await;
        assert_eq!(fast, RefreshOutcome::Applied(2));

        release.notify_one();
        assert_eq!(slow.await.unwrap(), RefreshOutcome::Stale);

        assert_eq!(ids(&c.products().await), vec![2, 1]);
        assert_eq!(c.snapshot().await.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn cancelled_refresh_returns_to_idle() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let mut fake = FakeCatalog::sample();
        fake.gate = Some(("jewelery".into(), started.clone(), release));
        let c = Arc::new(controller(Arc::new(fake)));
        c.mount().await;

        let pending = {
            let c = c.clone();
            tokio::spawn(async move { c.select_category("jewelery".into()).await })
        };
        started.notified().await;
        assert_eq!(c.snapshot().await.phase, Phase::Fetching);

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());

        let view = c.snapshot().await;
        assert_eq!(view.phase, Phase::Idle);
        assert_eq!(view.products.len(), 4);
        assert_eq!(
            c.select_category("men's clothing".into()).await,
            RefreshOutcome::Applied(2)
        );
        assert_eq!(c.snapshot().await.phase, Phase::Idle);
    }
}
