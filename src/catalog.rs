// =============================================================================
// CATALOG CONTROLLER MODULE
// =============================================================================
// Owns the "current result" (one page of products) and every way of
// replacing it: search by name, filter by category, and page navigation.
//
// LEARNING NOTES:
// - All queries funnel through one paginated fetch (fetch_page)
// - State is only replaced after the fetch succeeded; a failed request
//   leaves the previous page on screen and returns the error
// - Methods that change state take `&mut self`, so two navigations on the
//   same controller can never overlap: the borrow checker serializes them
// =============================================================================

use std::num::NonZeroU32;

use tracing::{debug, info};

use crate::api::CatalogApi;
use crate::error::{ShopError, ShopResult};
use crate::metrics;
use crate::models::{NavState, PageDirection, Product, ProductsResult, QueryMode};
use crate::view::CatalogView;

// =============================================================================
// PAGE ARITHMETIC
// =============================================================================

/// Number of result pages for `total` items; an empty result still has one.
pub fn page_count(total: u32, page_size: NonZeroU32) -> u32 {
    total.div_ceil(page_size.get()).max(1)
}

/// 1-based page number of the page starting at offset `skip`
pub fn page_number(skip: u32, page_size: NonZeroU32) -> u32 {
    (skip / page_size.get()).saturating_add(1)
}

// =============================================================================
// CONTROLLER
// =============================================================================
pub struct CatalogController<A: CatalogApi, V: CatalogView> {
    api: A,
    view: V,
    page_size: NonZeroU32,

    /// The single source of truth for what is on screen
    current: ProductsResult,

    /// Filter that produced `current`; paging re-issues it
    mode: QueryMode,
}

impl<A: CatalogApi, V: CatalogView> CatalogController<A, V> {
    pub fn new(api: A, view: V, page_size: NonZeroU32) -> Self {
        Self {
            api,
            view,
            page_size,
            current: ProductsResult::default(),
            mode: QueryMode::None,
        }
    }

    // -------------------------------------------------------------------------
    // STATE ACCESS
    // -------------------------------------------------------------------------

    pub fn current_result(&self) -> &ProductsResult {
        &self.current
    }

    pub fn query_mode(&self) -> &QueryMode {
        &self.mode
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.get()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Number of pages in the current result (at least 1)
    pub fn page_count(&self) -> u32 {
        page_count(self.current.total, self.page_size)
    }

    /// 1-based number of the page currently shown
    pub fn current_page(&self) -> u32 {
        page_number(self.current.skip, self.page_size)
    }

    /// Look up a product on the current page
    pub fn find_product(&self, product_id: i64) -> Option<&Product> {
        self.current.products.iter().find(|p| p.id == product_id)
    }

    // -------------------------------------------------------------------------
    // DERIVED UI STATE
    // -------------------------------------------------------------------------

    /// Pager state for the current result
    pub fn nav_state(&self) -> NavState {
        let current_page = self.current_page();
        let page_count = self.page_count();
        let at_start = current_page <= 1;
        let at_end = current_page >= page_count;

        NavState {
            visible: self.current.total as usize > self.current.products.len(),
            first_disabled: at_start,
            prev_disabled: at_start,
            next_disabled: at_end,
            last_disabled: at_end,
            current_page,
            page_count,
        }
    }

    /// "Found 45 products. Showing 21 to 40"
    pub fn summary_text(&self) -> String {
        let total = self.current.total;
        let mut summary = format!("Found {} product{}.", total, if total != 1 { "s" } else { "" });

        if total as usize > self.current.products.len() {
            let first = self.current.skip.saturating_add(1);
            let last = self
                .current
                .skip
                .saturating_add(self.page_size.get())
                .min(total);
            summary.push_str(&format!(" Showing {} to {}", first, last));
        }
        summary
    }

    // -------------------------------------------------------------------------
    // QUERIES
    // -------------------------------------------------------------------------

    /// First page of a name search; an empty text lists the whole catalog.
    pub async fn query_by_name(&mut self, text: &str) -> ShopResult<&ProductsResult> {
        self.run_query(QueryMode::by_name(text)).await
    }

    /// First page of a category; an empty category lists the whole catalog.
    pub async fn query_by_category(&mut self, category: &str) -> ShopResult<&ProductsResult> {
        self.run_query(QueryMode::by_category(category)).await
    }

    /// Move relative to the current page, clamped to the existing pages.
    pub async fn goto_relative_page(
        &mut self,
        direction: PageDirection,
    ) -> ShopResult<&ProductsResult> {
        let target = self.relative_target(direction);
        debug!(?direction, target_page = target + 1, "Relative page navigation");
        self.run_page(target).await
    }

    /// Jump to a 1-based page number.
    ///
    /// Pages outside 1..=page_count are rejected before any request is made.
    pub async fn goto_absolute_page(&mut self, page_number: u32) -> ShopResult<&ProductsResult> {
        let page_count = self.page_count();
        if page_number < 1 || page_number > page_count {
            debug!(page_number, page_count, "Rejected page outside the result");
            return Err(ShopError::PageOutOfRange {
                requested: page_number,
                page_count,
            });
        }
        self.run_page(page_number - 1).await
    }

    /// Fetch the category list and hand it to the view
    pub async fn load_categories(&mut self) -> ShopResult<Vec<String>> {
        let categories = self.api.get_categories().await?;
        self.view.render_categories(&categories);
        Ok(categories)
    }

    /// Show the detail view for a product on the current page.
    ///
    /// Returns false when the product is not on the current page.
    pub fn show_product(&mut self, product_id: i64) -> bool {
        match self.current.products.iter().find(|p| p.id == product_id) {
            Some(product) => {
                self.view.render_product_details(product);
                true
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // INTERNALS
    // -------------------------------------------------------------------------

    /// Zero-based target page for a relative move
    fn relative_target(&self, direction: PageDirection) -> u32 {
        let index = self.current_page() - 1;
        let last = self.page_count() - 1;

        match direction {
            PageDirection::Prev => index.saturating_sub(1).min(last),
            PageDirection::Next => index.saturating_add(1).min(last),
            PageDirection::First => 0,
            PageDirection::Last => last,
        }
    }

    /// A new (non-paging) query: remember the mode only once it succeeded
    async fn run_query(&mut self, mode: QueryMode) -> ShopResult<&ProductsResult> {
        let result = self.fetch_page(&mode, 0).await?;
        self.mode = mode;
        self.accept(result);
        Ok(&self.current)
    }

    /// Re-issue the remembered query for another page
    async fn run_page(&mut self, page_index: u32) -> ShopResult<&ProductsResult> {
        let mode = self.mode.clone();
        let result = self.fetch_page(&mode, page_index).await?;
        self.accept(result);
        Ok(&self.current)
    }

    /// The one paginated fetch every query goes through
    async fn fetch_page(&self, mode: &QueryMode, page_index: u32) -> ShopResult<ProductsResult> {
        let limit = self.page_size.get();
        let skip = page_index.saturating_mul(limit);
        let params = mode.params(limit, skip);

        self.api.get_json(&mode.path(), &params).await
    }

    /// Replace the current result, then update the pager and the listing
    fn accept(&mut self, result: ProductsResult) {
        self.current = result;

        info!(
            mode = self.mode.label(),
            total = self.current.total,
            skip = self.current.skip,
            shown = self.current.products.len(),
            "Showing products"
        );
        metrics::record_page_view(self.mode.label());

        let nav = self.nav_state();
        self.view.show_nav(&nav);

        let summary = self.summary_text();
        self.view.render_products(&self.current, &summary);
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{QueryParams, QueryValue};
    use serde::de::DeserializeOwned;
    use serde_json::json;
    use std::cell::{Cell, RefCell};

    // -------------------------------------------------------------------------
    // TEST DOUBLES
    // -------------------------------------------------------------------------

    /// In-memory catalog API with the same paths as dummyjson
    pub(crate) struct FakeApi {
        products: Vec<Product>,
        pub requests: Cell<usize>,
        pub last_path: RefCell<String>,
        pub last_params: RefCell<QueryParams>,
        /// When set, every request fails with this status
        pub fail_with: Cell<Option<u16>>,
    }

    impl FakeApi {
        /// `count` products, even ids are "laptops", odd ids are "phones"
        pub(crate) fn with_products(count: i64) -> Self {
            let products = (1..=count)
                .map(|id| Product {
                    id,
                    title: format!("Product {}", id),
                    brand: "Acme".into(),
                    description: String::new(),
                    price: 10.0,
                    discount_percentage: 0.0,
                    rating: 4.0,
                    stock: id,
                    category: (if id % 2 == 0 { "laptops" } else { "phones" }).into(),
                    thumbnail: String::new(),
                })
                .collect();

            Self {
                products,
                requests: Cell::new(0),
                last_path: RefCell::new(String::new()),
                last_params: RefCell::new(QueryParams::new()),
                fail_with: Cell::new(None),
            }
        }

        fn param(params: &QueryParams, key: &str) -> Option<String> {
            match params.get(key) {
                Some(QueryValue::Single(value)) => Some(value.clone()),
                _ => None,
            }
        }
    }

    impl CatalogApi for FakeApi {
        async fn get_json<T: DeserializeOwned>(
            &self,
            path: &[&str],
            params: &QueryParams,
        ) -> ShopResult<T> {
            self.requests.set(self.requests.get() + 1);
            *self.last_path.borrow_mut() = path.join("/");
            *self.last_params.borrow_mut() = params.clone();

            if let Some(code) = self.fail_with.get() {
                return Err(ShopError::from_status(code, "fake failure"));
            }

            let matching: Vec<&Product> = match path {
                ["products", "categories"] => {
                    return Ok(serde_json::from_value(json!(["phones", "laptops"]))?);
                }
                ["products"] => self.products.iter().collect(),
                ["products", "search"] => {
                    let q = Self::param(params, "q").unwrap_or_default().to_lowercase();
                    self.products
                        .iter()
                        .filter(|p| p.title.to_lowercase().contains(&q))
                        .collect()
                }
                ["products", "category", category] => self
                    .products
                    .iter()
                    .filter(|p| p.category == *category)
                    .collect(),
                _ => return Err(ShopError::from_status(404, "")),
            };

            let limit: usize = Self::param(params, "limit")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30);
            let skip: usize = Self::param(params, "skip")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            let page: Vec<&Product> = matching.iter().skip(skip).take(limit).copied().collect();

            Ok(serde_json::from_value(json!({
                "products": page,
                "total": matching.len(),
                "skip": skip,
                "limit": limit,
            }))?)
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum ViewEvent {
        Nav(NavState),
        Products { skip: u32, shown: usize, summary: String },
        Categories(Vec<String>),
        Details(i64),
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingCatalogView {
        pub events: Vec<ViewEvent>,
    }

    impl RecordingCatalogView {
        fn last_nav(&self) -> Option<&NavState> {
            self.events.iter().rev().find_map(|e| match e {
                ViewEvent::Nav(nav) => Some(nav),
                _ => None,
            })
        }
    }

    impl CatalogView for RecordingCatalogView {
        fn show_nav(&mut self, nav: &NavState) {
            self.events.push(ViewEvent::Nav(nav.clone()));
        }

        fn render_products(&mut self, result: &ProductsResult, summary: &str) {
            self.events.push(ViewEvent::Products {
                skip: result.skip,
                shown: result.products.len(),
                summary: summary.to_string(),
            });
        }

        fn render_categories(&mut self, categories: &[String]) {
            self.events.push(ViewEvent::Categories(categories.to_vec()));
        }

        fn render_product_details(&mut self, product: &Product) {
            self.events.push(ViewEvent::Details(product.id));
        }
    }

    type TestController = CatalogController<FakeApi, RecordingCatalogView>;

    fn controller(products: i64, page_size: u32) -> TestController {
        CatalogController::new(
            FakeApi::with_products(products),
            RecordingCatalogView::default(),
            NonZeroU32::new(page_size).expect("non-zero page size"),
        )
    }

    // -------------------------------------------------------------------------
    // PAGE ARITHMETIC
    // -------------------------------------------------------------------------

    #[test]
    fn test_page_count_is_ceiling_and_at_least_one() {
        for size in 1..=25u32 {
            let page_size = NonZeroU32::new(size).unwrap();
            for total in 0..=200u32 {
                let pages = page_count(total, page_size);
                assert!(pages >= 1);
                if total > 0 {
                    assert_eq!(pages, (total + size - 1) / size);
                }
            }
        }
    }

    #[test]
    fn test_page_number_from_skip() {
        let page_size = NonZeroU32::new(20).unwrap();
        assert_eq!(page_number(0, page_size), 1);
        assert_eq!(page_number(19, page_size), 1);
        assert_eq!(page_number(20, page_size), 2);
        assert_eq!(page_number(40, page_size), 3);
    }

    // -------------------------------------------------------------------------
    // NAVIGATION SCENARIOS
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_forty_five_products_in_pages_of_twenty() {
        let mut shop = controller(45, 20);

        shop.query_by_name("").await.unwrap();
        assert_eq!(shop.current_result().skip, 0);
        let nav = shop.nav_state();
        assert_eq!((nav.current_page, nav.page_count), (1, 3));
        assert!(nav.visible);
        assert!(!nav.next_disabled);
        assert!(nav.prev_disabled && nav.first_disabled);

        shop.goto_relative_page(PageDirection::Next).await.unwrap();
        assert_eq!(shop.current_result().skip, 20);
        let nav = shop.nav_state();
        assert_eq!((nav.current_page, nav.page_count), (2, 3));
        assert!(!nav.prev_disabled && !nav.next_disabled);

        shop.goto_relative_page(PageDirection::Last).await.unwrap();
        assert_eq!(shop.current_result().skip, 40);
        assert_eq!(shop.current_result().products.len(), 5);
        let nav = shop.nav_state();
        assert_eq!(nav.label(), "Page 3 / 3");
        assert!(nav.next_disabled && nav.last_disabled);
        assert!(!nav.prev_disabled);
    }

    #[tokio::test]
    async fn test_first_and_last() {
        let mut shop = controller(95, 10);
        shop.query_by_name("").await.unwrap();

        shop.goto_relative_page(PageDirection::Last).await.unwrap();
        assert_eq!(shop.current_page(), shop.page_count());
        assert_eq!(shop.current_page(), 10);

        shop.goto_relative_page(PageDirection::First).await.unwrap();
        assert_eq!(shop.current_page(), 1);
    }

    #[tokio::test]
    async fn test_repeated_next_is_monotonic_and_clamped() {
        let mut shop = controller(45, 20);
        shop.query_by_name("").await.unwrap();

        let mut previous = shop.current_page();
        for _ in 0..6 {
            shop.goto_relative_page(PageDirection::Next).await.unwrap();
            let page = shop.current_page();
            assert!(page >= previous);
            assert!(page <= shop.page_count());
            previous = page;
        }
        assert_eq!(previous, 3);
    }

    #[tokio::test]
    async fn test_prev_clamps_to_first_page() {
        let mut shop = controller(45, 20);
        shop.query_by_name("").await.unwrap();

        shop.goto_relative_page(PageDirection::Prev).await.unwrap();
        assert_eq!(shop.current_page(), 1);

        shop.goto_relative_page(PageDirection::Last).await.unwrap();
        shop.goto_relative_page(PageDirection::Prev).await.unwrap();
        assert_eq!(shop.current_page(), 2);
    }

    #[tokio::test]
    async fn test_absolute_page_in_range() {
        let mut shop = controller(45, 20);
        shop.query_by_name("").await.unwrap();

        let result = shop.goto_absolute_page(3).await.unwrap();
        assert_eq!(result.skip, 40);
    }

    #[tokio::test]
    async fn test_absolute_page_out_of_range_makes_no_request() {
        let mut shop = controller(45, 20);
        shop.query_by_name("").await.unwrap();
        let before = shop.current_result().clone();
        let requests = shop.api.requests.get();
        let events = shop.view().events.len();

        for page in [0, 4, 100] {
            let err = shop.goto_absolute_page(page).await.unwrap_err();
            assert!(matches!(
                err,
                ShopError::PageOutOfRange { requested, page_count: 3 } if requested == page
            ));
        }

        assert_eq!(shop.api.requests.get(), requests);
        assert_eq!(shop.current_result(), &before);
        assert_eq!(shop.view().events.len(), events);
    }

    // -------------------------------------------------------------------------
    // QUERY MODES
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_empty_search_lists_whole_catalog() {
        let mut shop = controller(45, 20);
        shop.query_by_name("").await.unwrap();

        assert_eq!(*shop.api.last_path.borrow(), "products");
        assert!(shop.api.last_params.borrow().get("q").is_none());
        assert_eq!(shop.query_mode(), &QueryMode::None);
    }

    #[tokio::test]
    async fn test_paging_repeats_category_query() {
        let mut shop = controller(100, 20);
        shop.query_by_category("laptops").await.unwrap();
        assert_eq!(shop.current_result().total, 50);

        shop.goto_relative_page(PageDirection::Next).await.unwrap();
        assert_eq!(*shop.api.last_path.borrow(), "products/category/laptops");
        assert_eq!(
            shop.api.last_params.borrow().get("skip"),
            Some(&QueryValue::Single("20".into()))
        );
        assert!(shop
            .current_result()
            .products
            .iter()
            .all(|p| p.category == "laptops"));
    }

    #[tokio::test]
    async fn test_paging_repeats_name_query() {
        let mut shop = controller(45, 5);
        // "Product 1", "Product 10".."Product 19" = 11 matches
        shop.query_by_name("Product 1").await.unwrap();
        assert_eq!(shop.current_result().total, 11);

        shop.goto_absolute_page(3).await.unwrap();
        assert_eq!(*shop.api.last_path.borrow(), "products/search");
        assert_eq!(
            shop.api.last_params.borrow().get("q"),
            Some(&QueryValue::Single("Product 1".into()))
        );
        assert_eq!(shop.current_result().products.len(), 1);
        assert_eq!(
            shop.query_mode(),
            &QueryMode::ByName("Product 1".to_string())
        );
    }

    #[tokio::test]
    async fn test_new_query_resets_to_first_page() {
        let mut shop = controller(100, 20);
        shop.query_by_name("").await.unwrap();
        shop.goto_relative_page(PageDirection::Last).await.unwrap();

        shop.query_by_category("phones").await.unwrap();
        assert_eq!(shop.current_page(), 1);
    }

    #[tokio::test]
    async fn test_repeated_query_is_idempotent() {
        let mut shop = controller(45, 20);
        let first = shop.query_by_name("").await.unwrap().clone();
        let second = shop.query_by_name("").await.unwrap().clone();
        assert_eq!(first, second);
    }

    // -------------------------------------------------------------------------
    // FAILURES
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_state() {
        let mut shop = controller(45, 20);
        shop.query_by_category("laptops").await.unwrap();
        let before = shop.current_result().clone();
        let events = shop.view().events.len();

        shop.api.fail_with.set(Some(500));
        let err = shop.query_by_name("phone").await.unwrap_err();
        assert_eq!(err.status_code(), Some(500));

        let err = shop
            .goto_relative_page(PageDirection::Next)
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Api { code: 500, .. }));

        assert_eq!(shop.current_result(), &before);
        assert_eq!(
            shop.query_mode(),
            &QueryMode::ByCategory("laptops".to_string())
        );
        assert_eq!(shop.view().events.len(), events);
    }

    // -------------------------------------------------------------------------
    // VIEW PROJECTION
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_nav_is_projected_before_render() {
        let mut shop = controller(45, 20);
        shop.query_by_name("").await.unwrap();

        let events = &shop.view().events;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ViewEvent::Nav(_)));
        assert_eq!(
            events[1],
            ViewEvent::Products {
                skip: 0,
                shown: 20,
                summary: "Found 45 products. Showing 1 to 20".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_single_page_hides_nav() {
        let mut shop = controller(5, 20);
        shop.query_by_name("").await.unwrap();

        let nav = shop.view().last_nav().unwrap();
        assert!(!nav.visible);
        assert_eq!(shop.summary_text(), "Found 5 products.");
    }

    #[tokio::test]
    async fn test_empty_result() {
        let mut shop = controller(5, 20);
        shop.query_by_name("nothing matches").await.unwrap();

        assert_eq!(shop.page_count(), 1);
        assert_eq!(shop.current_page(), 1);
        assert_eq!(shop.summary_text(), "Found 0 products.");
        let nav = shop.nav_state();
        assert!(!nav.visible);
        assert!(nav.next_disabled && nav.prev_disabled);
    }

    #[tokio::test]
    async fn test_summary_on_last_partial_page() {
        let mut shop = controller(45, 20);
        shop.query_by_name("").await.unwrap();
        shop.goto_relative_page(PageDirection::Last).await.unwrap();
        assert_eq!(shop.summary_text(), "Found 45 products. Showing 41 to 45");
    }

    #[tokio::test]
    async fn test_summary_singular() {
        let mut shop = controller(45, 20);
        shop.query_by_name("Product 45").await.unwrap();
        assert_eq!(shop.summary_text(), "Found 1 product.");
    }

    #[tokio::test]
    async fn test_find_and_show_product() {
        let mut shop = controller(45, 20);
        shop.query_by_name("").await.unwrap();

        assert_eq!(shop.find_product(7).map(|p| p.id), Some(7));
        // Product 30 exists but is not on the current page
        assert!(shop.find_product(30).is_none());

        assert!(shop.show_product(7));
        assert!(!shop.show_product(30));
        assert_eq!(shop.view().events.last(), Some(&ViewEvent::Details(7)));
    }

    #[test]
    fn test_offset_at_u32_max_does_not_overflow() {
        let one = NonZeroU32::new(1).unwrap();
        assert_eq!(page_number(u32::MAX, one), u32::MAX);

        let mut shop = controller(1, 1);
        shop.current = ProductsResult {
            products: vec![],
            total: u32::MAX,
            skip: u32::MAX,
            limit: 1,
        };

        let nav = shop.nav_state();
        assert_eq!(nav.current_page, u32::MAX);
        assert_eq!(nav.page_count, u32::MAX);
        assert!(nav.last_disabled);
        assert_eq!(
            shop.summary_text(),
            format!("Found {} products. Showing {} to {}", u32::MAX, u32::MAX, u32::MAX)
        );
    }

    #[tokio::test]
    async fn test_load_categories() {
        let mut shop = controller(5, 20);
        let categories = shop.load_categories().await.unwrap();

        assert_eq!(categories, vec!["laptops", "phones"]);
        assert_eq!(
            shop.view().events.last(),
            Some(&ViewEvent::Categories(categories.clone()))
        );
    }
}
