use std::cmp::Ordering;

use crate::api::traits::SearchSource;
use crate::models::asset::{Asset, AssetType};
use crate::models::filter::{SortKey, SortOrder, SortSpec, TransactionFilter};
use crate::models::page::Page;
use crate::models::portfolio::Portfolio;
use crate::models::transaction::Transaction;

/// Shorter free-text queries return nothing rather than everything.
pub const MIN_QUERY_LEN: usize = 2;

/// Results kept per section of the global search.
pub const MAX_SECTION_RESULTS: usize = 5;

/// Recent transactions fetched as the global search corpus.
pub const RECENT_TRANSACTION_LIMIT: usize = 10;

/// Results of the global search box, one section per entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalSearchResults {
    pub portfolios: Vec<Portfolio>,
    pub assets: Vec<Asset>,
    pub transactions: Vec<Transaction>,
}

impl GlobalSearchResults {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.portfolios.is_empty() && self.assets.is_empty() && self.transactions.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.portfolios.len() + self.assets.len() + self.transactions.len()
    }
}

// ── Free-text search ────────────────────────────────────────────────

/// Normalized query, or `None` when it is too short to search.
fn normalize_query(query: &str) -> Option<String> {
    let q = query.trim();
    if q.chars().count() < MIN_QUERY_LEN {
        None
    } else {
        Some(q.to_lowercase())
    }
}

fn any_contains<'a>(needle: &str, fields: impl IntoIterator<Item = Option<&'a str>>) -> bool {
    fields
        .into_iter()
        .flatten()
        .any(|f| f.to_lowercase().contains(needle))
}

/// Case-insensitive substring match of `query` against any of `fields`.
/// Always false for queries shorter than [`MIN_QUERY_LEN`].
pub fn matches_query<'a>(query: &str, fields: impl IntoIterator<Item = Option<&'a str>>) -> bool {
    match normalize_query(query) {
        Some(q) => any_contains(&q, fields),
        None => false,
    }
}

/// Portfolios whose name or description contains `query`.
pub fn search_portfolios(portfolios: &[Portfolio], query: &str) -> Vec<Portfolio> {
    let Some(q) = normalize_query(query) else {
        return Vec::new();
    };
    portfolios
        .iter()
        .filter(|p| any_contains(&q, [Some(p.name.as_str()), p.description.as_deref()]))
        .cloned()
        .collect()
}

/// Assets whose symbol or name contains `query`.
pub fn search_assets(assets: &[Asset], query: &str) -> Vec<Asset> {
    let Some(q) = normalize_query(query) else {
        return Vec::new();
    };
    assets
        .iter()
        .filter(|a| any_contains(&q, [Some(a.symbol.as_str()), Some(a.name.as_str())]))
        .cloned()
        .collect()
}

/// Transactions whose asset symbol or asset name contains `query`.
pub fn search_transactions(transactions: &[Transaction], query: &str) -> Vec<Transaction> {
    let Some(q) = normalize_query(query) else {
        return Vec::new();
    };
    transactions
        .iter()
        .filter(|t| any_contains(&q, [t.asset_symbol.as_deref(), t.asset_name.as_deref()]))
        .cloned()
        .collect()
}

/// Combine already-fetched sections into global search results, capping
/// each at [`MAX_SECTION_RESULTS`].
///
/// `remote_assets` is the backend search answer and is trusted as-is.
pub fn global_search(
    portfolios: &[Portfolio],
    remote_assets: &[Asset],
    recent_transactions: &[Transaction],
    query: &str,
) -> GlobalSearchResults {
    if normalize_query(query).is_none() {
        return GlobalSearchResults::default();
    }
    let mut portfolios = search_portfolios(portfolios, query);
    portfolios.truncate(MAX_SECTION_RESULTS);
    let mut transactions = search_transactions(recent_transactions, query);
    transactions.truncate(MAX_SECTION_RESULTS);
    let assets = remote_assets
        .iter()
        .take(MAX_SECTION_RESULTS)
        .cloned()
        .collect();

    GlobalSearchResults {
        portfolios,
        assets,
        transactions,
    }
}

/// Fetch the three sources concurrently and build the global search view.
///
/// A failing source contributes an empty section; the search as a whole
/// never fails. Short queries return immediately without any request.
pub async fn fetch_global_search(source: &dyn SearchSource, query: &str) -> GlobalSearchResults {
    if normalize_query(query).is_none() {
        return GlobalSearchResults::default();
    }

    let (portfolios, assets, transactions) = futures::join!(
        source.list_portfolios(),
        source.search_assets(query.trim()),
        source.recent_transactions(RECENT_TRANSACTION_LIMIT),
    );

    let portfolios = portfolios.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "global search: portfolios unavailable");
        Vec::new()
    });
    let assets = assets.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "global search: asset search failed");
        Vec::new()
    });
    let transactions = transactions.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "global search: transactions unavailable");
        Vec::new()
    });

    global_search(&portfolios, &assets, &transactions, query)
}

// ── Composite filter & sort ─────────────────────────────────────────

/// True if `tx` passes every active predicate of `filter`.
#[must_use]
pub fn transaction_matches(tx: &Transaction, filter: &TransactionFilter) -> bool {
    if !filter.include_transfers && tx.transaction_type.is_transfer() {
        return false;
    }
    if filter.portfolio_id.is_some_and(|id| id != tx.portfolio_id) {
        return false;
    }
    if filter.asset_id.is_some_and(|id| id != tx.asset_id) {
        return false;
    }
    if filter
        .transaction_type
        .is_some_and(|t| t != tx.transaction_type)
    {
        return false;
    }

    let day = tx.transaction_date.date();
    if filter.start_date.is_some_and(|start| day < start) {
        return false;
    }
    if filter.end_date.is_some_and(|end| day > end) {
        return false;
    }

    let amount = tx.amount();
    if filter.min_amount.is_some_and(|min| amount < min) {
        return false;
    }
    if filter.max_amount.is_some_and(|max| amount > max) {
        return false;
    }

    match filter.search.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => {
            any_contains(&s.to_lowercase(), [tx.asset_symbol.as_deref(), tx.asset_name.as_deref()])
        }
        _ => true,
    }
}

/// Transactions passing `filter`, in their original order.
pub fn filter_transactions(transactions: &[Transaction], filter: &TransactionFilter) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| transaction_matches(t, filter))
        .cloned()
        .collect()
}

fn compare(a: &Transaction, b: &Transaction, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => a.transaction_date.cmp(&b.transaction_date),
        SortKey::Amount => a.amount().total_cmp(&b.amount()),
        SortKey::Asset => a.symbol().cmp(b.symbol()),
    }
}

/// Stable sort: equal keys keep their input order in both directions.
pub fn sort_transactions(transactions: &mut [Transaction], sort: SortSpec) {
    match sort.order {
        SortOrder::Asc => transactions.sort_by(|a, b| compare(a, b, sort.key)),
        SortOrder::Desc => transactions.sort_by(|a, b| compare(b, a, sort.key)),
    }
}

// ── Pagination ──────────────────────────────────────────────────────

/// Slice `items` into a zero-based page. A page past the end is clamped to
/// the last page; a `size` of 0 is treated as 1.
pub fn paginate<T: Clone>(items: &[T], page: usize, size: usize) -> Page<T> {
    let size = size.max(1);
    let total_elements = items.len();
    let total_pages = total_elements.div_ceil(size);
    let page = page.min(total_pages.saturating_sub(1));
    let start = page * size;
    let end = (start + size).min(total_elements);

    Page {
        content: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page,
        size,
        total_elements,
        total_pages,
    }
}

/// Filter, sort and paginate in one call. The input is left untouched.
pub fn transaction_view(
    transactions: &[Transaction],
    filter: &TransactionFilter,
    sort: SortSpec,
    page: usize,
    size: usize,
) -> Page<Transaction> {
    let mut rows = filter_transactions(transactions, filter);
    sort_transactions(&mut rows, sort);
    paginate(&rows, page, size)
}

/// Asset list filter: optional type equality and optional symbol/name text.
/// Blank text applies no text predicate.
pub fn filter_assets(assets: &[Asset], asset_type: Option<AssetType>, text: Option<&str>) -> Vec<Asset> {
    let needle = text
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    assets
        .iter()
        .filter(|a| asset_type.map_or(true, |t| t == a.asset_type))
        .filter(|a| match &needle {
            Some(n) => any_contains(n, [Some(a.symbol.as_str()), Some(a.name.as_str())]),
            None => true,
        })
        .cloned()
        .collect()
}

/// [`filter_assets`] followed by [`paginate`].
pub fn asset_view(
    assets: &[Asset],
    asset_type: Option<AssetType>,
    text: Option<&str>,
    page: usize,
    size: usize,
) -> Page<Asset> {
    paginate(&filter_assets(assets, asset_type, text), page, size)
}
