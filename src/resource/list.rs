//! Page-token pagination over list endpoints.

// self
use crate::{_prelude::*, error::ConfigError};

/// Page size requested when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 100;
/// Page ceiling applied when none is configured.
pub const DEFAULT_MAX_PAGES: u32 = 1_000;

/// Knobs for list calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListOptions {
	/// Value sent as `pageSize`.
	pub page_size: u32,
	/// Maximum number of pages fetched before giving up with [`Error::PaginationLimit`].
	pub max_pages: u32,
}
impl ListOptions {
	/// Overrides the page size.
	pub fn with_page_size(mut self, page_size: u32) -> Self {
		self.page_size = page_size;

		self
	}

	/// Overrides the page ceiling.
	pub fn with_max_pages(mut self, max_pages: u32) -> Self {
		self.max_pages = max_pages;

		self
	}

	/// Rejects zero limits.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.page_size == 0 {
			return Err(ConfigError::ZeroLimit { field: "page_size" });
		}
		if self.max_pages == 0 {
			return Err(ConfigError::ZeroLimit { field: "max_pages" });
		}

		Ok(())
	}
}
impl Default for ListOptions {
	fn default() -> Self {
		Self { page_size: DEFAULT_PAGE_SIZE, max_pages: DEFAULT_MAX_PAGES }
	}
}

/// Query for one page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageQuery {
	/// Requested page size.
	pub page_size: u32,
	/// Continuation token; empty for the first page.
	pub page_token: String,
}
impl PageQuery {
	/// Query-string pairs for the page.
	pub fn pairs(&self) -> [(&'static str, String); 2] {
		[("pageSize", self.page_size.to_string()), ("pageToken", self.page_token.clone())]
	}
}

/// A decoded list response.
pub trait ListPage
where
	Self: DeserializeOwned,
{
	/// Entity type carried by the page.
	type Item;

	/// Splits the page into its entities and the continuation token.
	fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

/// Fetches pages until the continuation token is empty or absent.
///
/// `fetch` receives the query for each page. Every entity from every page is returned in
/// order; exceeding [`ListOptions::max_pages`] yields [`Error::PaginationLimit`].
pub async fn paginate<P, F, Fut>(options: ListOptions, mut fetch: F) -> Result<Vec<P::Item>>
where
	P: ListPage,
	F: FnMut(PageQuery) -> Fut,
	Fut: Future<Output = Result<P>>,
{
	let mut items = Vec::new();
	let mut page_token = String::new();

	for _ in 0..options.max_pages {
		let page = fetch(PageQuery { page_size: options.page_size, page_token }).await?;
		let (mut batch, next) = page.into_parts();

		items.append(&mut batch);

		match next.filter(|token| !token.is_empty()) {
			Some(token) => page_token = token,
			None => return Ok(items),
		}
	}

	Err(Error::PaginationLimit { max_pages: options.max_pages })
}
