use chrono::{DateTime, Utc};

use crate::collection::{Collection, Link};
use crate::domain;
use crate::nav::{self, Focus, NavEffect, NavKey};
use crate::pipeline::{self, DomainFilter, PageResult, Query, SortOrder};
use crate::prefs::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionSelection {
    #[default]
    All,
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub collection: CollectionSelection,
    pub search: String,
    pub domains: DomainFilter,
    pub sort: SortOrder,
    pub page: usize,
    pub layout: Layout,
    pub preview_enabled: bool,
    pub focus: Focus,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            collection: CollectionSelection::All,
            search: String::new(),
            domains: DomainFilter::all(),
            sort: SortOrder::Desc,
            page: 1,
            layout: Layout::List,
            preview_enabled: true,
            focus: Focus::Unfocused,
        }
    }
}

pub struct LinkBrowser {
    collections: Vec<Collection>,
    state: ViewState,
    page_size: usize,
}

impl LinkBrowser {
    pub fn new(collections: Vec<Collection>, page_size: usize) -> Self {
        Self {
            collections,
            state: ViewState::default(),
            page_size: page_size.max(1),
        }
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_links(&self) -> usize {
        self.collections.iter().map(|c| c.links.len()).sum()
    }

    pub fn active_links(&self) -> Vec<&Link> {
        match self.state.collection {
            CollectionSelection::All => self
                .collections
                .iter()
                .flat_map(|collection| collection.links.iter())
                .collect(),
            CollectionSelection::Index(index) => self
                .collections
                .get(index)
                .map(|collection| collection.links.iter().collect())
                .unwrap_or_default(),
        }
    }

    pub fn active_title(&self) -> &str {
        match self.state.collection {
            CollectionSelection::All => "All",
            CollectionSelection::Index(index) => self
                .collections
                .get(index)
                .map(|c| c.title.as_str())
                .unwrap_or("All"),
        }
    }

    pub fn domains(&self) -> Vec<String> {
        domain::facet(self.active_links())
    }

    pub fn page(&self) -> PageResult<'_> {
        let query = Query {
            domains: &self.state.domains,
            search: &self.state.search,
            sort: self.state.sort,
            page_size: self.page_size,
            page: self.state.page,
        };
        pipeline::run(self.active_links(), &query)
    }

    pub fn focused_link(&self) -> Option<&Link> {
        let index = self.state.focus.index()?;
        self.page().items.get(index).copied()
    }

    pub fn newest_date(&self) -> Option<DateTime<Utc>> {
        self.collections
            .iter()
            .flat_map(|c| c.links.iter())
            .filter_map(|link| pipeline::try_parse_date(&link.date))
            .max()
    }

    fn reset_position(&mut self) {
        self.state.page = 1;
        self.state.focus = Focus::Unfocused;
    }

    /// Switches collection. Selected domains that the new collection does
    /// not contain are dropped. Returns false for an unknown index.
    pub fn select_collection(&mut self, selection: CollectionSelection) -> bool {
        if let CollectionSelection::Index(index) = selection {
            if index >= self.collections.len() {
                return false;
            }
        }
        self.state.collection = selection;
        let available = self.domains();
        let stale: Vec<String> = self
            .state
            .domains
            .iter()
            .filter(|selected| !available.iter().any(|d| d == selected))
            .map(str::to_string)
            .collect();
        for domain in stale {
            self.state.domains.toggle(&domain);
        }
        self.reset_position();
        true
    }

    pub fn shift_collection(&mut self, delta: i32) {
        let slots = self.collections.len() as i64 + 1;
        let current = match self.state.collection {
            CollectionSelection::All => 0,
            CollectionSelection::Index(index) => index as i64 + 1,
        };
        let next = (current + i64::from(delta)).rem_euclid(slots);
        let selection = if next == 0 {
            CollectionSelection::All
        } else {
            CollectionSelection::Index((next - 1) as usize)
        };
        self.select_collection(selection);
    }

    pub fn set_search<S: Into<String>>(&mut self, search: S) {
        self.state.search = search.into();
        self.reset_position();
    }

    pub fn push_search_char(&mut self, ch: char) {
        self.state.search.push(ch);
        self.reset_position();
    }

    pub fn pop_search_char(&mut self) {
        if self.state.search.pop().is_some() {
            self.reset_position();
        }
    }

    pub fn toggle_domain(&mut self, domain: &str) -> bool {
        let selected = self.state.domains.toggle(domain);
        self.reset_position();
        selected
    }

    pub fn select_domain(&mut self, domain: &str) {
        self.state.domains = DomainFilter::only(domain);
        self.reset_position();
    }

    pub fn clear_domains(&mut self) {
        self.state.domains.clear();
        self.reset_position();
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.state.sort = sort;
        self.reset_position();
    }

    pub fn toggle_sort(&mut self) {
        self.set_sort(self.state.sort.toggled());
    }

    pub fn goto_page(&mut self, page: usize) {
        let total = self.page().total;
        self.state.page = pipeline::clamp_page(page, total, self.page_size);
        self.state.focus = Focus::Unfocused;
    }

    pub fn next_page(&mut self) {
        self.goto_page(self.state.page.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.goto_page(self.state.page.saturating_sub(1));
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.state.layout = layout;
    }

    pub fn set_preview_enabled(&mut self, enabled: bool) {
        self.state.preview_enabled = enabled;
    }

    pub fn clear_focus(&mut self) {
        self.state.focus = Focus::Unfocused;
    }

    pub fn navigate(&mut self, key: NavKey) -> Option<NavEffect> {
        let len = self.page().items.len();
        let (focus, effect) = nav::transition(self.state.focus, key, len);
        self.state.focus = focus;
        effect
    }
}
