//! In-memory [`PageSession`] for tests.
//!
//! A [`FakeView`] is a flat list of nodes registered under the URL that
//! loads it. Nodes match a selector by exact string, so fixtures name the
//! same selector strings the rule tables use. Clicking a reveal control
//! makes the next batch of nodes present; clicking a popup trigger shows
//! its target.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::error::ScraperError;
use crate::page::PageSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeElement(usize);

#[derive(Debug, Clone, Copy)]
enum OnClick {
    Nothing,
    RevealBatch,
    Show(usize),
}

#[derive(Debug, Clone)]
struct FakeNode {
    selector: String,
    parent: Option<usize>,
    text: String,
    attributes: Vec<(String, String)>,
    batch: usize,
    present_until: Option<usize>,
    shown: bool,
    clickable: bool,
    failing: bool,
    on_click: OnClick,
}

impl FakeNode {
    fn new(selector: &str) -> Self {
        Self {
            selector: selector.to_owned(),
            parent: None,
            text: String::new(),
            attributes: Vec::new(),
            batch: 0,
            present_until: None,
            shown: true,
            clickable: true,
            failing: false,
            on_click: OnClick::Nothing,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeView {
    nodes: Vec<FakeNode>,
    revealed: usize,
}

impl FakeView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, node: FakeNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// A page-level node with text.
    #[must_use]
    pub fn text(mut self, selector: &str, text: &str) -> Self {
        let mut node = FakeNode::new(selector);
        node.text = text.to_owned();
        self.push(node);
        self
    }

    /// A page-level node carrying one attribute and no text.
    #[must_use]
    pub fn attribute(mut self, selector: &str, name: &str, value: &str) -> Self {
        let mut node = FakeNode::new(selector);
        node.attributes.push((name.to_owned(), value.to_owned()));
        self.push(node);
        self
    }

    /// A container present from the start, with one text child per pair.
    #[must_use]
    pub fn item(self, container: &str, children: &[(&str, &str)]) -> Self {
        self.item_in_batch(0, container, children)
    }

    /// A container that appears after `batch` reveal clicks.
    #[must_use]
    pub fn item_in_batch(mut self, batch: usize, container: &str, children: &[(&str, &str)]) -> Self {
        let mut node = FakeNode::new(container);
        node.batch = batch;
        let parent = self.push(node);
        for (selector, text) in children {
            let mut child = FakeNode::new(selector);
            child.parent = Some(parent);
            child.batch = batch;
            child.text = (*text).to_owned();
            self.push(child);
        }
        self
    }

    /// A node that is present but errors on every interaction.
    #[must_use]
    pub fn failing_node(mut self, selector: &str) -> Self {
        let mut node = FakeNode::new(selector);
        node.failing = true;
        self.push(node);
        self
    }

    /// A node that is present but never becomes clickable.
    #[must_use]
    pub fn unclickable(mut self, selector: &str) -> Self {
        let mut node = FakeNode::new(selector);
        node.clickable = false;
        self.push(node);
        self
    }

    /// A reveal control that can be clicked `batches` times, each click
    /// making the next batch present. It disappears after the last one.
    #[must_use]
    pub fn reveal_control(mut self, selector: &str, batches: usize) -> Self {
        let mut node = FakeNode::new(selector);
        node.present_until = Some(batches);
        node.on_click = OnClick::RevealBatch;
        self.push(node);
        self
    }

    /// A trigger whose click shows `target` with `text`.
    #[must_use]
    pub fn popup(mut self, trigger: &str, target: &str, text: &str) -> Self {
        let mut hidden = FakeNode::new(target);
        hidden.shown = false;
        hidden.text = text.to_owned();
        let target = self.push(hidden);

        let mut node = FakeNode::new(trigger);
        node.on_click = OnClick::Show(target);
        self.push(node);
        self
    }

    fn is_present(&self, index: usize) -> bool {
        let Some(node) = self.nodes.get(index) else {
            return false;
        };
        let batch_ok = self.revealed >= node.batch
            && node.present_until.is_none_or(|until| self.revealed < until);
        let parent_ok = node.parent.is_none_or(|parent| self.is_present(parent));
        node.shown && batch_ok && parent_ok
    }

    fn is_descendant(&self, index: usize, ancestor: usize) -> bool {
        let mut current = self.nodes[index].parent;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.nodes[parent].parent;
        }
        false
    }

    fn matching(&self, selector: &str) -> impl Iterator<Item = usize> + '_ {
        let selector = selector.to_owned();
        (0..self.nodes.len())
            .filter(move |&i| self.nodes[i].selector == selector && self.is_present(i))
    }

    fn node(&self, element: FakeElement) -> Result<&FakeNode, ScraperError> {
        let node = self
            .nodes
            .get(element.0)
            .filter(|_| self.is_present(element.0))
            .ok_or_else(|| ScraperError::StaleElement(format!("node {}", element.0)))?;
        if node.failing {
            return Err(ScraperError::StaleElement(node.selector.clone()));
        }
        Ok(node)
    }
}

#[derive(Debug, Default)]
struct State {
    views: HashMap<String, FakeView>,
    failing_urls: HashSet<String>,
    current: FakeView,
    visits: Vec<String>,
    clicks: HashMap<String, usize>,
    queries: HashMap<String, usize>,
}

#[derive(Debug, Default)]
pub struct FakePage {
    state: Mutex<State>,
}

impl FakePage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `view` when `url` is loaded. Unregistered URLs load an empty
    /// page.
    #[must_use]
    pub fn with_view(self, url: &str, view: FakeView) -> Self {
        self.lock().views.insert(url.to_owned(), view);
        self
    }

    #[must_use]
    pub fn with_failing_navigation(self, url: &str) -> Self {
        self.lock().failing_urls.insert(url.to_owned());
        self
    }

    /// URLs passed to `navigate`, in call order.
    pub fn visits(&self) -> Vec<String> {
        self.lock().visits.clone()
    }

    /// Clicks received by nodes with `selector` across all loaded views.
    pub fn clicks(&self, selector: &str) -> usize {
        self.lock().clicks.get(selector).copied().unwrap_or(0)
    }

    /// `find` and `find_within` calls made with `selector`.
    pub fn queries(&self, selector: &str) -> usize {
        self.lock().queries.get(selector).copied().unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("fake page state poisoned")
    }

    fn first_present(&self, selector: &str) -> Result<Option<(FakeElement, bool)>, ScraperError> {
        let state = self.lock();
        let Some(index) = state.current.matching(selector).next() else {
            return Ok(None);
        };
        let node = state.current.node(FakeElement(index))?;
        Ok(Some((FakeElement(index), node.clickable)))
    }
}

impl PageSession for FakePage {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        let mut state = self.lock();
        state.visits.push(url.to_owned());
        if state.failing_urls.contains(url) {
            return Err(ScraperError::Navigation {
                url: url.to_owned(),
                reason: "net::ERR_CONNECTION_RESET".to_owned(),
            });
        }
        state.current = state.views.get(url).cloned().unwrap_or_default();
        Ok(())
    }

    async fn find(&self, selector: &str) -> Result<Vec<FakeElement>, ScraperError> {
        let mut state = self.lock();
        *state.queries.entry(selector.to_owned()).or_insert(0) += 1;
        Ok(state.current.matching(selector).map(FakeElement).collect())
    }

    async fn find_within(
        &self,
        element: &FakeElement,
        selector: &str,
    ) -> Result<Vec<FakeElement>, ScraperError> {
        let mut state = self.lock();
        *state.queries.entry(selector.to_owned()).or_insert(0) += 1;
        let view = &state.current;
        view.node(*element)?;
        Ok(view
            .matching(selector)
            .filter(|&i| view.is_descendant(i, element.0))
            .map(FakeElement)
            .collect())
    }

    async fn text(&self, element: &FakeElement) -> Result<String, ScraperError> {
        Ok(self.lock().current.node(*element)?.text.clone())
    }

    async fn attribute(
        &self,
        element: &FakeElement,
        name: &str,
    ) -> Result<Option<String>, ScraperError> {
        let state = self.lock();
        let node = state.current.node(*element)?;
        Ok(node
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone()))
    }

    async fn click_via_script(&self, element: &FakeElement) -> Result<(), ScraperError> {
        let mut state = self.lock();
        let node = state.current.node(*element)?;
        let selector = node.selector.clone();
        let on_click = node.on_click;

        *state.clicks.entry(selector).or_insert(0) += 1;
        match on_click {
            OnClick::Nothing => {}
            OnClick::RevealBatch => state.current.revealed += 1,
            OnClick::Show(target) => state.current.nodes[target].shown = true,
        }
        Ok(())
    }

    async fn wait_until_clickable(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<Option<FakeElement>, ScraperError> {
        Ok(self
            .first_present(selector)?
            .filter(|(_, clickable)| *clickable)
            .map(|(element, _)| element))
    }

    async fn wait_until_visible(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<Option<FakeElement>, ScraperError> {
        Ok(self.first_present(selector)?.map(|(element, _)| element))
    }
}
