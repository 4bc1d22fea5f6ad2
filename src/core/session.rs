//! Session-scoped manager for categories, selections and navigation
//!
//! One [`Session`] owns every per-category cache, the variant lists, the
//! alignment table and the active composition; nothing else writes
//! selection state. Fetch jobs run on the worker pool and settle part
//! handles; the session is the only component that mutates display
//! state, and it re-checks the current selection after awaiting a handle
//! before swapping the composition, so an out-of-order completion can
//! warm the cache but never clobber a newer selection.
//!
//! Navigation flow: compute the wrapped target index, issue the preload
//! window (fire-and-forget except the target), advance the selection,
//! await the target handle, then swap the resolved layer - and, for
//! hair, the aligned back-hair layer - into the active composition
//! together. A failed await rolls the selection back, leaving no
//! partial state.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::compose;
use crate::config::{LINK_FOLLOWER, LINK_PRIMARY, Settings};
use crate::core::align::AlignmentTable;
use crate::core::preload;
use crate::core::workers::Workers;
use crate::entities::Category;
use crate::entities::palette::Palette;
use crate::entities::part::{Part, PartLayer, PartWait};
use crate::error::VisageError;
use crate::fetch::PartSource;
use crate::svg;

/// Progress notifications posted by fetch jobs
#[derive(Debug, Clone)]
pub enum SessionEvent {
    PartLoaded {
        category: String,
        index: usize,
    },
    PartFailed {
        category: String,
        index: usize,
        reason: String,
    },
}

pub struct Session {
    source: Arc<dyn PartSource>,
    workers: Arc<Workers>,
    settings: Settings,
    categories: IndexMap<String, Category>,
    alignment: Option<AlignmentTable>,
    /// Currently displayed layer per category, layer order
    active: IndexMap<String, Arc<PartLayer>>,
    palette: Palette,
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,
}

impl Session {
    /// Fetch every category listing, resolve each default variant and
    /// build the initial composition.
    ///
    /// Listing retrieval is the only fatal failure class; a category
    /// with an empty variant list is treated the same way.
    pub fn connect(source: Arc<dyn PartSource>, settings: Settings) -> Result<Self, VisageError> {
        let workers = Arc::new(Workers::new(settings.worker_threads()));
        let (events_tx, events_rx) = unbounded();

        let mut categories = IndexMap::new();
        for name in &settings.categories {
            let variants = source.list_variants(name)?;
            if variants.is_empty() {
                return Err(VisageError::ListingFetch {
                    category: name.clone(),
                    reason: "empty variant list".into(),
                });
            }
            debug!("{}: {} variants", name, variants.len());
            categories.insert(
                name.clone(),
                Category::new(name.clone(), variants, settings.cache_capacity),
            );
        }

        let alignment = match (categories.get(LINK_PRIMARY), categories.get(LINK_FOLLOWER)) {
            (Some(hair), Some(backhair)) => {
                Some(AlignmentTable::build(hair.len(), backhair.variants())?)
            }
            _ => None,
        };

        let mut session = Self {
            source,
            workers,
            settings,
            categories,
            alignment,
            active: IndexMap::new(),
            palette: Palette::default(),
            events_tx,
            events_rx,
        };

        // Resolve the default variant of every category before the first
        // composition, like the editor's initial load.
        let names: Vec<String> = session.categories.keys().cloned().collect();
        for name in names {
            let part = {
                let cat = session.category(&name)?;
                session.request(cat, 0)
            };
            let layer = session.await_part(&name, 0, &part)?;
            session.active.insert(name, layer);
        }

        info!(
            "session ready: {} categories, capacity {}, radius {}",
            session.categories.len(),
            session.settings.cache_capacity,
            session.settings.preload_radius
        );
        Ok(session)
    }

    // --- Navigation ---

    /// Move a category's selection by `delta` steps (circular)
    pub fn step(&mut self, category: &str, delta: i64) -> Result<usize, VisageError> {
        let current = self.category(category)?.selection() as i64;
        self.select_offset(category, current + delta)
    }

    /// Set a category's selection to an absolute index (wrapped)
    pub fn select_index(&mut self, category: &str, index: usize) -> Result<usize, VisageError> {
        self.select_offset(category, index as i64)
    }

    fn select_offset(&mut self, category: &str, target: i64) -> Result<usize, VisageError> {
        if category == LINK_FOLLOWER && self.alignment.is_some() {
            return Err(VisageError::LinkedSelection(category.to_string()));
        }

        let len = self.category(category)?.len();
        let new_index = preload::wrap(target, len).ok_or_else(|| {
            VisageError::ListingFetch {
                category: category.to_string(),
                reason: "empty variant list".into(),
            }
        })?;
        self.apply_selection(category, new_index)
    }

    /// Preload around the target, advance the selection, await the
    /// target and swap it (with its linked follower, if any) into the
    /// active composition.
    fn apply_selection(&mut self, category: &str, new_index: usize) -> Result<usize, VisageError> {
        // Issue every resolve before touching selection state
        let (target, linked) = {
            let cat = self.category(category)?;
            let target = self.preload_window(cat, new_index);

            let linked = match (&self.alignment, category == LINK_PRIMARY) {
                (Some(table), true) => match self.categories.get(LINK_FOLLOWER) {
                    Some(backhair) => {
                        let follower_index = table.lookup(new_index);
                        let part = self.preload_window(backhair, follower_index);
                        Some((follower_index, part))
                    }
                    None => None,
                },
                _ => None,
            };
            (target, linked)
        };

        // Selection moves only after the assets were requested
        let prev = self.set_selection(category, new_index)?;
        let prev_linked = match &linked {
            Some((follower_index, _)) => Some(self.set_selection(LINK_FOLLOWER, *follower_index)?),
            None => None,
        };

        let rollback = |session: &mut Self| {
            let _ = session.set_selection(category, prev);
            if let Some(prev_follower) = prev_linked {
                let _ = session.set_selection(LINK_FOLLOWER, prev_follower);
            }
        };

        let layer = match self.await_part(category, new_index, &target) {
            Ok(layer) => layer,
            Err(err) => {
                rollback(self);
                return Err(err);
            }
        };

        let linked_layer = match &linked {
            Some((follower_index, part)) => {
                match self.await_part(LINK_FOLLOWER, *follower_index, part) {
                    Ok(layer) => Some(layer),
                    Err(err) => {
                        rollback(self);
                        return Err(err);
                    }
                }
            }
            None => None,
        };

        // Swap both layers together, and only if the awaited indices are
        // still the current selections (an older completion must never
        // overwrite a newer selection).
        let still_current = self.category(category)?.selection() == new_index
            && match &linked {
                Some((follower_index, _)) => {
                    self.category(LINK_FOLLOWER)?.selection() == *follower_index
                }
                None => true,
            };
        if still_current {
            self.active.insert(category.to_string(), layer);
            if let Some(layer) = linked_layer {
                self.active.insert(LINK_FOLLOWER.to_string(), layer);
            }
        }

        Ok(new_index)
    }

    // --- Cache plumbing ---

    /// Resolve every index in the preload window, dispatching one fetch
    /// per cache miss, and return the (most recently touched) handle for
    /// the center index.
    fn preload_window(&self, cat: &Category, center: usize) -> Part {
        for index in preload::window(center, cat.len(), self.settings.preload_radius) {
            self.request(cat, index);
        }
        // Touch the center last so eviction can never pick it
        self.request(cat, center)
    }

    /// Cache resolve plus fetch dispatch on insertion
    fn request(&self, cat: &Category, index: usize) -> Part {
        let (part, inserted) = cat.store().resolve(index);
        if !inserted {
            return part;
        }

        let Some(descriptor) = cat.descriptor(index) else {
            // Indices are wrapped before they get here
            cat.store().remove_if(index, &part);
            part.fail(format!("no variant at index {}", index));
            return part;
        };

        let source = Arc::clone(&self.source);
        let store = Arc::clone(cat.store());
        let category = cat.name().to_string();
        let name = descriptor.name.clone();
        let events = self.events_tx.clone();
        let handle = part.clone();

        self.workers.execute(move || {
            let outcome = source
                .fetch_part(&category, &name)
                .and_then(|text| svg::parse_part(&text));
            match outcome {
                Ok(layer) => {
                    handle.fulfill(layer);
                    let _ = events.send(SessionEvent::PartLoaded { category, index });
                }
                Err(err) => {
                    let reason = err.to_string();
                    // Drop the entry before waking waiters so a retry
                    // always sees a clean cache
                    store.remove_if(index, &handle);
                    handle.fail(reason.clone());
                    warn!("{}[{}] '{}': {}", category, index, name, reason);
                    let _ = events.send(SessionEvent::PartFailed {
                        category,
                        index,
                        reason,
                    });
                }
            }
        });

        part
    }

    fn await_part(
        &self,
        category: &str,
        index: usize,
        part: &Part,
    ) -> Result<Arc<PartLayer>, VisageError> {
        let timeout = Duration::from_millis(self.settings.fetch_timeout_ms);
        part.wait_ready(timeout).map_err(|wait| match wait {
            PartWait::Failed(reason) => VisageError::AssetFetch {
                category: category.to_string(),
                name: self
                    .categories
                    .get(category)
                    .and_then(|c| c.descriptor(index))
                    .map(|d| d.name.clone())
                    .unwrap_or_default(),
                reason,
            },
            PartWait::Timeout => VisageError::SelectionTimeout {
                category: category.to_string(),
                index,
            },
        })
    }

    // --- Accessors ---

    pub fn category(&self, name: &str) -> Result<&Category, VisageError> {
        self.categories
            .get(name)
            .ok_or_else(|| VisageError::UnknownCategory(name.to_string()))
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(|k| k.as_str())
    }

    /// Current selection per category, layer order
    pub fn selections(&self) -> BTreeMap<String, usize> {
        self.categories
            .iter()
            .map(|(name, cat)| (name.clone(), cat.selection()))
            .collect()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    /// Progress event stream (fetch completions and failures)
    pub fn events(&self) -> Receiver<SessionEvent> {
        self.events_rx.clone()
    }

    /// Compose the active parts into one SVG document
    pub fn compose(&self) -> Result<String, VisageError> {
        let mut layers = Vec::with_capacity(self.categories.len());
        for name in self.categories.keys() {
            let layer = self.active.get(name).ok_or_else(|| {
                VisageError::UnknownCategory(format!("no active part for '{}'", name))
            })?;
            layers.push(Arc::clone(layer));
        }
        Ok(compose::compose_document(&layers, &self.palette))
    }

    fn set_selection(&mut self, category: &str, index: usize) -> Result<usize, VisageError> {
        let cat = self
            .categories
            .get_mut(category)
            .ok_or_else(|| VisageError::UnknownCategory(category.to_string()))?;
        let prev = cat.selection();
        cat.set_selection(index);
        Ok(prev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    struct MockSource {
        lists: HashMap<String, Vec<String>>,
        fetches: AtomicUsize,
        failing: Mutex<HashSet<String>>,
    }

    impl MockSource {
        fn new(lists: &[(&str, Vec<String>)]) -> Arc<Self> {
            Arc::new(Self {
                lists: lists
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
                fetches: AtomicUsize::new(0),
                failing: Mutex::new(HashSet::new()),
            })
        }

        fn names(category: &str, count: usize) -> Vec<String> {
            (0..count)
                .map(|i| format!("{}_{:04}_v.svg", category, i))
                .collect()
        }

        fn set_failing(&self, name: &str, failing: bool) {
            let mut set = self.failing.lock().unwrap();
            if failing {
                set.insert(name.to_string());
            } else {
                set.remove(name);
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl PartSource for MockSource {
        fn list_variants(&self, category: &str) -> Result<Vec<VariantDescriptor>, VisageError> {
            let names = self
                .lists
                .get(category)
                .ok_or_else(|| VisageError::ListingFetch {
                    category: category.to_string(),
                    reason: "not in mock".into(),
                })?;
            Ok(names
                .iter()
                .map(|n| VariantDescriptor::new(n.clone(), vec![], format!("creator-of-{}", n)))
                .collect())
        }

        fn fetch_part(&self, category: &str, name: &str) -> Result<String, VisageError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.failing.lock().unwrap().contains(name) {
                return Err(VisageError::AssetFetch {
                    category: category.to_string(),
                    name: name.to_string(),
                    reason: "mock failure".into(),
                });
            }
            Ok(format!(
                concat!(
                    "<svg xmlns=\"http://www.w3.org/2000/svg\" ",
                    "xmlns:cc=\"http://creativecommons.org/ns#\" ",
                    "xmlns:dc=\"http://purl.org/dc/elements/1.1/\">",
                    "<g id=\"{name}\"><path d=\"M 0,0 H 1\"/></g>",
                    "<metadata><cc:Work><dc:creator><cc:Agent>",
                    "<dc:title>creator-of-{name}</dc:title>",
                    "</cc:Agent></dc:creator></cc:Work></metadata></svg>"
                ),
                name = name
            ))
        }
    }

    use crate::entities::variant::VariantDescriptor;

    fn settings(categories: &[&str]) -> Settings {
        Settings {
            categories: categories.iter().map(|s| s.to_string()).collect(),
            fetch_timeout_ms: 5_000,
            workers_override: 2,
            ..Default::default()
        }
    }

    fn wait_until(pred: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !pred() {
            assert!(Instant::now() < deadline, "condition not reached in time");
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn connect_resolves_every_default() {
        let source = MockSource::new(&[
            ("head", MockSource::names("head", 3)),
            ("eyes", MockSource::names("eyes", 4)),
        ]);
        let session = Session::connect(source.clone(), settings(&["head", "eyes"])).unwrap();

        assert_eq!(session.category("head").unwrap().selection(), 0);
        assert!(session.category("head").unwrap().store().contains(0));
        assert_eq!(source.fetch_count(), 2);

        let doc = session.compose().unwrap();
        assert!(doc.contains("id=\"head_0000_v.svg\""));
        assert!(doc.contains("id=\"eyes_0000_v.svg\""));
    }

    #[test]
    fn listing_failure_is_fatal() {
        let source = MockSource::new(&[("head", MockSource::names("head", 3))]);
        let result = Session::connect(source, settings(&["head", "ghost"]));
        assert!(matches!(
            result,
            Err(VisageError::ListingFetch { category, .. }) if category == "ghost"
        ));
    }

    #[test]
    fn selection_preloads_the_wrapped_window() {
        let source = MockSource::new(&[("hat", MockSource::names("hat", 5))]);
        let mut session = Session::connect(source.clone(), settings(&["hat"])).unwrap();

        let index = session.select_index("hat", 0).unwrap();
        assert_eq!(index, 0);

        // radius 2 around 0 on a 5-element list touches every index
        wait_until(|| source.fetch_count() == 5);
        let store = Arc::clone(session.category("hat").unwrap().store());
        wait_until(move || (0..5).all(|i| store.get(i).is_some_and(|p| p.layer().is_some())));
        assert_eq!(session.category("hat").unwrap().store().len(), 5);
    }

    #[test]
    fn revisiting_a_cached_selection_fetches_nothing() {
        let source = MockSource::new(&[("hat", MockSource::names("hat", 5))]);
        let mut session = Session::connect(source.clone(), settings(&["hat"])).unwrap();

        session.select_index("hat", 0).unwrap();
        wait_until(|| source.fetch_count() == 5);

        session.select_index("hat", 1).unwrap();
        assert_eq!(source.fetch_count(), 5, "window already resident");
    }

    #[test]
    fn navigation_round_trips() {
        let source = MockSource::new(&[("hat", MockSource::names("hat", 5))]);
        let mut session = Session::connect(source, settings(&["hat"])).unwrap();

        for _ in 0..3 {
            session.step("hat", 1).unwrap();
        }
        assert_eq!(session.category("hat").unwrap().selection(), 3);
        for _ in 0..3 {
            session.step("hat", -1).unwrap();
        }
        assert_eq!(session.category("hat").unwrap().selection(), 0);
    }

    #[test]
    fn steps_wrap_in_both_directions() {
        let source = MockSource::new(&[("hat", MockSource::names("hat", 5))]);
        let mut session = Session::connect(source, settings(&["hat"])).unwrap();

        assert_eq!(session.step("hat", -1).unwrap(), 4);
        assert_eq!(session.step("hat", 1).unwrap(), 0);
        assert_eq!(session.select_index("hat", 7).unwrap(), 2);
    }

    #[test]
    fn failed_fetch_keeps_selection_and_retries() {
        let source = MockSource::new(&[("eyes", MockSource::names("eyes", 8))]);
        let mut session = Session::connect(source.clone(), settings(&["eyes"])).unwrap();

        source.set_failing("eyes_0003_v.svg", true);
        let err = session.select_index("eyes", 3).unwrap_err();
        assert!(matches!(err, VisageError::AssetFetch { .. }));
        assert_eq!(session.category("eyes").unwrap().selection(), 0);
        assert!(
            !session.category("eyes").unwrap().store().contains(3),
            "failures are not cached"
        );

        source.set_failing("eyes_0003_v.svg", false);
        let before = source.fetch_count();
        session.select_index("eyes", 3).unwrap();
        assert!(source.fetch_count() > before, "a new fetch was issued");
        assert_eq!(session.category("eyes").unwrap().selection(), 3);
    }

    #[test]
    fn hair_selection_drives_backhair_through_the_table() {
        // Back-hair variant 1 becomes active at hair index 4
        let source = MockSource::new(&[
            ("hair", MockSource::names("hair", 8)),
            (
                "backhair",
                vec![
                    "backhair_0000_v.svg".to_string(),
                    "backhair_0004_v.svg".to_string(),
                ],
            ),
        ]);
        let mut session =
            Session::connect(source, settings(&["backhair", "hair"])).unwrap();

        // Still below the threshold: follower stays at the default
        session.select_index("hair", 1).unwrap();
        assert_eq!(session.category("backhair").unwrap().selection(), 0);

        session.select_index("hair", 5).unwrap();
        assert_eq!(session.category("backhair").unwrap().selection(), 1);

        // Stepping back re-derives the default
        session.select_index("hair", 0).unwrap();
        assert_eq!(session.category("backhair").unwrap().selection(), 0);
    }

    #[test]
    fn follower_category_cannot_be_selected_directly() {
        let source = MockSource::new(&[
            ("hair", MockSource::names("hair", 4)),
            ("backhair", vec!["backhair_0000_v.svg".to_string()]),
        ]);
        let mut session =
            Session::connect(source, settings(&["backhair", "hair"])).unwrap();
        assert!(matches!(
            session.step("backhair", 1),
            Err(VisageError::LinkedSelection(_))
        ));
    }

    #[test]
    fn linked_pair_fails_and_rolls_back_together() {
        let source = MockSource::new(&[
            ("hair", MockSource::names("hair", 8)),
            (
                "backhair",
                vec![
                    "backhair_0000_v.svg".to_string(),
                    "backhair_0004_v.svg".to_string(),
                ],
            ),
        ]);
        let mut session =
            Session::connect(source.clone(), settings(&["backhair", "hair"])).unwrap();

        source.set_failing("backhair_0004_v.svg", true);
        let err = session.select_index("hair", 5).unwrap_err();
        assert!(matches!(err, VisageError::AssetFetch { .. }));
        assert_eq!(session.category("hair").unwrap().selection(), 0);
        assert_eq!(session.category("backhair").unwrap().selection(), 0);

        // The composition still renders the pre-failure pair
        let doc = session.compose().unwrap();
        assert!(doc.contains("id=\"backhair_0000_v.svg\""));
        assert!(doc.contains("id=\"hair_0000_v.svg\""));
    }

    #[test]
    fn cache_capacity_holds_under_navigation() {
        let source = MockSource::new(&[("hat", MockSource::names("hat", 40))]);
        let mut session = Session::connect(source, settings(&["hat"])).unwrap();

        for i in (0..40).step_by(3) {
            session.select_index("hat", i).unwrap();
            assert!(session.category("hat").unwrap().store().len() <= 10);
        }
    }
}
