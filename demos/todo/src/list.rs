//! The to-do list: owns its item stores and keeps a filtered view of them.
//!
//! Items are child stores living in an [`Arena`]. Each child gets one fold
//! subscription, added when it is spawned, that writes its state back into
//! the list's `items` and emits [`TodoListEvent::ItemsChanged`]. The
//! filtered view is recomputed from scratch on every filter or items
//! change.

use crate::item::{TodoItemState, TodoItemStore};
use rxstore_core::{Events, Guard, IdGenerator, ItemId, Reducer, SequentialIds, smallvec};
use rxstore_macros::Kind;
use rxstore_runtime::{Arena, Bound, Port, Store, StoreConfig, StoreError, WeakStore};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Which items the filtered view keeps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    /// Every item
    #[default]
    All,
    /// Only done items
    Done,
    /// Only items not done
    NotDone,
}

impl Filter {
    /// Whether `item` passes this filter
    #[must_use]
    pub const fn keeps(self, item: &TodoItemState) -> bool {
        match self {
            Self::All => true,
            Self::Done => item.is_done,
            Self::NotDone => !item.is_done,
        }
    }

    /// The filtered view of `items`, order preserved
    #[must_use]
    pub fn apply(self, items: &[TodoItemState]) -> Vec<TodoItemState> {
        items.iter().filter(|item| self.keeps(item)).cloned().collect()
    }
}

/// State of the list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoListState {
    /// Every item, in creation order
    pub items: Vec<TodoItemState>,
    /// `filter` applied to `items`
    pub filtered_items: Vec<TodoItemState>,
    /// The active filter
    pub filter: Filter,
}

impl TodoListState {
    /// Whether an item with `id` is in the list
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// `items` with `item` replacing the entry of the same id, or appended
    #[must_use]
    pub fn with_item(&self, item: &TodoItemState) -> Vec<TodoItemState> {
        let mut items = self.items.clone();
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => existing.clone_from(item),
            None => items.push(item.clone()),
        }
        items
    }
}

/// Commands accepted by the list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Kind)]
#[serde(tag = "kind", content = "payload", rename_all = "kebab-case")]
pub enum TodoListCommand {
    /// Create an item (ignored for empty text)
    CreateItem(String),
    /// Switch the filter (ignored when unchanged)
    SetFilter(Filter),
    /// Remove an item (ignored for unknown ids)
    RemoveItem(ItemId),
}

/// Events folded into the list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Kind)]
#[serde(tag = "kind", content = "payload", rename_all = "kebab-case")]
pub enum TodoListEvent {
    /// The filter changed
    FilterSet(Filter),
    /// The item collection changed
    ItemsChanged(Vec<TodoItemState>),
    /// The filtered view was recomputed
    FilteredItemsChanged(Vec<TodoItemState>),
    /// A child item store was requested under a fresh id
    ItemCreated {
        /// Minted by the list's id generator
        id: ItemId,
        /// Initial text
        text: String,
    },
    /// An item left the list
    ItemRemoved(ItemId),
}

/// Folds list events
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoListReducer;

impl Reducer for TodoListReducer {
    type State = TodoListState;
    type Event = TodoListEvent;

    fn reduce(&self, state: &mut TodoListState, event: TodoListEvent) {
        match event {
            TodoListEvent::FilterSet(filter) => state.filter = filter,
            TodoListEvent::ItemsChanged(items) => state.items = items,
            TodoListEvent::FilteredItemsChanged(filtered) => state.filtered_items = filtered,
            // The item itself arrives through its fold as `ItemsChanged`.
            TodoListEvent::ItemCreated { .. } => {},
            TodoListEvent::ItemRemoved(id) => state.items.retain(|item| item.id != id),
        }
    }
}

/// Collaborators for the list guard
pub struct TodoListEnvironment {
    /// Mints item ids
    pub ids: Rc<dyn IdGenerator>,
}

impl TodoListEnvironment {
    /// An environment minting ids from `ids`
    #[must_use]
    pub fn new(ids: Rc<dyn IdGenerator>) -> Self {
        Self { ids }
    }
}

impl Default for TodoListEnvironment {
    fn default() -> Self {
        Self::new(Rc::new(SequentialIds::new()))
    }
}

impl fmt::Debug for TodoListEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TodoListEnvironment").finish_non_exhaustive()
    }
}

/// Domain rules for list commands
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoListGuard;

impl Guard for TodoListGuard {
    type State = TodoListState;
    type Command = TodoListCommand;
    type Event = TodoListEvent;
    type Environment = TodoListEnvironment;

    fn guard(
        &self,
        state: &TodoListState,
        command: &TodoListCommand,
        env: &TodoListEnvironment,
    ) -> Events<TodoListEvent> {
        match command {
            TodoListCommand::CreateItem(text) if !text.is_empty() => smallvec![TodoListEvent::ItemCreated {
                id: env.ids.next_id(),
                text: text.clone(),
            }],
            TodoListCommand::SetFilter(filter) if *filter != state.filter => {
                smallvec![TodoListEvent::FilterSet(*filter)]
            },
            TodoListCommand::RemoveItem(id) if state.contains(*id) => smallvec![TodoListEvent::ItemRemoved(*id)],
            _ => Events::new(),
        }
    }
}

/// One port per list command kind
#[derive(Debug, Clone)]
pub struct TodoListCommandPorts {
    /// `create_item()` invocations with their text
    pub create_item: Port<String>,
    /// `set_filter()` invocations
    pub set_filter: Port<Filter>,
    /// `remove_item()` invocations
    pub remove_item: Port<ItemId>,
}

impl TodoListCommandPorts {
    fn split(commands: &Port<TodoListCommand>) -> Self {
        Self {
            create_item: commands.filter_map(|command: &TodoListCommand| match command {
                TodoListCommand::CreateItem(text) => Some(text.clone()),
                _ => None,
            }),
            set_filter: commands.filter_map(|command: &TodoListCommand| match command {
                TodoListCommand::SetFilter(filter) => Some(*filter),
                _ => None,
            }),
            remove_item: commands.filter_map(|command: &TodoListCommand| match command {
                TodoListCommand::RemoveItem(id) => Some(*id),
                _ => None,
            }),
        }
    }
}

/// One port per list event kind
#[derive(Debug, Clone)]
pub struct TodoListEventPorts {
    /// Filter changes
    pub filter_set: Port<Filter>,
    /// New item collections
    pub items_changed: Port<Vec<TodoItemState>>,
    /// Recomputed filtered views
    pub filtered_items_changed: Port<Vec<TodoItemState>>,
    /// Minted ids with their initial text
    pub item_created: Port<(ItemId, String)>,
    /// Removed ids
    pub item_removed: Port<ItemId>,
}

impl TodoListEventPorts {
    fn split(events: &Port<TodoListEvent>) -> Self {
        Self {
            filter_set: events.filter_map(|event: &TodoListEvent| match event {
                TodoListEvent::FilterSet(filter) => Some(*filter),
                _ => None,
            }),
            items_changed: events.filter_map(|event: &TodoListEvent| match event {
                TodoListEvent::ItemsChanged(items) => Some(items.clone()),
                _ => None,
            }),
            filtered_items_changed: events.filter_map(|event: &TodoListEvent| match event {
                TodoListEvent::FilteredItemsChanged(items) => Some(items.clone()),
                _ => None,
            }),
            item_created: events.filter_map(|event: &TodoListEvent| match event {
                TodoListEvent::ItemCreated { id, text } => Some((*id, text.clone())),
                _ => None,
            }),
            item_removed: events.filter_map(|event: &TodoListEvent| match event {
                TodoListEvent::ItemRemoved(id) => Some(*id),
                _ => None,
            }),
        }
    }
}

/// The list's per-kind ports
#[derive(Debug, Clone)]
pub struct TodoListPorts {
    /// One port per command kind
    pub commands: TodoListCommandPorts,
    /// One port per event kind
    pub events: TodoListEventPorts,
}

type ItemArena = Arena<ItemId, TodoItemStore>;
type ListStore = Store<TodoListState, TodoListCommand, TodoListEvent>;

/// Handle to the to-do list store
///
/// Cloning yields another handle to the same list.
#[derive(Debug, Clone)]
pub struct TodoListStore {
    store: ListStore,
    ports: TodoListPorts,
    arena: Rc<RefCell<ItemArena>>,
}

impl TodoListStore {
    /// An empty, unstarted list minting ids from 1
    #[must_use]
    pub fn new() -> Self {
        Self::wire(
            Store::new(
                TodoListState::default(),
                TodoListReducer,
                TodoListGuard,
                TodoListEnvironment::default(),
            ),
            true,
        )
    }

    /// An empty, unstarted list with custom environment and configuration
    ///
    /// Item stores inherit the list's metrics setting.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if `config` fails validation.
    pub fn with_config(env: TodoListEnvironment, config: StoreConfig) -> Result<Self, StoreError> {
        let metrics = config.metrics;
        let store = Store::with_config(TodoListState::default(), TodoListReducer, TodoListGuard, env, config)?;
        Ok(Self::wire(store, metrics))
    }

    fn wire(store: ListStore, metrics: bool) -> Self {
        let arena = Rc::new(RefCell::new(ItemArena::new()));
        let ports = TodoListPorts {
            commands: TodoListCommandPorts::split(store.commands()),
            events: TodoListEventPorts::split(store.events()),
        };

        // Derived view: recomputed, never patched.
        store.wire_event(|event, state| match event {
            TodoListEvent::FilterSet(_) | TodoListEvent::ItemsChanged(_) | TodoListEvent::ItemRemoved(_) => {
                smallvec![TodoListEvent::FilteredItemsChanged(state.filter.apply(&state.items))]
            },
            TodoListEvent::FilteredItemsChanged(_) | TodoListEvent::ItemCreated { .. } => Events::new(),
        });

        let list = store.downgrade();
        let children = Rc::clone(&arena);
        store.wire_event(move |event, _state| {
            match event {
                TodoListEvent::ItemCreated { id, text } => spawn(&list, &children, *id, text, metrics),
                TodoListEvent::ItemRemoved(id) => {
                    if children.borrow_mut().release(id).is_some() {
                        tracing::debug!(item = %id, "Item store released");
                    }
                },
                _ => {},
            }
            Events::new()
        });

        Self { store, ports, arena }
    }

    /// Activate the list
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyStarted`] on a second call.
    pub fn start(&self) -> Result<(), StoreError> {
        self.store.start()
    }

    /// Create an item; empty text is ignored
    pub fn create_item(&self, text: impl Into<String>) {
        self.store.send(TodoListCommand::CreateItem(text.into()));
    }

    /// Switch the filter; the current filter is ignored
    pub fn set_filter(&self, filter: Filter) {
        self.store.send(TodoListCommand::SetFilter(filter));
    }

    /// Remove an item; unknown ids are ignored
    pub fn remove_item(&self, id: ItemId) {
        self.store.send(TodoListCommand::RemoveItem(id));
    }

    /// The current state with this list's commands attached
    #[must_use]
    pub fn snapshot(&self) -> Bound<TodoListState, Self> {
        Bound::new(self.store.current(), self.clone())
    }

    /// The item store under `id`, bound to its current state
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<Bound<TodoItemState, TodoItemStore>> {
        let item = self.arena.borrow().get(&id)?.clone();
        Some(item.snapshot())
    }

    /// Every item in creation order, each bound to its store
    #[must_use]
    pub fn items(&self) -> Vec<Bound<TodoItemState, TodoItemStore>> {
        self.bind(&self.store.current().items)
    }

    /// The filtered view, each entry bound to its store
    #[must_use]
    pub fn filtered(&self) -> Vec<Bound<TodoItemState, TodoItemStore>> {
        self.bind(&self.store.current().filtered_items)
    }

    fn bind(&self, items: &[TodoItemState]) -> Vec<Bound<TodoItemState, TodoItemStore>> {
        let arena = self.arena.borrow();
        items
            .iter()
            .filter_map(|item| {
                let child = arena.get(&item.id)?;
                Some(Bound::new(Rc::new(item.clone()), child.clone()))
            })
            .collect()
    }

    /// Number of live item stores
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.arena.borrow().len()
    }

    /// Per-kind command and event ports
    #[must_use]
    pub const fn ports(&self) -> &TodoListPorts {
        &self.ports
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &ListStore {
        &self.store
    }
}

impl Default for TodoListStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Create, adopt and start the item store for a freshly minted id
fn spawn(
    list: &WeakStore<TodoListState, TodoListCommand, TodoListEvent>,
    arena: &Rc<RefCell<ItemArena>>,
    id: ItemId,
    text: &str,
    metrics: bool,
) {
    let config = StoreConfig::new(format!("todo-item-{id}")).with_metrics(metrics);
    let item = match TodoItemStore::with_config(id, text, config) {
        Ok(item) => item,
        Err(error) => {
            tracing::error!(item = %id, %error, "Item store rejected its configuration");
            return;
        },
    };

    // Fold: every child snapshot replaces its entry in `items` by id.
    let parent = list.clone();
    let fold = item.store().state().subscribe(move |snapshot: &TodoItemState| {
        let Some(list) = parent.upgrade() else {
            return;
        };
        let Some(state) = list.state().latest() else {
            return;
        };
        list.emit(TodoListEvent::ItemsChanged(state.with_item(snapshot)));
    });

    arena.borrow_mut().adopt(id, item.clone(), fold);
    tracing::debug!(item = %id, "Item store spawned");

    // The borrow is released: starting runs the fold, which touches the list.
    if let Err(error) = item.start() {
        tracing::warn!(item = %id, %error, "Item store was already running");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use rxstore_testing::assertions::{assert_events, assert_suppressed};
    use rxstore_testing::{GuardTest, ReducerTest, test_ids};

    fn item(id: u64, done: bool) -> TodoItemState {
        TodoItemState {
            is_done: done,
            ..TodoItemState::new(ItemId::new(id), format!("item {id}"))
        }
    }

    fn env() -> TodoListEnvironment {
        TodoListEnvironment::new(Rc::new(test_ids()))
    }

    #[test]
    fn filters_select_by_done_flag() {
        let items = vec![item(1, false), item(2, true), item(3, false)];

        assert_eq!(Filter::All.apply(&items), items);
        assert_eq!(Filter::Done.apply(&items), vec![item(2, true)]);
        assert_eq!(Filter::NotDone.apply(&items), vec![item(1, false), item(3, false)]);
    }

    #[test]
    fn with_item_replaces_in_place() {
        let state = TodoListState {
            items: vec![item(1, false), item(2, false)],
            ..TodoListState::default()
        };

        let items = state.with_item(&item(1, true));
        assert_eq!(items, vec![item(1, true), item(2, false)]);

        let items = state.with_item(&item(3, false));
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].id, ItemId::new(3));
    }

    #[test]
    fn item_removed_drops_only_that_item() {
        ReducerTest::new(TodoListReducer)
            .given_state(TodoListState {
                items: vec![item(1, false), item(2, false)],
                ..TodoListState::default()
            })
            .when_event(TodoListEvent::ItemRemoved(ItemId::new(1)))
            .then_state(|state| assert_eq!(state.items, vec![item(2, false)]))
            .run();
    }

    #[test]
    fn item_created_leaves_state_alone() {
        ReducerTest::new(TodoListReducer)
            .given_state(TodoListState::default())
            .when_event(TodoListEvent::ItemCreated {
                id: ItemId::new(1),
                text: "x".to_string(),
            })
            .then_state(|state| assert_eq!(*state, TodoListState::default()))
            .run();
    }

    #[test]
    fn create_item_mints_ids() {
        GuardTest::new(TodoListGuard)
            .with_env(env())
            .given_state(TodoListState::default())
            .when_command(TodoListCommand::CreateItem("buy milk".to_string()))
            .then_events(|events| {
                assert_events(
                    events,
                    &[TodoListEvent::ItemCreated {
                        id: ItemId::new(1),
                        text: "buy milk".to_string(),
                    }],
                );
            })
            .run();
    }

    #[test]
    fn create_item_ignores_empty_text() {
        GuardTest::new(TodoListGuard)
            .with_env(env())
            .given_state(TodoListState::default())
            .when_command(TodoListCommand::CreateItem(String::new()))
            .then_events(assert_suppressed)
            .run();
    }

    #[test]
    fn set_filter_ignores_current_filter() {
        GuardTest::new(TodoListGuard)
            .with_env(env())
            .given_state(TodoListState::default())
            .when_command(TodoListCommand::SetFilter(Filter::All))
            .then_events(assert_suppressed)
            .run();
    }

    #[test]
    fn remove_item_ignores_unknown_ids() {
        GuardTest::new(TodoListGuard)
            .with_env(env())
            .given_state(TodoListState {
                items: vec![item(1, false)],
                ..TodoListState::default()
            })
            .when_command(TodoListCommand::RemoveItem(ItemId::new(9)))
            .then_events(assert_suppressed)
            .run();
    }

    #[test]
    fn filter_serializes_like_the_wire_names() {
        let json = serde_json::to_string(&[Filter::All, Filter::Done, Filter::NotDone]);
        assert_eq!(json.ok().as_deref(), Some(r#"["all","done","notDone"]"#));
    }
}
