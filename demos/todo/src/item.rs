//! A single to-do item: text with an editing draft and a done flag.

use rxstore_core::{Events, Guard, ItemId, Reducer, smallvec};
use rxstore_macros::Kind;
use rxstore_runtime::{Bound, Port, Store, StoreConfig, StoreError};
use serde::{Deserialize, Serialize};

/// State of one to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItemState {
    /// Assigned once at creation, never reused
    pub id: ItemId,
    /// Accepted text
    pub text: String,
    /// Draft text while editing, empty otherwise
    pub editing_text: String,
    /// Whether the item is done
    pub is_done: bool,
    /// Whether an edition is in progress
    pub is_editing: bool,
}

impl TodoItemState {
    /// A fresh, not-done, not-editing item
    #[must_use]
    pub fn new(id: ItemId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            editing_text: String::new(),
            is_done: false,
            is_editing: false,
        }
    }
}

/// Commands accepted by a to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Kind)]
#[serde(tag = "kind", content = "text", rename_all = "kebab-case")]
pub enum TodoItemCommand {
    /// Replace the draft text (only while editing)
    UpdateEditingText(String),
    /// Begin editing (only when neither editing nor done)
    StartEdition,
    /// Drop the draft (only while editing)
    CancelEdition,
    /// Commit the draft (only while editing)
    AcceptEdition,
    /// Mark as done (only when not done)
    MarkDone,
    /// Mark as not done (only when done)
    MarkUndone,
}

/// Events folded into a to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Kind)]
#[serde(tag = "kind", content = "text", rename_all = "kebab-case")]
pub enum TodoItemEvent {
    /// The draft text was replaced
    EditingTextUpdated(String),
    /// Editing began; the draft starts from the current text
    EditionStarted,
    /// Editing stopped without committing
    EditionCancelled,
    /// The draft became the text
    EditionAccepted,
    /// The item was marked as done
    MarkedAsDone,
    /// The item was marked as not done
    MarkedAsUndone,
}

/// Folds item events
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoItemReducer;

impl Reducer for TodoItemReducer {
    type State = TodoItemState;
    type Event = TodoItemEvent;

    fn reduce(&self, state: &mut TodoItemState, event: TodoItemEvent) {
        match event {
            TodoItemEvent::EditingTextUpdated(text) => state.editing_text = text,
            TodoItemEvent::EditionStarted => {
                state.editing_text.clone_from(&state.text);
                state.is_editing = true;
            },
            TodoItemEvent::EditionCancelled => {
                state.editing_text.clear();
                state.is_editing = false;
            },
            TodoItemEvent::EditionAccepted => {
                state.text = std::mem::take(&mut state.editing_text);
                state.is_editing = false;
            },
            TodoItemEvent::MarkedAsDone => state.is_done = true,
            TodoItemEvent::MarkedAsUndone => state.is_done = false,
        }
    }
}

/// Domain rules for item commands
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoItemGuard;

impl Guard for TodoItemGuard {
    type State = TodoItemState;
    type Command = TodoItemCommand;
    type Event = TodoItemEvent;
    type Environment = ();

    fn guard(&self, state: &TodoItemState, command: &TodoItemCommand, _env: &()) -> Events<TodoItemEvent> {
        match command {
            TodoItemCommand::UpdateEditingText(text) if state.is_editing => {
                smallvec![TodoItemEvent::EditingTextUpdated(text.clone())]
            },
            TodoItemCommand::StartEdition if !state.is_editing && !state.is_done => {
                smallvec![TodoItemEvent::EditionStarted]
            },
            TodoItemCommand::CancelEdition if state.is_editing => smallvec![TodoItemEvent::EditionCancelled],
            TodoItemCommand::AcceptEdition if state.is_editing => smallvec![TodoItemEvent::EditionAccepted],
            // Completion always cancels the edition first, editing or not.
            TodoItemCommand::MarkDone if !state.is_done => {
                smallvec![TodoItemEvent::EditionCancelled, TodoItemEvent::MarkedAsDone]
            },
            TodoItemCommand::MarkUndone if state.is_done => {
                smallvec![TodoItemEvent::EditionCancelled, TodoItemEvent::MarkedAsUndone]
            },
            _ => Events::new(),
        }
    }
}

/// One port per item command kind
#[derive(Debug, Clone)]
pub struct TodoItemCommandPorts {
    /// `update_editing_text()` invocations with their text
    pub update_editing_text: Port<String>,
    /// `start_edition()` invocations
    pub start_edition: Port<()>,
    /// `cancel_edition()` invocations
    pub cancel_edition: Port<()>,
    /// `accept_edition()` invocations
    pub accept_edition: Port<()>,
    /// `mark_done()` invocations
    pub mark_done: Port<()>,
    /// `mark_undone()` invocations
    pub mark_undone: Port<()>,
}

impl TodoItemCommandPorts {
    fn split(commands: &Port<TodoItemCommand>) -> Self {
        let only = |kind: TodoItemCommand| {
            commands.filter_map(move |command: &TodoItemCommand| (*command == kind).then_some(()))
        };
        Self {
            update_editing_text: commands.filter_map(|command: &TodoItemCommand| match command {
                TodoItemCommand::UpdateEditingText(text) => Some(text.clone()),
                _ => None,
            }),
            start_edition: only(TodoItemCommand::StartEdition),
            cancel_edition: only(TodoItemCommand::CancelEdition),
            accept_edition: only(TodoItemCommand::AcceptEdition),
            mark_done: only(TodoItemCommand::MarkDone),
            mark_undone: only(TodoItemCommand::MarkUndone),
        }
    }
}

/// One port per item event kind
#[derive(Debug, Clone)]
pub struct TodoItemEventPorts {
    /// New draft texts
    pub editing_text_updated: Port<String>,
    /// Editions begun
    pub edition_started: Port<()>,
    /// Editions dropped
    pub edition_cancelled: Port<()>,
    /// Editions committed
    pub edition_accepted: Port<()>,
    /// Completions
    pub marked_as_done: Port<()>,
    /// Reopenings
    pub marked_as_undone: Port<()>,
}

impl TodoItemEventPorts {
    fn split(events: &Port<TodoItemEvent>) -> Self {
        let only =
            |kind: TodoItemEvent| events.filter_map(move |event: &TodoItemEvent| (*event == kind).then_some(()));
        Self {
            editing_text_updated: events.filter_map(|event: &TodoItemEvent| match event {
                TodoItemEvent::EditingTextUpdated(text) => Some(text.clone()),
                _ => None,
            }),
            edition_started: only(TodoItemEvent::EditionStarted),
            edition_cancelled: only(TodoItemEvent::EditionCancelled),
            edition_accepted: only(TodoItemEvent::EditionAccepted),
            marked_as_done: only(TodoItemEvent::MarkedAsDone),
            marked_as_undone: only(TodoItemEvent::MarkedAsUndone),
        }
    }
}

/// An item's per-kind ports
#[derive(Debug, Clone)]
pub struct TodoItemPorts {
    /// One port per command kind
    pub commands: TodoItemCommandPorts,
    /// One port per event kind
    pub events: TodoItemEventPorts,
}

/// Handle to one to-do item store
///
/// Cloning yields another handle to the same item.
#[derive(Debug, Clone)]
pub struct TodoItemStore {
    store: Store<TodoItemState, TodoItemCommand, TodoItemEvent>,
    ports: TodoItemPorts,
}

impl TodoItemStore {
    /// A new, unstarted item
    #[must_use]
    pub fn new(id: ItemId, text: impl Into<String>) -> Self {
        Self::wrap(Store::new(TodoItemState::new(id, text), TodoItemReducer, TodoItemGuard, ()))
    }

    /// A new, unstarted item with custom store configuration
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if `config` fails validation.
    pub fn with_config(id: ItemId, text: impl Into<String>, config: StoreConfig) -> Result<Self, StoreError> {
        let store = Store::with_config(
            TodoItemState::new(id, text),
            TodoItemReducer,
            TodoItemGuard,
            (),
            config,
        )?;
        Ok(Self::wrap(store))
    }

    fn wrap(store: Store<TodoItemState, TodoItemCommand, TodoItemEvent>) -> Self {
        let ports = TodoItemPorts {
            commands: TodoItemCommandPorts::split(store.commands()),
            events: TodoItemEventPorts::split(store.events()),
        };
        Self { store, ports }
    }

    /// Activate the item
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyStarted`] on a second call.
    pub fn start(&self) -> Result<(), StoreError> {
        self.store.start()
    }

    /// The item's id
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.store.current().id
    }

    /// Replace the draft text
    pub fn update_editing_text(&self, text: impl Into<String>) {
        self.store.send(TodoItemCommand::UpdateEditingText(text.into()));
    }

    /// Begin editing
    pub fn start_edition(&self) {
        self.store.send(TodoItemCommand::StartEdition);
    }

    /// Drop the draft
    pub fn cancel_edition(&self) {
        self.store.send(TodoItemCommand::CancelEdition);
    }

    /// Commit the draft
    pub fn accept_edition(&self) {
        self.store.send(TodoItemCommand::AcceptEdition);
    }

    /// Mark as done
    pub fn mark_done(&self) {
        self.store.send(TodoItemCommand::MarkDone);
    }

    /// Mark as not done
    pub fn mark_undone(&self) {
        self.store.send(TodoItemCommand::MarkUndone);
    }

    /// The current state with this item's commands attached
    #[must_use]
    pub fn snapshot(&self) -> Bound<TodoItemState, Self> {
        Bound::new(self.store.current(), self.clone())
    }

    /// Per-kind command and event ports
    #[must_use]
    pub const fn ports(&self) -> &TodoItemPorts {
        &self.ports
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &Store<TodoItemState, TodoItemCommand, TodoItemEvent> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxstore_testing::assertions::{assert_events, assert_suppressed};
    use rxstore_testing::{GuardTest, ReducerTest};

    fn item() -> TodoItemState {
        TodoItemState::new(ItemId::new(1), "buy milk")
    }

    fn editing(draft: &str) -> TodoItemState {
        TodoItemState {
            editing_text: draft.to_string(),
            is_editing: true,
            ..item()
        }
    }

    fn done() -> TodoItemState {
        TodoItemState { is_done: true, ..item() }
    }

    #[test]
    fn edition_started_copies_text_into_draft() {
        ReducerTest::new(TodoItemReducer)
            .given_state(item())
            .when_event(TodoItemEvent::EditionStarted)
            .then_state(|state| {
                assert_eq!(state.editing_text, "buy milk");
                assert!(state.is_editing);
            })
            .run();
    }

    #[test]
    fn edition_accepted_commits_draft() {
        ReducerTest::new(TodoItemReducer)
            .given_state(editing("buy oat milk"))
            .when_event(TodoItemEvent::EditionAccepted)
            .then_state(|state| {
                assert_eq!(state.text, "buy oat milk");
                assert_eq!(state.editing_text, "");
                assert!(!state.is_editing);
            })
            .run();
    }

    #[test]
    fn edition_cancelled_keeps_text() {
        ReducerTest::new(TodoItemReducer)
            .given_state(editing("scratch"))
            .when_event(TodoItemEvent::EditionCancelled)
            .then_state(|state| {
                assert_eq!(state.text, "buy milk");
                assert_eq!(state.editing_text, "");
                assert!(!state.is_editing);
            })
            .run();
    }

    #[test]
    fn done_flag_is_independent_of_edition() {
        ReducerTest::new(TodoItemReducer)
            .given_state(editing("draft"))
            .when_event(TodoItemEvent::MarkedAsDone)
            .then_state(|state| {
                assert!(state.is_done);
                assert!(state.is_editing);
            })
            .run();
    }

    #[test]
    fn update_text_requires_editing() {
        GuardTest::new(TodoItemGuard)
            .with_env(())
            .given_state(item())
            .when_command(TodoItemCommand::UpdateEditingText("x".to_string()))
            .then_events(assert_suppressed)
            .run();
    }

    #[test]
    fn start_edition_blocked_while_done() {
        GuardTest::new(TodoItemGuard)
            .with_env(())
            .given_state(done())
            .when_command(TodoItemCommand::StartEdition)
            .then_events(assert_suppressed)
            .run();
    }

    #[test]
    fn start_edition_blocked_while_editing() {
        GuardTest::new(TodoItemGuard)
            .with_env(())
            .given_state(editing(""))
            .when_command(TodoItemCommand::StartEdition)
            .then_events(assert_suppressed)
            .run();
    }

    #[test]
    fn accept_and_cancel_require_editing() {
        for command in [TodoItemCommand::AcceptEdition, TodoItemCommand::CancelEdition] {
            GuardTest::new(TodoItemGuard)
                .with_env(())
                .given_state(item())
                .when_command(command)
                .then_events(assert_suppressed)
                .run();
        }
    }

    #[test]
    fn mark_done_cancels_edition_first() {
        GuardTest::new(TodoItemGuard)
            .with_env(())
            .given_state(editing("draft"))
            .when_command(TodoItemCommand::MarkDone)
            .then_events(|events| {
                assert_events(
                    events,
                    &[TodoItemEvent::EditionCancelled, TodoItemEvent::MarkedAsDone],
                );
            })
            .run();
    }

    #[test]
    fn mark_done_twice_is_suppressed() {
        GuardTest::new(TodoItemGuard)
            .with_env(())
            .given_state(done())
            .when_command(TodoItemCommand::MarkDone)
            .then_events(assert_suppressed)
            .run();
    }

    #[test]
    fn mark_undone_requires_done() {
        GuardTest::new(TodoItemGuard)
            .with_env(())
            .given_state(item())
            .when_command(TodoItemCommand::MarkUndone)
            .then_events(assert_suppressed)
            .run();

        GuardTest::new(TodoItemGuard)
            .with_env(())
            .given_state(done())
            .when_command(TodoItemCommand::MarkUndone)
            .then_events(|events| {
                assert_events(
                    events,
                    &[TodoItemEvent::EditionCancelled, TodoItemEvent::MarkedAsUndone],
                );
            })
            .run();
    }

    #[test]
    fn kind_tags_are_kebab_case() {
        use rxstore_core::Kind as _;

        assert_eq!(TodoItemEvent::EditingTextUpdated(String::new()).kind(), "editing-text-updated");
        assert_eq!(TodoItemEvent::MarkedAsDone.kind(), "marked-as-done");
        assert_eq!(TodoItemCommand::StartEdition.kind(), "start-edition");
    }
}
