//! In-memory window server for tests
//!
//! Holds a window tree with properties, a single grab flag, per-window
//! watches and an event queue. When the queue runs dry `next_event` runs the
//! next scheduled action, which plays the part of another client (a
//! competing locker, or Firefox answering a command). Requests from other
//! clients made while the server is grabbed wait until the ungrab.

use anyhow::{Result, bail};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use super::server::{Property, PropertyState, ServerEvent, Window, WindowServer};

type Action = Box<dyn FnOnce(&MemoryServer)>;

const ROOT: Window = 0x100;

#[derive(Default)]
struct State {
    next_id: Window,
    children: HashMap<Window, Vec<Window>>,
    properties: HashMap<(Window, Property), Vec<u8>>,
    destroyed: HashSet<Window>,
    watched: HashSet<Window>,
    events: VecDeque<ServerEvent>,
    failing: HashSet<Property>,
    grabbed: bool,
    grabs: usize,
    writes: Vec<Write>,
}

/// A successful property write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    pub window: Window,
    pub property: Property,
    pub value: Vec<u8>,
    /// Whether the server was grabbed when the write was served
    pub grabbed: bool,
}

pub struct MemoryServer {
    state: RefCell<State>,
    idle: RefCell<VecDeque<Action>>,
    during_grab: RefCell<VecDeque<Action>>,
    deferred: RefCell<VecDeque<Action>>,
}

impl MemoryServer {
    pub fn new() -> Self {
        let state = State {
            next_id: ROOT + 1,
            ..State::default()
        };
        Self {
            state: RefCell::new(state),
            idle: RefCell::new(VecDeque::new()),
            during_grab: RefCell::new(VecDeque::new()),
            deferred: RefCell::new(VecDeque::new()),
        }
    }

    /// Create a window as the last child of `parent`
    pub fn add_window(&self, parent: Window) -> Window {
        let mut state = self.state.borrow_mut();
        let window = state.next_id;
        state.next_id += 1;
        state.children.entry(parent).or_default().push(window);
        window
    }

    /// Set a property, panicking on failure
    pub fn put(&self, window: Window, property: Property, value: &str) {
        self.set(window, property, value.as_bytes()).unwrap();
    }

    pub fn value(&self, window: Window, property: Property) -> Option<String> {
        self.state
            .borrow()
            .properties
            .get(&(window, property))
            .map(|v| String::from_utf8_lossy(v).into_owned())
    }

    /// Destroy a window and notify watchers
    pub fn destroy(&self, window: Window) {
        let mut state = self.state.borrow_mut();
        state.destroyed.insert(window);
        state.properties.retain(|(w, _), _| *w != window);
        if state.watched.remove(&window) {
            state.events.push_back(ServerEvent::Destroyed { window });
        }
    }

    /// Make every write of `property` fail
    pub fn fail_writes(&self, property: Property) {
        self.state.borrow_mut().failing.insert(property);
    }

    /// Queue an unrelated event
    pub fn push_event(&self, event: ServerEvent) {
        self.state.borrow_mut().events.push_back(event);
    }

    /// Schedule an action to run once the event queue is empty
    pub fn on_idle(&self, action: impl FnOnce(&MemoryServer) + 'static) {
        self.idle.borrow_mut().push_back(Box::new(action));
    }

    /// Schedule an action to run right after the next grab is taken
    pub fn on_grab(&self, action: impl FnOnce(&MemoryServer) + 'static) {
        self.during_grab.borrow_mut().push_back(Box::new(action));
    }

    /// Run a request from another client: now, or at the ungrab if the
    /// server is grabbed
    pub fn as_other_client(&self, action: impl FnOnce(&MemoryServer) + 'static) {
        if self.is_grabbed() {
            self.deferred.borrow_mut().push_back(Box::new(action));
        } else {
            action(self);
        }
    }

    pub fn is_grabbed(&self) -> bool {
        self.state.borrow().grabbed
    }

    pub fn grab_count(&self) -> usize {
        self.state.borrow().grabs
    }

    pub fn is_watched(&self, window: Window) -> bool {
        self.state.borrow().watched.contains(&window)
    }

    /// Successful writes, oldest first
    pub fn writes(&self) -> Vec<Write> {
        self.state.borrow().writes.clone()
    }

    fn check_alive(state: &State, window: Window) -> Result<()> {
        if window != ROOT && state.destroyed.contains(&window) {
            bail!("BadWindow (0x{:x})", window);
        }
        Ok(())
    }

    fn notify(state: &mut State, window: Window, property: Property, change: PropertyState) {
        if state.watched.contains(&window) {
            state.events.push_back(ServerEvent::PropertyChanged {
                window,
                property: Some(property),
                state: change,
            });
        }
    }
}

impl WindowServer for MemoryServer {
    fn root(&self) -> Window {
        ROOT
    }

    fn children(&self, window: Window) -> Result<Vec<Window>> {
        let state = self.state.borrow();
        Self::check_alive(&state, window)?;
        Ok(state.children.get(&window).cloned().unwrap_or_default())
    }

    fn get(&self, window: Window, property: Property) -> Result<Option<Vec<u8>>> {
        let state = self.state.borrow();
        Self::check_alive(&state, window)?;
        Ok(state.properties.get(&(window, property)).cloned())
    }

    fn set(&self, window: Window, property: Property, value: &[u8]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        Self::check_alive(&state, window)?;
        if state.failing.contains(&property) {
            bail!("BadAlloc writing {}", property);
        }
        state.properties.insert((window, property), value.to_vec());
        let grabbed = state.grabbed;
        state.writes.push(Write {
            window,
            property,
            value: value.to_vec(),
            grabbed,
        });
        Self::notify(&mut state, window, property, PropertyState::NewValue);
        Ok(())
    }

    fn delete(&self, window: Window, property: Property) -> Result<()> {
        let mut state = self.state.borrow_mut();
        Self::check_alive(&state, window)?;
        if state.properties.remove(&(window, property)).is_some() {
            Self::notify(&mut state, window, property, PropertyState::Deleted);
        }
        Ok(())
    }

    fn grab(&self) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            if state.grabbed {
                bail!("server already grabbed");
            }
            state.grabbed = true;
            state.grabs += 1;
        }
        let action = self.during_grab.borrow_mut().pop_front();
        if let Some(action) = action {
            action(self);
        }
        Ok(())
    }

    fn ungrab(&self) -> Result<()> {
        self.state.borrow_mut().grabbed = false;
        loop {
            let action = self.deferred.borrow_mut().pop_front();
            match action {
                Some(action) => action(self),
                None => return Ok(()),
            }
        }
    }

    fn sync(&self) -> Result<()> {
        Ok(())
    }

    fn select_changes(&self, window: Window, enabled: bool) -> Result<()> {
        let mut state = self.state.borrow_mut();
        Self::check_alive(&state, window)?;
        if enabled {
            state.watched.insert(window);
        } else {
            state.watched.remove(&window);
        }
        Ok(())
    }

    fn next_event(&self) -> Result<ServerEvent> {
        loop {
            let event = self.state.borrow_mut().events.pop_front();
            if let Some(event) = event {
                return Ok(event);
            }
            let action = self.idle.borrow_mut().pop_front();
            match action {
                Some(action) => action(self),
                None => bail!("no pending events and nothing scheduled"),
            }
        }
    }
}
