//! Per-agent finite state machine
//!
//! Architecture: trait objects keyed by name
//! - `AgentState` is the behaviour interface (enter / update / exit)
//! - `AgentStateMachine` owns every registered state and tracks the active one
//! - `C` is the per-agent context handed to every callback, so states read
//!   facts and write intents without holding references into the agent
//!
//! Unknown state names are tolerated: a request to switch to a state that was
//! never registered is logged and ignored so an authoring typo cannot halt a
//! running tick.

use ahash::AHashMap;

/// What a state wants the machine to do after its update
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Transition {
    /// Remain in the current state
    #[default]
    Stay,
    /// Switch to the named state
    To(String),
}

impl Transition {
    pub fn to(name: impl Into<String>) -> Self {
        Transition::To(name.into())
    }
}

/// Behaviour of an agent while a state is active
pub trait AgentState<C>: Send {
    /// Called once when the machine switches into this state
    fn enter(&mut self, _ctx: &mut C) {}

    /// Called once per tick while this state is active
    fn update(&mut self, _ctx: &mut C, _dt: f32) -> Transition {
        Transition::Stay
    }

    /// Called once when the machine switches out of this state
    fn exit(&mut self, _ctx: &mut C) {}
}

/// Name-keyed registry of states with at most one active at a time
pub struct AgentStateMachine<C> {
    states: AHashMap<String, Box<dyn AgentState<C>>>,
    current: Option<String>,
    transitions: u64,
}

impl<C> Default for AgentStateMachine<C> {
    fn default() -> Self {
        Self {
            states: AHashMap::new(),
            current: None,
            transitions: 0,
        }
    }
}

impl<C> std::fmt::Debug for AgentStateMachine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentStateMachine")
            .field("states", &self.state_names())
            .field("current", &self.current)
            .field("transitions", &self.transitions)
            .finish()
    }
}

impl<C> AgentStateMachine<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a state under `name`
    ///
    /// Re-using a name replaces the previous state. If the replaced state is
    /// the active one, the new object becomes active without callbacks.
    pub fn add_state(&mut self, name: impl Into<String>, state: impl AgentState<C> + 'static) {
        self.add_boxed_state(name, Box::new(state));
    }

    /// Register an already boxed state
    pub fn add_boxed_state(&mut self, name: impl Into<String>, state: Box<dyn AgentState<C>>) {
        self.states.insert(name.into(), state);
    }

    /// Switch to the named state
    ///
    /// Returns true if a transition happened. Unknown names and the already
    /// active name leave the machine untouched and fire no callbacks.
    pub fn change_state(&mut self, name: &str, ctx: &mut C) -> bool {
        if !self.states.contains_key(name) {
            tracing::warn!("State {} not found, ignoring transition", name);
            return false;
        }

        if self.current.as_deref() == Some(name) {
            return false;
        }

        if let Some(previous) = self.current.take() {
            if let Some(state) = self.states.get_mut(&previous) {
                state.exit(ctx);
            }
            tracing::debug!("State transition {} -> {}", previous, name);
        } else {
            tracing::debug!("State machine entering {}", name);
        }

        self.current = Some(name.to_string());
        self.transitions += 1;

        if let Some(state) = self.states.get_mut(name) {
            state.enter(ctx);
        }

        true
    }

    /// Advance the active state by `dt` seconds
    ///
    /// A transition requested by the state is applied immediately, so the
    /// next state's `enter` runs within the same tick.
    pub fn update(&mut self, ctx: &mut C, dt: f32) {
        let transition = match self.current.as_deref() {
            Some(name) => match self.states.get_mut(name) {
                Some(state) => state.update(ctx, dt),
                None => Transition::Stay,
            },
            None => return,
        };

        if let Transition::To(next) = transition {
            self.change_state(&next, ctx);
        }
    }

    /// Leave the active state (firing its `exit`) without entering another
    pub fn stop(&mut self, ctx: &mut C) {
        if let Some(previous) = self.current.take() {
            if let Some(state) = self.states.get_mut(&previous) {
                state.exit(ctx);
            }
            tracing::debug!("State machine stopped in {}", previous);
        }
    }

    /// Name of the active state, if any
    pub fn current_state(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Check whether the named state is the active one
    pub fn is_in(&self, name: &str) -> bool {
        self.current.as_deref() == Some(name)
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Registered state names, sorted for stable output
    pub fn state_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.states.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of transitions performed since creation
    pub fn transition_count(&self) -> u64 {
        self.transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every callback into the shared context log
    struct Recorder {
        name: &'static str,
    }

    impl AgentState<Vec<String>> for Recorder {
        fn enter(&mut self, log: &mut Vec<String>) {
            log.push(format!("{}.enter", self.name));
        }

        fn update(&mut self, log: &mut Vec<String>, _dt: f32) -> Transition {
            log.push(format!("{}.update", self.name));
            Transition::Stay
        }

        fn exit(&mut self, log: &mut Vec<String>) {
            log.push(format!("{}.exit", self.name));
        }
    }

    /// Switches to `next` after `after` seconds have accumulated
    struct Timer {
        elapsed: f32,
        after: f32,
        next: &'static str,
    }

    impl AgentState<Vec<String>> for Timer {
        fn update(&mut self, _log: &mut Vec<String>, dt: f32) -> Transition {
            self.elapsed += dt;
            if self.elapsed >= self.after {
                Transition::to(self.next)
            } else {
                Transition::Stay
            }
        }
    }

    fn machine() -> AgentStateMachine<Vec<String>> {
        let mut fsm = AgentStateMachine::new();
        fsm.add_state("A", Recorder { name: "A" });
        fsm.add_state("B", Recorder { name: "B" });
        fsm
    }

    #[test]
    fn test_add_state() {
        let fsm = machine();
        assert_eq!(fsm.state_count(), 2);
        assert!(fsm.has_state("A"));
        assert!(fsm.current_state().is_none());
    }

    #[test]
    fn test_first_transition_only_enters() {
        let mut fsm = machine();
        let mut log = Vec::new();

        assert!(fsm.change_state("A", &mut log));
        assert_eq!(log, vec!["A.enter"]);
        assert_eq!(fsm.current_state(), Some("A"));
    }

    #[test]
    fn test_transition_exits_then_enters() {
        let mut fsm = machine();
        let mut log = Vec::new();
        fsm.change_state("A", &mut log);
        log.clear();

        assert!(fsm.change_state("B", &mut log));
        assert_eq!(log, vec!["A.exit", "B.enter"]);
        assert_eq!(fsm.current_state(), Some("B"));
    }

    #[test]
    fn test_unknown_state_is_ignored() {
        let mut fsm = machine();
        let mut log = Vec::new();
        fsm.change_state("A", &mut log);
        log.clear();

        assert!(!fsm.change_state("Missing", &mut log));
        assert!(log.is_empty());
        assert_eq!(fsm.current_state(), Some("A"));
    }

    #[test]
    fn test_unknown_state_without_active_state() {
        let mut fsm = machine();
        let mut log = Vec::new();
        assert!(!fsm.change_state("Missing", &mut log));
        assert!(fsm.current_state().is_none());
    }

    #[test]
    fn test_same_state_is_idempotent() {
        let mut fsm = machine();
        let mut log = Vec::new();
        fsm.change_state("A", &mut log);
        log.clear();

        assert!(!fsm.change_state("A", &mut log));
        assert!(log.is_empty());
        assert_eq!(fsm.transition_count(), 1);
    }

    #[test]
    fn test_update_without_active_state() {
        let mut fsm = machine();
        let mut log = Vec::new();
        fsm.update(&mut log, 0.016);
        assert!(log.is_empty());
    }

    #[test]
    fn test_update_reaches_active_state_only() {
        let mut fsm = machine();
        let mut log = Vec::new();
        fsm.change_state("B", &mut log);
        log.clear();

        fsm.update(&mut log, 0.016);
        assert_eq!(log, vec!["B.update"]);
    }

    #[test]
    fn test_state_requested_transition() {
        let mut fsm = machine();
        fsm.add_state(
            "Wait",
            Timer {
                elapsed: 0.0,
                after: 1.0,
                next: "A",
            },
        );
        let mut log = Vec::new();
        fsm.change_state("Wait", &mut log);

        fsm.update(&mut log, 0.5);
        assert!(fsm.is_in("Wait"));

        fsm.update(&mut log, 0.5);
        assert!(fsm.is_in("A"));
        assert_eq!(log, vec!["A.enter"]);
    }

    #[test]
    fn test_state_requesting_unknown_target_stays() {
        let mut fsm = machine();
        fsm.add_state(
            "Wait",
            Timer {
                elapsed: 0.0,
                after: 0.0,
                next: "Typo",
            },
        );
        let mut log = Vec::new();
        fsm.change_state("Wait", &mut log);
        fsm.update(&mut log, 0.1);
        assert!(fsm.is_in("Wait"));
    }

    #[test]
    fn test_replacing_state_last_write_wins() {
        let mut fsm = machine();
        fsm.add_state("A", Recorder { name: "A2" });
        assert_eq!(fsm.state_count(), 2);

        let mut log = Vec::new();
        fsm.change_state("A", &mut log);
        assert_eq!(log, vec!["A2.enter"]);
    }

    #[test]
    fn test_stop_exits_active_state() {
        let mut fsm = machine();
        let mut log = Vec::new();
        fsm.change_state("A", &mut log);
        log.clear();

        fsm.stop(&mut log);
        assert_eq!(log, vec!["A.exit"]);
        assert!(fsm.current_state().is_none());

        fsm.update(&mut log, 0.1);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_unit_context() {
        struct Quiet;
        impl AgentState<()> for Quiet {}

        let mut fsm: AgentStateMachine<()> = AgentStateMachine::new();
        fsm.add_state("Quiet", Quiet);
        assert!(fsm.change_state("Quiet", &mut ()));
        fsm.update(&mut (), 1.0);
        assert_eq!(fsm.state_names(), vec!["Quiet"]);
    }
}
