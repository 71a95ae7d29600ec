//! Boundary between the evolutionary core and whatever world the agents live in.

/// Binary decision an agent makes each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Leave the ground.
    Jump,
    /// Keep running.
    Idle,
}

/// A world that feeds observations to agents and reports their deaths.
///
/// Agents are addressed by index, in the order fixed by the last
/// [`reset`](Environment::reset). Implementations own all world state; the
/// core only ever sees normalized inputs and collision reports.
pub trait Environment {
    /// Length of every vector returned by [`sense`](Environment::sense).
    fn input_size(&self) -> usize;

    /// Starts a new episode with `agent_count` living agents.
    fn reset(&mut self, agent_count: usize);

    /// Observation for one agent, each component normalized to `[0, 1]`.
    fn sense(&self, agent: usize) -> Vec<f32>;

    /// Records an agent's decision for the coming step.
    fn apply(&mut self, agent: usize, action: Action);

    /// Advances the world by `dt` seconds and returns the agents that died.
    ///
    /// An agent is reported at most once per episode.
    fn advance(&mut self, dt: f32) -> Vec<usize>;
}
