//! Training session tying a population to an environment.
//!
//! The session owns everything the training loop needs: the population, the
//! agents of the running generation, the environment and the step counter.
//! Callers drive it one step at a time or one generation at a time.

use super::agent::Agent;
use super::environment::{Action, Environment};
use super::error::{EvoError, Result};
use super::params::TrainingParams;
use super::population::Population;
use super::stats::GenerationSummary;

/// Result of advancing a session by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Some agents are still alive.
    Running {
        /// Agents alive after this step.
        alive: usize,
    },
    /// Every agent is dead; the generation can be evolved.
    GenerationOver,
}

/// A population being trained in an environment.
#[derive(Debug)]
pub struct Session<E: Environment> {
    population: Population,
    agents: Vec<Agent>,
    environment: E,
    params: TrainingParams,
    steps: u64,
}

impl<E: Environment> Session<E> {
    /// Creates a session and starts its first generation.
    ///
    /// Fails if the environment's observations do not match the network inputs.
    pub fn new(population: Population, environment: E, params: TrainingParams) -> Result<Self> {
        params.validate()?;
        let inputs = population.topology().inputs;
        if environment.input_size() != inputs {
            return Err(EvoError::InvalidConfig(format!(
                "environment provides {} inputs but networks expect {}",
                environment.input_size(),
                inputs
            )));
        }

        let mut session = Self {
            population,
            agents: Vec::new(),
            environment,
            params,
            steps: 0,
        };
        session.start_generation();
        Ok(session)
    }

    /// Hands every network of the current generation to a fresh agent.
    fn start_generation(&mut self) {
        self.agents = self
            .population
            .networks()
            .iter()
            .cloned()
            .map(Agent::new)
            .collect();
        self.environment.reset(self.agents.len());
        self.steps = 0;
    }

    /// Advances the episode by one timestep.
    pub fn step(&mut self) -> Result<StepOutcome> {
        if self.alive_count() == 0 {
            return Ok(StepOutcome::GenerationOver);
        }

        // decide for every agent before touching the environment, so a bad
        // observation fails the step without applying anything
        let mut actions = Vec::with_capacity(self.agents.len());
        for (index, agent) in self.agents.iter().enumerate() {
            if !agent.is_alive() {
                continue;
            }
            let inputs = self.environment.sense(index);
            let outputs = agent.think(&inputs)?;
            let action = if outputs[0] > self.params.jump_threshold {
                Action::Jump
            } else {
                Action::Idle
            };
            actions.push((index, action));
        }
        for (index, action) in actions {
            self.environment.apply(index, action);
        }

        for index in self.environment.advance(self.params.dt) {
            if let Some(agent) = self.agents.get_mut(index) {
                agent.kill();
            }
        }
        let dt = f64::from(self.params.dt);
        for agent in &mut self.agents {
            agent.survive(dt);
        }
        self.steps += 1;

        let alive = self.alive_count();
        if alive == 0 {
            return Ok(StepOutcome::GenerationOver);
        }
        if self.steps >= self.params.max_steps {
            tracing::warn!(
                generation = self.population.generation(),
                alive,
                steps = self.steps,
                "step cap reached, ending generation"
            );
            for agent in &mut self.agents {
                agent.kill();
            }
            return Ok(StepOutcome::GenerationOver);
        }
        Ok(StepOutcome::Running { alive })
    }

    /// Evolves the population from the finished episode and starts the next one.
    ///
    /// Fails without changing anything if some agent is still alive.
    pub fn finish_generation(&mut self) -> Result<GenerationSummary> {
        let alive = self.alive_count();
        if alive > 0 {
            return Err(EvoError::GenerationInProgress { alive });
        }
        let scores: Vec<f64> = self.agents.iter().map(Agent::fitness).collect();
        let summary = self.population.evolve(&scores)?;
        self.start_generation();
        Ok(summary)
    }

    /// Steps until every agent is dead, then evolves.
    pub fn run_generation(&mut self) -> Result<GenerationSummary> {
        while let StepOutcome::Running { .. } = self.step()? {}
        self.finish_generation()
    }

    /// The population being trained.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Consumes the session, returning the population.
    pub fn into_population(self) -> Population {
        self.population
    }

    /// Agents of the running generation, index-aligned with the population.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Number of agents still alive.
    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    /// The environment.
    pub fn environment(&self) -> &E {
        &self.environment
    }

    /// Steps taken in the running generation.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::brain::Topology;
    use crate::simulation::population::PopulationConfig;

    /// Agent `i` dies after `i + 1` steps, whatever it does.
    struct Countdown {
        lifetimes: Vec<u32>,
        jumps: Vec<u32>,
        /// Agent whose observation comes back one value short.
        short_sense: Option<usize>,
    }

    impl Countdown {
        fn new() -> Self {
            Self {
                lifetimes: Vec::new(),
                jumps: Vec::new(),
                short_sense: None,
            }
        }
    }

    impl Environment for Countdown {
        fn input_size(&self) -> usize {
            2
        }

        fn reset(&mut self, agent_count: usize) {
            self.lifetimes = (1..=agent_count as u32).collect();
            self.jumps = vec![0; agent_count];
        }

        fn sense(&self, agent: usize) -> Vec<f32> {
            if self.short_sense == Some(agent) {
                vec![0.5]
            } else {
                vec![0.5, 0.5]
            }
        }

        fn apply(&mut self, agent: usize, action: Action) {
            if action == Action::Jump {
                self.jumps[agent] += 1;
            }
        }

        fn advance(&mut self, _dt: f32) -> Vec<usize> {
            let mut died = Vec::new();
            for (index, remaining) in self.lifetimes.iter_mut().enumerate() {
                if *remaining > 0 {
                    *remaining -= 1;
                    if *remaining == 0 {
                        died.push(index);
                    }
                }
            }
            died
        }
    }

    fn session(size: usize, params: TrainingParams) -> Session<Countdown> {
        let config = PopulationConfig::new(size, Topology::new(2, 3, 1));
        let population = Population::with_seed(config, 13).unwrap();
        Session::new(population, Countdown::new(), params).unwrap()
    }

    fn params() -> TrainingParams {
        TrainingParams {
            jump_threshold: 0.5,
            dt: 0.5,
            max_steps: 100,
        }
    }

    #[test]
    fn test_rejects_mismatched_environment() {
        let config = PopulationConfig::new(4, Topology::new(3, 3, 1));
        let population = Population::with_seed(config, 1).unwrap();
        let result = Session::new(population, Countdown::new(), params());
        assert!(matches!(result, Err(EvoError::InvalidConfig(_))));
    }

    #[test]
    fn test_fitness_is_survival_time() {
        let mut session = session(4, params());
        assert_eq!(session.step().unwrap(), StepOutcome::Running { alive: 3 });
        assert_eq!(session.step().unwrap(), StepOutcome::Running { alive: 2 });
        assert_eq!(session.step().unwrap(), StepOutcome::Running { alive: 1 });
        assert_eq!(session.step().unwrap(), StepOutcome::GenerationOver);

        let fitness: Vec<f64> = session.agents().iter().map(Agent::fitness).collect();
        assert_eq!(fitness, vec![0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_cannot_evolve_while_agents_alive() {
        let mut session = session(3, params());
        session.step().unwrap();
        let err = session.finish_generation().unwrap_err();
        assert!(matches!(err, EvoError::GenerationInProgress { alive: 2 }));
        assert_eq!(session.population().generation(), 1);
    }

    #[test]
    fn test_run_generation_evolves_with_frozen_fitness() {
        let mut session = session(5, params());
        let best_before = session.population().networks()[4].clone();

        let summary = session.run_generation().unwrap();
        assert_eq!(summary.generation, 1);
        assert_eq!(summary.best_fitness, 2.0);
        assert_eq!(summary.avg_fitness, 1.0);
        assert_eq!(session.population().generation(), 2);
        assert_eq!(session.population().best_network(), Some(&best_before));
        assert_eq!(session.population().networks()[0], best_before);

        // next generation started with everyone alive
        assert_eq!(session.alive_count(), 5);
        assert_eq!(session.steps(), 0);
    }

    #[test]
    fn test_step_cap_ends_generation() {
        let mut session = session(
            6,
            TrainingParams {
                max_steps: 2,
                ..params()
            },
        );
        assert_eq!(session.step().unwrap(), StepOutcome::Running { alive: 5 });
        assert_eq!(session.step().unwrap(), StepOutcome::GenerationOver);
        assert_eq!(session.alive_count(), 0);
        let summary = session.finish_generation().unwrap();
        assert_eq!(summary.best_fitness, 1.0);
    }

    #[test]
    fn test_decisions_follow_threshold() {
        let mut always = session(2, TrainingParams {
            jump_threshold: 0.0,
            ..params()
        });
        always.step().unwrap();
        assert_eq!(always.environment().jumps, vec![1, 1]);

        let mut never = session(2, TrainingParams {
            jump_threshold: 1.0,
            ..params()
        });
        never.step().unwrap();
        assert_eq!(never.environment().jumps, vec![0, 0]);
    }

    #[test]
    fn test_bad_observation_leaves_environment_untouched() {
        let config = PopulationConfig::new(3, Topology::new(2, 3, 1));
        let population = Population::with_seed(config, 13).unwrap();
        let params = TrainingParams {
            jump_threshold: 0.0,
            ..params()
        };
        let mut session = Session::new(population, Countdown::new(), params).unwrap();
        session.environment.short_sense = Some(2);

        let err = session.step().unwrap_err();
        assert!(matches!(err, EvoError::InputLength { expected: 2, actual: 1 }));
        assert_eq!(session.environment().jumps, vec![0, 0, 0]);
        assert_eq!(session.environment().lifetimes, vec![1, 2, 3]);
        assert_eq!(session.steps(), 0);
        assert_eq!(session.alive_count(), 3);
    }
}
