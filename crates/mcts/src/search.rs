//! Monte Carlo Tree Search implementation.
//!
//! One simulation walks the tree with PUCT, expands the leaf with a single
//! evaluator call (or reads the game result at a terminal leaf), and backs
//! the value up the selection path, negating it at every ply.
//!
//! The tree persists between calls to [`Mcts::run`]: the root tracks a game
//! state, and [`Mcts::advance`] / re-synchronization keep the statistics of
//! the subtree that is still reachable.

use std::hash::Hash;
use std::marker::PhantomData;

use rand::Rng;
use rand_distr::{Dirichlet, Distribution};
use reversi_core::{Game, Policy, ReversiError, Result, Value};
use tracing::{debug, trace};

use crate::{
    config::MctsConfig,
    evaluator::Evaluator,
    node::{Node, NodeId, NodeStats},
    tree::Tree,
};

/// Result of an MCTS search.
#[derive(Clone, Debug)]
pub struct SearchResult<A: Clone + Copy + Eq + Hash> {
    /// Visit count for each root child, in action-index order.
    pub visit_counts: Vec<(A, u32)>,

    /// Most visited action, lowest index on ties.
    /// For temperature-based selection, use `select_action()` instead.
    pub best_action: A,

    /// Policy derived from normalized visit counts.
    /// Length equals `game.num_actions()`, sums to 1.0.
    pub policy: Vec<f32>,

    /// Value estimate at root (from perspective of player to move).
    pub root_value: f32,
}

impl<A: Clone + Copy + Eq + Hash> SearchResult<A> {
    /// Select an action using temperature-based sampling.
    ///
    /// - temperature = 0: always return best action (greedy)
    /// - temperature = 1: sample proportional to visit counts
    /// - temperature > 1: more uniform distribution
    /// - temperature < 1: more peaked distribution
    ///
    /// Formula: P(a) ∝ N(a)^(1/τ) where τ is temperature
    pub fn select_action<R: Rng>(&self, temperature: f32, rng: &mut R) -> A {
        if temperature <= 0.0 || self.visit_counts.len() <= 1 {
            return self.best_action;
        }

        let max_count = self
            .visit_counts
            .iter()
            .map(|(_, count)| *count)
            .max()
            .unwrap_or(0);
        if max_count == 0 {
            return self.best_action;
        }

        // Scale by the largest count first so small temperatures cannot overflow
        let inv_temp = 1.0 / temperature as f64;
        let adjusted: Vec<f64> = self
            .visit_counts
            .iter()
            .map(|(_, count)| (*count as f64 / max_count as f64).powf(inv_temp))
            .collect();

        let sum: f64 = adjusted.iter().sum();
        let threshold: f64 = rng.gen::<f64>() * sum;
        let mut cumulative = 0.0;

        for (i, &weight) in adjusted.iter().enumerate() {
            cumulative += weight;
            if weight > 0.0 && cumulative >= threshold {
                return self.visit_counts[i].0;
            }
        }

        self.best_action
    }

    /// Visit count of `action` at the root (0 if it has no child).
    pub fn visits(&self, action: A) -> u32 {
        self.visit_counts
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Total visits over the root children.
    pub fn total_visits(&self) -> u32 {
        self.visit_counts.iter().map(|(_, count)| *count).sum()
    }

    /// Get the policy as a typed Policy (enforces sum to 1.0 invariant).
    ///
    /// # Errors
    /// Returns error if policy doesn't sum to 1.0 (indicates a bug).
    pub fn typed_policy(&self) -> Result<Policy> {
        Policy::new(self.policy.clone())
    }

    /// Get the root value as a typed Value (enforces [-1, 1] range invariant).
    pub fn typed_value(&self) -> Value {
        Value::clamped(self.root_value)
    }
}

/// How the retained root was matched to a requested state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RootSync {
    /// The retained root already is the requested state.
    Reused,
    /// The requested state is one move below the retained root; that child's
    /// subtree became the new root.
    Advanced,
    /// No usable statistics; the tree was started from scratch.
    Rebuilt,
}

/// Monte Carlo Tree Search with PUCT selection.
///
/// Generic over:
/// - `G`: The game being played
/// - `E`: The evaluation strategy
/// - `R`: The random number generator (root noise and action sampling)
pub struct Mcts<G: Game, E: Evaluator<G>, R: Rng> {
    config: MctsConfig,
    evaluator: E,
    rng: R,
    tree: Tree<G::Action>,
    root_state: Option<G::State>,
    root_noised: bool,
    _game: PhantomData<G>,
}

impl<G, E, R> Mcts<G, E, R>
where
    G: Game,
    E: Evaluator<G>,
    R: Rng,
{
    /// Create a new MCTS instance.
    ///
    /// # Errors
    /// Returns `ReversiError::InvalidConfig` if the config does not validate.
    pub fn new(config: MctsConfig, evaluator: E, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            evaluator,
            rng,
            tree: Tree::new(),
            root_state: None,
            root_noised: false,
            _game: PhantomData,
        })
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// The retained search tree.
    pub fn tree(&self) -> &Tree<G::Action> {
        &self.tree
    }

    /// State the retained root stands for, if any.
    pub fn root_state(&self) -> Option<&G::State> {
        self.root_state.as_ref()
    }

    /// Statistics of the retained root.
    pub fn root_stats(&self) -> &NodeStats {
        &self.tree.root().stats
    }

    /// Discard the retained tree.
    pub fn reset(&mut self) {
        self.tree.clear();
        self.root_state = None;
        self.root_noised = false;
        debug!("search tree reset");
    }

    /// Search `state` from scratch, ignoring any retained statistics.
    ///
    /// # Errors
    /// See [`Mcts::run`].
    pub fn search(&mut self, game: &G, state: &G::State) -> Result<SearchResult<G::Action>> {
        self.reset();
        self.run(game, state)
    }

    /// Run the configured number of simulations from `state`, reusing the
    /// retained tree when it covers `state`.
    ///
    /// # Errors
    /// - `ReversiError::StateMismatch` if `state` is terminal or does not
    ///   belong to `game`
    /// - `ReversiError::InvalidPolicy` / `InvalidValue` if the evaluator
    ///   breaks its contract
    /// - any error from `Game::apply` during a simulation
    pub fn run(&mut self, game: &G, state: &G::State) -> Result<SearchResult<G::Action>> {
        game.check_state(state)?;
        if game.is_terminal(state) {
            return Err(ReversiError::StateMismatch(
                "cannot search from a terminal state".to_string(),
            ));
        }

        let sync = self.sync_root(game, state);
        debug!(
            ?sync,
            nodes = self.tree.len(),
            root_visits = self.tree.root().stats.visit_count,
            "search root ready"
        );

        for _ in 0..self.config.num_simulations {
            if !self.root_noised && self.tree.root().expanded {
                self.add_root_noise()?;
            }
            self.simulate(game, state)?;
        }

        Ok(self.results(game))
    }

    /// Point the retained root at `state`.
    ///
    /// Keeps the tree if the root already is `state`, promotes the root child
    /// whose state equals `state` (the opponent's reply), and otherwise
    /// starts over with an empty root.
    pub fn sync_root(&mut self, game: &G, state: &G::State) -> RootSync {
        if self.root_state.as_ref() == Some(state) {
            return RootSync::Reused;
        }

        if let Some(root_state) = &self.root_state {
            let found = self
                .tree
                .root()
                .children
                .iter()
                .find_map(|&(action, child)| match game.apply(root_state, action) {
                    Ok(next) if next == *state => Some(child),
                    _ => None,
                });

            if let Some(child) = found {
                self.tree.retain_subtree(child);
                self.root_state = Some(state.clone());
                self.root_noised = false;
                return RootSync::Advanced;
            }
        }

        self.tree.clear();
        self.root_state = Some(state.clone());
        self.root_noised = false;
        RootSync::Rebuilt
    }

    /// Make the child for `action` the new root, discarding its siblings.
    ///
    /// If the action was never expanded, the new root starts with zero
    /// statistics.
    ///
    /// # Errors
    /// - `ReversiError::StateMismatch` if there is no retained root state
    /// - `ReversiError::IllegalMove` if `action` is illegal at the root
    pub fn advance(&mut self, game: &G, action: G::Action) -> Result<()> {
        let root_state = self.root_state.as_ref().ok_or_else(|| {
            ReversiError::StateMismatch("no search root to advance from".to_string())
        })?;
        let next = game.apply(root_state, action)?;

        match self.tree.root().child(action) {
            Some(child) => self.tree.retain_subtree(child),
            None => self.tree.clear(),
        }
        self.root_state = Some(next);
        self.root_noised = false;

        debug!(
            ?action,
            nodes = self.tree.len(),
            root_visits = self.tree.root().stats.visit_count,
            "advanced search root"
        );
        Ok(())
    }

    /// Pick an action from a search result with the given temperature.
    pub fn select_action(&mut self, result: &SearchResult<G::Action>, temperature: f32) -> G::Action {
        result.select_action(temperature, &mut self.rng)
    }

    /// Run a single simulation: select -> expand -> backpropagate.
    fn simulate(&mut self, game: &G, root_state: &G::State) -> Result<()> {
        let mut path: Vec<NodeId> = vec![NodeId::ROOT];
        let mut state = root_state.clone();
        let mut current_id = NodeId::ROOT;

        // SELECT: traverse tree using PUCT until unexpanded/terminal node
        loop {
            let node = self.tree.get(current_id);

            if let Some(value) = node.terminal_value {
                self.backpropagate(&path, value);
                trace!(depth = path.len() - 1, value, "simulation hit cached terminal");
                return Ok(());
            }

            if !node.expanded {
                break;
            }

            let (action, child_id) = self.select_child(current_id);
            state = game.apply(&state, action)?;
            path.push(child_id);
            current_id = child_id;
        }

        // EXPAND: terminal states are scored by the game, others by the evaluator
        let value = match game.terminal_value(&state) {
            Some(value) => {
                self.tree.get_mut(current_id).terminal_value = Some(value);
                value
            }
            None => self.expand_node(game, &state, current_id)?,
        };

        self.backpropagate(&path, value);
        trace!(depth = path.len() - 1, value, "simulation complete");
        Ok(())
    }

    /// Evaluate `state` and add one child per legal action with non-zero prior.
    ///
    /// Returns the evaluator's value for the side to move at `state`.
    fn expand_node(&mut self, game: &G, state: &G::State, node_id: NodeId) -> Result<f32> {
        let evaluation = self.evaluator.evaluate(game, state)?;

        if evaluation.policy.len() != game.num_actions() {
            return Err(ReversiError::InvalidPolicy(format!(
                "evaluator returned {} priors, expected {}",
                evaluation.policy.len(),
                game.num_actions()
            )));
        }
        let value = Value::new(evaluation.value)?;

        let legal_actions = game.legal_actions(state);
        let indices: Vec<usize> = legal_actions
            .iter()
            .map(|action| game.action_to_index(*action))
            .collect();
        let priors = Policy::masked(&evaluation.policy, &indices)?;

        for (action, index) in legal_actions.into_iter().zip(indices) {
            let prior = priors[index];
            if prior > 0.0 {
                let child_id = self.tree.add(Node::new(Some(action), prior));
                self.tree.get_mut(node_id).children.push((action, child_id));
            }
        }
        if self.tree.get(node_id).children.is_empty() {
            return Err(ReversiError::InvalidPolicy(
                "no legal action kept a non-zero prior".to_string(),
            ));
        }

        self.tree.get_mut(node_id).expanded = true;
        Ok(value.get())
    }

    /// Select best child using PUCT formula.
    ///
    /// score(a) = Q(a) + c_puct * P(a) * sqrt(N_parent) / (1 + N(a))
    ///
    /// Children are stored in ascending action order and only a strictly
    /// better score replaces the current best, so ties go to the lowest index.
    fn select_child(&self, node_id: NodeId) -> (G::Action, NodeId) {
        let node = self.tree.get(node_id);
        let sqrt_parent = (node.stats.visit_count as f32).sqrt();

        let mut best = None;
        let mut best_score = f32::NEG_INFINITY;

        for &(action, child_id) in &node.children {
            let child = &self.tree.get(child_id).stats;

            let q = child.parent_q();
            let u = self.config.c_puct * child.prior * sqrt_parent
                / (1.0 + child.visit_count as f32);
            let score = q + u;

            if score > best_score {
                best_score = score;
                best = Some((action, child_id));
            }
        }

        // INVARIANT: expansion always creates at least one child
        best.expect("BUG: select_child called on node without children")
    }

    /// Backpropagate value through path.
    ///
    /// Value is from the perspective of the player at the leaf.
    /// As we go up the tree, we alternate perspective by negating.
    fn backpropagate(&mut self, path: &[NodeId], leaf_value: f32) {
        let mut value = leaf_value;

        for &node_id in path.iter().rev() {
            self.tree.get_mut(node_id).stats.record(value);
            value = -value;
        }
    }

    /// Mix Dirichlet noise into the root priors, once per root.
    fn add_root_noise(&mut self) -> Result<()> {
        self.root_noised = true;

        let children: Vec<NodeId> = self.tree.root().child_ids().collect();
        // Dirichlet requires at least 2 elements
        if !self.config.uses_root_noise() || children.len() < 2 {
            return Ok(());
        }

        let alpha = vec![self.config.dirichlet_alpha; children.len()];
        let dirichlet = Dirichlet::new(&alpha)
            .map_err(|e| ReversiError::InvalidConfig(format!("dirichlet noise: {}", e)))?;
        let noise: Vec<f32> = dirichlet.sample(&mut self.rng);

        let eps = self.config.exploration_fraction;
        for (child_id, n) in children.into_iter().zip(noise) {
            let stats = &mut self.tree.get_mut(child_id).stats;
            stats.prior = (1.0 - eps) * stats.prior + eps * n;
        }
        trace!(eps, alpha = self.config.dirichlet_alpha, "root noise applied");
        Ok(())
    }

    /// Extract search results from root node.
    fn results(&self, game: &G) -> SearchResult<G::Action> {
        let root = self.tree.root();

        let visit_counts: Vec<(G::Action, u32)> = root
            .children
            .iter()
            .map(|(a, id)| (*a, self.tree.get(*id).stats.visit_count))
            .collect();

        // INVARIANT: at least one simulation ran, so the root is expanded
        let mut best = *visit_counts
            .first()
            .expect("BUG: results requested from an unexpanded root");
        for &(action, count) in &visit_counts[1..] {
            if count > best.1 {
                best = (action, count);
            }
        }

        // Visit distribution, or the priors when no child has been visited yet
        let total_visits: u32 = visit_counts.iter().map(|(_, c)| *c).sum();
        let mut policy = vec![0.0; game.num_actions()];
        for (action, child_id) in &root.children {
            let child = &self.tree.get(*child_id).stats;
            policy[game.action_to_index(*action)] = if total_visits > 0 {
                child.visit_count as f32 / total_visits as f32
            } else {
                child.prior
            };
        }

        SearchResult {
            visit_counts,
            best_action: best.0,
            policy,
            root_value: Value::clamped(root.stats.mean_value()).get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{Evaluation, RolloutEvaluator, UniformEvaluator};
    use crate::testing::{CountingGame, FixedValueEvaluator, RawEvaluator};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn mcts<E: Evaluator<CountingGame>>(
        config: MctsConfig,
        evaluator: E,
    ) -> Mcts<CountingGame, E, ChaCha8Rng> {
        Mcts::new(config, evaluator, ChaCha8Rng::seed_from_u64(42)).unwrap()
    }

    fn child_stats<E: Evaluator<CountingGame>>(
        mcts: &Mcts<CountingGame, E, ChaCha8Rng>,
        path: &[u8],
    ) -> NodeStats {
        let tree = mcts.tree();
        let mut id = NodeId::ROOT;
        for &action in path {
            id = tree.get(id).child(action).expect("path exists");
        }
        tree.get(id).stats.clone()
    }

    #[test]
    fn test_mcts_basic() {
        let mut mcts = mcts(MctsConfig::with_simulations(100), RolloutEvaluator::new(42, 20));
        let game = CountingGame::new(5);
        let result = mcts.search(&game, &game.initial_state()).unwrap();

        assert!(result.best_action == 1 || result.best_action == 2);
        let policy_sum: f32 = result.policy.iter().sum();
        assert!((policy_sum - 1.0).abs() < 1e-4);

        // Every simulation after the root expansion goes through a child
        assert_eq!(result.total_visits(), 99);
        assert_eq!(mcts.root_stats().visit_count, 100);
    }

    #[test]
    fn test_mcts_deterministic() {
        let run_search = |seed: u64| {
            let mut mcts = Mcts::new(
                MctsConfig::for_selfplay(50),
                RolloutEvaluator::new(seed, 20),
                ChaCha8Rng::seed_from_u64(seed),
            )
            .unwrap();
            let game = CountingGame::new(7);
            mcts.search(&game, &game.initial_state()).unwrap()
        };

        let result1 = run_search(12345);
        let result2 = run_search(12345);

        assert_eq!(result1.best_action, result2.best_action);
        assert_eq!(result1.visit_counts, result2.visit_counts);
        assert_eq!(result1.policy, result2.policy);
    }

    #[test]
    fn test_sign_alternation_three_ply() {
        // A single line of play, so each simulation goes one ply deeper
        let game = CountingGame::chain(5);
        let state = game.initial_state();
        let mut mcts = mcts(MctsConfig::with_simulations(1), FixedValueEvaluator(0.5));

        mcts.run(&game, &state).unwrap();
        mcts.run(&game, &state).unwrap();
        let before = [
            child_stats(&mcts, &[]).value_sum,
            child_stats(&mcts, &[1]).value_sum,
        ];

        // Third simulation expands depth 2 and backs up through 3 levels
        mcts.run(&game, &state).unwrap();
        let root = child_stats(&mcts, &[]);
        let ply1 = child_stats(&mcts, &[1]);
        let ply2 = child_stats(&mcts, &[1, 1]);

        assert_eq!(ply2.visit_count, 1);
        assert!((ply2.value_sum - 0.5).abs() < 1e-6);
        assert!((ply1.value_sum - before[1] - (-0.5)).abs() < 1e-6);
        assert!((root.value_sum - before[0] - 0.5).abs() < 1e-6);

        assert_eq!(root.visit_count, 3);
        assert_eq!(ply1.visit_count, 2);
    }

    #[test]
    fn test_terminal_value_cached_and_backed_up() {
        // Saying 1 ends the game, so the child is terminal and lost for its mover
        let game = CountingGame::chain(1);
        let mut mcts = mcts(MctsConfig::with_simulations(3), FixedValueEvaluator(0.0));
        mcts.search(&game, &game.initial_state()).unwrap();

        let child_id = mcts.tree().root().child(1).unwrap();
        let child = mcts.tree().get(child_id);
        assert_eq!(child.terminal_value, Some(-1.0));
        assert!(!child.expanded);
        assert!(child.children.is_empty());
        assert_eq!(child.stats.visit_count, 2);
        assert!((child.stats.value_sum + 2.0).abs() < 1e-6);

        // Root sees two wins plus its own neutral evaluation
        assert!((mcts.root_stats().value_sum - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_visit_counts_bound_children() {
        let game = CountingGame::new(9);
        let mut mcts = mcts(MctsConfig::with_simulations(300), RolloutEvaluator::new(3, 30));
        mcts.search(&game, &game.initial_state()).unwrap();

        for (_, node) in mcts.tree().iter() {
            let child_sum: u32 = node
                .children
                .iter()
                .map(|(_, id)| mcts.tree().get(*id).stats.visit_count)
                .sum();
            assert!(node.stats.visit_count >= child_sum);
        }
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let game = CountingGame::new(5);
        let mut mcts = mcts(MctsConfig::with_simulations(2), UniformEvaluator);
        let result = mcts.search(&game, &game.initial_state()).unwrap();

        // Equal priors and values: the second simulation descends into action 1
        assert_eq!(result.visit_counts, vec![(1, 1), (2, 0)]);
        assert_eq!(result.best_action, 1);
    }

    #[test]
    fn test_unvisited_root_reports_priors() {
        let game = CountingGame::new(5);
        let mut mcts = mcts(MctsConfig::with_simulations(1), UniformEvaluator);
        let result = mcts.search(&game, &game.initial_state()).unwrap();

        assert_eq!(result.total_visits(), 0);
        assert_eq!(result.best_action, 1);
        assert!(result.typed_policy().is_ok());
    }

    #[test]
    fn test_finds_winning_move() {
        // Race to 4: moving to 1 leaves the opponent three short, a lost position
        let game = CountingGame::new(4);
        let mut mcts = mcts(MctsConfig::with_simulations(500), UniformEvaluator);
        let result = mcts.search(&game, &game.initial_state()).unwrap();

        assert_eq!(result.best_action, 1);
        assert!(result.visits(1) > 4 * result.visits(2));
        assert!(result.root_value > 0.3);
    }

    #[test]
    fn test_zero_prior_actions_get_no_child() {
        // Target 6 keeps action 2 legal all the way down the 0, 2, 4 line
        let game = CountingGame::new(6);
        let evaluator = RawEvaluator(Evaluation {
            policy: vec![0.0, 3.0],
            value: 0.0,
        });
        let mut mcts = mcts(MctsConfig::with_simulations(10), evaluator);
        let result = mcts.search(&game, &game.initial_state()).unwrap();

        assert_eq!(result.visit_counts.len(), 1);
        assert_eq!(result.best_action, 2);
        // Renormalized over the legal mass
        let child = mcts.tree().root().child(2).unwrap();
        assert!((mcts.tree().get(child).stats.prior - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_evaluator_contract_violations_are_errors() {
        let game = CountingGame::new(5);
        let state = game.initial_state();
        let cases = [
            (vec![0.5, 0.5, 0.0], 0.0),
            (vec![0.5, f32::NAN], 0.0),
            (vec![-0.5, 1.5], 0.0),
            (vec![0.0, 0.0], 0.0),
            // finite priors whose sum overflows
            (vec![f32::MAX, f32::MAX], 0.0),
        ];
        for (policy, value) in cases {
            let mut mcts = mcts(
                MctsConfig::with_simulations(5),
                RawEvaluator(Evaluation { policy, value }),
            );
            assert!(matches!(
                mcts.search(&game, &state),
                Err(ReversiError::InvalidPolicy(_))
            ));
        }

        for value in [1.5, -2.0, f32::NAN, f32::INFINITY] {
            let mut mcts = mcts(
                MctsConfig::with_simulations(5),
                RawEvaluator(Evaluation {
                    policy: vec![0.5, 0.5],
                    value,
                }),
            );
            assert!(matches!(
                mcts.search(&game, &state),
                Err(ReversiError::InvalidValue(_))
            ));
        }
    }

    #[test]
    fn test_terminal_root_is_rejected() {
        let game = CountingGame::new(2);
        let terminal = game.apply(&game.initial_state(), 2).unwrap();
        let mut mcts = mcts(MctsConfig::with_simulations(5), UniformEvaluator);
        assert!(matches!(
            mcts.search(&game, &terminal),
            Err(ReversiError::StateMismatch(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Mcts::<CountingGame, _, _>::new(
            MctsConfig::with_simulations(0),
            UniformEvaluator,
            ChaCha8Rng::seed_from_u64(0),
        );
        assert!(matches!(result, Err(ReversiError::InvalidConfig(_))));
    }

    #[test]
    fn test_advance_keeps_child_statistics() {
        let game = CountingGame::new(9);
        let mut mcts = mcts(MctsConfig::with_simulations(200), RolloutEvaluator::new(1, 30));
        let result = mcts.search(&game, &game.initial_state()).unwrap();

        let action = result.best_action;
        let expected = child_stats(&mcts, &[action]);
        let expected_children: Vec<(u8, NodeStats)> = {
            let id = mcts.tree().root().child(action).unwrap();
            mcts.tree()
                .children(id)
                .map(|(a, s)| (a, s.clone()))
                .collect()
        };

        mcts.advance(&game, action).unwrap();

        assert_eq!(mcts.root_stats(), &expected);
        let children: Vec<(u8, NodeStats)> = mcts
            .tree()
            .children(NodeId::ROOT)
            .map(|(a, s)| (a, s.clone()))
            .collect();
        assert_eq!(children, expected_children);
        assert_eq!(mcts.root_state().map(|s| s.count), Some(action));
    }

    #[test]
    fn test_advance_unexpanded_action_starts_fresh() {
        let game = CountingGame::new(5);
        let evaluator = RawEvaluator(Evaluation {
            policy: vec![1.0, 0.0],
            value: 0.0,
        });
        let mut mcts = mcts(MctsConfig::with_simulations(10), evaluator);
        mcts.search(&game, &game.initial_state()).unwrap();

        // Action 2 had zero prior, so it has no node
        mcts.advance(&game, 2).unwrap();
        assert_eq!(mcts.tree().len(), 1);
        assert_eq!(mcts.root_stats().visit_count, 0);
        assert_eq!(mcts.root_state().map(|s| s.count), Some(2));
    }

    #[test]
    fn test_advance_illegal_action_is_error() {
        let game = CountingGame::new(5);
        let mut mcts = mcts(MctsConfig::with_simulations(10), UniformEvaluator);
        assert!(matches!(
            mcts.advance(&game, 1),
            Err(ReversiError::StateMismatch(_))
        ));

        mcts.search(&game, &game.initial_state()).unwrap();
        assert!(matches!(
            mcts.advance(&game, 3),
            Err(ReversiError::IllegalMove(_))
        ));
    }

    #[test]
    fn test_sync_root_paths() {
        let game = CountingGame::new(9);
        let start = game.initial_state();
        let mut mcts = mcts(MctsConfig::with_simulations(100), UniformEvaluator);

        assert_eq!(mcts.sync_root(&game, &start), RootSync::Rebuilt);
        mcts.run(&game, &start).unwrap();
        assert_eq!(mcts.sync_root(&game, &start), RootSync::Reused);

        let after_two = game.apply(&start, 2).unwrap();
        let expected = child_stats(&mcts, &[2]);
        assert_eq!(mcts.sync_root(&game, &after_two), RootSync::Advanced);
        assert_eq!(mcts.root_stats(), &expected);

        // Two plies away is not a child of the retained root
        let far = game
            .apply(&game.apply(&after_two, 1).unwrap(), 2)
            .unwrap();
        assert_eq!(mcts.sync_root(&game, &far), RootSync::Rebuilt);
        assert_eq!(mcts.tree().len(), 1);
    }

    #[test]
    fn test_reset_clears_tree() {
        let game = CountingGame::new(5);
        let mut mcts = mcts(MctsConfig::with_simulations(20), UniformEvaluator);
        mcts.search(&game, &game.initial_state()).unwrap();
        assert!(mcts.tree().len() > 1);

        mcts.reset();
        assert_eq!(mcts.tree().len(), 1);
        assert!(mcts.root_state().is_none());
        assert_eq!(mcts.root_stats().visit_count, 0);
    }

    #[test]
    fn test_root_noise_keeps_priors_normalized() {
        let game = CountingGame::new(9);
        let mut mcts = mcts(MctsConfig::for_selfplay(20), UniformEvaluator);
        mcts.search(&game, &game.initial_state()).unwrap();

        let priors: Vec<f32> = mcts
            .tree()
            .children(NodeId::ROOT)
            .map(|(_, s)| s.prior)
            .collect();
        let sum: f32 = priors.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
        // Uniform 0.5/0.5 is perturbed by the noise
        assert!(priors.iter().any(|p| (p - 0.5).abs() > 1e-6));
    }

    #[test]
    fn test_select_action_greedy() {
        let result = SearchResult {
            visit_counts: vec![(1u8, 3), (2, 7)],
            best_action: 2,
            policy: vec![0.3, 0.7],
            root_value: 0.0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..20 {
            assert_eq!(result.select_action(0.0, &mut rng), 2);
        }
    }

    #[test]
    fn test_select_action_never_picks_unvisited() {
        let result = SearchResult {
            visit_counts: vec![(1u8, 0), (2, 10), (3, 0)],
            best_action: 2,
            policy: vec![0.0, 1.0, 0.0],
            root_value: 0.0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..200 {
            assert_eq!(result.select_action(1.0, &mut rng), 2);
        }
    }

    #[test]
    fn test_select_action_proportional() {
        let result = SearchResult {
            visit_counts: vec![(1u8, 25), (2, 75)],
            best_action: 2,
            policy: vec![0.25, 0.75],
            root_value: 0.0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let picks = (0..4000)
            .filter(|_| result.select_action(1.0, &mut rng) == 1)
            .count();
        // ~1000 expected
        assert!((800..1200).contains(&picks), "picked action 1 {} times", picks);

        // A tiny temperature is effectively greedy and must not overflow
        for _ in 0..50 {
            assert_eq!(result.select_action(0.01, &mut rng), 2);
        }
    }
}
