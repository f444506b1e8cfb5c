//! Property-based tests for the MCTS implementation on 6x6 Othello.
//!
//! - Visit policy is a distribution over legal actions only
//! - Root value stays in [-1, 1]
//! - Searches are reproducible from a seed
//! - Parent visit counts bound the sum of their children's

use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use reversi_core::Game;
use reversi_mcts::{Mcts, MctsConfig, RolloutEvaluator, UniformEvaluator};
use reversi_othello::{Board, Othello};

const POLICY_SUM_TOLERANCE: f32 = 1e-4;

// =============================================================================
// Strategies for generating test inputs
// =============================================================================

fn arb_seed() -> impl Strategy<Value = u64> {
    any::<u64>()
}

/// Random number of simulations (small for fast tests)
fn arb_simulations() -> impl Strategy<Value = usize> {
    1usize..120
}

/// A non-terminal 6x6 position reached by random play.
fn arb_position() -> impl Strategy<Value = Board> {
    (0usize..24, arb_seed()).prop_map(|(num_moves, seed)| {
        let game = Othello::new(6).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut state = game.initial_state();

        for _ in 0..num_moves {
            let actions = game.legal_actions(&state);
            let next = game
                .apply(&state, actions[rng.gen_range(0..actions.len())])
                .unwrap();
            if game.is_terminal(&next) {
                break;
            }
            state = next;
        }
        state
    })
}

fn rollout_mcts(seed: u64, simulations: usize) -> Mcts<Othello, RolloutEvaluator, ChaCha8Rng> {
    Mcts::new(
        MctsConfig::for_selfplay(simulations),
        RolloutEvaluator::new(seed, 64),
        ChaCha8Rng::seed_from_u64(seed),
    )
    .unwrap()
}

// =============================================================================
// Policy and value
// =============================================================================

proptest! {
    #[test]
    fn prop_policy_sums_to_one(
        seed in arb_seed(),
        simulations in arb_simulations(),
        state in arb_position()
    ) {
        let game = Othello::new(6).unwrap();
        let result = rollout_mcts(seed, simulations).search(&game, &state).unwrap();

        let policy_sum: f32 = result.policy.iter().sum();
        prop_assert!(
            (policy_sum - 1.0).abs() < POLICY_SUM_TOLERANCE,
            "Policy sum {} is not 1.0",
            policy_sum
        );
        prop_assert!(result.typed_policy().is_ok());
    }

    #[test]
    fn prop_policy_only_legal_actions(
        seed in arb_seed(),
        simulations in arb_simulations(),
        state in arb_position()
    ) {
        let game = Othello::new(6).unwrap();
        let result = rollout_mcts(seed, simulations).search(&game, &state).unwrap();

        let legal: Vec<usize> = game
            .legal_actions(&state)
            .into_iter()
            .map(|a| game.action_to_index(a))
            .collect();
        for (index, p) in result.policy.iter().enumerate() {
            prop_assert!(*p >= 0.0);
            if !legal.contains(&index) {
                prop_assert_eq!(*p, 0.0, "illegal index {} has mass", index);
            }
        }
        prop_assert!(state.is_legal(result.best_action));
    }

    #[test]
    fn prop_value_in_range(
        seed in arb_seed(),
        simulations in arb_simulations(),
        state in arb_position()
    ) {
        let game = Othello::new(6).unwrap();
        let result = rollout_mcts(seed, simulations).search(&game, &state).unwrap();
        prop_assert!((-1.0..=1.0).contains(&result.root_value));
    }
}

// =============================================================================
// Determinism and selection
// =============================================================================

proptest! {
    #[test]
    fn prop_deterministic(
        seed in arb_seed(),
        simulations in arb_simulations(),
        state in arb_position()
    ) {
        let game = Othello::new(6).unwrap();
        let first = rollout_mcts(seed, simulations).search(&game, &state).unwrap();
        let second = rollout_mcts(seed, simulations).search(&game, &state).unwrap();

        prop_assert_eq!(first.best_action, second.best_action);
        prop_assert_eq!(first.visit_counts, second.visit_counts);
        prop_assert_eq!(first.policy, second.policy);
    }

    #[test]
    fn prop_best_action_is_max_visits(
        simulations in arb_simulations(),
        state in arb_position()
    ) {
        let game = Othello::new(6).unwrap();
        let mut mcts = Mcts::new(
            MctsConfig::for_evaluation(simulations),
            UniformEvaluator,
            ChaCha8Rng::seed_from_u64(0),
        )
        .unwrap();
        let result = mcts.search(&game, &state).unwrap();

        let best_visits = result.visits(result.best_action);
        let max_visits = result.visit_counts.iter().map(|(_, c)| *c).max().unwrap();
        prop_assert_eq!(best_visits, max_visits);

        // Lowest index among the most visited
        let first_max = result
            .visit_counts
            .iter()
            .find(|(_, c)| *c == max_visits)
            .map(|(a, _)| *a)
            .unwrap();
        prop_assert_eq!(result.best_action, first_max);
    }
}

// =============================================================================
// Tree statistics
// =============================================================================

proptest! {
    #[test]
    fn prop_parent_visits_bound_children(
        seed in arb_seed(),
        simulations in arb_simulations(),
        state in arb_position()
    ) {
        let game = Othello::new(6).unwrap();
        let mut mcts = rollout_mcts(seed, simulations);
        mcts.search(&game, &state).unwrap();

        let tree = mcts.tree();
        for (_, node) in tree.iter() {
            let mut child_sum = 0;
            for (_, child_id) in &node.children {
                let child = tree.get(*child_id).stats.visit_count;
                prop_assert!(child <= node.stats.visit_count);
                child_sum += child;
            }
            prop_assert!(node.stats.visit_count >= child_sum);
        }
        prop_assert_eq!(mcts.root_stats().visit_count as usize, simulations);
    }

    #[test]
    fn prop_advance_preserves_subtree(
        seed in arb_seed(),
        simulations in arb_simulations(),
        state in arb_position()
    ) {
        let game = Othello::new(6).unwrap();
        let mut mcts = rollout_mcts(seed, simulations);
        let result = mcts.search(&game, &state).unwrap();

        let action = result.best_action;
        let before = mcts
            .tree()
            .root()
            .child(action)
            .map(|id| mcts.tree().get(id).stats.clone());

        mcts.advance(&game, action).unwrap();
        if let Some(stats) = before {
            prop_assert_eq!(mcts.root_stats(), &stats);
        } else {
            prop_assert_eq!(mcts.tree().len(), 1);
        }
        prop_assert_eq!(mcts.root_state(), Some(&state.apply_move(action).unwrap()));
    }
}
