use std::collections::{HashMap, HashSet};

use jobdag::dag::DependencyGraph;
use jobdag::types::JobState;
use proptest::prelude::*;

/// Randomly generated acyclic job graph.
///
/// Job `i` may only depend on jobs `0..i`, so submitting in index order
/// always satisfies the "dependencies first" rule.
#[derive(Debug, Clone)]
struct GraphShape {
    deps: Vec<Vec<usize>>,
    has_command: Vec<bool>,
    failing: HashSet<usize>,
}

fn name(i: usize) -> String {
    format!("job_{i}")
}

fn graph_strategy(max_jobs: usize) -> impl Strategy<Value = GraphShape> {
    (1..=max_jobs).prop_flat_map(|n| {
        (
            proptest::collection::vec(proptest::collection::vec(any::<usize>(), 0..4), n),
            proptest::collection::vec(any::<bool>(), n),
            proptest::collection::vec(0..n, 0..3),
        )
            .prop_map(move |(raw_deps, has_command, failing)| {
                let deps = raw_deps
                    .into_iter()
                    .enumerate()
                    .map(|(i, candidates)| {
                        if i == 0 {
                            return Vec::new();
                        }
                        let mut picked: Vec<usize> = candidates.into_iter().map(|d| d % i).collect();
                        picked.sort();
                        picked.dedup();
                        picked
                    })
                    .collect();
                GraphShape {
                    deps,
                    has_command,
                    failing: failing.into_iter().collect(),
                }
            })
    })
}

proptest! {
    #[test]
    fn every_acyclic_graph_runs_to_completion(
        shape in graph_strategy(12),
        // Picks which running job finishes next.
        choices in proptest::collection::vec(any::<usize>(), 64),
    ) {
        let mut graph = DependencyGraph::new();
        for (i, deps) in shape.deps.iter().enumerate() {
            let dep_names: Vec<String> = deps.iter().map(|d| name(*d)).collect();
            let command = shape.has_command[i].then(|| format!("run {i}"));
            graph.append(&name(i), &dep_names, command.as_deref()).unwrap();
        }

        let mut dispatch_count: HashMap<String, usize> = HashMap::new();
        let mut running: Vec<String> = Vec::new();
        let mut steps = 0;
        let max_steps = 10_000;

        while !graph.is_finished() && steps < max_steps {
            steps += 1;

            while let Some(job) = graph.next_ready() {
                match job.command {
                    Some(_) => {
                        *dispatch_count.entry(job.id.clone()).or_default() += 1;
                        running.push(job.id);
                    }
                    None => {
                        graph.complete(&job.id, 0).unwrap();
                    }
                }
            }

            if running.is_empty() {
                prop_assert!(
                    graph.is_finished(),
                    "nothing running or ready but graph not finished: deadlock"
                );
                break;
            }

            let pick = choices[steps % choices.len()] % running.len();
            let id = running.swap_remove(pick);
            let index: usize = id.trim_start_matches("job_").parse().unwrap();
            let code = if shape.failing.contains(&index) { 1 } else { 0 };
            graph.complete(&id, code).unwrap();
        }

        prop_assert!(steps < max_steps, "simulation did not terminate");
        prop_assert!(graph.is_finished());

        for (i, deps) in shape.deps.iter().enumerate() {
            let id = name(i);
            let state = graph.state_of(&id).unwrap();
            prop_assert!(state.is_terminal(), "{} ended in {:?}", id, state);
            prop_assert!(dispatch_count.get(&id).copied().unwrap_or(0) <= 1);

            let dep_states: Vec<JobState> =
                deps.iter().map(|d| graph.state_of(&name(*d)).unwrap()).collect();
            let all_deps_ok = dep_states.iter().all(|s| *s == JobState::Succeeded);

            match state {
                JobState::Skipped => {
                    prop_assert!(!dispatch_count.contains_key(&id), "{} skipped but ran", id);
                    prop_assert!(!all_deps_ok, "{} skipped with all deps succeeded", id);
                }
                JobState::Succeeded | JobState::Failed => {
                    prop_assert!(all_deps_ok, "{} ran before its dependencies succeeded", id);
                    let failed = shape.has_command[i] && shape.failing.contains(&i);
                    prop_assert_eq!(state == JobState::Failed, failed);
                }
                other => prop_assert!(false, "{} in non-terminal state {:?}", id, other),
            }
        }
    }
}
