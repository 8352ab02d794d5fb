// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Dependency Resolver
//!
//! Turns the set of selected [`AdapterDescriptor`]s into a deterministic
//! linear render order. This is a capability-edge topological sort: an
//! adapter that `requires` a capability depends on the single adapter that
//! `provides` it.
//!
//! Determinism matters as much as correctness here (P1, P2 in the testable
//! properties): the same set of selected adapters must produce the exact
//! same order on every run, on every machine, so that re-rendering an
//! unchanged configuration produces a byte-identical artifact tree. Kahn's
//! algorithm naturally admits multiple valid orderings when more than one
//! adapter is ready at once; this resolver breaks ties by adapter name so
//! the algorithm's internal nondeterminism (hash map iteration order, etc.)
//! can never leak into the output.

use std::collections::{BTreeMap, BTreeSet, BinaryHeap};
use std::cmp::Reverse;

use crate::adapter::AdapterDescriptor;
use crate::capability::Capability;
use crate::error::ZtcError;

/// The resolver's output: adapters in the order they must render, each
/// paired with the phase the resolver assigned at lookup time (for
/// diagnostics; the phase itself came from the descriptor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlan {
    pub order: Vec<String>,
}

impl ResolvedPlan {
    pub fn adapter_names(&self) -> &[String] {
        &self.order
    }
}

struct ProviderIndex<'a> {
    by_capability: BTreeMap<Capability, &'a str>,
}

impl<'a> ProviderIndex<'a> {
    fn build(descriptors: &'a [AdapterDescriptor]) -> Result<Self, ZtcError> {
        let mut by_capability: BTreeMap<Capability, &'a str> = BTreeMap::new();
        for descriptor in descriptors {
            for capability in &descriptor.provides {
                if let Some(existing) = by_capability.get(capability) {
                    return Err(ZtcError::DuplicateProvider {
                        capability: capability.to_string(),
                        first: (*existing).to_string(),
                        second: descriptor.name.to_string(),
                    });
                }
                by_capability.insert(*capability, descriptor.name);
            }
        }
        Ok(Self { by_capability })
    }

    fn provider_of(&self, capability: Capability) -> Option<&'a str> {
        self.by_capability.get(&capability).copied()
    }
}

/// Resolves `descriptors` into a deterministic, phase- and capability-respecting
/// render order.
///
/// Errors (in the order they are checked):
/// - [`ZtcError::DuplicateProvider`] if two adapters provide the same capability.
/// - [`ZtcError::MissingCapability`] if an adapter requires a capability no
///   selected adapter provides.
/// - [`ZtcError::PhaseViolation`] if an adapter's required capability is
///   provided by an adapter in a later (or equal *and* not-yet-rendered... see
///   below) phase — capabilities may only flow forward.
/// - [`ZtcError::CircularDependency`] if the capability graph has a cycle.
pub fn resolve(descriptors: &[AdapterDescriptor]) -> Result<ResolvedPlan, ZtcError> {
    let providers = ProviderIndex::build(descriptors)?;
    let by_name: BTreeMap<&str, &AdapterDescriptor> =
        descriptors.iter().map(|d| (d.name, d)).collect();

    // Build the dependency edges: consumer -> provider, validating
    // MissingCapability and PhaseViolation as we go.
    let mut dependents: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut indegree: BTreeMap<&str, usize> = descriptors.iter().map(|d| (d.name, 0)).collect();

    for descriptor in descriptors {
        for capability in &descriptor.requires {
            let Some(provider_name) = providers.provider_of(*capability) else {
                return Err(ZtcError::MissingCapability {
                    consumer: descriptor.name.to_string(),
                    capability: capability.to_string(),
                });
            };

            if provider_name == descriptor.name {
                return Err(ZtcError::CircularDependency {
                    cycle: vec![descriptor.name.to_string()],
                });
            }

            let provider = by_name
                .get(provider_name)
                .expect("provider index only ever returns a descriptor from this set");

            if provider.phase > descriptor.phase {
                return Err(ZtcError::PhaseViolation {
                    consumer: descriptor.name.to_string(),
                    provider: provider_name.to_string(),
                    capability: capability.to_string(),
                });
            }

            if dependents
                .entry(provider_name)
                .or_default()
                .insert(descriptor.name)
            {
                *indegree.entry(descriptor.name).or_insert(0) += 1;
            }
        }
    }

    // Kahn's algorithm. The ready set is a min-heap over adapter names
    // (via `Reverse`) so that whenever more than one adapter becomes
    // ready in the same round, the lexicographically smallest name is
    // always emitted first — this is what makes the output independent
    // of `BTreeMap`/iteration order elsewhere in the function.
    let mut ready: BinaryHeap<Reverse<&str>> = indegree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&name, _)| Reverse(name))
        .collect();

    let mut remaining_indegree = indegree.clone();
    let mut order: Vec<String> = Vec::with_capacity(descriptors.len());

    while let Some(Reverse(name)) = ready.pop() {
        order.push(name.to_string());
        if let Some(children) = dependents.get(name) {
            for &child in children {
                let degree = remaining_indegree
                    .get_mut(child)
                    .expect("every dependent name was seeded into indegree");
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse(child));
                }
            }
        }
    }

    if order.len() != descriptors.len() {
        let cycle = find_cycle(descriptors, &dependents, &remaining_indegree);
        return Err(ZtcError::CircularDependency { cycle });
    }

    Ok(ResolvedPlan { order })
}

/// Called only once Kahn's algorithm has stalled with unresolved nodes
/// remaining; walks the residual graph to produce a human-readable cycle for
/// the error message. Deterministic: starts from the lexicographically
/// smallest unresolved node and always follows the lexicographically
/// smallest outgoing edge, so the reported cycle is stable across runs.
fn find_cycle(
    descriptors: &[AdapterDescriptor],
    dependents: &BTreeMap<&str, BTreeSet<&str>>,
    remaining_indegree: &BTreeMap<&str, usize>,
) -> Vec<String> {
    let stuck: BTreeSet<&str> = remaining_indegree
        .iter()
        .filter(|(_, &deg)| deg > 0)
        .map(|(&name, _)| name)
        .collect();

    // Edges here point consumer -> provider (requires); `dependents` is
    // provider -> consumers, so invert for the walk.
    let mut requires: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (&provider, consumers) in dependents {
        for &consumer in consumers {
            if stuck.contains(consumer) && stuck.contains(provider) {
                requires.entry(consumer).or_default().insert(provider);
            }
        }
    }

    let start = *stuck
        .iter()
        .next()
        .expect("find_cycle is only called when at least one node is stuck");

    let mut path = vec![start];
    let mut visited = BTreeSet::new();
    visited.insert(start);
    let mut current = start;

    loop {
        let next = requires
            .get(current)
            .and_then(|edges| edges.iter().next())
            .copied();
        let Some(next) = next else {
            // No outgoing edge recorded (shouldn't happen if truly stuck on
            // a cycle, but guards against an empty descriptors list).
            let _ = descriptors;
            break;
        };
        if visited.contains(next) {
            break;
        }
        path.push(next);
        visited.insert(next);
        current = next;
    }

    path.into_iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(
        name: &'static str,
        phase: crate::adapter::Phase,
        provides: &[Capability],
        requires: &[Capability],
    ) -> AdapterDescriptor {
        AdapterDescriptor {
            name,
            display_name: name,
            version: "1.0.0",
            phase,
            selection_group: name,
            provides: provides.to_vec(),
            requires: requires.to_vec(),
            supported_versions: vec!["1.0.0"],
            default_version: "1.0.0",
        }
    }

    use crate::adapter::Phase;

    #[test]
    fn trivial_chain_resolves_in_dependency_order() {
        let descriptors = vec![
            descriptor("hetzner", Phase::Foundation, &[Capability::CloudInfrastructure], &[]),
            descriptor(
                "talos",
                Phase::Foundation,
                &[Capability::KubernetesApi],
                &[Capability::CloudInfrastructure],
            ),
            descriptor(
                "cilium",
                Phase::Networking,
                &[Capability::CniArtifacts],
                &[Capability::KubernetesApi],
            ),
        ];
        let plan = resolve(&descriptors).unwrap();
        assert_eq!(plan.order, vec!["hetzner", "talos", "cilium"]);
    }

    #[test]
    fn ties_break_on_adapter_name() {
        let descriptors = vec![
            descriptor("zeta", Phase::Foundation, &[Capability::KubernetesApi], &[]),
            descriptor("alpha", Phase::Foundation, &[Capability::CloudInfrastructure], &[]),
        ];
        let plan = resolve(&descriptors).unwrap();
        assert_eq!(plan.order, vec!["alpha", "zeta"]);
    }

    #[test]
    fn resolution_is_deterministic_across_input_order() {
        let forward = vec![
            descriptor("hetzner", Phase::Foundation, &[Capability::CloudInfrastructure], &[]),
            descriptor(
                "talos",
                Phase::Foundation,
                &[Capability::KubernetesApi],
                &[Capability::CloudInfrastructure],
            ),
        ];
        let reversed: Vec<_> = forward.iter().cloned().rev().collect();
        assert_eq!(resolve(&forward).unwrap(), resolve(&reversed).unwrap());
    }

    #[test]
    fn missing_capability_is_reported() {
        let descriptors = vec![descriptor(
            "talos",
            Phase::Foundation,
            &[Capability::KubernetesApi],
            &[Capability::CloudInfrastructure],
        )];
        let err = resolve(&descriptors).unwrap_err();
        assert!(matches!(err, ZtcError::MissingCapability { .. }));
    }

    #[test]
    fn duplicate_provider_is_rejected() {
        let descriptors = vec![
            descriptor("hetzner", Phase::Foundation, &[Capability::CloudInfrastructure], &[]),
            descriptor("scaleway", Phase::Foundation, &[Capability::CloudInfrastructure], &[]),
        ];
        let err = resolve(&descriptors).unwrap_err();
        assert!(matches!(err, ZtcError::DuplicateProvider { .. }));
    }

    #[test]
    fn phase_violation_when_provider_is_later_phase() {
        let descriptors = vec![
            descriptor("cilium", Phase::Networking, &[Capability::CniArtifacts], &[]),
            descriptor(
                "hetzner",
                Phase::Foundation,
                &[Capability::CloudInfrastructure],
                &[Capability::CniArtifacts],
            ),
        ];
        let err = resolve(&descriptors).unwrap_err();
        assert!(matches!(err, ZtcError::PhaseViolation { .. }));
    }

    #[test]
    fn circular_dependency_is_detected() {
        let descriptors = vec![
            descriptor(
                "a",
                Phase::Foundation,
                &[Capability::CloudInfrastructure],
                &[Capability::KubernetesApi],
            ),
            descriptor(
                "b",
                Phase::Foundation,
                &[Capability::KubernetesApi],
                &[Capability::CloudInfrastructure],
            ),
        ];
        let err = resolve(&descriptors).unwrap_err();
        match err {
            ZtcError::CircularDependency { cycle } => {
                assert_eq!(cycle, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("expected CircularDependency, got {other:?}"),
        }
    }

    #[test]
    fn same_phase_forward_dependency_is_allowed() {
        let descriptors = vec![
            descriptor("hetzner", Phase::Foundation, &[Capability::CloudInfrastructure], &[]),
            descriptor(
                "talos",
                Phase::Foundation,
                &[Capability::KubernetesApi],
                &[Capability::CloudInfrastructure],
            ),
        ];
        assert!(resolve(&descriptors).is_ok());
    }

}
