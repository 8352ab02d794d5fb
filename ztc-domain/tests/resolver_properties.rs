// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Properties P1–P3 (§8): resolver output never places a consumer before
//! its provider, is invariant to the input's declaration order, and always
//! rejects a capability cycle regardless of how the descriptors are shuffled.

use proptest::prelude::*;
use ztc_domain::{resolve, AdapterDescriptor, Capability, Phase, ZtcError};

fn descriptor(
    name: &'static str,
    phase: Phase,
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

fn chain() -> Vec<AdapterDescriptor> {
    vec![
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
    ]
}

proptest! {
    /// P1: every provider appears before every consumer of its capability,
    /// no matter how the input list was ordered or shuffled.
    #[test]
    fn providers_always_precede_their_consumers(seed in 0u64..64) {
        let mut descriptors = chain();
        if seed % 2 == 0 {
            descriptors.reverse();
        }
        if seed % 3 == 0 {
            descriptors.swap(0, 1);
        }

        let plan = resolve(&descriptors).unwrap();
        let pos = |name: &str| plan.order.iter().position(|n| n == name).unwrap();
        prop_assert!(pos("hetzner") < pos("talos"));
        prop_assert!(pos("talos") < pos("cilium"));
    }

    /// P2: the resolved order is a pure function of the descriptor set,
    /// independent of the order the caller happened to list them in.
    #[test]
    fn resolution_is_invariant_to_declaration_order(seed in 0u64..64) {
        let mut shuffled = chain();
        if seed % 2 == 0 {
            shuffled.swap(0, 2);
        }
        if seed % 5 == 0 {
            shuffled.reverse();
        }

        prop_assert_eq!(resolve(&chain()).unwrap(), resolve(&shuffled).unwrap());
    }

    /// P3: a two-adapter capability cycle is rejected regardless of which
    /// order the two descriptors are listed in.
    #[test]
    fn a_two_adapter_cycle_is_always_rejected(swap_order in any::<bool>()) {
        let mut descriptors = vec![
            descriptor(
                "a",
                Phase::Foundation,
                &[Capability::CniArtifacts],
                &[Capability::KubernetesApi],
            ),
            descriptor(
                "b",
                Phase::Foundation,
                &[Capability::KubernetesApi],
                &[Capability::CniArtifacts],
            ),
        ];
        if swap_order {
            descriptors.swap(0, 1);
        }

        let err = resolve(&descriptors).unwrap_err();
        prop_assert!(matches!(err, ZtcError::CircularDependency { .. }));
    }
}
