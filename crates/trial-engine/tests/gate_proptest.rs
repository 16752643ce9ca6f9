//! Property tests for `ActionGate` socket semantics.

use std::collections::BTreeSet;

use proptest::prelude::*;
use trial_engine::gate::{ActionGate, FireTicket};

const SOCKETS: [&str; 3] = ["PLAYER_WALK", "INTRO_FADE", "DOOR"];

#[derive(Debug, Clone)]
enum GateOp {
    Fire(usize),
    Release(usize),
    ForceRelease(usize),
    ReleaseTicket(usize),
}

fn gate_op_strategy() -> impl Strategy<Value = GateOp> {
    prop_oneof![
        (0..SOCKETS.len()).prop_map(GateOp::Fire),
        (0..SOCKETS.len()).prop_map(GateOp::Release),
        (0..SOCKETS.len()).prop_map(GateOp::ForceRelease),
        (0..16usize).prop_map(GateOp::ReleaseTicket),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1_000))]

    #[test]
    fn gate_tracks_a_set_of_held_sockets(ops in prop::collection::vec(gate_op_strategy(), 1..80)) {
        let mut gate = ActionGate::new();
        let mut held: BTreeSet<&str> = BTreeSet::new();
        // Every ticket ever issued, with whether a force-release orphaned it.
        let mut tickets: Vec<(FireTicket, bool)> = Vec::new();

        for op in &ops {
            match *op {
                GateOp::Fire(i) => {
                    let socket = SOCKETS[i];
                    let ticket = gate.try_fire(socket);
                    prop_assert_eq!(ticket.is_some(), held.insert(socket));
                    if let Some(ticket) = ticket {
                        prop_assert!(gate.is_current(&ticket));
                        tickets.push((ticket, false));
                    }
                }
                GateOp::Release(i) => {
                    gate.release(SOCKETS[i]);
                    held.remove(SOCKETS[i]);
                }
                GateOp::ForceRelease(i) => {
                    gate.force_release(SOCKETS[i]);
                    held.remove(SOCKETS[i]);
                    for (ticket, orphaned) in &mut tickets {
                        if ticket.socket() == SOCKETS[i] {
                            *orphaned = true;
                        }
                    }
                }
                GateOp::ReleaseTicket(n) => {
                    if let Some((ticket, orphaned)) = tickets.get(n) {
                        let released = gate.release_ticket(ticket);
                        if *orphaned {
                            prop_assert!(!released, "orphaned ticket released {:?}", ticket);
                        }
                        if released {
                            held.remove(ticket.socket());
                        }
                    }
                }
            }

            let fired: BTreeSet<&str> = gate.fired_sockets().collect();
            prop_assert_eq!(&fired, &held);
            for socket in SOCKETS {
                prop_assert_eq!(gate.is_fired(socket), held.contains(socket));
            }
            for (ticket, orphaned) in &tickets {
                if *orphaned {
                    prop_assert!(!gate.is_current(ticket));
                }
            }
        }
    }

    #[test]
    fn held_socket_never_fires_twice(fires in 2..20usize) {
        let mut gate = ActionGate::new();
        let first = gate.try_fire("PLAYER_WALK");
        prop_assert!(first.is_some());
        for _ in 1..fires {
            prop_assert!(gate.try_fire("PLAYER_WALK").is_none());
        }
    }
}
