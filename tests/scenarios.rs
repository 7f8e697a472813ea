//! End-to-end scenarios exercising the gossip and accounting subsystems
//! together, one test per concrete scenario.

use shardbft::block::{KeyPair, Peer, PublicKey, SecretKey, Shard};
use shardbft::byzantine::ByzantineAccounting;
use shardbft::coinbase::CoinbaseTracker;
use shardbft::config::NodeConfig;
use shardbft::gossip::{Message, NetworkConfig, RumorHolder};

fn pk(b: u8) -> PublicKey {
    PublicKey(vec![b; 4])
}

fn peer(port: u32) -> Peer {
    Peer { ip_address: 0x7f000001, port }
}

/// A lone holder that never hears back from anyone still retires its
/// own rumor within the derived round budget: local termination does
/// not depend on the network actually propagating anything.
#[test]
fn gossip_silent_network_still_retires_locally() {
    let cfg = NetworkConfig::new(3);
    let mut holder = RumorHolder::new(peer(0), cfg);
    holder.add_peer(peer(1), true);
    holder.add_peer(peer(2), true);

    holder.add_rumor(1, b"rumor".to_vec());
    assert!(holder.is_known(1));

    for _ in 0..(cfg.max_rounds_total() as usize + 1) {
        holder.advance_round();
    }
    assert_eq!(holder.active_rumor_count(), 0);
}

/// A peer that is pushed a rumor but whose confirmations never arrive
/// back (the "Byzantine never replies" case) still ages the rumor out
/// on its own schedule rather than holding it forever.
#[test]
fn gossip_unconfirmed_rumor_still_ages_out() {
    let cfg = NetworkConfig::with_rounds(3, 2, 2, 4);
    let mut holder = RumorHolder::new(peer(0), cfg);
    holder.add_peer(peer(1), false);

    let out = holder.received_message(peer(1), Message::push(7, 0, b"payload".to_vec()));
    assert!(out.is_empty(), "first sighting of a rumor produces no reply, matching the base protocol");
    assert!(holder.is_known(7));

    for _ in 0..(cfg.max_rounds_total() as usize + 1) {
        holder.advance_round();
    }
    assert_eq!(holder.active_rumor_count(), 0);
}

/// A peer that never responds to PUSH/PULL eventually gets dropped
/// from the non-priority pool, the mechanism that bounds a quiet
/// Byzantine peer's ability to keep being re-selected as a target.
#[test]
fn gossip_non_responsive_peer_is_eventually_dropped() {
    let cfg = NetworkConfig::with_rounds(3, 1, 1, 5);
    let mut holder = RumorHolder::new(peer(0), cfg);
    holder.add_peer(peer(1), false);
    holder.add_peer(peer(2), true);

    for _ in 0..3 {
        holder.decay_non_priority_peers(&[peer(1)]);
    }
    assert_eq!(holder.peer_count(), 1, "the silent non-priority peer should have been dropped, the priority one kept");
}

/// Wires `count` holders into a full mesh and drives them through
/// `ticks` rounds of real message exchange between actual
/// `RumorHolder`s, rather than driving one in isolation.
/// Holder indices in `silent` never let anything they produce leave
/// their node -- neither their own `advance_round` output nor any
/// reply `received_message` computes for them -- modeling a Byzantine
/// peer that drops every outbound message while still processing
/// whatever honest peers send it.
///
/// Message delivery is bounded to two hops per send: the primary
/// message, then whatever single reply it provokes. Replies to that
/// reply are not chased further, since this round-based core advances
/// rounds via discrete per-peer clocks rather than a live network's
/// instantaneous, continuous-time message cascade.
fn run_mesh(count: usize, ticks: usize, silent: &[usize]) -> (Vec<RumorHolder>, Vec<usize>, Vec<usize>) {
    let full_mesh_rounds = (count as u32).saturating_sub(1).max(1);
    let cfg = NetworkConfig::with_rounds(count, full_mesh_rounds, full_mesh_rounds, full_mesh_rounds * 4);

    let peers: Vec<Peer> = (0..count).map(|i| peer(50000 + i as u32)).collect();
    let mut holders: Vec<RumorHolder> = peers.iter().map(|&p| RumorHolder::new(p, cfg)).collect();
    for i in 0..count {
        for j in 0..count {
            if i != j {
                holders[i].add_peer(peers[j], true);
            }
        }
    }

    let mut sent = vec![0usize; count];
    let mut received = vec![0usize; count];

    let seed = holders[0].add_rumor(1, b"rumor".to_vec());
    dispatch(&mut holders, &peers, &mut sent, &mut received, silent, 0, seed);

    for _ in 0..ticks {
        for i in 0..count {
            let outgoing = holders[i].advance_round();
            dispatch(&mut holders, &peers, &mut sent, &mut received, silent, i, outgoing);
        }
    }

    (holders, sent, received)
}

fn dispatch(
    holders: &mut [RumorHolder],
    peers: &[Peer],
    sent: &mut [usize],
    received: &mut [usize],
    silent: &[usize],
    from_idx: usize,
    outgoing: Vec<(Peer, Message)>,
) {
    if silent.contains(&from_idx) {
        return;
    }
    for (to_peer, msg) in outgoing {
        let to_idx = peers.iter().position(|p| *p == to_peer).expect("target is one of the meshed peers");
        sent[from_idx] += 1;
        received[to_idx] += 1;
        let replies = holders[to_idx].received_message(peers[from_idx], msg);
        if silent.contains(&to_idx) {
            continue;
        }
        for reply in replies {
            sent[to_idx] += 1;
            received[from_idx] += 1;
            let _ = holders[from_idx].received_message(peers[to_idx], reply);
        }
    }
}

/// Three peers, no Byzantine faults: peer 0 originates a rumor, every
/// peer sends and receives real traffic, and dissemination terminates
/// with every holder retiring the rumor.
#[test]
fn gossip_three_peer_happy_path_disseminates_to_everyone() {
    let (holders, sent, received) = run_mesh(3, 10, &[]);

    for i in 0..3 {
        assert!(sent[i] > 0, "peer {i} never sent anything");
        assert!(received[i] > 0, "peer {i} never received anything");
    }
    assert_eq!(sent.iter().sum::<usize>(), received.iter().sum::<usize>(), "every send is exactly one receive");
    for holder in &holders {
        assert!(!holder.is_known(1), "rumor should have fully retired everywhere");
    }
}

/// Three peers, peer 1 Byzantine (drops every outbound message): peers
/// 0 and 2 still disseminate and retire the rumor between themselves;
/// peer 1 keeps receiving the gossip pushed at it but never manages to
/// dispatch anything of its own, matching the "receives but never
/// dispatches" character of a silent peer.
#[test]
fn gossip_one_byzantine_peer_still_lets_honest_peers_converge() {
    let (holders, sent, received) = run_mesh(3, 10, &[1]);

    assert_eq!(sent[1], 0, "the Byzantine peer must never dispatch anything");
    assert!(received[1] > 0, "the Byzantine peer is still gossiped at by its honest neighbors");

    assert!(sent[0] > 0 && sent[2] > 0, "the honest peers keep trying to spread the rumor");
    assert!(!holders[0].is_known(1), "honest peer 0 still retires the rumor on its own schedule");
    assert!(!holders[2].is_known(1), "honest peer 2 still retires the rumor on its own schedule");
}

/// Three peers, peers 1 and 2 both Byzantine: peer 0's only gossip
/// partners drop everything, so no acknowledgement of any kind ever
/// makes it back -- the liveness loss a lone honest peer suffers when
/// surrounded by silence, even though it keeps broadcasting.
#[test]
fn gossip_two_byzantine_peers_isolates_the_lone_honest_peer() {
    let (_, sent, received) = run_mesh(3, 10, &[1, 2]);

    assert_eq!(sent[1], 0, "byzantine peer 1 must never dispatch anything");
    assert_eq!(sent[2], 0, "byzantine peer 2 must never dispatch anything");
    assert!(sent[0] > 0, "the honest peer keeps broadcasting");
    assert_eq!(received[0], 0, "with every neighbor silent, nothing ever comes back to the honest peer");
}

fn committee(n: usize) -> Vec<PublicKey> {
    (0..n as u8).map(pk).collect()
}

/// Scenario: 20-member committee, 99-epoch rotation window,
/// PERFORMANCE_THRESHOLD=0.25 -> maxCoSigs=196, threshold=49. Two
/// members cosigned nothing; both should be flagged for removal.
#[test]
fn byzantine_clean_rotation_flags_exactly_the_idle_members() {
    let mut config = NodeConfig::default();
    config.num_final_block_per_pow = 99;
    config.performance_threshold = 0.25;
    config.num_of_removed = 20; // cap is not the constraint under test

    assert_eq!(config.max_co_sigs(), 196);
    assert_eq!(config.removal_threshold(), 49);

    let members = committee(20);
    let mut accounting = ByzantineAccounting::new();
    // Every member except the last two cosigns well above threshold.
    for member in members.iter().take(18) {
        for _ in 0..60 {
            accounting.record_cosign(member);
        }
    }

    let removed = accounting.removal_candidates(&members, 2, &config);
    assert_eq!(removed.len(), 2);
    assert!(removed.contains(&members[18]));
    assert!(removed.contains(&members[19]));
}

/// Scenario: 8 underperforming members but NUM_OF_REMOVED=3 -> the
/// removal list is capped at exactly 3, taking the first 3 by
/// committee order.
#[test]
fn byzantine_over_cap_removal_is_capped_and_order_preserving() {
    let mut config = NodeConfig::default();
    config.num_final_block_per_pow = 11; // max_co_sigs = 20
    config.performance_threshold = 0.5; // threshold = 10
    config.num_of_removed = 3;

    let members = committee(8);
    // None of the 8 ever cosigns, so all 8 are under threshold.
    let accounting = ByzantineAccounting::new();

    let removed = accounting.removal_candidates(&members, 2, &config);
    assert_eq!(removed.len(), 3);
    assert_eq!(removed, vec![members[0].clone(), members[1].clone(), members[2].clone()]);
}

fn kp(byte: u8) -> KeyPair {
    KeyPair { secret: SecretKey(vec![byte]), public: pk(byte) }
}

fn shard_of(n: u8) -> Shard {
    (0..n).map(|i| (kp(i).public, peer(30000 + i as u32))).collect()
}

/// Scenario: empty `GENESIS_WALLETS` -> distribution is a no-op, no
/// payouts recorded, matching `InitCoinbase`'s early return.
#[test]
fn coinbase_distribute_with_empty_genesis_wallets_pays_nothing() {
    let mut tracker = CoinbaseTracker::new();
    let shard = shard_of(4);
    tracker.record_cosigs(1, 0, &shard, &[true, true, false, false], &[false, false, true, true]).unwrap();

    let mut payouts = Vec::new();
    tracker
        .distribute(1, &[], 950_000_000_000_000, 0, 0xBEEF, |to, from, amount| {
            payouts.push((to, from, amount));
            true
        })
        .unwrap();

    assert!(payouts.is_empty());
}
