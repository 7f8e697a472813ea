//! Per-node gossip state: the set of known peers and in-flight rumors,
//! matching `RumorHolder.cpp`'s neighbor-sampling and retirement rules.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;

use crate::block::Peer;
use crate::config::MAX_RETRY;

use super::message::{Message, MessageType, NO_RUMOR};
use super::network_config::NetworkConfig;
use super::rumor_state::{RumorPhase, RumorStateMachine};

/// A peer tracked by a holder, with the decay state used to drop
/// non-priority peers that repeatedly fail target selection.
#[derive(Clone, Debug)]
struct PeerEntry {
    peer: Peer,
    priority: bool,
    miss_count: u32,
}

/// Tracks peers and active rumors for a single gossiping node.
/// `receivedMessage` and `advanceRound` are meant to be called behind a
/// single lock by the caller: this type itself holds no
/// lock, it's the unit of state the owner's `Mutex<RumorHolder>` wraps.
pub struct RumorHolder {
    self_peer: Peer,
    network_config: NetworkConfig,
    peers: Vec<PeerEntry>,
    rumors: HashMap<i64, (Vec<u8>, RumorStateMachine)>,
    /// Peers heard from since the last `advance_round` call. Fed to
    /// every active rumor's state machine so it can judge how fast the
    /// rumor is spreading among current neighbors.
    peers_in_current_round: HashSet<Peer>,
    /// Peers already answered with a PULL burst this round; consulted
    /// by `select_targets` so a peer that just asked for everything
    /// isn't immediately re-targeted too.
    reactive_peers_this_round: HashSet<Peer>,
    /// Peers dropped after exceeding the non-priority miss-count bound.
    max_peer_misses: u32,
}

impl RumorHolder {
    pub fn new(self_peer: Peer, network_config: NetworkConfig) -> Self {
        Self {
            self_peer,
            network_config,
            peers: Vec::new(),
            rumors: HashMap::new(),
            peers_in_current_round: HashSet::new(),
            reactive_peers_this_round: HashSet::new(),
            max_peer_misses: 3,
        }
    }

    pub fn add_peer(&mut self, peer: Peer, priority: bool) {
        if peer == self.self_peer || self.peers.iter().any(|p| p.peer == peer) {
            return;
        }
        self.peers.push(PeerEntry { peer, priority, miss_count: 0 });
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Originates a new rumor at this holder, returning the initial
    /// PUSH to emit to a freshly sampled set of targets.
    pub fn add_rumor(&mut self, rumor_id: i64, payload: Vec<u8>) -> Vec<(Peer, Message)> {
        self.rumors.entry(rumor_id).or_insert_with(|| (payload.clone(), RumorStateMachine::new(self.network_config)));
        let targets = self.select_targets();
        targets.into_iter().map(|p| (p, Message::push(rumor_id, 0, payload.clone()))).collect()
    }

    /// Handles an inbound message, returning any reply messages to
    /// send back to `from`. Matches `RumorHolder::receivedMessage`: the
    /// first PUSH/EMPTY_PUSH heard from a peer this round triggers a
    /// PULL burst for everything this holder still has to spread, and
    /// separately, any message carrying a real rumor id is folded into
    /// that rumor's member-round tracking (or starts tracking it, if
    /// it's brand new to this holder).
    pub fn received_message(&mut self, from: Peer, msg: Message) -> Vec<Message> {
        let is_new_peer_this_round = self.peers_in_current_round.insert(from);

        let mut replies = Vec::new();
        if is_new_peer_this_round && matches!(msg.kind, MessageType::Push | MessageType::EmptyPush) {
            let pulls: Vec<Message> = self
                .rumors
                .iter()
                .filter(|(_, (_, sm))| sm.age() > 0 && !sm.is_old())
                .map(|(id, (_, sm))| Message::pull(*id, sm.age()))
                .collect();
            if pulls.is_empty() {
                replies.push(Message::empty_pull());
            } else {
                replies.extend(pulls);
                self.reactive_peers_this_round.insert(from);
            }
        }

        // Pull/LazyPush/LazyPull carry a rumor id but no real payload --
        // they're requests, not assertions -- so only Push/Forward ever
        // seed a brand-new entry here; any kind still raises the round
        // recorded for `from` once the rumor is already tracked.
        if msg.rumor_id != NO_RUMOR {
            if let Some((_, sm)) = self.rumors.get_mut(&msg.rumor_id) {
                sm.record_member_round(from, msg.rounds);
            } else if matches!(msg.kind, MessageType::Push | MessageType::Forward) {
                self.rumors.insert(
                    msg.rumor_id,
                    (msg.payload.clone(), RumorStateMachine::new_from_peer(self.network_config, from, msg.rounds)),
                );
            }
        }

        match msg.kind {
            MessageType::Pull => {
                if let Some((payload, _)) = self.rumors.get(&msg.rumor_id) {
                    replies.push(Message::push(msg.rumor_id, msg.rounds, payload.clone()));
                } else {
                    replies.push(Message::empty_pull());
                }
            }
            MessageType::LazyPush => {
                if self.rumors.contains_key(&msg.rumor_id) {
                    replies.push(Message::empty_push());
                } else {
                    replies.push(Message::pull(msg.rumor_id, msg.rounds));
                }
            }
            MessageType::LazyPull => {
                if self.rumors.contains_key(&msg.rumor_id) {
                    replies.push(Message::push(msg.rumor_id, msg.rounds, self.rumors[&msg.rumor_id].0.clone()));
                } else {
                    replies.push(Message::empty_pull());
                }
            }
            MessageType::EmptyPush | MessageType::EmptyPull => {
                self.note_peer_responded(from);
            }
            MessageType::Push | MessageType::Forward | MessageType::Undefined => {}
        }
        replies
    }

    /// Drives one local gossip round: samples targets once, ages every
    /// active rumor against the peers heard from this round, then
    /// pushes every non-old rumor to that same target set, falling
    /// back to a single EMPTY_PUSH per target with nothing to spread.
    pub fn advance_round(&mut self) -> Vec<(Peer, Message)> {
        let peers_in_current_round: Vec<Peer> = self.peers_in_current_round.iter().copied().collect();
        let targets = self.select_targets();

        for (_, sm) in self.rumors.values_mut() {
            if !sm.is_old() {
                sm.advance_round(&peers_in_current_round);
            }
        }
        self.rumors.retain(|_, (_, sm)| !sm.is_old());

        let mut outgoing = Vec::new();
        for peer in &targets {
            let mut sent_any = false;
            for (id, (payload, sm)) in self.rumors.iter() {
                let msg = match sm.phase() {
                    RumorPhase::New => Message::push(*id, sm.age(), payload.clone()),
                    RumorPhase::Known => Message::lazy_push(*id, sm.age()),
                    RumorPhase::Old | RumorPhase::Unknown => continue,
                };
                outgoing.push((*peer, msg));
                sent_any = true;
            }
            if !sent_any {
                outgoing.push((*peer, Message::empty_push()));
            }
        }

        self.peers_in_current_round.clear();
        self.reactive_peers_this_round.clear();
        outgoing
    }

    pub fn is_known(&self, rumor_id: i64) -> bool {
        self.rumors.contains_key(&rumor_id)
    }

    pub fn active_rumor_count(&self) -> usize {
        self.rumors.len()
    }

    /// Samples `maxRoundsInB`-many priority peers first; if sampling
    /// repeatedly lands on already-exhausted priority peers (up to
    /// [`MAX_RETRY`] attempts), falls back to the non-priority pool.
    /// Peers that already received a PULL burst this round
    /// (`reactive_peers_this_round`) are skipped unless excluding them
    /// would leave too few candidates to fill the target count.
    fn select_targets(&mut self) -> Vec<Peer> {
        if self.peers.is_empty() {
            return Vec::new();
        }
        let mut rng = rand::thread_rng();
        let want = self.network_config.max_rounds_in_b().max(1) as usize;
        let capped_want = want.min(self.peers.len());

        let mut priority_idxs: Vec<usize> =
            self.peers.iter().enumerate().filter(|(_, p)| p.priority).map(|(i, _)| i).collect();
        priority_idxs = self.filter_reactive(priority_idxs, capped_want);

        let mut chosen = Vec::new();
        let mut attempt = 0;
        while chosen.len() < capped_want && attempt < MAX_RETRY {
            priority_idxs.shuffle(&mut rng);
            for &idx in priority_idxs.iter().take(capped_want - chosen.len()) {
                if !chosen.contains(&idx) {
                    chosen.push(idx);
                }
            }
            if priority_idxs.is_empty() {
                break;
            }
            attempt += 1;
        }

        if chosen.len() < capped_want {
            let mut rest: Vec<usize> = (0..self.peers.len()).filter(|i| !chosen.contains(i)).collect();
            rest = self.filter_reactive(rest, capped_want - chosen.len());
            rest.shuffle(&mut rng);
            for idx in rest {
                if chosen.len() >= capped_want {
                    break;
                }
                chosen.push(idx);
            }
        }

        chosen.into_iter().map(|i| self.peers[i].peer).collect()
    }

    /// Drops entries for peers in `reactive_peers_this_round`, unless
    /// doing so would leave fewer than `min_pool` candidates.
    fn filter_reactive(&self, idxs: Vec<usize>, min_pool: usize) -> Vec<usize> {
        let filtered: Vec<usize> =
            idxs.iter().copied().filter(|&i| !self.reactive_peers_this_round.contains(&self.peers[i].peer)).collect();
        if filtered.len() >= min_pool {
            filtered
        } else {
            idxs
        }
    }

    fn note_peer_responded(&mut self, from: Peer) {
        if let Some(entry) = self.peers.iter_mut().find(|p| p.peer == from) {
            entry.miss_count = 0;
        }
    }

    /// Bumps the miss counter for non-priority peers that were targeted
    /// but never replied, dropping them once they exceed the bound
    /// set by [`Self::set_max_peer_misses`] (or the default of 3).
    pub fn decay_non_priority_peers(&mut self, unresponsive: &[Peer]) {
        for peer in unresponsive {
            if let Some(entry) = self.peers.iter_mut().find(|p| p.peer == *peer && !p.priority) {
                entry.miss_count += 1;
            }
        }
        let bound = self.max_peer_misses;
        self.peers.retain(|p| p.priority || p.miss_count < bound);
    }

    /// Ensures deterministic test behaviour by letting callers inject a
    /// fixed, non-random decay bound.
    #[cfg(test)]
    pub fn set_max_peer_misses(&mut self, bound: u32) {
        self.max_peer_misses = bound;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(port: u32) -> Peer {
        Peer { ip_address: 0x7f000001, port }
    }

    #[test]
    fn add_rumor_pushes_to_sampled_targets() {
        let cfg = NetworkConfig::with_rounds(5, 2, 2, 10);
        let mut holder = RumorHolder::new(peer(0), cfg);
        for i in 1..5 {
            holder.add_peer(peer(i), true);
        }
        let out = holder.add_rumor(1, b"hello".to_vec());
        assert!(!out.is_empty());
        assert!(holder.is_known(1));
    }

    #[test]
    fn pull_for_unknown_rumor_gets_empty_pull() {
        let cfg = NetworkConfig::with_rounds(3, 1, 1, 5);
        let mut holder = RumorHolder::new(peer(0), cfg);
        let reply = holder.received_message(peer(1), Message::pull(42, 0));
        assert_eq!(reply.len(), 1);
        assert_eq!(reply[0].kind, MessageType::EmptyPull);
    }

    #[test]
    fn first_push_this_round_triggers_a_pull_burst_for_known_rumors() {
        let cfg = NetworkConfig::with_rounds(3, 2, 2, 10);
        let mut holder = RumorHolder::new(peer(0), cfg);
        holder.add_rumor(7, b"payload".to_vec());
        // Age rumor 7 past zero so it's eligible for the pull burst.
        holder.advance_round();

        let replies = holder.received_message(peer(9), Message::push(1, 0, b"other".to_vec()));
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].kind, MessageType::Pull);
        assert_eq!(replies[0].rumor_id, 7);
    }

    #[test]
    fn push_with_nothing_to_offer_back_gets_an_empty_pull() {
        let cfg = NetworkConfig::with_rounds(3, 2, 2, 10);
        let mut holder = RumorHolder::new(peer(0), cfg);
        let replies = holder.received_message(peer(9), Message::push(1, 0, b"payload".to_vec()));
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].kind, MessageType::EmptyPull);
    }

    #[test]
    fn a_second_push_in_the_same_round_does_not_repeat_the_pull_burst() {
        let cfg = NetworkConfig::with_rounds(3, 2, 2, 10);
        let mut holder = RumorHolder::new(peer(0), cfg);
        holder.add_rumor(7, b"payload".to_vec());
        holder.advance_round();

        let from = peer(9);
        let first = holder.received_message(from, Message::push(1, 0, b"a".to_vec()));
        assert!(!first.is_empty());
        let second = holder.received_message(from, Message::push(2, 0, b"b".to_vec()));
        assert!(second.is_empty());
    }

    #[test]
    fn advance_round_samples_targets_once_for_every_active_rumor() {
        let cfg = NetworkConfig::with_rounds(5, 4, 4, 10);
        let mut holder = RumorHolder::new(peer(0), cfg);
        for i in 1..5 {
            holder.add_peer(peer(i), true);
        }
        holder.add_rumor(1, b"one".to_vec());
        holder.add_rumor(2, b"two".to_vec());

        let outgoing = holder.advance_round();
        let targets_for_rumor_1: HashSet<Peer> =
            outgoing.iter().filter(|(_, m)| m.rumor_id == 1).map(|(p, _)| *p).collect();
        let targets_for_rumor_2: HashSet<Peer> =
            outgoing.iter().filter(|(_, m)| m.rumor_id == 2).map(|(p, _)| *p).collect();
        assert_eq!(targets_for_rumor_1, targets_for_rumor_2);
    }

    #[test]
    fn advance_round_with_no_active_rumors_falls_back_to_a_single_empty_push_per_target() {
        let cfg = NetworkConfig::with_rounds(3, 2, 2, 10);
        let mut holder = RumorHolder::new(peer(0), cfg);
        holder.add_peer(peer(1), true);
        holder.add_peer(peer(2), true);

        let outgoing = holder.advance_round();
        assert_eq!(outgoing.len(), 2);
        assert!(outgoing.iter().all(|(_, m)| m.kind == MessageType::EmptyPush));
    }

    #[test]
    fn non_priority_peer_is_dropped_after_repeated_misses() {
        let cfg = NetworkConfig::with_rounds(3, 1, 1, 5);
        let mut holder = RumorHolder::new(peer(0), cfg);
        holder.add_peer(peer(1), false);
        holder.set_max_peer_misses(2);
        holder.decay_non_priority_peers(&[peer(1)]);
        holder.decay_non_priority_peers(&[peer(1)]);
        assert_eq!(holder.peer_count(), 0);
    }
}
