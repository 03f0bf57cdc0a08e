//! Half-share pairing protocol.
//!
//! Two HALF members of one committee are paired when both carry the same
//! pair key, the lexicographically smaller of their ids. An unpaired HALF
//! member carries its own id. Re-pairing always unlinks first, so a pairing
//! can never be left one-sided.

use rosca_types::{Member, MemberId};
use tracing::debug;

/// The other HALF member sharing `member`'s pair key in the same committee.
pub fn partner_of<'a>(members: &'a [Member], member: &Member) -> Option<&'a Member> {
    let key = member.pair_key()?;
    members.iter().find(|m| {
        m.id != member.id && m.committee_id == member.committee_id && m.pair_key() == Some(key)
    })
}

pub fn is_paired(members: &[Member], member: &Member) -> bool {
    partner_of(members, member).is_some()
}

/// A partner request resolves only to an existing, unpaired HALF member of
/// the same committee other than the member itself.
fn resolve_partner<'a>(
    members: &'a [Member],
    member: &Member,
    partner_id: &MemberId,
) -> Option<&'a Member> {
    members.iter().find(|m| &m.id == partner_id).filter(|p| {
        p.id != member.id
            && p.committee_id == member.committee_id
            && p.is_unpaired_sentinel()
            && !is_paired(members, p)
    })
}

fn reset(member: &mut Member) {
    member.pair_id = if member.is_half() {
        Some(member.id.clone())
    } else {
        None
    };
}

/// Restore `member_id` and its partner (if any) to the unpaired state.
pub(crate) fn unlink(members: &mut [Member], member_id: &MemberId) {
    let Some(member) = members.iter().find(|m| &m.id == member_id) else {
        return;
    };
    let partner_id = partner_of(members, member).map(|p| p.id.clone());

    for m in members.iter_mut() {
        if &m.id == member_id || Some(&m.id) == partner_id.as_ref() {
            reset(m);
        }
    }
    if let Some(partner_id) = partner_id {
        debug!(member = %member_id, partner = %partner_id, "half-share pair unlinked");
    }
}

/// Apply a pairing request to an unlinked HALF member.
///
/// Returns the canonical pair key when a pairing was made. An unresolvable
/// partner falls back to the unpaired state.
pub(crate) fn link(
    members: &mut [Member],
    member_id: &MemberId,
    partner: Option<&MemberId>,
) -> Option<MemberId> {
    let member = members.iter().find(|m| &m.id == member_id)?;
    if !member.is_half() {
        return None;
    }
    let resolved = partner
        .and_then(|pid| resolve_partner(members, member, pid))
        .map(|p| p.id.clone());

    let Some(partner_id) = resolved else {
        if let Some(requested) = partner {
            debug!(
                member = %member_id,
                partner = %requested,
                "partner unavailable; member left unpaired"
            );
        }
        for m in members.iter_mut().filter(|m| &m.id == member_id) {
            reset(m);
        }
        return None;
    };

    let key = MemberId::canonical_pair(member_id, &partner_id);
    for m in members.iter_mut() {
        if &m.id == member_id || m.id == partner_id {
            m.pair_id = Some(key.clone());
        }
    }
    debug!(member = %member_id, partner = %partner_id, pair = %key, "half-share pair linked");
    Some(key)
}

#[cfg(test)]
mod tests {
    use rosca_types::{CommitteeId, ShareType};

    use super::*;

    fn id(s: &str) -> MemberId {
        MemberId::parse(s).unwrap()
    }

    fn half(s: &str, committee: &str) -> Member {
        Member {
            id: id(s),
            committee_id: CommitteeId::parse(committee).unwrap(),
            name: s.into(),
            phone: String::new(),
            share_type: ShareType::Half,
            pair_id: Some(id(s)),
        }
    }

    fn pair_of(members: &[Member], s: &str) -> String {
        members
            .iter()
            .find(|m| m.id.as_str() == s)
            .and_then(|m| m.pair_id.clone())
            .map(|p| p.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn link_sets_canonical_key_on_both_sides() {
        let mut members = vec![half("b", "c"), half("a", "c")];
        let key = link(&mut members, &id("b"), Some(&id("a")));
        assert_eq!(key, Some(id("a")));
        assert_eq!(pair_of(&members, "a"), "a");
        assert_eq!(pair_of(&members, "b"), "a");
        assert!(is_paired(&members, &members[0]));
        assert_eq!(partner_of(&members, &members[1]).unwrap().id, id("b"));
    }

    #[test]
    fn missing_partner_falls_back_to_unpaired() {
        let mut members = vec![half("a", "c")];
        assert_eq!(link(&mut members, &id("a"), Some(&id("ghost"))), None);
        assert_eq!(pair_of(&members, "a"), "a");
    }

    #[test]
    fn already_paired_partner_is_refused() {
        let mut members = vec![half("a", "c"), half("b", "c"), half("d", "c")];
        link(&mut members, &id("a"), Some(&id("b")));
        assert_eq!(link(&mut members, &id("d"), Some(&id("b"))), None);
        assert_eq!(link(&mut members, &id("d"), Some(&id("a"))), None);
        assert_eq!(pair_of(&members, "b"), "a");
        assert_eq!(pair_of(&members, "d"), "d");
    }

    #[test]
    fn partner_in_other_committee_is_refused() {
        let mut members = vec![half("a", "c"), half("b", "other")];
        assert_eq!(link(&mut members, &id("a"), Some(&id("b"))), None);
    }

    #[test]
    fn self_pairing_is_refused() {
        let mut members = vec![half("a", "c")];
        assert_eq!(link(&mut members, &id("a"), Some(&id("a"))), None);
        assert_eq!(pair_of(&members, "a"), "a");
    }

    #[test]
    fn unlink_restores_both_members() {
        let mut members = vec![half("a", "c"), half("b", "c")];
        link(&mut members, &id("b"), Some(&id("a")));
        unlink(&mut members, &id("a"));
        assert_eq!(pair_of(&members, "a"), "a");
        assert_eq!(pair_of(&members, "b"), "b");
        assert!(!is_paired(&members, &members[0]));
    }

    #[test]
    fn relink_after_unlink_moves_partner() {
        let mut members = vec![half("a", "c"), half("b", "c"), half("z", "c")];
        link(&mut members, &id("a"), Some(&id("b")));
        unlink(&mut members, &id("b"));
        let key = link(&mut members, &id("b"), Some(&id("z")));
        assert_eq!(key, Some(id("b")));
        assert_eq!(pair_of(&members, "a"), "a");
        assert_eq!(pair_of(&members, "z"), "b");
    }
}
