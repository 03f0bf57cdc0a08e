use std::collections::BTreeMap;

use rosca_types::{CommitteeId, Member, MemberId, ShareType};

/// HALF members of a committee grouped by pair key.
pub fn pair_groups<'a, I>(
    committee: &CommitteeId,
    members: I,
) -> BTreeMap<&'a MemberId, Vec<&'a Member>>
where
    I: IntoIterator<Item = &'a Member>,
{
    let mut groups: BTreeMap<&MemberId, Vec<&Member>> = BTreeMap::new();
    for member in members {
        if &member.committee_id != committee {
            continue;
        }
        if let Some(key) = member.pair_key() {
            groups.entry(key).or_default().push(member);
        }
    }
    groups
}

/// Pair groups holding exactly two members. A lone unpaired HALF member is
/// not a payout slot.
pub fn complete_pairs<'a, I>(
    committee: &CommitteeId,
    members: I,
) -> BTreeMap<&'a MemberId, Vec<&'a Member>>
where
    I: IntoIterator<Item = &'a Member>,
{
    let mut groups = pair_groups(committee, members);
    groups.retain(|_, group| group.len() == 2);
    groups
}

/// Number of payout slots of a committee: FULL members plus complete HALF pairs.
pub fn derive_duration<'a, I>(committee: &CommitteeId, members: I) -> u32
where
    I: IntoIterator<Item = &'a Member>,
{
    let members: Vec<&Member> = members
        .into_iter()
        .filter(|m| &m.committee_id == committee)
        .collect();
    let full = members
        .iter()
        .filter(|m| m.share_type == ShareType::Full)
        .count();
    let pairs = complete_pairs(committee, members.iter().copied()).len();
    u32::try_from(full + pairs).unwrap_or(u32::MAX)
}
