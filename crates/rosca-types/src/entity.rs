use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::ids::{CommitteeId, DrawId, MemberId, PayerId, PaymentId};
use crate::money::Amount;
use crate::month::MonthYear;

/// A rotating savings group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Committee {
    pub id: CommitteeId,
    pub name: String,
    pub monthly_amount: Amount,
    pub start_date: NaiveDate,
    /// Number of payout slots; derived from the member set, never set by callers.
    pub duration_months: u32,
    pub allow_half_share: bool,
}

impl Committee {
    pub fn start_month(&self) -> MonthYear {
        MonthYear::from_date(self.start_date)
    }

    /// The full pool paid out to each winner.
    pub fn pool_amount(&self) -> Option<Amount> {
        self.monthly_amount.checked_mul(self.duration_months)
    }
}

/// Contribution slot size of a member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShareType {
    Full,
    Half,
}

impl fmt::Display for ShareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("FULL"),
            Self::Half => f.write_str("HALF"),
        }
    }
}

impl FromStr for ShareType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FULL" => Ok(Self::Full),
            "HALF" => Ok(Self::Half),
            _ => Err(TypeError::InvalidShareType(s.to_string())),
        }
    }
}

/// A participant in a committee.
///
/// HALF members always carry a `pair_id`: their partner's canonical pair key
/// when paired, or their own id when unpaired. FULL members carry none.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub committee_id: CommitteeId,
    pub name: String,
    pub phone: String,
    pub share_type: ShareType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_id: Option<MemberId>,
}

impl Member {
    pub fn is_half(&self) -> bool {
        self.share_type == ShareType::Half
    }

    /// Pair key used to group HALF members; `None` for FULL members.
    pub fn pair_key(&self) -> Option<&MemberId> {
        if self.is_half() {
            self.pair_id.as_ref()
        } else {
            None
        }
    }

    /// Whether this HALF member holds the "unpaired" sentinel (its own id).
    pub fn is_unpaired_sentinel(&self) -> bool {
        self.is_half() && self.pair_id.as_ref() == Some(&self.id)
    }
}

/// A monthly contribution by a FULL member or a HALF pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    pub committee_id: CommitteeId,
    #[serde(rename = "memberIdOrPairId")]
    pub payer: PayerId,
    pub month_year: MonthYear,
    pub amount: Amount,
    pub date_paid: NaiveDate,
    pub late_days: u32,
    pub demerit_points: u32,
}

/// A monthly payout of the full pool to one member or pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draw {
    pub id: DrawId,
    pub committee_id: CommitteeId,
    pub month_year: MonthYear,
    #[serde(rename = "winnerIdOrPairId")]
    pub winner: PayerId,
    pub payout_date: NaiveDate,
    pub amount: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, share_type: ShareType, pair: Option<&str>) -> Member {
        Member {
            id: MemberId::parse(id).unwrap(),
            committee_id: CommitteeId::parse("c-1").unwrap(),
            name: id.to_uppercase(),
            phone: String::new(),
            share_type,
            pair_id: pair.map(|p| MemberId::parse(p).unwrap()),
        }
    }

    #[test]
    fn share_type_parses_case_insensitively() {
        assert_eq!("half".parse::<ShareType>().unwrap(), ShareType::Half);
        assert_eq!("FULL".parse::<ShareType>().unwrap(), ShareType::Full);
        assert!("quarter".parse::<ShareType>().is_err());
    }

    #[test]
    fn unpaired_sentinel_only_for_half() {
        assert!(member("a", ShareType::Half, Some("a")).is_unpaired_sentinel());
        assert!(!member("b", ShareType::Half, Some("a")).is_unpaired_sentinel());
        assert!(!member("c", ShareType::Full, Some("c")).is_unpaired_sentinel());
    }

    #[test]
    fn full_member_has_no_pair_key() {
        assert!(member("a", ShareType::Full, Some("a")).pair_key().is_none());
        assert_eq!(
            member("b", ShareType::Half, Some("a")).pair_key().map(MemberId::as_str),
            Some("a")
        );
    }

    #[test]
    fn persisted_field_names() {
        let payment = Payment {
            id: PaymentId::parse("p").unwrap(),
            committee_id: CommitteeId::parse("c").unwrap(),
            payer: MemberId::parse("m").unwrap(),
            month_year: MonthYear::new(2024, 1).unwrap(),
            amount: Amount::new(1000),
            date_paid: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            late_days: 2,
            demerit_points: 2,
        };
        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["memberIdOrPairId"], "m");
        assert_eq!(json["monthYear"], "2024-01");
        assert_eq!(json["datePaid"], "2024-01-12");
        assert_eq!(json["demeritPoints"], 2);

        let full = serde_json::to_value(member("f", ShareType::Full, None)).unwrap();
        assert_eq!(full["shareType"], "FULL");
        assert!(full.get("pairId").is_none());
    }

    #[test]
    fn pool_amount_multiplies_duration() {
        let committee = Committee {
            id: CommitteeId::parse("c").unwrap(),
            name: "Office".into(),
            monthly_amount: Amount::new(1000),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            duration_months: 3,
            allow_half_share: true,
        };
        assert_eq!(committee.pool_amount(), Some(Amount::new(3000)));
        assert_eq!(committee.start_month().to_string(), "2024-01");
    }
}
