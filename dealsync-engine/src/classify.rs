//! Participant classification into the remote role/side vocabulary.
//!
//! Rule precedence for [`decide_role_type`] (first match wins):
//! 1. double-ender deal + seller-side agent → `agent`
//! 2. buying deal + buyer-side agent → `agent`
//! 3. selling deal + seller-side agent → `agent`
//! 4. any other agent tag → `outside_brokerage`
//! 5. tag lookup (title, buyer/tenant, seller/landlord, lawyers, referrals)
//! 6. `other_profile`

use dealsync_core::{Deal, Direction, RoleCategory, RoleTag, Side};

/// Role category of `role` on `deal`. Total over every tag, never fails.
pub fn decide_role_type(deal: &Deal, role: &RoleTag) -> RoleCategory {
    if deal.ender_type.is_double_ender() && role.is_seller_agent() {
        return RoleCategory::Agent;
    }
    match deal.direction {
        Direction::Buying if role.is_buyer_agent() => return RoleCategory::Agent,
        Direction::Selling if role.is_seller_agent() => return RoleCategory::Agent,
        _ => {}
    }
    if role.is_agent() {
        return RoleCategory::OutsideBrokerage;
    }

    match role {
        RoleTag::Title => RoleCategory::TitleCompany,
        RoleTag::Buyer | RoleTag::Tenant => RoleCategory::Buyer,
        RoleTag::Seller | RoleTag::Landlord => RoleCategory::Seller,
        RoleTag::Lawyer | RoleTag::SellerLawyer | RoleTag::BuyerLawyer => RoleCategory::Lawyer,
        RoleTag::BuyerReferral | RoleTag::SellerReferral => RoleCategory::SourceOfBusiness,
        _ => RoleCategory::OtherProfile,
    }
}

/// Side the brokerage owns on `deal`.
pub fn decide_owning_side(deal: &Deal) -> Side {
    if deal.ender_type.is_double_ender() {
        return Side::DoubleEnd;
    }
    match deal.direction {
        Direction::Buying => Side::Sell,
        Direction::Selling => Side::List,
    }
}

/// Side written on a participant's access grant.
///
/// Agents of this brokerage take the owning side; other participants take
/// the side their tag belongs to; neutral participants take the owning side.
pub fn decide_access_side(deal: &Deal, role: &RoleTag) -> Side {
    if decide_role_type(deal, role) == RoleCategory::Agent {
        return decide_owning_side(deal);
    }
    match role {
        RoleTag::Buyer
        | RoleTag::Tenant
        | RoleTag::BuyerAgent
        | RoleTag::CoBuyerAgent
        | RoleTag::BuyerLawyer
        | RoleTag::BuyerReferral => Side::Sell,
        RoleTag::Seller
        | RoleTag::Landlord
        | RoleTag::SellerAgent
        | RoleTag::CoSellerAgent
        | RoleTag::SellerLawyer
        | RoleTag::SellerReferral => Side::List,
        _ => decide_owning_side(deal),
    }
}

/// Category and access side of one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: RoleCategory,
    pub side: Side,
}

pub fn classify(deal: &Deal, role: &RoleTag) -> Classification {
    Classification {
        category: decide_role_type(deal, role),
        side: decide_access_side(deal, role),
    }
}
