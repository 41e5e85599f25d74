use regional_marketplace_api::{
    dto::orders::{OrderLineRequest, PlaceOrderRequest},
    entity::sea_orm_active_enums::{OrderStatus, Role},
    error::AppError,
    middleware::auth::{AuthUser, Capability, ensure_admin, ensure_capability, ensure_owner_or_admin},
    response::page_count,
    routes::params::Pagination,
    services::product_service::{dedup_tags, escape_like},
};
use uuid::Uuid;
use validator::Validate;

#[test]
fn roles_map_to_capabilities() {
    assert!(Role::Producer.can(Capability::ManageProducts));
    assert!(Role::Producer.can(Capability::ViewProducerAnalytics));
    assert!(!Role::Producer.can(Capability::PlaceOrders));
    assert!(!Role::Producer.can(Capability::Moderate));

    assert!(Role::Consumer.can(Capability::PlaceOrders));
    assert!(Role::Consumer.can(Capability::WriteReviews));
    assert!(Role::Consumer.can(Capability::KeepFavorites));
    assert!(!Role::Consumer.can(Capability::ManageProducts));
    assert!(!Role::Consumer.can(Capability::ViewPlatformAnalytics));

    assert!(Role::Admin.can(Capability::Moderate));
    assert!(Role::Admin.can(Capability::ViewPlatformAnalytics));
}

#[test]
fn admin_checks_reject_other_roles() {
    let consumer = AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::Consumer,
    };
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::Admin,
    };
    assert!(matches!(ensure_admin(&consumer), Err(AppError::Forbidden)));
    assert!(ensure_admin(&admin).is_ok());
    assert!(matches!(
        ensure_capability(&consumer, Capability::ManageProducts),
        Err(AppError::Forbidden)
    ));
}

#[test]
fn owners_and_admins_pass_ownership_checks() {
    let owner = AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::Producer,
    };
    let other = AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::Producer,
    };
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::Admin,
    };
    assert!(ensure_owner_or_admin(&owner, owner.user_id).is_ok());
    assert!(ensure_owner_or_admin(&admin, owner.user_id).is_ok());
    assert!(matches!(
        ensure_owner_or_admin(&other, owner.user_id),
        Err(AppError::Forbidden)
    ));
}

#[test]
fn order_status_moves_forward_only() {
    use OrderStatus::*;
    assert!(Pending.can_transition_to(Confirmed));
    assert!(Confirmed.can_transition_to(Shipped));
    assert!(Shipped.can_transition_to(Delivered));
    assert!(Pending.can_transition_to(Cancelled));
    assert!(Shipped.can_transition_to(Cancelled));

    assert!(!Pending.can_transition_to(Shipped));
    assert!(!Delivered.can_transition_to(Cancelled));
    assert!(!Cancelled.can_transition_to(Pending));
    assert!(!Confirmed.can_transition_to(Confirmed));
    assert!(Delivered.is_terminal());
    assert!(!Shipped.is_terminal());
}

#[test]
fn pagination_defaults_and_clamps() {
    assert_eq!(Pagination::default().normalize(), (1, 10, 0));
    assert_eq!(Pagination::new(3, 10).normalize(), (3, 10, 20));
    assert_eq!(Pagination::new(0, 500).normalize(), (1, 100, 0));
    assert_eq!(Pagination::new(2, 0).normalize(), (2, 1, 1));
}

#[test]
fn huge_page_saturates_instead_of_overflowing() {
    assert_eq!(
        Pagination::new(i64::MAX, 10).normalize(),
        (i64::MAX, 10, i64::MAX)
    );
    assert_eq!(
        Pagination::new(i64::MAX, 100).normalize(),
        (i64::MAX, 100, i64::MAX)
    );
}

#[test]
fn page_count_rounds_up() {
    assert_eq!(page_count(23, 10), 3);
    assert_eq!(page_count(20, 10), 2);
    assert_eq!(page_count(0, 10), 0);
}

#[test]
fn like_metacharacters_are_escaped() {
    assert_eq!(escape_like("a_b"), "a\\_b");
    assert_eq!(escape_like("50%"), "50\\%");
    assert_eq!(escape_like("c:\\tmp"), "c:\\\\tmp");
    assert_eq!(escape_like("plain text"), "plain text");
}

#[test]
fn tags_are_deduplicated_in_first_seen_order() {
    let tags = vec![
        "organic".to_string(),
        " argan ".to_string(),
        "organic".to_string(),
        "".to_string(),
        "argan".to_string(),
    ];
    assert_eq!(dedup_tags(tags), vec!["organic", "argan"]);
}

#[test]
fn order_requests_need_at_least_one_valid_line() {
    let order = |items: Vec<OrderLineRequest>| PlaceOrderRequest {
        items,
        shipping_address: "7 Derb Lalla Azzouna".to_string(),
        notes: None,
    };

    assert!(order(Vec::new()).validate().is_err());
    assert!(
        order(vec![OrderLineRequest {
            product_id: Uuid::new_v4(),
            quantity: 0,
        }])
        .validate()
        .is_err()
    );
    assert!(
        order(vec![OrderLineRequest {
            product_id: Uuid::new_v4(),
            quantity: 2,
        }])
        .validate()
        .is_ok()
    );
}
