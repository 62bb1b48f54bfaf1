use std::sync::Arc;

use reelchain_client::{
    capability::CapabilitySelection,
    context::{ClientContext, ClientSettings},
    error::ClientError,
    manifest::IdentityResolver,
    mock::MockLedger,
    operations::{self, ProfileDetails},
};
use reelchain_common::{
    config::COIN_VALUE,
    crypto::{KeyPair, ObjectId},
};

const PACKAGE: ObjectId = ObjectId::from_u8(0xaa);

fn context(ledger: Arc<MockLedger>, settings: ClientSettings) -> ClientContext {
    let keypair = KeyPair::from_secret_bytes(&[7u8; 32]);
    ledger.add_coin(keypair.address(), ObjectId::from_u8(0x50), 10 * COIN_VALUE);
    ClientContext::new(
        ledger,
        keypair,
        IdentityResolver::from_entries([("package", PACKAGE)]),
        settings,
    )
}

fn details() -> ProfileDetails {
    ProfileDetails {
        username: "name".to_owned(),
        bio: "bio".to_owned(),
        pfp: "pfp".to_owned(),
    }
}

#[tokio::test]
async fn test_create_then_locate_profile() {
    let ledger = Arc::new(MockLedger::new());
    let ctx = context(ledger.clone(), ClientSettings::default());

    let err = ctx.profile_capability().await.unwrap_err();
    assert!(matches!(err, ClientError::CapabilityNotFound { .. }));
    assert!(err.is_not_found());

    let outcome = operations::create_profile(&ctx, &details()).await.unwrap();
    assert!(outcome.is_success());
    assert!(!outcome.digest.to_string().is_empty());
    let profile = outcome.created_of_type("profile", "Profile").unwrap();
    let cap = outcome.created_of_type("profile", "ProfileOwnerCap").unwrap();

    let capability = ctx.profile_capability().await.unwrap();
    assert_eq!(capability.capability_id, cap);
    assert_eq!(capability.controlled_entity_id, profile);

    assert_eq!(operations::list_profiles(&ctx).await.unwrap(), vec![profile]);
    assert_eq!(ledger.submitted().len(), 1);
}

#[tokio::test]
async fn test_social_operations_after_profile() {
    let ledger = Arc::new(MockLedger::new());
    let ctx = context(ledger.clone(), ClientSettings::default());
    let profile = operations::create_profile(&ctx, &details())
        .await
        .unwrap()
        .created_of_type("profile", "Profile")
        .unwrap();

    let video = operations::create_video(&ctx, "some_url", 100).await.unwrap();
    let video_id = video.created_of_type("video", "Video").unwrap();
    assert_eq!(operations::list_videos(&ctx).await.unwrap(), vec![video_id]);
    let stats = video.created_of_type("video", "VideoStats").unwrap();
    assert!(operations::like_video(&ctx, stats).await.unwrap().is_success());

    let other = ObjectId::from_u8(0x77);
    assert!(operations::follow(&ctx, other).await.unwrap().is_success());
    assert!(operations::unfollow(&ctx, other).await.unwrap().is_success());
    assert!(operations::tip(&ctx, profile, "0.1").await.unwrap().is_success());
    assert!(operations::withdraw_tips(&ctx).await.unwrap().is_success());
    assert_eq!(ledger.submitted().len(), 7);
}

#[tokio::test]
async fn test_invalid_tip_amount_is_not_submitted() {
    let ledger = Arc::new(MockLedger::new());
    let ctx = context(ledger.clone(), ClientSettings::default());

    let err = operations::tip(&ctx, ObjectId::from_u8(2), "0.1234567891")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidAmount(_)));
    assert!(ledger.submitted().is_empty());
}

#[tokio::test]
async fn test_several_capabilities() {
    let ledger = Arc::new(MockLedger::new());
    let ctx = context(ledger.clone(), ClientSettings::default());
    operations::create_profile(&ctx, &details()).await.unwrap();
    operations::create_profile(&ctx, &details()).await.unwrap();

    assert!(matches!(
        ctx.profile_capability().await,
        Err(ClientError::AmbiguousResult { ref candidates, .. }) if candidates.len() == 2
    ));
    assert!(matches!(
        operations::withdraw_tips(&ctx).await,
        Err(ClientError::AmbiguousResult { .. })
    ));

    let pick_first = context(
        ledger.clone(),
        ClientSettings {
            selection: CapabilitySelection::First,
            ..ClientSettings::default()
        },
    );
    assert!(pick_first.profile_capability().await.is_ok());
}

#[tokio::test]
async fn test_dry_run_submits_nothing() {
    let ledger = Arc::new(MockLedger::new());
    let ctx = context(
        ledger.clone(),
        ClientSettings {
            dry_run: true,
            ..ClientSettings::default()
        },
    );

    let outcome = operations::create_profile(&ctx, &details()).await.unwrap();
    assert!(outcome.dry_run);
    assert!(ledger.submitted().is_empty());
    assert!(matches!(
        ctx.profile_capability().await,
        Err(ClientError::CapabilityNotFound { .. })
    ));
}

#[tokio::test]
async fn test_missing_package_in_manifest() {
    let ledger = Arc::new(MockLedger::new());
    let ctx = ClientContext::new(
        ledger,
        KeyPair::from_secret_bytes(&[7u8; 32]),
        IdentityResolver::from_entries(Vec::<(String, ObjectId)>::new()),
        ClientSettings::default(),
    );

    assert!(matches!(
        operations::list_profiles(&ctx).await,
        Err(ClientError::NameNotFound(ref name)) if name == "package"
    ));
}
