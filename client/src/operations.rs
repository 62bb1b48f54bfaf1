//! Social operations of the profile/video contract.
//!
//! Each operation comes in two halves: a pure constructor returning the
//! [`UnsignedCall`] for given ids, and an async function that looks the
//! ids up through the [`ClientContext`] and submits the call.

use log::{debug, info};
use reelchain_common::{
    config::COIN_DECIMALS,
    crypto::{Address, ObjectId},
    transaction::builder::{
        BuilderError, CallArgument, PureValue, Target, TransactionBuilder, UnsignedCall,
    },
    utils::from_coin,
};

use crate::{
    capability::Capability,
    context::ClientContext,
    error::Result,
    events::{ProfileCreated, VideoCreated},
    executor::TransactionOutcome,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDetails {
    pub username: String,
    pub bio: String,
    // Profile picture url
    pub pfp: String,
}

fn target(package: ObjectId, path: &str) -> Result<Target, BuilderError> {
    Target::parse(package, path)
}

// profile::create_profile(username, bio, pfp), the new profile goes to `recipient`
pub fn create_profile_call(
    package: ObjectId,
    details: &ProfileDetails,
    recipient: Address,
) -> Result<UnsignedCall, BuilderError> {
    let mut builder = TransactionBuilder::new();
    let profile = builder.move_call(
        &target(package, "profile::create_profile")?,
        vec![
            CallArgument::pure(details.username.as_str()),
            CallArgument::pure(details.bio.as_str()),
            CallArgument::pure(details.pfp.as_str()),
        ],
    )?;
    builder.transfer_objects(vec![profile], recipient)?;
    builder.finish()
}

// video::create_video(cap, url, length, clock), the new video goes to `recipient`
pub fn create_video_call(
    package: ObjectId,
    profile_cap: ObjectId,
    url: &str,
    length: u64,
    recipient: Address,
) -> Result<UnsignedCall, BuilderError> {
    let mut builder = TransactionBuilder::new();
    let video = builder.move_call(
        &target(package, "video::create_video")?,
        vec![
            CallArgument::read_only(profile_cap),
            CallArgument::pure(url),
            CallArgument::pure(length),
            CallArgument::Clock,
        ],
    )?;
    builder.transfer_objects(vec![video], recipient)?;
    builder.finish()
}

pub fn follow_call(
    package: ObjectId,
    capability: &Capability,
    followed_profile: ObjectId,
) -> Result<UnsignedCall, BuilderError> {
    TransactionBuilder::build(
        &target(package, "profile::follow")?,
        vec![
            CallArgument::object(capability.controlled_entity_id),
            CallArgument::read_only(capability.capability_id),
            CallArgument::Pure(PureValue::Id(followed_profile)),
            CallArgument::Clock,
        ],
    )
}

pub fn unfollow_call(
    package: ObjectId,
    capability: &Capability,
    unfollowed_profile: ObjectId,
) -> Result<UnsignedCall, BuilderError> {
    TransactionBuilder::build(
        &target(package, "profile::unfollow")?,
        vec![
            CallArgument::object(capability.controlled_entity_id),
            CallArgument::read_only(capability.capability_id),
            CallArgument::Pure(PureValue::Id(unfollowed_profile)),
        ],
    )
}

pub fn like_video_call(
    package: ObjectId,
    video_stats: ObjectId,
    profile_cap: ObjectId,
) -> Result<UnsignedCall, BuilderError> {
    TransactionBuilder::build(
        &target(package, "video::like")?,
        vec![
            CallArgument::object(video_stats),
            CallArgument::read_only(profile_cap),
            CallArgument::Clock,
        ],
    )
}

// Split `amount` MIST off the gas coin and hand it to profile::tip
pub fn tip_call(package: ObjectId, profile: ObjectId, amount: u64) -> Result<UnsignedCall, BuilderError> {
    let mut builder = TransactionBuilder::new();
    let coin = builder.split_gas(amount)?;
    builder.move_call(
        &target(package, "profile::tip")?,
        vec![CallArgument::object(profile), CallArgument::Result(coin)],
    )?;
    builder.finish()
}

// profile::withdraw_tip(profile, cap), the withdrawn coin goes to `recipient`
pub fn withdraw_tips_call(
    package: ObjectId,
    capability: &Capability,
    recipient: Address,
) -> Result<UnsignedCall, BuilderError> {
    let mut builder = TransactionBuilder::new();
    let coin = builder.move_call(
        &target(package, "profile::withdraw_tip")?,
        vec![
            CallArgument::object(capability.controlled_entity_id),
            CallArgument::read_only(capability.capability_id),
        ],
    )?;
    builder.transfer_objects(vec![coin], recipient)?;
    builder.finish()
}

pub async fn create_profile(ctx: &ClientContext, details: &ProfileDetails) -> Result<TransactionOutcome> {
    let call = create_profile_call(ctx.package()?, details, ctx.address())?;
    info!("Creating profile '{}'", details.username);
    ctx.submit(call).await
}

pub async fn create_video(ctx: &ClientContext, url: &str, length: u64) -> Result<TransactionOutcome> {
    let capability = ctx.profile_capability().await?;
    let call = create_video_call(
        ctx.package()?,
        capability.capability_id,
        url,
        length,
        ctx.address(),
    )?;
    info!("Creating video {} for profile {}", url, capability.controlled_entity_id);
    ctx.submit(call).await
}

pub async fn follow(ctx: &ClientContext, profile: ObjectId) -> Result<TransactionOutcome> {
    let capability = ctx.profile_capability().await?;
    let call = follow_call(ctx.package()?, &capability, profile)?;
    info!("Profile {} follows {}", capability.controlled_entity_id, profile);
    ctx.submit(call).await
}

pub async fn unfollow(ctx: &ClientContext, profile: ObjectId) -> Result<TransactionOutcome> {
    let capability = ctx.profile_capability().await?;
    let call = unfollow_call(ctx.package()?, &capability, profile)?;
    info!("Profile {} unfollows {}", capability.controlled_entity_id, profile);
    ctx.submit(call).await
}

pub async fn like_video(ctx: &ClientContext, video_stats: ObjectId) -> Result<TransactionOutcome> {
    let capability = ctx.profile_capability().await?;
    let call = like_video_call(ctx.package()?, video_stats, capability.capability_id)?;
    info!("Liking video stats {}", video_stats);
    ctx.submit(call).await
}

// `amount` is in SUI, e.g. "0.1"
pub async fn tip(ctx: &ClientContext, profile: ObjectId, amount: &str) -> Result<TransactionOutcome> {
    let atomic = from_coin(amount, COIN_DECIMALS)?;
    debug!("Tip of {} SUI is {} MIST", amount, atomic);
    let call = tip_call(ctx.package()?, profile, atomic)?;
    info!("Tipping profile {} with {} SUI", profile, amount);
    ctx.submit(call).await
}

pub async fn withdraw_tips(ctx: &ClientContext) -> Result<TransactionOutcome> {
    let capability = ctx.profile_capability().await?;
    let call = withdraw_tips_call(ctx.package()?, &capability, ctx.address())?;
    info!("Withdrawing tips of profile {}", capability.controlled_entity_id);
    ctx.submit(call).await
}

pub async fn list_profiles(ctx: &ClientContext) -> Result<Vec<ObjectId>> {
    let package = ctx.package()?;
    ctx.event_reader().entity_ids::<ProfileCreated>(package).await
}

pub async fn list_videos(ctx: &ClientContext) -> Result<Vec<ObjectId>> {
    let package = ctx.package()?;
    ctx.event_reader().entity_ids::<VideoCreated>(package).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelchain_common::{
        config::{CLOCK_OBJECT_ID, COIN_VALUE},
        transaction::{builder::InputArg, Argument, Command},
    };

    const PACKAGE: ObjectId = ObjectId::from_u8(0xaa);
    const ME: Address = Address::from_u8(0x11);

    fn capability() -> Capability {
        Capability {
            capability_id: ObjectId::from_u8(1),
            controlled_entity_id: ObjectId::from_u8(2),
        }
    }

    fn move_call(call: &UnsignedCall, index: usize) -> (String, String, Vec<Argument>) {
        match &call.commands()[index] {
            Command::MoveCall(c) => (c.module.clone(), c.function.clone(), c.arguments.clone()),
            other => panic!("expected a move call, got {:?}", other),
        }
    }

    fn pure(value: PureValue) -> InputArg {
        InputArg::Pure(value.to_bytes().unwrap())
    }

    #[test]
    fn test_create_profile_arguments_in_order() {
        let details = ProfileDetails {
            username: "alice".to_owned(),
            bio: "hello".to_owned(),
            pfp: "https://example.com/a.png".to_owned(),
        };
        let call = create_profile_call(PACKAGE, &details, ME).unwrap();

        let (module, function, arguments) = move_call(&call, 0);
        assert_eq!((module.as_str(), function.as_str()), ("profile", "create_profile"));
        assert_eq!(
            arguments,
            vec![Argument::Input(0), Argument::Input(1), Argument::Input(2)]
        );
        assert_eq!(call.inputs()[0], pure("alice".into()));
        assert_eq!(call.inputs()[1], pure("hello".into()));
        assert_eq!(call.inputs()[2], pure("https://example.com/a.png".into()));
        assert_eq!(call.inputs()[3], pure(ME.into()));
        assert_eq!(
            call.commands()[1],
            Command::TransferObjects(vec![Argument::Result(0)], Argument::Input(3))
        );
    }

    #[test]
    fn test_create_video_uses_cap_and_clock() {
        let call = create_video_call(PACKAGE, ObjectId::from_u8(1), "some_url", 100, ME).unwrap();

        let (module, function, arguments) = move_call(&call, 0);
        assert_eq!((module.as_str(), function.as_str()), ("video", "create_video"));
        assert_eq!(arguments.len(), 4);
        assert_eq!(
            call.inputs()[0],
            InputArg::Object {
                id: ObjectId::from_u8(1),
                mutable: false
            }
        );
        assert_eq!(call.inputs()[1], pure("some_url".into()));
        assert_eq!(call.inputs()[2], pure(100u64.into()));
        assert!(matches!(
            &call.inputs()[3],
            InputArg::Resolved(arg) if arg.id() == CLOCK_OBJECT_ID
        ));
    }

    #[test]
    fn test_follow_and_unfollow() {
        let other = ObjectId::from_u8(9);
        let call = follow_call(PACKAGE, &capability(), other).unwrap();
        let (_, function, arguments) = move_call(&call, 0);
        assert_eq!(function, "follow");
        assert_eq!(arguments.len(), 4);
        assert_eq!(
            call.inputs()[0],
            InputArg::Object {
                id: ObjectId::from_u8(2),
                mutable: true
            }
        );
        assert_eq!(call.inputs()[2], pure(PureValue::Id(other)));

        let call = unfollow_call(PACKAGE, &capability(), other).unwrap();
        let (_, function, arguments) = move_call(&call, 0);
        assert_eq!(function, "unfollow");
        assert_eq!(arguments.len(), 3);
        assert_eq!(call.object_ids(), vec![ObjectId::from_u8(2), ObjectId::from_u8(1)]);
    }

    #[test]
    fn test_like_video() {
        let call = like_video_call(PACKAGE, ObjectId::from_u8(5), ObjectId::from_u8(1)).unwrap();
        let (module, function, arguments) = move_call(&call, 0);
        assert_eq!((module.as_str(), function.as_str()), ("video", "like"));
        assert_eq!(arguments.len(), 3);
        assert_eq!(
            call.inputs()[0],
            InputArg::Object {
                id: ObjectId::from_u8(5),
                mutable: true
            }
        );
    }

    #[test]
    fn test_tip_splits_gas() {
        let amount = from_coin("0.1", COIN_DECIMALS).unwrap();
        assert_eq!(amount, COIN_VALUE / 10);

        let call = tip_call(PACKAGE, ObjectId::from_u8(2), amount).unwrap();
        assert_eq!(
            call.commands()[0],
            Command::SplitCoins(Argument::GasCoin, vec![Argument::Input(0)])
        );
        assert_eq!(call.inputs()[0], pure(amount.into()));

        let (_, function, arguments) = move_call(&call, 1);
        assert_eq!(function, "tip");
        assert_eq!(arguments[1], Argument::NestedResult(0, 0));

        assert!(matches!(
            tip_call(PACKAGE, ObjectId::from_u8(2), 0),
            Err(BuilderError::ZeroAmount)
        ));
    }

    #[test]
    fn test_withdraw_tips_transfers_coin() {
        let call = withdraw_tips_call(PACKAGE, &capability(), ME).unwrap();
        let (_, function, arguments) = move_call(&call, 0);
        assert_eq!(function, "withdraw_tip");
        assert_eq!(arguments, vec![Argument::Input(0), Argument::Input(1)]);
        assert_eq!(
            call.commands()[1],
            Command::TransferObjects(vec![Argument::Result(0)], Argument::Input(2))
        );
    }
}
