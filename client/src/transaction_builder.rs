use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use reelchain_common::{
    api::{Coin, ObjectData, ObjectDataOptions, Owner},
    config::{COIN_TYPE, DEFAULT_GAS_BUDGET, MAX_GAS_PAYMENT_OBJECTS, MAX_PAGE_SIZE},
    crypto::{Address, ObjectId},
    transaction::{
        builder::{InputArg, UnsignedCall},
        Argument, Command, ObjectArg, ObjectRef, TransactionData,
    },
};

use crate::{
    error::{ClientError, Result},
    ledger::{CursorTrail, LedgerApi},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasSettings {
    // Maximum amount of MIST the transaction may spend on gas
    pub budget: u64,
    // Fixed gas price, the node reference price is used when not set
    pub price: Option<u64>,
}

impl Default for GasSettings {
    fn default() -> Self {
        Self {
            budget: DEFAULT_GAS_BUDGET,
            price: None,
        }
    }
}

// Amount the call splits off the gas coin, it must be available on top of the budget
pub fn split_from_gas(call: &UnsignedCall) -> u64 {
    call.commands()
        .iter()
        .filter_map(|command| match command {
            Command::SplitCoins(Argument::GasCoin, amounts) => Some(amounts),
            _ => None,
        })
        .flatten()
        .filter_map(|amount| match amount {
            Argument::Input(index) => match call.inputs().get(*index as usize) {
                Some(InputArg::Pure(bytes)) => bcs::from_bytes::<u64>(bytes).ok(),
                _ => None,
            },
            _ => None,
        })
        .fold(0u64, u64::saturating_add)
}

// Pick coins in the order returned by the node until `required` is covered
pub fn select_gas_coins(
    coins: &[Coin],
    required: u64,
    excluded: &HashSet<ObjectId>,
) -> Result<Vec<ObjectRef>> {
    let mut selected = Vec::new();
    let mut total: u64 = 0;
    for coin in coins {
        if excluded.contains(&coin.coin_object_id) {
            continue;
        }
        if selected.len() >= MAX_GAS_PAYMENT_OBJECTS || total >= required {
            break;
        }

        selected.push(coin.object_ref());
        total = total.saturating_add(coin.balance);
    }

    if total < required || selected.is_empty() {
        return Err(ClientError::InsufficientGas {
            required,
            available: total,
        });
    }

    Ok(selected)
}

// Pin an object input to the reference the ledger expects
pub fn object_arg(object: &ObjectData, mutable: bool) -> Result<ObjectArg> {
    let owner = object
        .owner
        .as_ref()
        .ok_or_else(|| ClientError::MalformedObject {
            object_id: object.object_id,
            reason: "owner is missing".to_owned(),
        })?;

    Ok(match owner {
        Owner::Shared {
            initial_shared_version,
        } => ObjectArg::SharedObject {
            id: object.object_id,
            initial_shared_version: *initial_shared_version,
            mutable,
        },
        Owner::ConsensusAddressOwner { start_version, .. } => ObjectArg::SharedObject {
            id: object.object_id,
            initial_shared_version: *start_version,
            mutable,
        },
        Owner::AddressOwner(_) | Owner::ObjectOwner(_) | Owner::Immutable => {
            ObjectArg::ImmOrOwnedObject(object.object_ref())
        }
    })
}

// State used to turn a locally built call into complete transaction data
pub struct TransactionBuilderState<'a> {
    ledger: &'a dyn LedgerApi,
    sender: Address,
    gas: GasSettings,
}

impl<'a> TransactionBuilderState<'a> {
    pub fn new(ledger: &'a dyn LedgerApi, sender: Address, gas: GasSettings) -> Self {
        Self { ledger, sender, gas }
    }

    async fn fetch_objects(&self, ids: &[ObjectId]) -> Result<HashMap<ObjectId, ObjectData>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let responses = self
            .ledger
            .multi_get_objects(ids, &ObjectDataOptions::with_owner())
            .await?;

        let mut objects = HashMap::with_capacity(ids.len());
        for (id, response) in ids.iter().zip(responses) {
            let data = response
                .into_data()
                .map_err(|_| ClientError::ObjectNotFound(*id))?;
            objects.insert(data.object_id, data);
        }

        match ids.iter().find(|id| !objects.contains_key(*id)) {
            Some(id) => Err(ClientError::ObjectNotFound(*id)),
            None => Ok(objects),
        }
    }

    // Fetch coin pages until their balance covers `required`
    async fn fetch_coins(&self, required: u64) -> Result<Vec<Coin>> {
        let mut coins = Vec::new();
        let mut total: u64 = 0;
        let mut cursor: Option<ObjectId> = None;
        let mut trail = CursorTrail::new();
        loop {
            let page = self
                .ledger
                .get_coins(&self.sender, COIN_TYPE, cursor.as_ref(), Some(MAX_PAGE_SIZE))
                .await?;

            let next = page.continuation().copied();
            total = page
                .data
                .iter()
                .fold(total, |total, coin| total.saturating_add(coin.balance));
            coins.extend(page.data);
            match next {
                Some(next) if total < required => cursor = Some(trail.advance(next)?),
                _ => break,
            }
        }
        Ok(coins)
    }

    async fn gas_price(&self) -> Result<u64> {
        match self.gas.price {
            Some(price) => Ok(price),
            None => Ok(self.ledger.get_reference_gas_price().await?),
        }
    }

    pub async fn build(&self, call: UnsignedCall) -> Result<TransactionData> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("build transaction for {}", self.sender);
        }

        let referenced: HashSet<ObjectId> = call.referenced_objects().into_iter().collect();
        let required = self.gas.budget.saturating_add(split_from_gas(&call));

        let objects = self.fetch_objects(&call.object_ids()).await?;
        let transaction = call.resolve(|id, mutable| match objects.get(id) {
            Some(object) => object_arg(object, mutable),
            None => Err(ClientError::ObjectNotFound(*id)),
        })?;

        let price = self.gas_price().await?;
        let coins = self.fetch_coins(required).await?;
        let payment = select_gas_coins(&coins, required, &referenced)?;

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Paying gas with {} coins, budget {} at price {}",
                payment.len(),
                self.gas.budget,
                price
            );
        }

        Ok(TransactionData::new_programmable(
            self.sender,
            payment,
            transaction,
            self.gas.budget,
            price,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLedger;
    use reelchain_common::{
        config::{CLOCK_OBJECT_ID, COIN_VALUE},
        crypto::Digest,
        transaction::{
            builder::{CallArgument, Target, TransactionBuilder},
            CallArg,
        },
    };

    const SENDER: Address = Address::from_u8(0x11);

    fn coin(id: u8, balance: u64) -> Coin {
        Coin {
            coin_type: COIN_TYPE.to_owned(),
            coin_object_id: ObjectId::from_u8(id),
            version: 1,
            digest: Digest::zero(),
            balance,
        }
    }

    #[test]
    fn test_select_gas_coins() {
        let coins = vec![coin(1, 10), coin(2, 30), coin(3, 100)];
        let none = HashSet::new();

        let selected = select_gas_coins(&coins, 35, &none).unwrap();
        assert_eq!(
            selected.iter().map(|r| r.object_id).collect::<Vec<_>>(),
            vec![ObjectId::from_u8(1), ObjectId::from_u8(2)]
        );

        let excluded = HashSet::from([ObjectId::from_u8(1)]);
        let selected = select_gas_coins(&coins, 35, &excluded).unwrap();
        assert_eq!(selected[0].object_id, ObjectId::from_u8(2));
        assert_eq!(selected.len(), 2);

        assert!(matches!(
            select_gas_coins(&coins, 1_000, &none),
            Err(ClientError::InsufficientGas {
                required: 1_000,
                available: 140
            })
        ));
        assert!(matches!(
            select_gas_coins(&[], 0, &none),
            Err(ClientError::InsufficientGas { .. })
        ));
    }

    #[test]
    fn test_split_from_gas() {
        let target = Target::parse(ObjectId::from_u8(0xaa), "profile::tip").unwrap();
        let mut builder = TransactionBuilder::new();
        let coin = builder.split_gas(COIN_VALUE / 10).unwrap();
        builder
            .move_call(
                &target,
                vec![CallArgument::object(ObjectId::from_u8(1)), CallArgument::Result(coin)],
            )
            .unwrap();
        assert_eq!(split_from_gas(&builder.finish().unwrap()), COIN_VALUE / 10);
    }

    #[tokio::test]
    async fn test_build_resolves_objects_and_gas() {
        let ledger = MockLedger::new();
        ledger.set_gas_price(750);
        let package = ObjectId::from_u8(0xaa);
        let cap = ObjectId::from_u8(1);
        let stats = ObjectId::from_u8(2);
        ledger.add_profile_cap(SENDER, package, cap, ObjectId::from_u8(3));
        ledger.add_shared_object(stats, "0xaa::video::VideoStats", 8);
        ledger.add_coin(SENDER, ObjectId::from_u8(0x50), DEFAULT_GAS_BUDGET * 2);

        let target = Target::parse(package, "video::like").unwrap();
        let call = TransactionBuilder::build(
            &target,
            vec![
                CallArgument::object(stats),
                CallArgument::read_only(cap),
                CallArgument::Clock,
            ],
        )
        .unwrap();

        let state = TransactionBuilderState::new(&ledger, SENDER, GasSettings::default());
        let data = state.build(call).await.unwrap();

        let inputs = &data.programmable().inputs;
        assert_eq!(
            inputs[0],
            CallArg::Object(ObjectArg::SharedObject {
                id: stats,
                initial_shared_version: 8,
                mutable: true
            })
        );
        assert!(matches!(
            &inputs[1],
            CallArg::Object(ObjectArg::ImmOrOwnedObject(r)) if r.object_id == cap && r.version == 1
        ));
        assert!(matches!(
            &inputs[2],
            CallArg::Object(ObjectArg::SharedObject { id, mutable: false, .. }) if *id == CLOCK_OBJECT_ID
        ));

        let gas = data.gas_data();
        assert_eq!(gas.price, 750);
        assert_eq!(gas.budget, DEFAULT_GAS_BUDGET);
        assert_eq!(gas.owner, SENDER);
        assert_eq!(gas.payment[0].object_id, ObjectId::from_u8(0x50));
    }

    #[tokio::test]
    async fn test_build_with_missing_object() {
        let ledger = MockLedger::new();
        ledger.add_coin(SENDER, ObjectId::from_u8(0x50), DEFAULT_GAS_BUDGET);
        let target = Target::parse(ObjectId::from_u8(0xaa), "video::like").unwrap();
        let call =
            TransactionBuilder::build(&target, vec![CallArgument::object(ObjectId::from_u8(9))])
                .unwrap();

        let state = TransactionBuilderState::new(
            &ledger,
            SENDER,
            GasSettings {
                budget: DEFAULT_GAS_BUDGET,
                price: Some(1_000),
            },
        );
        assert!(matches!(
            state.build(call).await,
            Err(ClientError::ObjectNotFound(id)) if id == ObjectId::from_u8(9)
        ));
        assert_eq!(ledger.calls("get_reference_gas_price"), 0);
    }

    #[tokio::test]
    async fn test_build_without_gas() {
        let ledger = MockLedger::new();
        let target = Target::parse(ObjectId::from_u8(0xaa), "profile::create_profile").unwrap();
        let call = TransactionBuilder::build(&target, vec![CallArgument::pure("name")]).unwrap();

        let state = TransactionBuilderState::new(&ledger, SENDER, GasSettings::default());
        assert!(matches!(
            state.build(call).await,
            Err(ClientError::InsufficientGas { available: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_repeated_coin_cursor_stops() {
        let ledger = MockLedger::new();
        ledger.add_coin(SENDER, ObjectId::from_u8(0x50), 10);
        ledger.add_coin(SENDER, ObjectId::from_u8(0x51), 20);
        ledger.stick_cursors();

        let state = TransactionBuilderState::new(&ledger, SENDER, GasSettings::default());
        assert!(matches!(
            state.fetch_coins(DEFAULT_GAS_BUDGET).await,
            Err(ClientError::RemoteError(_))
        ));
        assert_eq!(ledger.calls("get_coins"), 2);
    }
}
