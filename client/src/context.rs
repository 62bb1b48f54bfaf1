use std::sync::Arc;

use log::info;
use reelchain_common::{
    config::{MAX_PAGE_SIZE, PACKAGE_LOGICAL_NAME},
    crypto::{Address, KeyPair, ObjectId},
    transaction::builder::UnsignedCall,
};

use crate::{
    capability::{Capability, CapabilityLocator, CapabilitySelection},
    error::Result,
    events::EventReader,
    executor::{Executor, TransactionOutcome},
    ledger::{EventOrder, LedgerApi},
    manifest::IdentityResolver,
    transaction_builder::{GasSettings, TransactionBuilderState},
};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub gas: GasSettings,
    pub selection: CapabilitySelection,
    pub page_size: usize,
    pub order: EventOrder,
    // Simulate mutating calls instead of submitting them
    pub dry_run: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            gas: GasSettings::default(),
            selection: CapabilitySelection::default(),
            page_size: MAX_PAGE_SIZE,
            order: EventOrder::default(),
            dry_run: false,
        }
    }
}

// Everything an operation needs, built once at startup and only read afterwards
pub struct ClientContext {
    ledger: Arc<dyn LedgerApi>,
    keypair: KeyPair,
    resolver: IdentityResolver,
    settings: ClientSettings,
}

impl ClientContext {
    pub fn new(
        ledger: Arc<dyn LedgerApi>,
        keypair: KeyPair,
        resolver: IdentityResolver,
        settings: ClientSettings,
    ) -> Self {
        Self {
            ledger,
            keypair,
            resolver,
            settings,
        }
    }

    pub fn ledger(&self) -> &dyn LedgerApi {
        self.ledger.as_ref()
    }

    pub fn address(&self) -> Address {
        self.keypair.address()
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    // Id of the deployed contract package
    pub fn package(&self) -> Result<ObjectId> {
        self.resolver.resolve(PACKAGE_LOGICAL_NAME)
    }

    pub fn locator(&self) -> CapabilityLocator<'_> {
        CapabilityLocator::new(self.ledger()).with_page_size(self.settings.page_size)
    }

    pub fn event_reader(&self) -> EventReader<'_> {
        EventReader::new(self.ledger())
            .with_page_size(self.settings.page_size)
            .with_order(self.settings.order)
    }

    pub fn executor(&self) -> Executor<'_> {
        Executor::new(self.ledger(), &self.keypair)
    }

    // Profile capability of the signer
    pub async fn profile_capability(&self) -> Result<Capability> {
        let package = self.package()?;
        self.locator()
            .locate_profile(&self.address(), package, self.settings.selection)
            .await
    }

    // Resolve, sign and submit (or simulate) a call
    pub async fn submit(&self, call: UnsignedCall) -> Result<TransactionOutcome> {
        let data = TransactionBuilderState::new(self.ledger(), self.address(), self.settings.gas)
            .build(call)
            .await?;

        let outcome = self.executor().run(data, self.settings.dry_run).await?;
        if outcome.dry_run {
            info!("Dry run of {} succeeded", outcome.digest);
        } else {
            info!("Transaction {} executed", outcome.digest);
        }
        Ok(outcome)
    }
}
