//! Programmable call builder.
//! Assembles the inputs and commands of a single ledger call without touching the network.
//! Object inputs are kept as plain ids here, they are pinned to a version
//! later by whoever has access to the ledger.

mod unsigned;

pub use unsigned::{InputArg, UnsignedCall};

use indexmap::IndexMap;
use std::{fmt, str::FromStr};
use thiserror::Error;

use super::{is_valid_identifier, Argument, Command, ObjectArg, ProgrammableMoveCall};
use crate::{
    config::{CLOCK_INITIAL_SHARED_VERSION, CLOCK_OBJECT_ID},
    crypto::{Address, CryptoError, ObjectId},
};

#[derive(Error, Debug)]
pub enum BuilderError {
    #[error("Invalid call target '{0}', expected 'module::function'")]
    InvalidTarget(String),
    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),
    #[error(transparent)]
    InvalidPackage(#[from] CryptoError),
    #[error("Too many inputs, limit is {}", u16::MAX)]
    TooManyInputs,
    #[error("Too many commands, limit is {}", u16::MAX)]
    TooManyCommands,
    #[error("Transaction has no command")]
    NoCommands,
    #[error("Amount to split cannot be zero")]
    ZeroAmount,
    #[error("Failed to encode pure value: {0}")]
    Encoding(#[from] bcs::Error),
}

// Raw value passed by value to the ledger, encoded with BCS
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PureValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Address(Address),
    // `ID` of an on-chain object, same layout as an address
    Id(ObjectId),
    // UTF-8 string, encoded as a byte vector
    String(String),
    Bytes(Vec<u8>),
}

impl PureValue {
    pub fn to_bytes(&self) -> Result<Vec<u8>, bcs::Error> {
        match self {
            PureValue::Bool(v) => bcs::to_bytes(v),
            PureValue::U8(v) => bcs::to_bytes(v),
            PureValue::U16(v) => bcs::to_bytes(v),
            PureValue::U32(v) => bcs::to_bytes(v),
            PureValue::U64(v) => bcs::to_bytes(v),
            PureValue::U128(v) => bcs::to_bytes(v),
            PureValue::Address(v) => bcs::to_bytes(v),
            PureValue::Id(v) => bcs::to_bytes(v),
            PureValue::String(v) => bcs::to_bytes(v),
            PureValue::Bytes(v) => bcs::to_bytes(v),
        }
    }
}

impl From<&str> for PureValue {
    fn from(value: &str) -> Self {
        PureValue::String(value.to_owned())
    }
}

impl From<String> for PureValue {
    fn from(value: String) -> Self {
        PureValue::String(value)
    }
}

impl From<u64> for PureValue {
    fn from(value: u64) -> Self {
        PureValue::U64(value)
    }
}

impl From<bool> for PureValue {
    fn from(value: bool) -> Self {
        PureValue::Bool(value)
    }
}

impl From<Address> for PureValue {
    fn from(value: Address) -> Self {
        PureValue::Address(value)
    }
}

// Argument of a move call, as written by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArgument {
    Object { id: ObjectId, mutable: bool },
    Pure(PureValue),
    // Shared clock singleton, always read-only
    Clock,
    GasCoin,
    // Output of an earlier command of the same transaction
    Result(Argument),
}

impl CallArgument {
    pub fn object(id: ObjectId) -> Self {
        CallArgument::Object { id, mutable: true }
    }

    pub fn read_only(id: ObjectId) -> Self {
        CallArgument::Object { id, mutable: false }
    }

    pub fn pure<V: Into<PureValue>>(value: V) -> Self {
        CallArgument::Pure(value.into())
    }
}

// Entry point of the contract: `package::module::function`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    package: ObjectId,
    module: String,
    function: String,
}

impl Target {
    pub fn new<M: Into<String>, F: Into<String>>(
        package: ObjectId,
        module: M,
        function: F,
    ) -> Result<Self, BuilderError> {
        let module = module.into();
        let function = function.into();
        for identifier in [&module, &function] {
            if !is_valid_identifier(identifier) {
                return Err(BuilderError::InvalidIdentifier(identifier.clone()));
            }
        }

        Ok(Self {
            package,
            module,
            function,
        })
    }

    // Parse a `module::function` path living in the given package
    pub fn parse(package: ObjectId, path: &str) -> Result<Self, BuilderError> {
        let (module, function) = path
            .split_once("::")
            .ok_or_else(|| BuilderError::InvalidTarget(path.to_owned()))?;
        Self::new(package, module, function)
    }

    pub fn package(&self) -> &ObjectId {
        &self.package
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn function(&self) -> &str {
        &self.function
    }
}

impl FromStr for Target {
    type Err = BuilderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (package, path) = value
            .split_once("::")
            .ok_or_else(|| BuilderError::InvalidTarget(value.to_owned()))?;
        Self::parse(ObjectId::from_hex(package)?, path)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.function)
    }
}

#[derive(Debug, Default)]
pub struct TransactionBuilder {
    inputs: Vec<InputArg>,
    // Position of each object in the inputs, an object is only passed once
    objects: IndexMap<ObjectId, u16>,
    commands: Vec<Command>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_input(&mut self, input: InputArg) -> Result<Argument, BuilderError> {
        let index = u16::try_from(self.inputs.len()).map_err(|_| BuilderError::TooManyInputs)?;
        self.inputs.push(input);
        Ok(Argument::Input(index))
    }

    fn push_command(&mut self, command: Command) -> Result<u16, BuilderError> {
        let index =
            u16::try_from(self.commands.len()).map_err(|_| BuilderError::TooManyCommands)?;
        self.commands.push(command);
        Ok(index)
    }

    pub fn pure(&mut self, value: PureValue) -> Result<Argument, BuilderError> {
        let bytes = value.to_bytes()?;
        self.push_input(InputArg::Pure(bytes))
    }

    // Passing the same object twice reuses its input, mutable access wins
    pub fn object(&mut self, id: ObjectId, mutable: bool) -> Result<Argument, BuilderError> {
        if let Some(index) = self.objects.get(&id) {
            let index = *index;
            if let InputArg::Object { mutable: current, .. } = &mut self.inputs[index as usize] {
                *current |= mutable;
            }
            return Ok(Argument::Input(index));
        }

        let argument = self.push_input(InputArg::Object { id, mutable })?;
        if let Argument::Input(index) = argument {
            self.objects.insert(id, index);
        }
        Ok(argument)
    }

    pub fn clock(&mut self) -> Result<Argument, BuilderError> {
        if let Some(index) = self.objects.get(&CLOCK_OBJECT_ID) {
            return Ok(Argument::Input(*index));
        }

        let argument = self.push_input(InputArg::Resolved(ObjectArg::SharedObject {
            id: CLOCK_OBJECT_ID,
            initial_shared_version: CLOCK_INITIAL_SHARED_VERSION,
            mutable: false,
        }))?;
        if let Argument::Input(index) = argument {
            self.objects.insert(CLOCK_OBJECT_ID, index);
        }
        Ok(argument)
    }

    pub fn argument(&mut self, argument: CallArgument) -> Result<Argument, BuilderError> {
        match argument {
            CallArgument::Object { id, mutable } => self.object(id, mutable),
            CallArgument::Pure(value) => self.pure(value),
            CallArgument::Clock => self.clock(),
            CallArgument::GasCoin => Ok(Argument::GasCoin),
            CallArgument::Result(argument) => Ok(argument),
        }
    }

    // Returns the result of the call so it can be used by a later command
    pub fn move_call(
        &mut self,
        target: &Target,
        arguments: Vec<CallArgument>,
    ) -> Result<Argument, BuilderError> {
        let arguments = arguments
            .into_iter()
            .map(|argument| self.argument(argument))
            .collect::<Result<Vec<_>, _>>()?;

        let index = self.push_command(Command::MoveCall(Box::new(ProgrammableMoveCall {
            package: target.package,
            module: target.module.clone(),
            function: target.function.clone(),
            type_arguments: Vec::new(),
            arguments,
        })))?;

        Ok(Argument::Result(index))
    }

    pub fn transfer_objects(
        &mut self,
        objects: Vec<Argument>,
        recipient: Address,
    ) -> Result<(), BuilderError> {
        let recipient = self.pure(PureValue::Address(recipient))?;
        self.push_command(Command::TransferObjects(objects, recipient))?;
        Ok(())
    }

    // Split a new coin of `amount` base units off the gas coin
    pub fn split_gas(&mut self, amount: u64) -> Result<Argument, BuilderError> {
        if amount == 0 {
            return Err(BuilderError::ZeroAmount);
        }

        let amount = self.pure(PureValue::U64(amount))?;
        let index = self.push_command(Command::SplitCoins(Argument::GasCoin, vec![amount]))?;
        Ok(Argument::NestedResult(index, 0))
    }

    pub fn finish(self) -> Result<UnsignedCall, BuilderError> {
        if self.commands.is_empty() {
            return Err(BuilderError::NoCommands);
        }

        Ok(UnsignedCall::new(self.inputs, self.commands))
    }

    // Single call transaction
    pub fn build(target: &Target, arguments: Vec<CallArgument>) -> Result<UnsignedCall, BuilderError> {
        let mut builder = Self::new();
        builder.move_call(target, arguments)?;
        builder.finish()
    }
}
