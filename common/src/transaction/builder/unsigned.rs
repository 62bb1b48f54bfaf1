use crate::{
    crypto::ObjectId,
    transaction::{CallArg, Command, ObjectArg, ProgrammableTransaction},
};

// Input of a call before objects are pinned to their current version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputArg {
    Pure(Vec<u8>),
    Object { id: ObjectId, mutable: bool },
    // Already known reference, such as the clock
    Resolved(ObjectArg),
}

// Call built locally, waiting for its objects to be resolved against the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedCall {
    inputs: Vec<InputArg>,
    commands: Vec<Command>,
}

impl UnsignedCall {
    pub(super) fn new(inputs: Vec<InputArg>, commands: Vec<Command>) -> Self {
        Self { inputs, commands }
    }

    pub fn inputs(&self) -> &[InputArg] {
        &self.inputs
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    // Objects that still need to be resolved, in input order
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.inputs
            .iter()
            .filter_map(|input| match input {
                InputArg::Object { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    // Every object referenced by the call, resolved or not
    pub fn referenced_objects(&self) -> Vec<ObjectId> {
        self.inputs
            .iter()
            .filter_map(|input| match input {
                InputArg::Object { id, .. } => Some(*id),
                InputArg::Resolved(arg) => Some(arg.id()),
                InputArg::Pure(_) => None,
            })
            .collect()
    }

    // Pin every object input using the provided resolver, keeping the input order
    pub fn resolve<E, F>(self, mut resolver: F) -> Result<ProgrammableTransaction, E>
    where
        F: FnMut(&ObjectId, bool) -> Result<ObjectArg, E>,
    {
        let inputs = self
            .inputs
            .into_iter()
            .map(|input| match input {
                InputArg::Pure(bytes) => Ok(CallArg::Pure(bytes)),
                InputArg::Object { id, mutable } => resolver(&id, mutable).map(CallArg::Object),
                InputArg::Resolved(arg) => Ok(CallArg::Object(arg)),
            })
            .collect::<Result<Vec<_>, E>>()?;

        Ok(ProgrammableTransaction {
            inputs,
            commands: self.commands,
        })
    }
}
