use log::{debug, trace, warn};
use reelchain_common::{
    api::{ObjectData, ObjectDataOptions, ObjectFilter, ObjectQuery},
    config::MAX_PAGE_SIZE,
    crypto::{Address, ObjectId},
    rpc::RpcError,
    transaction::StructTag,
};
use serde::Serialize;
use serde_json::Value;

use crate::{
    error::{ClientError, Result},
    ledger::{CursorTrail, LedgerApi},
};

pub const PROFILE_MODULE: &str = "profile";
pub const PROFILE_OWNER_CAP: &str = "ProfileOwnerCap";
// Field of the capability holding the id of the profile it controls
pub const PROFILE_ID_FIELD: &str = "profile_id";

pub fn profile_owner_cap_type(package: ObjectId) -> StructTag {
    StructTag::new(package.into(), PROFILE_MODULE, PROFILE_OWNER_CAP)
}

// Owned capability and the entity it controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capability {
    pub capability_id: ObjectId,
    pub controlled_entity_id: ObjectId,
}

// What to do when the owner holds several capabilities of the same type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapabilitySelection {
    // Fail with AmbiguousResult
    #[default]
    Unique,
    // Take the first one returned by the node
    First,
    // Use this capability, it must be owned by the caller
    Explicit(ObjectId),
}

pub struct CapabilityLocator<'a> {
    ledger: &'a dyn LedgerApi,
    page_size: usize,
}

impl<'a> CapabilityLocator<'a> {
    pub fn new(ledger: &'a dyn LedgerApi) -> Self {
        Self {
            ledger,
            page_size: MAX_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    // Every object of the given type owned by `owner`, following all pages
    pub async fn owned_objects(
        &self,
        owner: &Address,
        object_type: &StructTag,
    ) -> Result<Vec<ObjectData>> {
        let query = ObjectQuery {
            filter: Some(ObjectFilter::StructType(object_type.to_string())),
            options: ObjectDataOptions::with_content(),
        };

        let mut objects = Vec::new();
        let mut cursor: Option<ObjectId> = None;
        let mut trail = CursorTrail::new();
        loop {
            if log::log_enabled!(log::Level::Trace) {
                trace!("fetching {} owned by {} after {:?}", object_type, owner, cursor);
            }

            let page = self
                .ledger
                .get_owned_objects(owner, &query, cursor.as_ref(), Some(self.page_size))
                .await?;

            let next = page.continuation().copied();
            for response in page.data {
                let data = response.into_data().map_err(|error| {
                    ClientError::RemoteError(RpcError::InvalidResponse(format!(
                        "unreadable {} owned by {}: {}",
                        object_type, owner, error
                    )))
                })?;
                objects.push(data);
            }

            match next {
                Some(next) => cursor = Some(trail.advance(next)?),
                None => break,
            }
        }

        Ok(objects)
    }

    pub async fn locate(
        &self,
        owner: &Address,
        capability_type: &StructTag,
        field: &str,
        selection: CapabilitySelection,
    ) -> Result<Capability> {
        let candidates = self.owned_objects(owner, capability_type).await?;
        if candidates.is_empty() && !matches!(selection, CapabilitySelection::Explicit(_)) {
            return Err(ClientError::CapabilityNotFound {
                owner: owner.to_string(),
                capability_type: capability_type.to_string(),
            });
        }

        let selected = match selection {
            CapabilitySelection::Unique => {
                if candidates.len() > 1 {
                    return Err(ClientError::AmbiguousResult {
                        capability_type: capability_type.to_string(),
                        candidates: candidates.iter().map(|c| c.object_id).collect(),
                    });
                }
                &candidates[0]
            }
            CapabilitySelection::First => {
                if candidates.len() > 1 {
                    warn!(
                        "{} capabilities of type {} found, using {}",
                        candidates.len(),
                        capability_type,
                        candidates[0].object_id
                    );
                }
                &candidates[0]
            }
            CapabilitySelection::Explicit(id) => candidates
                .iter()
                .find(|c| c.object_id == id)
                .ok_or(ClientError::CapabilityNotOwned(id))?,
        };

        let capability = Capability {
            capability_id: selected.object_id,
            controlled_entity_id: extract_id_field(selected, field)?,
        };

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Located capability {} controlling {}",
                capability.capability_id, capability.controlled_entity_id
            );
        }
        Ok(capability)
    }

    // Profile capability of `owner` for the given contract package
    pub async fn locate_profile(
        &self,
        owner: &Address,
        package: ObjectId,
        selection: CapabilitySelection,
    ) -> Result<Capability> {
        self.locate(
            owner,
            &profile_owner_cap_type(package),
            PROFILE_ID_FIELD,
            selection,
        )
        .await
    }
}

// Read an object id stored in a field of the object content
pub fn extract_id_field(object: &ObjectData, field: &str) -> Result<ObjectId> {
    let malformed = |reason: String| ClientError::MalformedObject {
        object_id: object.object_id,
        reason,
    };

    if object.content.is_none() {
        return Err(malformed("content is missing".to_owned()));
    }

    match object.field(field) {
        Some(Value::String(value)) => ObjectId::from_hex(value)
            .map_err(|e| malformed(format!("field '{}' is not an id: {}", field, e))),
        Some(other) => Err(malformed(format!(
            "field '{}' is not an id: {}",
            field, other
        ))),
        None => Err(malformed(format!("field '{}' is missing", field))),
    }
}
